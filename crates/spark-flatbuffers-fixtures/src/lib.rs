#![warn(missing_docs)]

//! `spark-flatbuffers-fixtures` 提供 `MyGame.Sample` 样例 schema 的手写生成代码。
//!
//! # 教案背景（Why）
//! - 编解码适配层以类型参数处理任意 schema 表，测试、基准与演示都需要一组稳定的具体类型；
//! - 这里的代码形态与 schema 编译器产物一致：零尺寸标记类型实现 [`RootTable`]，
//!   `*Ref`/`*Mut` 访问器按 vtable 偏移读写字段，`*T` 为可打包的内存表示。
//!
//! # 对应 schema（What）
//! ```text
//! namespace MyGame.Sample;
//! enum Color:byte { Red = 1, Green = 2, Blue = 8 }
//! struct Vec3 { x:float; y:float; z:float; }
//! table Monster {
//!   pos:Vec3; mana:short = 150; hp:short = 100; name:string;
//!   friendly:bool = false (deprecated); inventory:[ubyte]; color:Color = Blue;
//! }
//! table Weapon { name:string; damage:short; }
//! ```
//!
//! [`RootTable`]: spark_flatbuffers_wire::RootTable

mod monster;
mod weapon;

pub use crate::monster::{Color, Monster, MonsterMut, MonsterRef, MonsterT, Vec3};
pub use crate::weapon::{Weapon, WeaponRef, WeaponT};
