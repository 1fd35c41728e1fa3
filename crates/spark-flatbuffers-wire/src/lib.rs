#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! `spark-flatbuffers-wire` 提供 FlatBuffers 表格式的底层读写原语。
//!
//! # 教案背景（Why）
//! - 编解码适配层只需要“从字节拿到根表视图”与“把内存对象序列化为字节”两项能力，
//!   不需要完整的 schema 编译器；本 crate 将这两项能力沉淀为稳定的协作契约；
//! - 所有读取均做越界检查，畸形输入只会得到缺省值或 `None`，绝不触发未定义行为。
//!
//! # 使用概览（How）
//! - schema 生成代码为每张表实现 [`RootTable`]（只读/可变根视图）与 [`NativeTable`]（内存表示的打包）；
//! - 读取侧通过 [`Table`] 与 [`Vector`] 按 vtable 偏移访问字段；
//! - 改写侧通过 [`TableMut::set`] 原地覆盖已存在的标量字段；
//! - 构建侧通过 [`TableWriter`] 收集字段，再由 [`finish`]/[`finish_size_prefixed`] 产出字节。
//!
//! # 线格式摘要（What）
//! - 字节 0..4 为小端 `uoffset`，指向根表；
//! - 表起始处为 `soffset`，`表位置 - soffset` 即 vtable 位置；
//! - vtable 依次为 vtable 长度、表长度与每个字段相对表起点的 `u16` 偏移，偏移为 0 表示字段缺省；
//! - 字符串与向量位于表之后，以 `u32` 长度前缀开头，字符串额外以 `\0` 结尾。
//!
//! # 风险提示（Trade-offs）
//! - 构建器仅覆盖单表（标量、字符串、标量向量、内联 struct），嵌套表需由上层拆分为独立消息；
//! - 不做 schema 级校验，[`check_root`] 只确认根偏移、vtable 与表范围位于缓冲之内。

#[cfg(feature = "alloc")]
extern crate alloc;

mod error;
mod mutate;
mod read;
mod scalar;
mod table;
mod verify;
#[cfg(feature = "alloc")]
mod write;

pub use crate::error::WireError;
pub use crate::mutate::TableMut;
pub use crate::read::{Table, Vector, VectorIter};
pub use crate::scalar::Scalar;
pub use crate::table::{RootTable, field_voffset};
#[cfg(feature = "alloc")]
pub use crate::table::{NativeTable, finish, finish_size_prefixed};
pub use crate::verify::{check_root, read_size_prefix};
#[cfg(feature = "alloc")]
pub use crate::write::TableWriter;

/// vtable 内字段偏移的类型，单位为字节。
pub type VOffset = u16;

/// 根偏移、字符串与向量长度前缀、size prefix 的字节宽度。
pub const UOFFSET_SIZE: usize = 4;

/// 本 crate 的结果别名。
pub type Result<T, E = WireError> = core::result::Result<T, E>;
