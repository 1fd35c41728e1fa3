//! 内部 sealed 模块用于控制外部扩展边界。
//!
//! # 设计背景（Why）
//! - [`crate::AnyBufferView`] 的写入与分发路径依赖“实现者必然是 [`crate::TypedView`]”这一前提，
//!   `Value::downcast` 也只认识该类型；
//! - 与对所有类型 blanket 实现的做法不同，这里只为 `TypedView<T>` 实现标记，外部 crate 无法再扩展实现者集合。
//!
//! # 契约说明（What）
//! - `Sealed` 不对外导出；新增实现者需在本 crate 内完成，并同步更新 `Value` 的分发逻辑。
pub trait Sealed {}

impl<T: spark_flatbuffers_wire::RootTable> Sealed for crate::view::TypedView<T> {}
