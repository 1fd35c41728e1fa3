//! schema 生成代码与上层适配器之间的协作契约。
//!
//! # 教案背景（Why）
//! - 适配层需要以类型参数 `T` 统一处理任意 schema 表：只读访问、原地改写、内存对象打包；
//! - 使用 GAT 表达“访问器借用底层缓冲”的关系，访问器的生命周期由调用点的借用自动约束。

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::{VOffset, WireError};
#[cfg(feature = "alloc")]
use crate::TableWriter;

/// 按字段声明顺序计算 vtable 偏移：第 `index` 个字段位于 `4 + 2 * index`。
pub const fn field_voffset(index: u16) -> VOffset {
    4 + 2 * index
}

/// `RootTable` 描述一种可以作为消息根的 schema 表。
///
/// # 教案式说明
/// - **意图 (Why)**：把“字节 → 类型化访问器”的定位逻辑交给生成代码，适配层只关心类型参数；
/// - **契约 (What)**：
///   - `FULLY_QUALIFIED_NAME` 为 schema 中的全限定名（如 `MyGame.Sample.Monster`），用于日志与类型标识；
///   - `follow_root` 不做校验，畸形数据得到的访问器读出缺省值；需要校验时先调用 [`RootTable::verify`]；
///   - `follow_root_mut` 的访问器独占借用缓冲，只允许覆盖已存在的定长字段；
/// - **权衡 (Trade-offs)**：标记类型通常为零尺寸，不携带任何数据，仅作为类型级标识参与泛型分发。
pub trait RootTable: Send + Sync + 'static {
    /// schema 全限定名。
    const FULLY_QUALIFIED_NAME: &'static str;

    /// 只读访问器。
    type Ref<'a>;

    /// 可写访问器。
    type Mut<'a>;

    /// 定位只读根访问器。
    fn follow_root(buf: &[u8]) -> Self::Ref<'_>;

    /// 定位可写根访问器。
    fn follow_root_mut(buf: &mut [u8]) -> Self::Mut<'_>;

    /// 校验根结构位于缓冲之内，默认实现委托给 [`crate::check_root`]。
    fn verify(buf: &[u8]) -> Result<(), WireError> {
        crate::verify::check_root(buf)
    }
}

/// `NativeTable` 是 schema 表的内存表示（“object API”），负责把自身打包为线格式。
///
/// # 契约说明（What）
/// - `pack` 只向 [`TableWriter`] 登记字段，不负责最终布局；
/// - 与缺省值相等的标量字段可由 `pack` 交给构建器省略，读取侧会自动回退为缺省值。
#[cfg(feature = "alloc")]
pub trait NativeTable {
    /// 对应的根表类型。
    type Root: RootTable;

    /// 将字段登记到构建器。
    fn pack(&self, writer: &mut TableWriter) -> Result<(), WireError>;
}

/// 将内存对象打包为完整消息。
#[cfg(feature = "alloc")]
pub fn finish<N: NativeTable + ?Sized>(native: &N) -> Result<Vec<u8>, WireError> {
    let mut writer = TableWriter::new();
    native.pack(&mut writer)?;
    writer.finish()
}

/// 将内存对象打包为带 4 字节长度前缀的消息。
#[cfg(feature = "alloc")]
pub fn finish_size_prefixed<N: NativeTable + ?Sized>(native: &N) -> Result<Vec<u8>, WireError> {
    let mut writer = TableWriter::new();
    native.pack(&mut writer)?;
    writer.finish_size_prefixed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voffsets_follow_declaration_order() {
        assert_eq!(field_voffset(0), 4);
        assert_eq!(field_voffset(1), 6);
        assert_eq!(field_voffset(5), 14);
    }
}
