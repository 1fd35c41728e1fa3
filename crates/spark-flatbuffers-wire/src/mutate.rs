use core::fmt;

use crate::read::read_at;
use crate::{Scalar, Table, VOffset};

/// `TableMut` 是覆盖在独占字节上的可写表访问器。
///
/// # 设计背景（Why）
/// - 原地改写是 FlatBuffers 的重要卖点：修改一个已存在的定长字段无需重新序列化整条消息；
/// - 通过 `&'a mut [u8]` 借用，编译期即可保证同一时刻只有一个写入者。
///
/// # 契约说明（What）
/// - 只能覆盖**已经写入缓冲**的字段；被构建器省略的缺省值字段没有存储槽位，[`TableMut::set`] 返回 `false`；
/// - 写入宽度由 `T::SIZE` 决定，调用方需保证与 schema 声明的字段类型一致。
pub struct TableMut<'a> {
    buf: &'a mut [u8],
    loc: usize,
}

impl<'a> TableMut<'a> {
    /// 在给定绝对位置构造可写访问器。
    pub fn new(buf: &'a mut [u8], loc: usize) -> Self {
        Self { buf, loc }
    }

    /// 按根偏移定位根表，语义与 [`Table::follow_root`] 一致。
    pub fn follow_root(buf: &'a mut [u8]) -> Self {
        let loc = read_at::<u32>(buf, 0)
            .map(|offset| offset as usize)
            .unwrap_or(usize::MAX);
        Self { buf, loc }
    }

    /// 以只读视角访问同一张表。
    pub fn as_table(&self) -> Table<'_> {
        Table::new(self.buf, self.loc)
    }

    /// 读取标量字段，缺省时返回 `default`。
    pub fn get<T: Scalar>(&self, voffset: VOffset, default: T) -> T {
        self.as_table().get(voffset, default)
    }

    /// 原地覆盖标量字段，字段缺省或越界时返回 `false` 且不修改任何字节。
    pub fn set<T: Scalar>(&mut self, voffset: VOffset, value: T) -> bool {
        let Some(pos) = self.as_table().field_offset(voffset) else {
            return false;
        };
        match pos
            .checked_add(T::SIZE)
            .and_then(|end| self.buf.get_mut(pos..end))
        {
            Some(slot) => {
                value.write_le(slot);
                true
            }
            None => false,
        }
    }

    /// 原地覆盖内联 struct 字段的全部字节。
    pub fn set_struct_bytes(&mut self, voffset: VOffset, bytes: &[u8]) -> bool {
        let Some(pos) = self.as_table().field_offset(voffset) else {
            return false;
        };
        match pos
            .checked_add(bytes.len())
            .and_then(|end| self.buf.get_mut(pos..end))
        {
            Some(slot) => {
                slot.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for TableMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableMut")
            .field("loc", &self.loc)
            .field("buffer_len", &self.buf.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_field_buffer() -> [u8; 20] {
        [
            12, 0, 0, 0, // root -> 12
            8, 0, // vtable len
            8, 0, // table len
            4, 0, // voffset 4 -> table + 4
            0, 0, // voffset 6 absent
            8, 0, 0, 0, // soffset
            5, 0, // u16 field
            0, 0,
        ]
    }

    #[test]
    fn present_field_is_overwritten_in_place() {
        let mut bytes = one_field_buffer();
        let mut table = TableMut::follow_root(&mut bytes);
        assert!(table.set::<u16>(4, 300));
        assert_eq!(table.get::<u16>(4, 0), 300);
        assert_eq!(&bytes[16..18], &300u16.to_le_bytes());
    }

    #[test]
    fn absent_field_is_left_untouched() {
        let mut bytes = one_field_buffer();
        let before = bytes;
        let mut table = TableMut::follow_root(&mut bytes);
        assert!(!table.set::<u16>(6, 1));
        assert!(!table.set::<u16>(40, 1));
        assert_eq!(bytes, before);
    }
}
