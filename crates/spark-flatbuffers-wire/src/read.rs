use core::fmt;
use core::marker::PhantomData;

use crate::{Scalar, UOFFSET_SIZE, VOffset, WireError};

/// 在绝对位置 `pos` 读取一个标量；越界时返回 `None`。
#[inline]
pub(crate) fn read_at<T: Scalar>(buf: &[u8], pos: usize) -> Option<T> {
    let end = pos.checked_add(T::SIZE)?;
    buf.get(pos..end).map(T::read_le)
}

/// `Table` 是覆盖在只读字节上的表访问器，schema 生成代码在其之上提供具名字段方法。
///
/// # 设计背景（Why）
/// - 零拷贝：字段直接从原始字节解析，不构造中间对象；
/// - 借用检查保证访问器不会比底层字节活得更久，视图生命周期问题在编译期即被拦截。
///
/// # 逻辑解析（How）
/// - `loc` 为表在缓冲内的绝对位置；`soffset` 决定 vtable 位置；
/// - 每个字段通过 vtable 中的 `u16` 相对偏移定位，偏移为 0 或超出 vtable 长度即视为缺省。
///
/// # 契约说明（What）
/// - 所有读取都做越界检查：畸形数据会得到缺省值或 `None`，不会 panic；
/// - 需要“先校验再读取”的调用方应使用 [`Table::root`] 或 [`crate::check_root`]。
#[derive(Clone, Copy)]
pub struct Table<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> Table<'a> {
    /// 在给定绝对位置构造表访问器。
    pub fn new(buf: &'a [u8], loc: usize) -> Self {
        Self { buf, loc }
    }

    /// 按根偏移定位根表，不做任何校验。
    ///
    /// 缓冲不足 4 字节时返回一个所有字段都缺省的访问器。
    pub fn follow_root(buf: &'a [u8]) -> Self {
        let loc = read_at::<u32>(buf, 0)
            .map(|offset| offset as usize)
            .unwrap_or(usize::MAX);
        Self { buf, loc }
    }

    /// 先做边界检查再定位根表。
    pub fn root(buf: &'a [u8]) -> Result<Self, WireError> {
        crate::verify::check_root(buf)?;
        Ok(Self::follow_root(buf))
    }

    /// 底层字节。
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// 表的绝对位置。
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// 返回 vtable 的绝对位置与声明长度。
    pub(crate) fn vtable(&self) -> Option<(usize, u16)> {
        let soffset = read_at::<i32>(self.buf, self.loc)?;
        let position = i64::try_from(self.loc)
            .ok()?
            .checked_sub(i64::from(soffset))?;
        let position = usize::try_from(position).ok()?;
        let len = read_at::<u16>(self.buf, position)?;
        Some((position, len))
    }

    /// 查询字段的绝对位置；字段缺省时返回 `None`。
    pub fn field_offset(&self, voffset: VOffset) -> Option<usize> {
        let (vtable, vtable_len) = self.vtable()?;
        if voffset < 4 || voffset.checked_add(2)? > vtable_len {
            return None;
        }
        let relative = read_at::<u16>(self.buf, vtable.checked_add(usize::from(voffset))?)?;
        if relative == 0 {
            return None;
        }
        self.loc.checked_add(usize::from(relative))
    }

    /// 读取标量字段，缺省或越界时返回 `default`。
    pub fn get<T: Scalar>(&self, voffset: VOffset, default: T) -> T {
        self.get_optional(voffset).unwrap_or(default)
    }

    /// 读取标量字段，缺省或越界时返回 `None`。
    pub fn get_optional<T: Scalar>(&self, voffset: VOffset) -> Option<T> {
        self.field_offset(voffset)
            .and_then(|pos| read_at::<T>(self.buf, pos))
    }

    /// 读取 UTF-8 字符串字段。
    pub fn get_str(&self, voffset: VOffset) -> Option<&'a str> {
        let bytes = self.get_vector::<u8>(voffset)?;
        core::str::from_utf8(bytes.bytes()).ok()
    }

    /// 读取标量向量字段。
    pub fn get_vector<T: Scalar>(&self, voffset: VOffset) -> Option<Vector<'a, T>> {
        let start = self.follow_uoffset(voffset)?;
        let len = read_at::<u32>(self.buf, start)? as usize;
        let data_start = start.checked_add(UOFFSET_SIZE)?;
        let data_end = data_start.checked_add(len.checked_mul(T::SIZE)?)?;
        let data = self.buf.get(data_start..data_end)?;
        Some(Vector {
            data,
            len,
            _marker: PhantomData,
        })
    }

    /// 读取内联 struct 字段的原始字节，`size` 为 struct 的定长宽度。
    pub fn get_struct_bytes(&self, voffset: VOffset, size: usize) -> Option<&'a [u8]> {
        let pos = self.field_offset(voffset)?;
        self.buf.get(pos..pos.checked_add(size)?)
    }

    fn follow_uoffset(&self, voffset: VOffset) -> Option<usize> {
        let pos = self.field_offset(voffset)?;
        let offset = read_at::<u32>(self.buf, pos)?;
        pos.checked_add(offset as usize)
    }
}

impl fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("loc", &self.loc)
            .field("buffer_len", &self.buf.len())
            .finish()
    }
}

/// `Vector` 是长度前缀标量向量的零拷贝视图。
pub struct Vector<'a, T: Scalar> {
    data: &'a [u8],
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Scalar> Clone for Vector<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar> Copy for Vector<'_, T> {}

impl<'a, T: Scalar> Vector<'a, T> {
    /// 元素个数。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空向量。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 读取第 `index` 个元素。
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let start = index * T::SIZE;
        Some(T::read_le(&self.data[start..start + T::SIZE]))
    }

    /// 顺序迭代全部元素。
    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter {
            vector: *self,
            index: 0,
        }
    }

    /// 将元素复制到新的 `Vec`。
    #[cfg(feature = "alloc")]
    pub fn to_vec(&self) -> alloc::vec::Vec<T> {
        self.iter().collect()
    }
}

impl<'a> Vector<'a, u8> {
    /// 字节向量可直接借出底层切片。
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }
}

impl<T: Scalar + fmt::Debug> fmt::Debug for Vector<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Scalar> IntoIterator for Vector<'a, T> {
    type Item = T;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`Vector`] 的迭代器。
pub struct VectorIter<'a, T: Scalar> {
    vector: Vector<'a, T>,
    index: usize,
}

impl<T: Scalar> Iterator for VectorIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.vector.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Scalar> ExactSizeIterator for VectorIter<'_, T> {}
