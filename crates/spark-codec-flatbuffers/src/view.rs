//! 类型化视图：缓冲句柄与 schema 根访问器的组合。

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use spark_flatbuffers_wire::{NativeTable, RootTable, WireError};

use crate::buffer::BufferHandle;
use crate::registry::TypeRegistry;
use crate::sealed::Sealed;
use crate::token::TypeToken;

/// `AnyBufferView` 是所有 [`TypedView`] 共享的对象安全接口。
///
/// # 设计初衷（Why）
/// - 写入路径只需要“拿到字节”，读取路径需要“按令牌产出值”，二者都不能在编译期命名具体 schema 类型；
/// - 该 trait 是 sealed 的：实现者只有 `TypedView<T>`，[`crate::Value::downcast`] 依赖这一点。
///
/// # 契约说明（What）
/// - `buffer_bytes` 返回视图背后的完整缓冲，空视图返回空切片；
/// - `type_token` 不触发注册。
pub trait AnyBufferView: Send + Sync + fmt::Debug + Sealed {
    /// 视图的类型令牌。
    fn type_token(&self) -> TypeToken;

    /// 视图背后的全部字节。
    fn buffer_bytes(&self) -> &[u8];

    /// 视图是否可原地改写。
    fn is_mutable(&self) -> bool;

    /// 以 [`Any`] 借出，用于类型判断。
    fn as_any(&self) -> &dyn Any;

    /// 转为 [`Any`]，用于向下转型。
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// `TypedView<T>` 把缓冲句柄解释为 schema 表 `T` 的根。
///
/// # 设计背景（Why）
/// - FlatBuffers 的根访问器只是缓冲内的一个位置，独立存在毫无意义；
///   视图持有 [`BufferHandle`]，访问器在每次调用时从 `&self`（或 `&mut self`）借出，
///   因此访问器不可能比缓冲活得更久，也不可能被脱离句柄单独保存；
/// - 构造、读取、冻结都不复制或搬移字节。
///
/// # 逻辑解析（How）
/// - 只读视图：[`TypedView::table`] 经 [`RootTable::follow_root`] 得到访问器；
/// - 可写视图：要求独占句柄，[`TypedView::mutable_table`] 经 [`RootTable::follow_root_mut`] 得到可写访问器；
///   `&mut self` 保证同一时刻只有一个写入者；
/// - 空视图：由 [`TypedView::empty`] 显式构造，仅用于表达“视图存在但没有字节”，读取得到全部缺省值。
///
/// # 契约说明（What）
/// - 不做 schema 校验；需要边界检查时调用 [`TypedView::check_bounds`]；
/// - [`TypedView::type_token`] 会在首次调用时把 `T` 注册到全局注册表。
///
/// # 风险提示（Trade-offs）
/// - 克隆只读视图共享底层字节；克隆可写视图会复制出独立缓冲，见 [`BufferHandle`] 的克隆语义。
pub struct TypedView<T: RootTable> {
    handle: BufferHandle,
    mutable: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RootTable> TypedView<T> {
    /// 将句柄解释为 `T` 的根，得到只读视图；空句柄返回 `None`。
    pub fn from_buffer(handle: BufferHandle) -> Option<Self> {
        if handle.is_empty() {
            return None;
        }
        Some(Self::wrap(handle, false))
    }

    /// 在独占句柄上构造可写视图；共享或空句柄返回 `None`。
    pub fn from_mutable_buffer(handle: BufferHandle) -> Option<Self> {
        if !handle.is_mutable() {
            return None;
        }
        Some(Self::wrap(handle, true))
    }

    /// 没有任何字节的空视图。
    pub fn empty() -> Self {
        Self::wrap(BufferHandle::empty(), false)
    }

    /// 将内存表示打包为新缓冲，得到只读视图。
    pub fn from_native<N>(native: &N) -> Result<Self, WireError>
    where
        N: NativeTable<Root = T> + ?Sized,
    {
        let bytes = spark_flatbuffers_wire::finish(native)?;
        Ok(Self::wrap(BufferHandle::from_vec(bytes), false))
    }

    /// 将内存表示打包为新的独占缓冲，得到可写视图。
    pub fn from_native_mut<N>(native: &N) -> Result<Self, WireError>
    where
        N: NativeTable<Root = T> + ?Sized,
    {
        let bytes = spark_flatbuffers_wire::finish(native)?;
        Ok(Self::wrap(BufferHandle::exclusive_from_vec(bytes), true))
    }

    fn wrap(handle: BufferHandle, mutable: bool) -> Self {
        Self {
            handle,
            mutable,
            _marker: PhantomData,
        }
    }

    /// 只读根访问器，可写视图同样可用。
    pub fn table(&self) -> T::Ref<'_> {
        T::follow_root(self.handle.data())
    }

    /// 可写根访问器；只读视图返回 `None`。
    pub fn mutable_table(&mut self) -> Option<T::Mut<'_>> {
        if !self.mutable {
            return None;
        }
        self.handle.data_mut().map(T::follow_root_mut)
    }

    /// 背后的缓冲句柄。
    pub fn buffer(&self) -> &BufferHandle {
        &self.handle
    }

    /// 背后的全部字节。
    pub fn bytes(&self) -> &[u8] {
        self.handle.data()
    }

    /// 取回缓冲句柄，视图随之消失。
    pub fn into_buffer(self) -> BufferHandle {
        self.handle
    }

    /// 是否为可写视图。
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// 是否为空视图。
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    /// 字节长度。
    pub fn size(&self) -> usize {
        self.handle.size()
    }

    /// 对根结构做边界检查。
    pub fn check_bounds(&self) -> Result<(), WireError> {
        T::verify(self.handle.data())
    }

    /// 转为只读视图，不复制字节。
    pub fn freeze(self) -> Self {
        Self::wrap(self.handle.freeze(), false)
    }

    /// `T` 的类型令牌；首次调用时把 `T` 的视图工厂注册到全局注册表。
    pub fn type_token() -> TypeToken {
        TypeRegistry::global().ensure_view::<T>()
    }
}

impl<T: RootTable> Clone for TypedView<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.handle.clone(), self.mutable)
    }
}

impl<T: RootTable> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("type", &T::FULLY_QUALIFIED_NAME)
            .field("size", &self.handle.size())
            .field("mutable", &self.mutable)
            .finish()
    }
}

impl<T: RootTable> AnyBufferView for TypedView<T> {
    fn type_token(&self) -> TypeToken {
        TypeToken::of::<T>()
    }

    fn buffer_bytes(&self) -> &[u8] {
        self.handle.data()
    }

    fn is_mutable(&self) -> bool {
        self.mutable
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_flatbuffers_wire::{Table, TableMut, TableWriter, field_voffset};

    struct Counter;

    impl RootTable for Counter {
        const FULLY_QUALIFIED_NAME: &'static str = "test.Counter";
        type Ref<'a> = Table<'a>;
        type Mut<'a> = TableMut<'a>;

        fn follow_root(buf: &[u8]) -> Table<'_> {
            Table::follow_root(buf)
        }

        fn follow_root_mut(buf: &mut [u8]) -> TableMut<'_> {
            TableMut::follow_root(buf)
        }
    }

    fn counter_bytes(value: u32) -> Vec<u8> {
        let mut writer = TableWriter::new();
        writer.add_scalar(field_voffset(0), value, 0u32);
        writer.finish().expect("finish")
    }

    #[test]
    fn empty_handle_yields_no_view() {
        assert!(TypedView::<Counter>::from_buffer(BufferHandle::empty()).is_none());
        assert!(TypedView::<Counter>::from_mutable_buffer(BufferHandle::empty()).is_none());
    }

    #[test]
    fn read_only_view_refuses_mutation() {
        let mut view = TypedView::<Counter>::from_buffer(BufferHandle::from_vec(counter_bytes(3)))
            .expect("view");
        assert!(!view.is_mutable());
        assert!(view.mutable_table().is_none());
        assert_eq!(view.table().get::<u32>(field_voffset(0), 0), 3);
    }

    #[test]
    fn mutable_view_requires_exclusive_handle() {
        let shared = BufferHandle::from_vec(counter_bytes(3));
        assert!(TypedView::<Counter>::from_mutable_buffer(shared).is_none());

        let exclusive = BufferHandle::exclusive_from_vec(counter_bytes(3));
        let mut view = TypedView::<Counter>::from_mutable_buffer(exclusive).expect("view");
        let mut table = view.mutable_table().expect("mutable");
        assert!(table.set::<u32>(field_voffset(0), 11));
        assert_eq!(view.table().get::<u32>(field_voffset(0), 0), 11);
    }

    #[test]
    fn view_construction_does_not_copy() {
        let handle = BufferHandle::from_vec(counter_bytes(9));
        let ptr = handle.data().as_ptr();
        let view = TypedView::<Counter>::from_buffer(handle).expect("view");
        assert_eq!(view.bytes().as_ptr(), ptr);
        let cloned = view.clone();
        assert_eq!(cloned.bytes().as_ptr(), ptr);
    }

    #[test]
    fn freeze_turns_view_read_only_in_place() {
        let mut view = TypedView::<Counter>::from_mutable_buffer(BufferHandle::exclusive_from_vec(
            counter_bytes(1),
        ))
        .expect("view");
        let ptr = view.bytes().as_ptr();
        let frozen = view.clone().freeze();
        assert!(!frozen.is_mutable());
        assert!(view.mutable_table().is_some());
        let frozen_again = view.freeze();
        assert_eq!(frozen_again.bytes().as_ptr(), ptr);
    }

    #[test]
    fn check_bounds_reports_corruption() {
        let view =
            TypedView::<Counter>::from_buffer(BufferHandle::create(&[200, 0, 0, 0])).expect("view");
        assert!(view.check_bounds().is_err());
        let view = TypedView::<Counter>::from_buffer(BufferHandle::from_vec(counter_bytes(2)))
            .expect("view");
        assert_eq!(view.check_bounds(), Ok(()));
    }
}
