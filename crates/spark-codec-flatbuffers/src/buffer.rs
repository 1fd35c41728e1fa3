//! 缓冲句柄：类型化视图背后的唯一字节所有者。

use std::fmt;

use bytes::{Bytes, BytesMut};

/// 句柄内部存储形态。
#[derive(Default)]
enum Storage {
    #[default]
    Empty,
    Shared(Bytes),
    Exclusive(BytesMut),
}

/// `BufferHandle` 持有一段字节缓冲，并决定它能否被原地改写。
///
/// # 设计背景（Why）
/// - 视图中的根访问器本质上是指向缓冲内部的位置，绝不能脱离缓冲单独存活；
///   让视图持有句柄、按需借出访问器，即可把这条约束交给借用检查器；
/// - 读多写少：共享形态基于 [`Bytes`] 的引用计数，克隆只增加计数；
///   独占形态基于 [`BytesMut`]，同一时刻只有一个所有者，天然满足“单写者”纪律。
///
/// # 逻辑解析（How）
/// - `Empty`：零长度来源得到的显式空句柄，与“构造失败”不同；
/// - `Shared`：只读、可廉价共享；
/// - `Exclusive`：可写，[`BufferHandle::freeze`] 可零拷贝转为共享形态。
///
/// # 契约说明（What）
/// - [`BufferHandle::size`] 在构造后不再变化，没有任何接口会增删字节；
/// - [`BufferHandle::data`] 返回的切片只在句柄存活期间有效（由生命周期保证）；
/// - 克隆共享句柄不复制字节；克隆独占句柄会得到一份**独立**的字节副本，两者的改写互不可见。
///
/// # 风险提示（Trade-offs）
/// - 共享句柄的底层存储可能被多个视图引用，长时间持有会推迟内存释放。
#[derive(Default)]
pub struct BufferHandle {
    storage: Storage,
}

impl BufferHandle {
    /// 显式空句柄。
    pub fn empty() -> Self {
        Self::default()
    }

    /// 复制一段字节，得到只读共享句柄。
    pub fn create(data: &[u8]) -> Self {
        if data.is_empty() {
            return Self::empty();
        }
        Self::from_bytes(Bytes::copy_from_slice(data))
    }

    /// 接管 [`Bytes`]，不复制。
    pub fn from_bytes(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        Self {
            storage: Storage::Shared(bytes),
        }
    }

    /// 接管 `Vec<u8>`，不复制。
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_bytes(Bytes::from(data))
    }

    /// 接管 [`BytesMut`]，得到可写句柄。
    pub fn exclusive(bytes: BytesMut) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        Self {
            storage: Storage::Exclusive(bytes),
        }
    }

    /// 以 `Vec<u8>` 的内容构造可写句柄（复制一次）。
    pub fn exclusive_from_vec(data: Vec<u8>) -> Self {
        Self::exclusive(BytesMut::from(&data[..]))
    }

    /// 只读访问全部字节。
    pub fn data(&self) -> &[u8] {
        match &self.storage {
            Storage::Empty => &[],
            Storage::Shared(bytes) => bytes,
            Storage::Exclusive(bytes) => bytes,
        }
    }

    /// 可写访问全部字节；非独占句柄返回 `None`。
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            Storage::Exclusive(bytes) => Some(&mut bytes[..]),
            _ => None,
        }
    }

    /// 字节长度。
    pub fn size(&self) -> usize {
        self.data().len()
    }

    /// 是否为空句柄。
    pub fn is_empty(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }

    /// 是否可以原地改写。
    pub fn is_mutable(&self) -> bool {
        matches!(self.storage, Storage::Exclusive(_))
    }

    /// 共享同一份只读字节；独占句柄无法共享，返回 `None`。
    pub fn share(&self) -> Option<Self> {
        match &self.storage {
            Storage::Empty => Some(Self::empty()),
            Storage::Shared(bytes) => Some(Self {
                storage: Storage::Shared(bytes.clone()),
            }),
            Storage::Exclusive(_) => None,
        }
    }

    /// 转为只读共享句柄，独占形态零拷贝冻结。
    pub fn freeze(self) -> Self {
        match self.storage {
            Storage::Exclusive(bytes) => Self {
                storage: Storage::Shared(bytes.freeze()),
            },
            storage => Self { storage },
        }
    }

    /// 取出底层字节。
    pub fn into_bytes(self) -> Bytes {
        match self.storage {
            Storage::Empty => Bytes::new(),
            Storage::Shared(bytes) => bytes,
            Storage::Exclusive(bytes) => bytes.freeze(),
        }
    }
}

impl Clone for BufferHandle {
    fn clone(&self) -> Self {
        match &self.storage {
            Storage::Exclusive(bytes) => Self {
                storage: Storage::Exclusive(bytes.clone()),
            },
            Storage::Shared(bytes) => Self {
                storage: Storage::Shared(bytes.clone()),
            },
            Storage::Empty => Self::empty(),
        }
    }
}

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.storage {
            Storage::Empty => "empty",
            Storage::Shared(_) => "shared",
            Storage::Exclusive(_) => "exclusive",
        };
        f.debug_struct("BufferHandle")
            .field("kind", &kind)
            .field("size", &self.size())
            .finish()
    }
}

impl From<Bytes> for BufferHandle {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for BufferHandle {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<BytesMut> for BufferHandle {
    fn from(bytes: BytesMut) -> Self {
        Self::exclusive(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_sources_yield_empty_handles() {
        assert!(BufferHandle::create(&[]).is_empty());
        assert!(BufferHandle::from_vec(Vec::new()).is_empty());
        assert!(BufferHandle::exclusive(BytesMut::new()).is_empty());
        assert_eq!(BufferHandle::empty().size(), 0);
    }

    #[test]
    fn create_copies_and_outlives_source() {
        let handle = {
            let source = vec![1u8, 2, 3, 4];
            BufferHandle::create(&source)
        };
        assert_eq!(handle.data(), &[1, 2, 3, 4]);
        assert_eq!(handle.size(), 4);
        assert!(!handle.is_mutable());
    }

    #[test]
    fn shared_handles_point_at_the_same_bytes() {
        let handle = BufferHandle::from_vec(vec![9; 16]);
        let shared = handle.share().expect("shared handle");
        assert_eq!(handle.data().as_ptr(), shared.data().as_ptr());
    }

    #[test]
    fn exclusive_handle_is_mutable_and_not_shareable() {
        let mut handle = BufferHandle::exclusive_from_vec(vec![0; 8]);
        assert!(handle.is_mutable());
        assert!(handle.share().is_none());
        handle.data_mut().expect("exclusive")[0] = 7;
        assert_eq!(handle.data()[0], 7);
    }

    #[test]
    fn freeze_keeps_bytes_in_place() {
        let handle = BufferHandle::exclusive_from_vec(vec![5; 8]);
        let before = handle.data().as_ptr();
        let frozen = handle.freeze();
        assert!(!frozen.is_mutable());
        assert_eq!(frozen.data().as_ptr(), before);
        assert_eq!(frozen.size(), 8);
    }

    #[test]
    fn cloning_exclusive_handle_detaches_the_copy() {
        let mut original = BufferHandle::exclusive_from_vec(vec![1; 4]);
        let copy = original.clone();
        original.data_mut().expect("exclusive")[0] = 2;
        assert_eq!(copy.data()[0], 1);
    }
}
