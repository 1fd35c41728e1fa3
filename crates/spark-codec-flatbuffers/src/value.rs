//! 管线在映射器两端传递的通用值容器。

use std::fmt;

use bytes::Bytes;
use spark_flatbuffers_wire::RootTable;

use crate::token::TypeToken;
use crate::view::{AnyBufferView, TypedView};

/// `Value` 是管线在映射器两端传递的通用值容器。
///
/// # 教案式说明
/// - **意图 (Why)**：管线不认识具体 schema 类型，只能传递“某个值”；映射器据此决定写出哪些字节，
///   读取结果也以同一容器交回；
/// - **契约 (What)**：
///   - `Null`：空值，总与一条被压入 [`crate::ErrorStack`] 的错误成对出现（读取失败时）；
///   - `View`：任意 [`TypedView`]，以 sealed 的 [`AnyBufferView`] 擦除类型；
///   - `Raw`：未经解释的原始字节；
/// - **权衡 (Trade-offs)**：视图被装箱，换取不必为每种 schema 类型扩展枚举。
#[derive(Default)]
pub enum Value {
    /// 空值。
    #[default]
    Null,
    /// 类型化视图。
    View(Box<dyn AnyBufferView>),
    /// 原始字节。
    Raw(Bytes),
}

impl Value {
    /// 是否为空值。
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 值的类型令牌；空值返回 `None`。
    pub fn value_type(&self) -> Option<TypeToken> {
        match self {
            Value::Null => None,
            Value::View(view) => Some(view.type_token()),
            Value::Raw(_) => Some(TypeToken::raw_buffer()),
        }
    }

    /// 值携带的字节；空值返回 `None`。
    pub fn payload_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Null => None,
            Value::View(view) => Some(view.buffer_bytes()),
            Value::Raw(bytes) => Some(bytes),
        }
    }

    /// 向下转型为 `TypedView<T>`；类型不符时原样交还。
    pub fn downcast<T: RootTable>(self) -> Result<TypedView<T>, Value> {
        match self {
            Value::View(view) => {
                if !view.as_any().is::<TypedView<T>>() {
                    return Err(Value::View(view));
                }
                match view.into_any().downcast::<TypedView<T>>() {
                    Ok(view) => Ok(*view),
                    // 上方 `is` 已确认具体类型，装箱后的类型不会改变。
                    Err(_) => unreachable!("view type checked before downcast"),
                }
            }
            other => Err(other),
        }
    }

    /// 取出原始字节；非 `Raw` 值原样交还。
    pub fn into_raw(self) -> Result<Bytes, Value> {
        match self {
            Value::Raw(bytes) => Ok(bytes),
            other => Err(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::View(view) => f.debug_tuple("View").field(view).finish(),
            Value::Raw(bytes) => f.debug_tuple("Raw").field(&bytes.len()).finish(),
        }
    }
}

impl<T: RootTable> From<TypedView<T>> for Value {
    fn from(view: TypedView<T>) -> Self {
        Value::View(Box::new(view))
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Raw(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Raw(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferHandle;
    use spark_flatbuffers_wire::{Table, TableMut};

    struct Left;
    struct Right;

    macro_rules! stub_table {
        ($ty:ty, $name:literal) => {
            impl RootTable for $ty {
                const FULLY_QUALIFIED_NAME: &'static str = $name;
                type Ref<'a> = Table<'a>;
                type Mut<'a> = TableMut<'a>;

                fn follow_root(buf: &[u8]) -> Table<'_> {
                    Table::follow_root(buf)
                }

                fn follow_root_mut(buf: &mut [u8]) -> TableMut<'_> {
                    TableMut::follow_root(buf)
                }
            }
        };
    }

    stub_table!(Left, "test.Left");
    stub_table!(Right, "test.Right");

    fn left_value() -> Value {
        let view = TypedView::<Left>::from_buffer(BufferHandle::create(&[4, 0, 0, 0]))
            .expect("view");
        Value::from(view)
    }

    #[test]
    fn downcast_to_matching_type_succeeds() {
        let view = left_value().downcast::<Left>().expect("left view");
        assert_eq!(view.bytes(), &[4, 0, 0, 0]);
    }

    #[test]
    fn downcast_to_other_type_returns_value() {
        let value = left_value().downcast::<Right>().expect_err("mismatch");
        assert_eq!(value.value_type(), Some(TypeToken::of::<Left>()));
        assert_eq!(value.payload_bytes(), Some(&[4u8, 0, 0, 0][..]));
        let view = value.downcast::<Left>().expect("still a left view");
        assert_eq!(view.bytes(), &[4, 0, 0, 0]);
    }

    #[test]
    fn raw_and_null_report_their_shape() {
        let raw = Value::from(vec![1u8, 2]);
        assert_eq!(raw.value_type(), Some(TypeToken::raw_buffer()));
        assert_eq!(raw.payload_bytes(), Some(&[1u8, 2][..]));
        assert!(raw.downcast::<Left>().is_err());
        assert!(Value::Null.is_null());
        assert!(Value::Null.payload_bytes().is_none());
        assert_eq!(
            Value::from(Bytes::from_static(b"xy"))
                .into_raw()
                .expect("raw"),
            Bytes::from_static(b"xy")
        );
    }
}
