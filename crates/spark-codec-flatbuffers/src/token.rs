//! 类型令牌：schema 类型的可比较标识，作为注册表键。

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use spark_flatbuffers_wire::RootTable;

use crate::metadata::SchemaDescriptor;

/// 令牌所命名的类型族。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// 原始字节缓冲，读取时不经注册表直接返回。
    RawBuffer,
    /// schema 表类型，读取时经注册表构造类型化视图。
    Table,
}

/// `TypeToken` 是 schema 类型的不透明、可比较标识，作为注册表的键。
///
/// # 教案式说明
/// - **意图 (Why)**：管线在运行期以“类型描述”请求解码结果，需要一个既可比较又可哈希的键；
/// - **逻辑 (How)**：相等性与哈希只基于 [`TypeId`]，因此两个不同的 Rust 类型永远不会碰撞，
///   即便它们的 schema 全限定名相同；`name` 仅用于日志与诊断；
/// - **契约 (What)**：[`TypeToken::of`] 不产生任何副作用；需要“首次请求即注册”语义时使用
///   [`crate::TypedView::type_token`]。
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeToken {
    /// 表类型 `T` 的令牌。
    pub fn of<T: RootTable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::FULLY_QUALIFIED_NAME,
            kind: TypeKind::Table,
        }
    }

    /// 原始字节缓冲的令牌。
    pub fn raw_buffer() -> Self {
        Self {
            id: TypeId::of::<Bytes>(),
            name: "bytes",
            kind: TypeKind::RawBuffer,
        }
    }

    /// 底层 [`TypeId`]。
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// schema 全限定名或原始缓冲的名称。
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 类型族。
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// 是否为原始字节缓冲。
    pub fn is_raw_buffer(&self) -> bool {
        self.kind == TypeKind::RawBuffer
    }

    /// 以 schema 描述的形式导出，供内容协商与日志使用。
    pub fn schema_descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor::with_name(self.name)
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeToken")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_flatbuffers_wire::{Table, TableMut};

    struct Alpha;
    struct Beta;

    impl RootTable for Alpha {
        const FULLY_QUALIFIED_NAME: &'static str = "test.Same";
        type Ref<'a> = Table<'a>;
        type Mut<'a> = TableMut<'a>;

        fn follow_root(buf: &[u8]) -> Table<'_> {
            Table::follow_root(buf)
        }

        fn follow_root_mut(buf: &mut [u8]) -> TableMut<'_> {
            TableMut::follow_root(buf)
        }
    }

    impl RootTable for Beta {
        const FULLY_QUALIFIED_NAME: &'static str = "test.Same";
        type Ref<'a> = Table<'a>;
        type Mut<'a> = TableMut<'a>;

        fn follow_root(buf: &[u8]) -> Table<'_> {
            Table::follow_root(buf)
        }

        fn follow_root_mut(buf: &mut [u8]) -> TableMut<'_> {
            TableMut::follow_root(buf)
        }
    }

    #[test]
    fn distinct_types_never_collide_even_with_equal_names() {
        let alpha = TypeToken::of::<Alpha>();
        let beta = TypeToken::of::<Beta>();
        assert_eq!(alpha.name(), beta.name());
        assert_ne!(alpha, beta);
        assert_eq!(alpha, TypeToken::of::<Alpha>());
    }

    #[test]
    fn raw_buffer_token_is_its_own_kind() {
        let raw = TypeToken::raw_buffer();
        assert!(raw.is_raw_buffer());
        assert_eq!(raw.kind(), TypeKind::RawBuffer);
        assert_eq!(TypeToken::of::<Alpha>().kind(), TypeKind::Table);
        assert_eq!(raw.to_string(), "bytes");
        let schema = TypeToken::of::<Alpha>().schema_descriptor();
        assert_eq!(schema.name(), "test.Same");
    }
}
