//! 运行时类型注册表：类型令牌 → 视图工厂。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use parking_lot::RwLock;
use spark_flatbuffers_wire::RootTable;
use tracing::debug;

use crate::buffer::BufferHandle;
use crate::token::TypeToken;
use crate::value::Value;
use crate::view::TypedView;

/// 视图工厂：接收一段新缓冲，产出包装好的值。
///
/// 工厂不得持有共享可变状态；它只会从传入的新缓冲构造新视图，因此替换工厂不会影响已经产出的视图。
pub type ViewFactory = Arc<dyn Fn(Bytes) -> Value + Send + Sync>;

/// `TypeRegistry` 维护“类型令牌 → 视图工厂”映射，让映射器在运行期为无法命名的类型构造视图。
///
/// # 设计初衷（Why）
/// - 读取路径每条入站消息都要查表，注册通常只在每种类型首次使用时发生一次；
///   因此采用读优化的 [`parking_lot::RwLock`]，查表只取读锁；
/// - 进程级单例通过 [`TypeRegistry::global`] 提供，测试或多租户场景可用 [`TypeRegistry::new`] 构造隔离实例。
///
/// # 行为逻辑（How）
/// - `register`：安装或替换（后写者胜），返回被替换的旧工厂；
/// - `ensure_view`：仅在缺失时安装 `TypedView<T>` 工厂，供“首次请求令牌即注册”的懒初始化使用；
/// - `lookup`：克隆出工厂的 `Arc`，随即释放读锁，工厂调用不在锁内进行。
///
/// # 契约说明（What）
/// - 条目永不删除；
/// - 并发 `register`/`lookup` 无数据竞争，任意时刻查到的都是某个完整的工厂。
#[derive(Default)]
pub struct TypeRegistry {
    factories: RwLock<HashMap<TypeToken, ViewFactory>>,
}

impl TypeRegistry {
    /// 创建隔离的空注册表。
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级注册表。
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// 安装或替换 `token` 的工厂，返回被替换的旧工厂。
    pub fn register(&self, token: TypeToken, factory: ViewFactory) -> Option<ViewFactory> {
        let previous = self.factories.write().insert(token, factory);
        if previous.is_some() {
            debug!(type_name = token.name(), "replaced flatbuffers view factory");
        } else {
            debug!(type_name = token.name(), "registered flatbuffers view factory");
        }
        previous
    }

    /// 安装 `TypedView<T>` 的工厂，返回 `T` 的令牌。重复调用结果等价。
    pub fn register_view<T: RootTable>(&self) -> TypeToken {
        let token = TypeToken::of::<T>();
        self.register(token, view_factory::<T>());
        token
    }

    /// 仅在缺失时安装 `TypedView<T>` 的工厂，返回 `T` 的令牌。
    pub fn ensure_view<T: RootTable>(&self) -> TypeToken {
        let token = TypeToken::of::<T>();
        if self.contains(&token) {
            return token;
        }
        let mut factories = self.factories.write();
        if !factories.contains_key(&token) {
            factories.insert(token, view_factory::<T>());
            debug!(type_name = token.name(), "registered flatbuffers view factory");
        }
        token
    }

    /// 查找 `token` 的工厂。
    pub fn lookup(&self, token: &TypeToken) -> Option<ViewFactory> {
        self.factories.read().get(token).cloned()
    }

    /// 是否已注册。
    pub fn contains(&self, token: &TypeToken) -> bool {
        self.factories.read().contains_key(token)
    }

    /// 已注册的条目数。
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// 是否没有任何条目。
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self
            .factories
            .read()
            .keys()
            .map(TypeToken::name)
            .collect();
        f.debug_struct("TypeRegistry")
            .field("types", &names)
            .finish()
    }
}

fn view_factory<T: RootTable>() -> ViewFactory {
    Arc::new(|bytes: Bytes| {
        TypedView::<T>::from_buffer(BufferHandle::from_bytes(bytes))
            .map(Value::from)
            .unwrap_or(Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_flatbuffers_wire::{Table, TableMut};

    struct Probe;

    impl RootTable for Probe {
        const FULLY_QUALIFIED_NAME: &'static str = "test.Probe";
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
    fn lookup_misses_until_registered() {
        let registry = TypeRegistry::new();
        let token = TypeToken::of::<Probe>();
        assert!(registry.lookup(&token).is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.register_view::<Probe>(), token);
        assert!(registry.lookup(&token).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn last_registration_wins() {
        let registry = TypeRegistry::new();
        let token = TypeToken::of::<Probe>();
        assert!(
            registry
                .register(token, Arc::new(|_: Bytes| Value::Null))
                .is_none()
        );
        assert!(registry.register(token, Arc::new(Value::Raw)).is_some());
        let factory = registry.lookup(&token).expect("factory");
        let value = factory(Bytes::from_static(b"abcd"));
        assert_eq!(value.payload_bytes(), Some(&b"abcd"[..]));
    }

    #[test]
    fn ensure_view_keeps_existing_factory() {
        let registry = TypeRegistry::new();
        let token = TypeToken::of::<Probe>();
        registry.register(token, Arc::new(Value::Raw));
        assert_eq!(registry.ensure_view::<Probe>(), token);
        let value = registry.lookup(&token).expect("factory")(Bytes::from_static(b"wxyz"));
        assert!(matches!(value, Value::Raw(_)));
    }

    #[test]
    fn view_factory_wraps_fresh_buffers() {
        let registry = TypeRegistry::new();
        let token = registry.register_view::<Probe>();
        let factory = registry.lookup(&token).expect("factory");
        let value = factory(Bytes::from_static(&[12, 0, 0, 0]));
        assert_eq!(value.value_type(), Some(token));
        assert!(factory(Bytes::new()).is_null());
    }
}
