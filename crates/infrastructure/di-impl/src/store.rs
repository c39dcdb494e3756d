//! 实例存储
//!
//! 三个缓存区域：进程级单例区、按会话作用域的私有区、瞬时无存储。
//! 单例区的 create-if-absent 以标识为粒度互斥：同一标识的并发首次
//! 请求只会触发一次工厂调用，后到者阻塞等待结果；不同标识之间互不
//! 影响。作用域区按约定单线程使用，锁只用于与共享存储的对接。

use std::collections::HashMap;

use dashmap::DashMap;
use infrastructure_common::{DependencyResult, Scope};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use di_abstractions::ComponentInstance;

/// 一个会话作用域的私有实例缓存
#[derive(Debug)]
struct ScopeCache {
    scope: Scope,
    instances: Mutex<HashMap<String, ComponentInstance>>,
}

/// 实例存储
#[derive(Default)]
pub(crate) struct InstanceStore {
    singletons: DashMap<String, std::sync::Arc<OnceCell<ComponentInstance>>>,
    scopes: DashMap<Uuid, std::sync::Arc<ScopeCache>>,
}

impl InstanceStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 单例区的原子 create-if-absent
    ///
    /// 构造失败不会留下缓存条目，后续查找可以合法地重试。
    pub(crate) fn get_or_create_singleton(
        &self,
        name: &str,
        factory: impl FnOnce() -> DependencyResult<ComponentInstance>,
    ) -> DependencyResult<ComponentInstance> {
        let cell = self
            .singletons
            .entry(name.to_string())
            .or_default()
            .clone();
        // 进入初始化前必须释放映射分片锁，工厂内部会递归访问存储
        cell.get_or_try_init(factory).cloned()
    }

    /// 查看单例实例而不触发创建
    pub(crate) fn peek_singleton(&self, name: &str) -> Option<ComponentInstance> {
        self.singletons
            .get(name)
            .and_then(|cell| cell.get().cloned())
    }

    /// 逐出单例实例
    pub(crate) fn remove_singleton(&self, name: &str) {
        self.singletons.remove(name);
    }

    /// 已创建的单例数量
    pub(crate) fn active_singletons(&self) -> usize {
        self.singletons
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// 登记一个会话作用域缓存
    ///
    /// 已存在时保持原缓存不变。
    pub(crate) fn register_scope(&self, scope: &Scope) {
        self.scopes.entry(scope.id).or_insert_with(|| {
            debug!("创建会话作用域缓存: {} ({})", scope.name, scope.id);
            std::sync::Arc::new(ScopeCache {
                scope: scope.clone(),
                instances: Mutex::new(HashMap::new()),
            })
        });
    }

    /// 查看会话作用域内的实例
    ///
    /// 作用域缓存不存在时按需创建，会话缓存的生命周期由调用方的
    /// 上下文决定。
    pub(crate) fn get_scoped(&self, scope: &Scope, name: &str) -> Option<ComponentInstance> {
        self.register_scope(scope);
        self.scopes
            .get(&scope.id)
            .and_then(|cache| cache.instances.lock().get(name).cloned())
    }

    /// 在会话作用域内插入实例，已存在时返回先到者
    ///
    /// 会话按约定单线程使用，检查-构造-插入之间不会有并发写入；
    /// 这里仍以先到者为准，保证同一作用域内实例唯一。
    pub(crate) fn insert_scoped(
        &self,
        scope: &Scope,
        name: &str,
        instance: ComponentInstance,
    ) -> ComponentInstance {
        self.register_scope(scope);
        match self.scopes.get(&scope.id) {
            Some(cache) => cache
                .instances
                .lock()
                .entry(name.to_string())
                .or_insert(instance)
                .clone(),
            None => instance,
        }
    }

    /// 查看指定作用域ID下的实例
    pub(crate) fn peek_scoped(&self, scope_id: Uuid, name: &str) -> Option<ComponentInstance> {
        self.scopes
            .get(&scope_id)
            .and_then(|cache| cache.instances.lock().get(name).cloned())
    }

    /// 从指定作用域逐出实例
    pub(crate) fn remove_scoped(&self, scope_id: Uuid, name: &str) {
        if let Some(cache) = self.scopes.get(&scope_id) {
            cache.instances.lock().remove(name);
        }
    }

    /// 作用域缓存是否存在
    pub(crate) fn has_scope(&self, scope_id: Uuid) -> bool {
        self.scopes.contains_key(&scope_id)
    }

    /// 移除整个作用域缓存
    pub(crate) fn drop_scope(&self, scope_id: Uuid) -> bool {
        if let Some((_, cache)) = self.scopes.remove(&scope_id) {
            debug!("移除会话作用域缓存: {} ({})", cache.scope.name, scope_id);
            true
        } else {
            false
        }
    }

    /// 当前活跃的作用域ID列表
    pub(crate) fn scope_ids(&self) -> Vec<Uuid> {
        self.scopes.iter().map(|entry| *entry.key()).collect()
    }

    /// 活跃作用域数量
    pub(crate) fn active_scopes(&self) -> usize {
        self.scopes.len()
    }

    /// 丢弃全部缓存，不执行任何钩子
    pub(crate) fn clear(&self) {
        self.singletons.clear();
        self.scopes.clear();
    }
}
