//! 解析引擎与容器实现
//!
//! 编排按需创建、依赖解析顺序、生命周期钩子调用，以及按图顺序的
//! 启动与关闭。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use infrastructure_common::{
    Component, ComponentDescriptor, ContainerState, DependencyError, DependencyResult,
    InfrastructureError, Lifetime, LifecycleError, LifecycleResult, Scope,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use di_abstractions::{
    downcast_component, ComponentInstance, ComponentRegistration, ContainerConfig, ContainerStats,
    DiContainer, ResolveContext, TypedResolver,
};

use crate::graph::DependencyGraph;
use crate::store::InstanceStore;

/// 依赖注入容器实现
///
/// 注册阶段单线程、独占借用；初始化完成后图和注册表只读，可跨线程
/// 共享（通常包在 `Arc` 中），实例存储内部自行同步。
pub struct DiContainerImpl {
    config: ContainerConfig,
    registrations: HashMap<String, ComponentRegistration>,
    registration_order: Vec<String>,
    /// 目标类型到标识的索引，按注册顺序，按类型查找时第一个匹配胜出
    type_index: Vec<(TypeId, String)>,
    graph: DependencyGraph,
    store: InstanceStore,
    root_scope: Scope,
    /// 初始化时固定下来的构造顺序，销毁路径按其逆序执行
    topology: OnceCell<Vec<String>>,
    state: RwLock<ContainerState>,
    resolved_count: AtomicU64,
    error_count: AtomicU64,
}

impl std::fmt::Debug for DiContainerImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiContainerImpl")
            .field("state", &*self.state.read())
            .field("registrations", &self.registration_order)
            .finish_non_exhaustive()
    }
}

impl DiContainerImpl {
    /// 使用默认配置创建容器
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        let root_scope = Scope::new(config.root_scope_name.clone());
        Self {
            config,
            registrations: HashMap::new(),
            registration_order: Vec::new(),
            type_index: Vec::new(),
            graph: DependencyGraph::new(),
            store: InstanceStore::new(),
            root_scope,
            topology: OnceCell::new(),
            state: RwLock::new(ContainerState::Uninitialized),
            resolved_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
        }
    }

    /// 容器的根作用域
    ///
    /// 急切初始化和不带作用域的查找都使用它。
    #[must_use]
    pub fn root_scope(&self) -> &Scope {
        &self.root_scope
    }

    /// 容器统计信息
    #[must_use]
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_components: self.registrations.len(),
            resolved_components: self.resolved_count.load(Ordering::Relaxed),
            active_singletons: self.store.active_singletons(),
            active_scopes: self.store.active_scopes(),
            resolution_errors: self.error_count.load(Ordering::Relaxed),
        }
    }

    /// 状态检查：容器当前是否接受解析请求
    fn ensure_resolvable(&self) -> DependencyResult<()> {
        let state = *self.state.read();
        if state.is_closed() {
            return Err(DependencyError::ContainerClosed);
        }
        if !state.can_resolve() {
            return Err(DependencyError::ContainerNotReady {
                state: state.to_string(),
            });
        }
        Ok(())
    }

    /// 解析的核心递归
    ///
    /// 急切初始化按预先计算的拓扑顺序调用它，因此任何节点都不会早于
    /// 自己的依赖被解析；这里的递归只是同一保证的重述。链路检查防止
    /// 单例初始化单元的同线程重入。
    fn resolve_internal(
        &self,
        name: &str,
        scope: &Scope,
        context: &mut ResolveContext,
    ) -> DependencyResult<ComponentInstance> {
        let registration = self
            .registrations
            .get(name)
            .ok_or_else(|| DependencyError::not_registered(name))?;

        context.push(name)?;
        let result = match registration.descriptor.lifetime {
            Lifetime::Singleton => self
                .store
                .get_or_create_singleton(name, || {
                    self.build_instance(registration, scope, &mut *context)
                }),
            Lifetime::Scoped => match self.store.get_scoped(scope, name) {
                Some(existing) => Ok(existing),
                None => self
                    .build_instance(registration, scope, context)
                    .map(|instance| self.store.insert_scoped(scope, name, instance)),
            },
            Lifetime::Transient => self.build_instance(registration, scope, context),
        };
        context.pop();
        result
    }

    /// 构造一个新实例
    ///
    /// 先按声明顺序解析全部依赖，再调用构造策略，最后在实例对任何
    /// 调用方可见之前按声明顺序执行构造后钩子。
    fn build_instance(
        &self,
        registration: &ComponentRegistration,
        scope: &Scope,
        context: &mut ResolveContext,
    ) -> DependencyResult<ComponentInstance> {
        let descriptor = &registration.descriptor;

        let mut dependencies = Vec::with_capacity(descriptor.dependencies.len());
        for dependency in &descriptor.dependencies {
            dependencies.push(self.resolve_internal(dependency, scope, context)?);
        }

        let instance = (registration.factory)(dependencies)?;

        for hook in &registration.post_construct {
            hook(&instance).map_err(|source| {
                DependencyError::creation_failed(descriptor.type_info.short_name(), source)
            })?;
        }

        debug!(
            "构造组件实例: {} ({}), 生命周期: {}",
            descriptor.name, descriptor.type_info, descriptor.lifetime
        );
        Ok(instance)
    }

    /// 执行一个实例的销毁前钩子
    ///
    /// 钩子失败只记录日志，销毁流程继续。
    fn run_pre_destroy(&self, registration: &ComponentRegistration, instance: &ComponentInstance) {
        for hook in &registration.pre_destroy {
            if let Err(source) = hook(instance) {
                error!(
                    "销毁前钩子执行失败: {}, 原因: {}",
                    registration.descriptor.name, source
                );
            }
        }
    }

    /// 销毁并逐出一个节点当前存在的全部实例
    ///
    /// 先处理单例区，再遍历每个活跃会话作用域的私有缓存。
    fn destroy_node(&self, name: &str) {
        let Some(registration) = self.registrations.get(name) else {
            return;
        };

        if let Some(instance) = self.store.peek_singleton(name) {
            self.run_pre_destroy(registration, &instance);
            self.store.remove_singleton(name);
        }

        for scope_id in self.store.scope_ids() {
            if let Some(instance) = self.store.peek_scoped(scope_id, name) {
                self.run_pre_destroy(registration, &instance);
                self.store.remove_scoped(scope_id, name);
            }
        }
    }

    /// 初始化失败时的清理：容器进入 `Closed`，缓存直接丢弃
    ///
    /// 不暴露部分就绪状态，已构造的实例不再执行钩子。
    fn abort_initialization(&self) {
        self.store.clear();
        *self.state.write() = ContainerState::Closed;
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl DiContainer for DiContainerImpl {
    fn register(&mut self, registration: ComponentRegistration) -> DependencyResult<()> {
        let state = *self.state.read();
        if state != ContainerState::Uninitialized {
            return Err(DependencyError::RegistrationError {
                name: registration.descriptor.name.clone(),
                message: format!("容器状态 {state} 不允许注册"),
            });
        }

        let descriptor = &registration.descriptor;
        self.graph
            .register(&descriptor.name, &descriptor.dependencies)?;

        debug!(
            "注册组件: {} ({}), 生命周期: {}, 依赖: {:?}",
            descriptor.name, descriptor.type_info, descriptor.lifetime, descriptor.dependencies
        );

        self.type_index
            .push((descriptor.type_info.id, descriptor.name.clone()));
        self.registration_order.push(descriptor.name.clone());
        self.registrations
            .insert(descriptor.name.clone(), registration);
        Ok(())
    }

    fn initialize(&self) -> Result<(), InfrastructureError> {
        {
            let mut state = self.state.write();
            if *state != ContainerState::Uninitialized {
                return Err(LifecycleError::InvalidStateTransition {
                    from: state.to_string(),
                    operation: "initialize".to_string(),
                }
                .into());
            }
            *state = ContainerState::Initializing;
        }

        info!("初始化容器, 共 {} 个组件", self.registrations.len());

        let order = match self.graph.topological_order() {
            Ok(order) => order,
            Err(source) => {
                error!("依赖图校验失败: {}", source);
                self.abort_initialization();
                return Err(source.into());
            }
        };
        let order = self.topology.get_or_init(|| order);

        if self.config.eager_initialization {
            for name in order {
                let mut context = ResolveContext::new(self.config.max_resolution_depth);
                if let Err(source) = self.resolve_internal(name, &self.root_scope, &mut context) {
                    error!("急切初始化失败于组件 {}: {}", name, source);
                    self.abort_initialization();
                    return Err(source.into());
                }
            }
        } else {
            debug!("急切初始化已禁用，实例将按需物化");
        }

        *self.state.write() = ContainerState::Ready;
        info!("容器就绪, 构造顺序: {:?}", order);
        Ok(())
    }

    fn resolve_by_name(&self, name: &str) -> DependencyResult<ComponentInstance> {
        let scope = &self.root_scope;
        self.resolve_by_name_in_scope(name, scope)
    }

    fn resolve_by_name_in_scope(
        &self,
        name: &str,
        scope: &Scope,
    ) -> DependencyResult<ComponentInstance> {
        self.ensure_resolvable()?;

        let mut context = ResolveContext::new(self.config.max_resolution_depth);
        let result = self.resolve_internal(name, scope, &mut context);
        match &result {
            Ok(_) => {
                self.resolved_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(source) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
                warn!("解析组件失败: {}, 原因: {}", name, source);
            }
        }
        result
    }

    fn resolve_by_type_id(&self, type_id: TypeId) -> DependencyResult<ComponentInstance> {
        self.ensure_resolvable()?;

        let name = self
            .type_index
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, name)| name.clone())
            .ok_or_else(|| DependencyError::ComponentNotRegistered {
                type_name: format!("TypeId({type_id:?})"),
            })?;

        self.resolve_by_name(&name)
    }

    fn is_registered_by_name(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    fn descriptors(&self) -> Vec<ComponentDescriptor> {
        self.registration_order
            .iter()
            .filter_map(|name| self.registrations.get(name))
            .map(|registration| registration.descriptor.clone())
            .collect()
    }

    fn state(&self) -> ContainerState {
        *self.state.read()
    }

    fn create_scope(&self, name: &str) -> DependencyResult<Scope> {
        self.ensure_resolvable()?;

        let scope = self.root_scope.child(name);
        self.store.register_scope(&scope);
        debug!("创建会话作用域: {} ({})", scope.name, scope.id);
        Ok(scope)
    }

    fn destroy_scope(&self, scope: &Scope) -> LifecycleResult<()> {
        if !self.store.has_scope(scope.id) {
            return Err(LifecycleError::ScopeNotFound {
                scope_id: scope.id.to_string(),
            });
        }

        if let Some(order) = self.topology.get() {
            for name in order.iter().rev() {
                if let (Some(registration), Some(instance)) = (
                    self.registrations.get(name),
                    self.store.peek_scoped(scope.id, name),
                ) {
                    self.run_pre_destroy(registration, &instance);
                    self.store.remove_scoped(scope.id, name);
                }
            }
        }

        self.store.drop_scope(scope.id);
        debug!("销毁会话作用域: {} ({})", scope.name, scope.id);
        Ok(())
    }

    fn close(&self) -> Result<(), InfrastructureError> {
        {
            let mut state = self.state.write();
            match *state {
                ContainerState::Ready => *state = ContainerState::Closing,
                // 重复关闭是无害的
                ContainerState::Closed => return Ok(()),
                other => {
                    return Err(InfrastructureError::ShutdownFailed {
                        message: format!("容器状态 {other} 不允许关闭"),
                    });
                }
            }
        }

        info!("关闭容器, 按逆拓扑顺序销毁实例");

        if let Some(order) = self.topology.get() {
            for name in order.iter().rev() {
                self.destroy_node(name);
            }
        }

        for scope_id in self.store.scope_ids() {
            self.store.drop_scope(scope_id);
        }

        *self.state.write() = ContainerState::Closed;
        info!("容器已关闭");
        Ok(())
    }
}

impl TypedResolver for DiContainerImpl {
    fn resolve<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + 'static,
    {
        let instance = self.resolve_by_type_id(TypeId::of::<T>()).map_err(|err| {
            match err {
                DependencyError::ComponentNotRegistered { .. } => {
                    DependencyError::not_registered(std::any::type_name::<T>())
                }
                other => other,
            }
        })?;
        downcast_component(instance)
    }

    fn resolve_as<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        downcast_component(self.resolve_by_name(name)?)
    }
}
