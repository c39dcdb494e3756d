//! 基础设施主入口
//!
//! 应用层唯一使用的查找边界：按标识或按类型的组件查找、会话作用域
//! 管理以及容器的启动与关闭。

use std::any::Any;
use std::sync::Arc;

use di_abstractions::{ComponentInstance, ContainerStats, DiContainer, TypedResolver};
use di_impl::DiContainerImpl;
use infrastructure_common::{
    Component, ComponentDescriptor, ContainerState, DependencyResult, InfrastructureError,
    LifecycleResult, Scope,
};
use tracing::info;

use crate::builder::InfrastructureBuilder;

/// 组件基础设施
///
/// 持有装配完成的容器，生命周期由顶层应用拥有并显式传递给需要
/// 查找的地方，不存在隐藏的全局可变状态。克隆是廉价的引用克隆，
/// 便于跨线程共享。
#[derive(Clone)]
pub struct ComponentInfrastructure {
    container: Arc<DiContainerImpl>,
}

impl std::fmt::Debug for ComponentInfrastructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInfrastructure")
            .field("state", &self.container.state())
            .finish_non_exhaustive()
    }
}

impl ComponentInfrastructure {
    /// 创建基础设施构建器
    #[must_use]
    pub fn builder() -> InfrastructureBuilder {
        InfrastructureBuilder::new()
    }

    /// 内部构造函数
    pub(crate) fn new(container: DiContainerImpl) -> Self {
        Self {
            container: Arc::new(container),
        }
    }

    /// 启动基础设施
    ///
    /// 校验依赖图并按拓扑顺序急切实例化组件。
    pub fn start(&self) -> Result<(), InfrastructureError> {
        info!("启动基础设施");
        self.container.initialize()
    }

    /// 停止基础设施
    ///
    /// 按逆拓扑顺序销毁实例并关闭容器，之后所有查找失败。
    pub fn stop(&self) -> Result<(), InfrastructureError> {
        info!("停止基础设施");
        self.container.close()
    }

    /// 当前容器状态
    #[must_use]
    pub fn state(&self) -> ContainerState {
        self.container.state()
    }

    /// 容器统计信息
    #[must_use]
    pub fn stats(&self) -> ContainerStats {
        self.container.stats()
    }

    /// 按类型查找组件
    ///
    /// 按注册顺序第一个匹配的声明胜出。
    pub fn get_component<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + 'static,
    {
        self.container.resolve::<T>()
    }

    /// 按标识查找组件
    pub fn get_component_by_name(&self, name: &str) -> DependencyResult<ComponentInstance> {
        self.container.resolve_by_name(name)
    }

    /// 按标识查找组件并转型
    pub fn get_component_as<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.container.resolve_as::<T>(name)
    }

    /// 在指定会话作用域内按标识查找组件并转型
    pub fn get_component_in_scope<T>(&self, name: &str, scope: &Scope) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + Any + 'static,
    {
        let instance = self.container.resolve_by_name_in_scope(name, scope)?;
        di_abstractions::downcast_component(instance)
    }

    /// 创建新的会话作用域
    pub fn create_session(&self, name: &str) -> DependencyResult<Scope> {
        self.container.create_scope(name)
    }

    /// 销毁会话作用域
    ///
    /// 按逆拓扑顺序执行该作用域内实例的销毁前钩子。
    pub fn destroy_session(&self, scope: &Scope) -> LifecycleResult<()> {
        self.container.destroy_scope(scope)
    }

    /// 所有已注册的组件声明，按注册顺序
    #[must_use]
    pub fn descriptors(&self) -> Vec<ComponentDescriptor> {
        self.container.descriptors()
    }

    /// 是否注册了指定标识
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.container.is_registered_by_name(name)
    }
}
