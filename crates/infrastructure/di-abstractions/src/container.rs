//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use std::any::TypeId;
use std::sync::Arc;

use infrastructure_common::{
    Component, ComponentDescriptor, ContainerState, DependencyResult, InfrastructureError,
    LifecycleResult, Scope,
};
use serde::{Deserialize, Serialize};

use crate::registry::{ComponentInstance, ComponentRegistration};

/// 依赖注入容器 trait
///
/// 对外的注册表门面：按标识或按类型查找，其余系统只通过这一边界
/// 使用容器。
pub trait DiContainer: Send + Sync {
    /// 注册组件声明
    ///
    /// 仅在 `Uninitialized` 状态下合法。声明引用的依赖必须已经注册，
    /// 否则快速失败。
    fn register(&mut self, registration: ComponentRegistration) -> DependencyResult<()>;

    /// 初始化容器
    ///
    /// 计算拓扑顺序并按序急切实例化；任何一步失败都会使整个初始化
    /// 失败，容器进入 `Closed` 状态。
    fn initialize(&self) -> Result<(), InfrastructureError>;

    /// 按标识解析组件（使用根作用域）
    fn resolve_by_name(&self, name: &str) -> DependencyResult<ComponentInstance>;

    /// 在指定会话作用域内按标识解析组件
    fn resolve_by_name_in_scope(
        &self,
        name: &str,
        scope: &Scope,
    ) -> DependencyResult<ComponentInstance>;

    /// 按类型解析组件
    ///
    /// 按注册顺序扫描，第一个目标类型匹配的声明胜出；多个匹配不视为
    /// 错误（已记录的歧义策略）。
    fn resolve_by_type_id(&self, type_id: TypeId) -> DependencyResult<ComponentInstance>;

    /// 检查是否已注册指定标识
    fn is_registered_by_name(&self, name: &str) -> bool;

    /// 获取所有已注册的组件声明，按注册顺序
    fn descriptors(&self) -> Vec<ComponentDescriptor>;

    /// 当前容器状态
    fn state(&self) -> ContainerState;

    /// 创建新的会话作用域
    fn create_scope(&self, name: &str) -> DependencyResult<Scope>;

    /// 销毁会话作用域，按逆拓扑顺序执行其实例的销毁前钩子
    fn destroy_scope(&self, scope: &Scope) -> LifecycleResult<()>;

    /// 关闭容器
    ///
    /// 按逆拓扑顺序执行销毁前钩子并逐出实例，之后所有查找失败。
    fn close(&self) -> Result<(), InfrastructureError>;
}

/// 类型化解析扩展
///
/// 为容器补充泛型入口，向下转型由实现完成。
pub trait TypedResolver: DiContainer {
    /// 按组件类型解析
    fn resolve<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component + 'static;

    /// 按标识解析并转型为具体组件类型
    fn resolve_as<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static;
}

/// 容器构建器 trait
pub trait ContainerBuilder {
    /// 关联的容器类型
    type Container: DiContainer;

    /// 添加组件注册，注册顺序即声明处理顺序
    #[must_use]
    fn register(self, registration: ComponentRegistration) -> Self;

    /// 设置容器配置
    #[must_use]
    fn with_config(self, config: ContainerConfig) -> Self;

    /// 构建容器，逐条处理注册并快速失败
    fn build(self) -> DependencyResult<Self::Container>;
}

/// 容器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// 是否在初始化时急切实例化全部组件
    pub eager_initialization: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 根作用域名称
    pub root_scope_name: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            eager_initialization: true,
            max_resolution_depth: 64,
            root_scope_name: "root".to_string(),
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 解析成功次数
    pub resolved_components: u64,
    /// 活跃单例数量
    pub active_singletons: usize,
    /// 活跃会话作用域数量
    pub active_scopes: usize,
    /// 解析错误次数
    pub resolution_errors: u64,
}
