//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    #[error("未解析的依赖: {component} 依赖 {dependency}，但后者尚未注册")]
    UnresolvedDependency {
        component: String,
        dependency: String,
    },

    #[error("组件重复注册: {name}")]
    DuplicateComponent { name: String },

    #[error("组件注册失败: {name}, 原因: {message}")]
    RegistrationError { name: String, message: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("容器已关闭，拒绝解析请求")]
    ContainerClosed,

    #[error("容器尚未就绪: 当前状态 {state}")]
    ContainerNotReady { state: String },

    #[error("解析深度超出限制 {max_depth}: {chain}")]
    ResolutionDepthExceeded { max_depth: usize, chain: String },
}

impl DependencyError {
    /// 创建组件创建失败错误
    pub fn creation_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 创建未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ComponentNotRegistered {
            type_name: type_name.into(),
        }
    }
}

/// 生命周期管理错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("非法状态转换: 当前状态 {from}, 不允许执行 {operation}")]
    InvalidStateTransition { from: String, operation: String },

    #[error("作用域不存在: {scope_id}")]
    ScopeNotFound { scope_id: String },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("生命周期错误: {source}")]
    LifecycleError {
        #[from]
        source: LifecycleError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
