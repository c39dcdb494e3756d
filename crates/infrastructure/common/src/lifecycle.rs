//! 组件生命周期管理
//!
//! 定义组件生命周期类型、容器状态机和显式会话作用域句柄

use serde::{Deserialize, Serialize};

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifetime {
    /// 单例模式 - 整个容器生命周期内只创建一个实例
    Singleton,
    /// 作用域模式 - 在同一会话作用域内共享实例
    Scoped,
    /// 瞬时模式 - 每次解析都创建新实例
    Transient,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Transient
    }
}

impl Lifetime {
    /// 该生命周期是否缓存实例
    ///
    /// Singleton 和 Scoped 缓存，Transient 不缓存。
    #[must_use]
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Singleton | Self::Scoped)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Singleton => f.write_str("Singleton"),
            Self::Scoped => f.write_str("Scoped"),
            Self::Transient => f.write_str("Transient"),
        }
    }
}

/// 容器状态
///
/// 状态机：`Uninitialized → Initializing → Ready → Closing → Closed`。
/// 初始化失败时直接进入 `Closed`，不暴露部分就绪状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// 未初始化 - 仅允许注册声明
    Uninitialized,
    /// 初始化中 - 按拓扑顺序急切构造实例
    Initializing,
    /// 就绪 - 允许查找
    Ready,
    /// 关闭中 - 按逆拓扑顺序销毁实例
    Closing,
    /// 已关闭 - 所有查找失败
    Closed,
}

impl Default for ContainerState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl ContainerState {
    /// 当前状态是否允许解析组件
    #[must_use]
    pub fn can_resolve(&self) -> bool {
        matches!(self, Self::Initializing | Self::Ready)
    }

    /// 容器是否已经进入关闭流程
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Initializing => f.write_str("Initializing"),
            Self::Ready => f.write_str("Ready"),
            Self::Closing => f.write_str("Closing"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

/// 会话作用域句柄
///
/// 显式传递到解析调用，取代隐式线程本地存储。一个作用域对应
/// 容器内一份私有实例缓存，缓存从不跨会话可见。
#[derive(Debug, Clone)]
pub struct Scope {
    /// 作用域唯一标识
    pub id: uuid::Uuid,
    /// 作用域名称
    pub name: String,
    /// 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Scope {
    /// 创建新作用域
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            created_at: chrono::Utc::now(),
        }
    }

    /// 创建根作用域
    #[must_use]
    pub fn root() -> Self {
        Self::new("root")
    }

    /// 创建子作用域
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::new(format!("{}.{}", self.name, name.into()))
    }
}
