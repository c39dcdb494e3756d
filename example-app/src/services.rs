//! 示例服务
//!
//! 四个演示组件覆盖全部生命周期：单例仓储、单例服务、会话作用域
//! 服务、瞬时服务，外加一个工厂方法式声明的用户组件。

use std::sync::Arc;

use infrastructure_common::Component;
use tracing::info;

/// 共享仓储，无依赖，单例
#[derive(Debug)]
pub struct Repository;

impl Repository {
    /// 创建仓储
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// 演示方法
    pub fn say_hello(&self) {
        info!("Repository[{:p}]: Hello World", self);
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Repository {
    fn name(&self) -> &'static str {
        "Repository"
    }
}

/// 单例服务，依赖仓储
#[derive(Debug)]
pub struct SingletonService {
    repository: Arc<Repository>,
}

impl SingletonService {
    /// 创建服务
    #[must_use]
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// 演示方法
    pub fn do_something(&self) {
        info!("SingletonService[{:p}] 开始工作", self);
        self.repository.say_hello();
    }
}

impl Component for SingletonService {
    fn name(&self) -> &'static str {
        "SingletonService"
    }
}

/// 会话作用域服务，依赖仓储
#[derive(Debug)]
pub struct ScopedService {
    repository: Arc<Repository>,
}

impl ScopedService {
    /// 创建服务
    #[must_use]
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// 演示方法
    pub fn do_something(&self) {
        info!("ScopedService[{:p}] 开始工作", self);
        self.repository.say_hello();
    }
}

impl Component for ScopedService {
    fn name(&self) -> &'static str {
        "ScopedService"
    }
}

/// 瞬时服务，依赖仓储，每次查找都是新实例
#[derive(Debug)]
pub struct TransientService {
    repository: Arc<Repository>,
}

impl TransientService {
    /// 创建服务
    #[must_use]
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// 演示方法
    pub fn do_something(&self) {
        info!("TransientService[{:p}] 开始工作", self);
        self.repository.say_hello();
    }
}

impl Component for TransientService {
    fn name(&self) -> &'static str {
        "TransientService"
    }
}

/// 工厂方法式声明的用户组件
#[derive(Debug)]
pub struct User;

impl User {
    /// 创建用户
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// 演示方法
    pub fn say_hi(&self) {
        info!("User[{:p}]: Hi", self);
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for User {
    fn name(&self) -> &'static str {
        "User"
    }
}
