//! 容器构建器实现

use di_abstractions::{ComponentRegistration, ContainerBuilder, ContainerConfig, DiContainer};
use infrastructure_common::DependencyResult;
use tracing::info;

use crate::container::DiContainerImpl;

/// 容器构建器
///
/// 收集注册声明，`build` 时按添加顺序逐条处理。声明引用的依赖必须
/// 出现在批次中更早的位置，否则快速失败。
#[derive(Default)]
pub struct DiContainerBuilder {
    registrations: Vec<ComponentRegistration>,
    config: ContainerConfig,
}

impl DiContainerBuilder {
    /// 创建新的容器构建器
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerBuilder for DiContainerBuilder {
    type Container = DiContainerImpl;

    fn register(mut self, registration: ComponentRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    fn build(self) -> DependencyResult<Self::Container> {
        let mut container = DiContainerImpl::with_config(self.config);

        let registration_count = self.registrations.len();
        for registration in self.registrations {
            container.register(registration)?;
        }

        info!("构建容器完成，注册了 {} 个组件", registration_count);
        Ok(container)
    }
}
