//! 基础设施构建器

use di_abstractions::{ComponentRegistration, ContainerBuilder, ContainerConfig};
use di_impl::DiContainerBuilder;
use infrastructure_common::InfrastructureError;
use tracing::{debug, info};

use crate::infrastructure::ComponentInfrastructure;

/// 基础设施构建器
///
/// 使用建造者模式收集组件声明并装配容器。声明按添加顺序处理，
/// 依赖必须先于依赖方出现，否则构建快速失败。
pub struct InfrastructureBuilder {
    registrations: Vec<ComponentRegistration>,
    config: ContainerConfig,
}

impl InfrastructureBuilder {
    /// 创建新的基础设施构建器
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            config: ContainerConfig::default(),
        }
    }

    /// 设置容器配置
    #[must_use]
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加一条组件注册
    #[must_use]
    pub fn register(mut self, registration: ComponentRegistration) -> Self {
        debug!("添加组件声明: {}", registration.name());
        self.registrations.push(registration);
        self
    }

    /// 构建基础设施
    ///
    /// 只装配容器，不触发实例化；实例化由
    /// [`ComponentInfrastructure::start`] 完成。
    pub fn build(self) -> Result<ComponentInfrastructure, InfrastructureError> {
        info!("装配基础设施, 共 {} 条组件声明", self.registrations.len());

        let mut builder = DiContainerBuilder::new().with_config(self.config);
        for registration in self.registrations {
            builder = builder.register(registration);
        }
        let container = builder.build()?;

        info!("基础设施装配完成");
        Ok(ComponentInfrastructure::new(container))
    }
}

impl Default for InfrastructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
