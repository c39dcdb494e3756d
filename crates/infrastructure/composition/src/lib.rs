//! # 基础设施组合层
//!
//! 这个 crate 是容器平台的组合层，负责把外部协作方提供的组件声明
//! 装配成一个完整的、可运行的容器实例。
//!
//! ## 主要功能
//!
//! - **声明装配**: 类型安全地描述组件声明（标识、生命周期、依赖、
//!   构造策略、生命周期钩子）
//! - **基础设施构建器**: 使用构建者模式装配容器
//! - **生命周期管理**: 管理容器的启动和关闭
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ComponentDeclaration, ComponentInfrastructure};
//!
//! #[derive(Debug)]
//! struct Repository;
//!
//! impl infrastructure_common::Component for Repository {
//!     fn name(&self) -> &'static str {
//!         "Repository"
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 装配并构建基础设施
//!     let infrastructure = ComponentInfrastructure::builder()
//!         .register(
//!             ComponentDeclaration::<Repository>::singleton("Repository")
//!                 .factory(|_| Ok(Repository))
//!                 .into_registration(),
//!         )
//!         .build()?;
//!
//!     // 启动：按拓扑顺序急切实例化
//!     infrastructure.start()?;
//!
//!     // 查找组件
//!     let repository = infrastructure.get_component::<Repository>()?;
//!     println!("已解析: {repository:?}");
//!
//!     // 关闭：按逆拓扑顺序销毁
//!     infrastructure.stop()?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod declarations;
pub mod infrastructure;

// 重新导出主要类型
pub use builder::InfrastructureBuilder;
pub use declarations::{instance_declaration, ComponentDeclaration};
pub use infrastructure::ComponentInfrastructure;

// 重新导出声明装配需要的容器类型
pub use di_abstractions::{dependency_at, ComponentInstance, ContainerConfig};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
