//! # Infrastructure Common
//!
//! 这个 crate 提供了组件容器平台的公共类型和工具。
//!
//! ## 核心组件
//!
//! - [`Component`] - 组件基础 trait
//! - [`ComponentDescriptor`] - 组件声明描述符
//! - [`Lifetime`] - 组件生命周期类型
//! - [`ContainerState`] - 容器状态机
//! - [`Scope`] - 显式会话作用域句柄
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 同步优先：所有容器操作都是同步完成或失败的
//! - 显式作用域句柄，而不是隐式线程本地存储
//! - 声明在注册后不可变

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
