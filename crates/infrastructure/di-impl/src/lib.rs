//! # Dependency Injection Implementation
//!
//! 依赖注入容器的具体实现：依赖图、实例存储和解析引擎。
//!
//! ## 组成部分
//!
//! - [`graph::DependencyGraph`] - 按标识组织的有向依赖图，提供注册、
//!   拓扑排序（Kahn 算法）和循环检测
//! - 实例存储 - 单例区、会话作用域区和瞬时策略的按需创建
//! - [`DiContainerImpl`] - 解析引擎与状态机
//!   （`Uninitialized → Initializing → Ready → Closing → Closed`）
//! - [`DiContainerBuilder`] - 按注册顺序装配容器
//!
//! 依赖图在单线程注册阶段构建完成，此后只读；运行期唯一可变的共享
//! 结构是实例存储，单例区使用按标识的原子 create-if-absent 原语。

pub mod builder;
pub mod container;
pub mod graph;

mod store;

pub use builder::DiContainerBuilder;
pub use container::DiContainerImpl;
pub use graph::DependencyGraph;
