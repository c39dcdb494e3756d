//! 组件基础接口定义
//!
//! 提供所有可注册组件必须实现的基础 trait 以及组件声明描述符

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::lifecycle::Lifetime;
use crate::metadata::TypeInfo;

/// 组件基础 trait
///
/// 所有通过类型注册和按类型解析的组件都必须实现此 trait
pub trait Component: Send + Sync + Debug + 'static {
    /// 组件名称
    fn name(&self) -> &'static str;

    /// 组件优先级，数值越高优先级越高
    fn priority(&self) -> i32 {
        0
    }

    /// 组件是否启用
    fn is_enabled(&self) -> bool {
        true
    }

    /// 组件类型ID
    fn type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// 组件声明描述符
///
/// 描述一个可创建单元的被动数据：标识、目标类型、生命周期、
/// 依赖标识列表。注册到容器后不可变。
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// 组件标识（在容器内唯一）
    pub name: String,
    /// 目标类型信息
    pub type_info: TypeInfo,
    /// 组件生命周期
    pub lifetime: Lifetime,
    /// 构造前必须解析的依赖标识，按声明顺序
    pub dependencies: Vec<String>,
    /// 组件优先级
    pub priority: i32,
    /// 是否启用
    pub enabled: bool,
    /// 组件元数据
    pub metadata: HashMap<String, String>,
}

impl ComponentDescriptor {
    /// 创建新的组件声明描述符
    pub fn new<T: 'static>(name: impl Into<String>, lifetime: Lifetime) -> Self {
        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            lifetime,
            dependencies: Vec::new(),
            priority: 0,
            enabled: true,
            metadata: HashMap::new(),
        }
    }

    /// 使用已有的类型信息创建描述符
    ///
    /// 用于工厂方法式声明：标识取方法名，类型取返回值类型。
    pub fn with_type_info(name: impl Into<String>, type_info: TypeInfo, lifetime: Lifetime) -> Self {
        Self {
            name: name.into(),
            type_info,
            lifetime,
            dependencies: Vec::new(),
            priority: 0,
            enabled: true,
            metadata: HashMap::new(),
        }
    }

    /// 添加一个依赖标识
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// 批量设置依赖标识
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 设置启用状态
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
