//! 组件注册类型
//!
//! 将被动的组件声明与构造策略、生命周期钩子组合成一次注册。

use std::any::Any;
use std::sync::Arc;

use infrastructure_common::{ComponentDescriptor, DependencyError, DependencyResult};

/// 已实例化的组件
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// 组件工厂函数类型
///
/// 输入为已解析的依赖实例，按声明顺序排列。
pub type ComponentFactoryFn =
    Arc<dyn Fn(Vec<ComponentInstance>) -> DependencyResult<ComponentInstance> + Send + Sync>;

/// 生命周期钩子函数类型
///
/// 构造后钩子在实例对任何调用方可见之前执行；销毁前钩子在实例
/// 从缓存中逐出之前执行。
pub type LifecycleHookFn = Arc<
    dyn Fn(&ComponentInstance) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync,
>;

/// 组件注册信息
///
/// 注册到容器后不可变。
#[derive(Clone)]
pub struct ComponentRegistration {
    /// 组件声明描述符
    pub descriptor: ComponentDescriptor,
    /// 构造策略
    pub factory: ComponentFactoryFn,
    /// 构造后钩子，按声明顺序执行
    pub post_construct: Vec<LifecycleHookFn>,
    /// 销毁前钩子，按声明顺序执行
    pub pre_destroy: Vec<LifecycleHookFn>,
}

impl ComponentRegistration {
    /// 创建新的组件注册信息
    pub fn new(descriptor: ComponentDescriptor, factory: ComponentFactoryFn) -> Self {
        Self {
            descriptor,
            factory,
            post_construct: Vec::new(),
            pre_destroy: Vec::new(),
        }
    }

    /// 追加一个构造后钩子
    #[must_use]
    pub fn with_post_construct(mut self, hook: LifecycleHookFn) -> Self {
        self.post_construct.push(hook);
        self
    }

    /// 追加一个销毁前钩子
    #[must_use]
    pub fn with_pre_destroy(mut self, hook: LifecycleHookFn) -> Self {
        self.pre_destroy.push(hook);
        self
    }

    /// 组件标识
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("descriptor", &self.descriptor)
            .field("factory", &"<function>")
            .field("post_construct", &self.post_construct.len())
            .field("pre_destroy", &self.pre_destroy.len())
            .finish()
    }
}

/// 将任意实例向下转型为具体组件类型
///
/// 转型失败说明同名注册的目标类型与请求类型不一致。
pub fn downcast_component<T: Send + Sync + 'static>(
    instance: ComponentInstance,
) -> DependencyResult<Arc<T>> {
    instance.downcast::<T>().map_err(|_| {
        DependencyError::ComponentNotRegistered {
            type_name: std::any::type_name::<T>().to_string(),
        }
    })
}

/// 从已解析的依赖列表中按位置取出一个依赖并转型
///
/// 位置对应声明顺序，供构造策略在函数体内提取依赖。
pub fn dependency_at<T: Send + Sync + 'static>(
    dependencies: &[ComponentInstance],
    index: usize,
) -> DependencyResult<Arc<T>> {
    let instance = dependencies.get(index).cloned().ok_or_else(|| {
        DependencyError::creation_failed(
            std::any::type_name::<T>(),
            format!("缺少第 {index} 个依赖参数"),
        )
    })?;
    downcast_component(instance)
}
