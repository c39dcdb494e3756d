//! 组件声明装配
//!
//! 扫描/配置协作方的输出契约：每个组件提供标识、生命周期、依赖标识
//! 列表、构造策略和有序的生命周期钩子列表。这里把类型安全的声明
//! 翻译成容器消费的 [`ComponentRegistration`]。

use std::marker::PhantomData;
use std::sync::Arc;

use di_abstractions::{
    ComponentFactoryFn, ComponentInstance, ComponentRegistration, LifecycleHookFn,
};
use infrastructure_common::{ComponentDescriptor, DependencyError, Lifetime, TypeInfo};

/// 钩子和工厂可抛出的错误类型
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// 类型化的组件声明构建器
///
/// `T` 是目标类型标签，按类型查找时以它匹配。
pub struct ComponentDeclaration<T> {
    descriptor: ComponentDescriptor,
    factory: Option<ComponentFactoryFn>,
    post_construct: Vec<LifecycleHookFn>,
    pre_destroy: Vec<LifecycleHookFn>,
    _marker: PhantomData<T>,
}

impl<T: Send + Sync + 'static> ComponentDeclaration<T> {
    fn with_lifetime(name: impl Into<String>, lifetime: Lifetime) -> Self {
        Self {
            descriptor: ComponentDescriptor::new::<T>(name, lifetime),
            factory: None,
            post_construct: Vec::new(),
            pre_destroy: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// 单例声明：整个容器生命周期内共享一个实例
    pub fn singleton(name: impl Into<String>) -> Self {
        Self::with_lifetime(name, Lifetime::Singleton)
    }

    /// 作用域声明：每个会话作用域一个实例
    pub fn scoped(name: impl Into<String>) -> Self {
        Self::with_lifetime(name, Lifetime::Scoped)
    }

    /// 瞬时声明：每次查找都创建新实例
    pub fn transient(name: impl Into<String>) -> Self {
        Self::with_lifetime(name, Lifetime::Transient)
    }

    /// 工厂方法式声明
    ///
    /// 配置类风格：标识取方法名，类型标签取返回值类型，构造无需
    /// 依赖参数，生命周期为单例。
    pub fn factory_method<F>(method_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<T, BoxedError> + Send + Sync + 'static,
    {
        let mut declaration = Self {
            descriptor: ComponentDescriptor::with_type_info(
                method_name,
                TypeInfo::of::<T>(),
                Lifetime::Singleton,
            ),
            factory: None,
            post_construct: Vec::new(),
            pre_destroy: Vec::new(),
            _marker: PhantomData,
        };
        declaration = declaration.factory(move |_| factory());
        declaration
    }

    /// 添加一个依赖标识，构造时按声明顺序传入工厂
    #[must_use]
    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.with_dependency(dependency);
        self
    }

    /// 设置构造策略
    ///
    /// 入参是已解析的依赖实例，按声明顺序排列。
    #[must_use]
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Vec<ComponentInstance>) -> Result<T, BoxedError> + Send + Sync + 'static,
    {
        let type_name = self.descriptor.type_info.short_name().to_string();
        self.factory = Some(Arc::new(move |dependencies| {
            factory(dependencies)
                .map(|component| Arc::new(component) as ComponentInstance)
                .map_err(|source| DependencyError::creation_failed(type_name.clone(), source))
        }));
        self
    }

    /// 追加构造后钩子，在实例对任何调用方可见之前按声明顺序执行
    #[must_use]
    pub fn post_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxedError> + Send + Sync + 'static,
    {
        self.post_construct.push(typed_hook(hook));
        self
    }

    /// 追加销毁前钩子，在实例从缓存逐出之前按声明顺序执行
    #[must_use]
    pub fn pre_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxedError> + Send + Sync + 'static,
    {
        self.pre_destroy.push(typed_hook(hook));
        self
    }

    /// 设置组件优先级
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.descriptor = self.descriptor.with_priority(priority);
        self
    }

    /// 添加元数据
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.with_metadata(key, value);
        self
    }

    /// 固化为容器消费的注册信息
    ///
    /// 未设置构造策略的声明会得到一个始终失败的工厂，让错误在解析
    /// 时立即浮现而不是被悄悄跳过。
    #[must_use]
    pub fn into_registration(self) -> ComponentRegistration {
        let factory = self.factory.unwrap_or_else(|| {
            let type_name = self.descriptor.type_info.short_name().to_string();
            Arc::new(move |_| {
                Err(DependencyError::creation_failed(
                    type_name.clone(),
                    "组件声明缺少构造策略",
                ))
            })
        });

        let mut registration = ComponentRegistration::new(self.descriptor, factory);
        for hook in self.post_construct {
            registration = registration.with_post_construct(hook);
        }
        for hook in self.pre_destroy {
            registration = registration.with_pre_destroy(hook);
        }
        registration
    }
}

/// 把针对具体类型的钩子包装成容器的通用钩子
fn typed_hook<T, F>(hook: F) -> LifecycleHookFn
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> Result<(), BoxedError> + Send + Sync + 'static,
{
    Arc::new(move |instance: &ComponentInstance| match instance.clone().downcast::<T>() {
        Ok(typed) => hook(&typed),
        Err(_) => Err(format!(
            "生命周期钩子目标类型不匹配: 期望 {}",
            std::any::type_name::<T>()
        )
        .into()),
    })
}

/// 把预构建的实例声明为单例
///
/// 值在注册时就已存在，工厂只是交还共享引用。
pub fn instance_declaration<T>(name: impl Into<String>, instance: T) -> ComponentRegistration
where
    T: Send + Sync + std::fmt::Debug + 'static,
{
    let shared = Arc::new(instance);
    let descriptor = ComponentDescriptor::new::<T>(name, Lifetime::Singleton);
    ComponentRegistration::new(
        descriptor,
        Arc::new(move |_| Ok(shared.clone() as ComponentInstance)),
    )
}
