//! 依赖注入实现的集成测试
//!
//! 覆盖容器的可观察性质：拓扑顺序、循环与未注册依赖的失败路径、
//! 三种生命周期的实例身份语义、钩子执行顺序以及关闭后的行为。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use di_abstractions::{ContainerBuilder, DiContainer};
use di_impl::{DependencyGraph, DiContainerBuilder};
use infrastructure_common::{
    Component, ContainerState, DependencyError, InfrastructureError, Lifetime,
};
use infrastructure_composition::{
    dependency_at, instance_declaration, ComponentDeclaration, ComponentInfrastructure,
    ContainerConfig,
};

/// 测试仓储组件
#[derive(Debug)]
struct TestRepository;

impl Component for TestRepository {
    fn name(&self) -> &'static str {
        "TestRepository"
    }
}

/// 测试单例服务
#[derive(Debug)]
struct TestSingletonService {
    repository: Arc<TestRepository>,
}

impl Component for TestSingletonService {
    fn name(&self) -> &'static str {
        "TestSingletonService"
    }
}

/// 测试作用域服务
#[derive(Debug)]
struct TestScopedService {
    repository: Arc<TestRepository>,
}

impl Component for TestScopedService {
    fn name(&self) -> &'static str {
        "TestScopedService"
    }
}

/// 测试瞬时服务
#[derive(Debug)]
struct TestTransientService {
    repository: Arc<TestRepository>,
}

impl Component for TestTransientService {
    fn name(&self) -> &'static str {
        "TestTransientService"
    }
}

/// 装配规格示例场景的基础设施
///
/// Repository（无依赖，单例）、SingletonService（依赖仓储，单例）、
/// ScopedService（依赖仓储，作用域）、TransientService（依赖仓储，瞬时）。
fn demo_infrastructure(eager: bool) -> ComponentInfrastructure {
    let config = ContainerConfig {
        eager_initialization: eager,
        ..ContainerConfig::default()
    };

    ComponentInfrastructure::builder()
        .with_config(config)
        .register(
            ComponentDeclaration::<TestRepository>::singleton("Repository")
                .factory(|_| Ok(TestRepository))
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TestSingletonService>::singleton("SingletonService")
                .depends_on("Repository")
                .factory(|deps| {
                    Ok(TestSingletonService {
                        repository: dependency_at::<TestRepository>(&deps, 0)?,
                    })
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TestScopedService>::scoped("ScopedService")
                .depends_on("Repository")
                .factory(|deps| {
                    Ok(TestScopedService {
                        repository: dependency_at::<TestRepository>(&deps, 0)?,
                    })
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TestTransientService>::transient("TransientService")
                .depends_on("Repository")
                .factory(|deps| {
                    Ok(TestTransientService {
                        repository: dependency_at::<TestRepository>(&deps, 0)?,
                    })
                })
                .into_registration(),
        )
        .build()
        .unwrap()
}

#[test]
fn topological_order_is_a_permutation_respecting_edges() {
    let mut graph = DependencyGraph::new();
    graph.register("repository", &[]).unwrap();
    graph
        .register("cache", &["repository".to_string()])
        .unwrap();
    graph
        .register("service", &["repository".to_string(), "cache".to_string()])
        .unwrap();
    graph.register("endpoint", &["service".to_string()]).unwrap();

    let order = graph.topological_order().unwrap();
    assert_eq!(order.len(), 4);

    let position = |name: &str| order.iter().position(|entry| entry == name).unwrap();
    assert!(position("repository") < position("cache"));
    assert!(position("repository") < position("service"));
    assert!(position("cache") < position("service"));
    assert!(position("service") < position("endpoint"));
}

#[test]
fn cyclic_declaration_set_fails_initialize_with_circular_dependency() {
    #[derive(Debug)]
    struct Cyclic;

    impl Component for Cyclic {
        fn name(&self) -> &'static str {
            "Cyclic"
        }
    }

    let infrastructure = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<Cyclic>::singleton("Cyclic")
                .depends_on("Cyclic")
                .factory(|_| Ok(Cyclic))
                .into_registration(),
        )
        .build()
        .unwrap();

    let err = infrastructure.start().unwrap_err();
    assert!(matches!(
        err,
        InfrastructureError::DependencyError {
            source: DependencyError::CircularDependency { .. }
        }
    ));

    // 初始化失败后容器不可用，任何查找都被拒绝
    assert_eq!(infrastructure.state(), ContainerState::Closed);
    let err = infrastructure.get_component_by_name("Cyclic").unwrap_err();
    assert!(matches!(err, DependencyError::ContainerClosed));
}

#[test]
fn unresolved_dependency_fails_at_registration_time() {
    #[derive(Debug)]
    struct Orphan;

    impl Component for Orphan {
        fn name(&self) -> &'static str {
            "Orphan"
        }
    }

    let err = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<Orphan>::singleton("Orphan")
                .depends_on("Missing")
                .factory(|_| Ok(Orphan))
                .into_registration(),
        )
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        InfrastructureError::DependencyError {
            source: DependencyError::UnresolvedDependency { .. }
        }
    ));
}

#[test]
fn duplicate_identity_is_rejected() {
    let err = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<TestRepository>::singleton("Repository")
                .factory(|_| Ok(TestRepository))
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TestRepository>::singleton("Repository")
                .factory(|_| Ok(TestRepository))
                .into_registration(),
        )
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        InfrastructureError::DependencyError {
            source: DependencyError::DuplicateComponent { .. }
        }
    ));
}

#[test]
fn concurrent_first_time_singleton_lookups_construct_once() {
    #[derive(Debug)]
    struct Slow;

    impl Component for Slow {
        fn name(&self) -> &'static str {
            "Slow"
        }
    }

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    // 关闭急切初始化，让两个线程竞争首次构造
    let infrastructure = ComponentInfrastructure::builder()
        .with_config(ContainerConfig {
            eager_initialization: false,
            ..ContainerConfig::default()
        })
        .register(
            ComponentDeclaration::<Slow>::singleton("Slow")
                .factory(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    Ok(Slow)
                })
                .into_registration(),
        )
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let infrastructure = infrastructure.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            infrastructure.get_component_as::<Slow>("Slow").unwrap()
        }));
    }

    let first = handles.pop().unwrap().join().unwrap();
    let second = handles.pop().unwrap().join().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn scoped_instances_are_shared_within_and_private_across_sessions() {
    let infrastructure = demo_infrastructure(true);
    infrastructure.start().unwrap();

    let first_session = infrastructure.create_session("first").unwrap();
    let second_session = infrastructure.create_session("second").unwrap();

    let a1 = infrastructure
        .get_component_in_scope::<TestScopedService>("ScopedService", &first_session)
        .unwrap();
    let a2 = infrastructure
        .get_component_in_scope::<TestScopedService>("ScopedService", &first_session)
        .unwrap();
    let b = infrastructure
        .get_component_in_scope::<TestScopedService>("ScopedService", &second_session)
        .unwrap();

    assert!(Arc::ptr_eq(&a1, &a2));
    assert!(!Arc::ptr_eq(&a1, &b));

    // 不同会话的实例仍然共享同一个单例仓储
    assert!(Arc::ptr_eq(&a1.repository, &b.repository));

    infrastructure.stop().unwrap();
}

#[test]
fn transient_lookups_create_a_fresh_instance_per_call() {
    #[derive(Debug)]
    struct Fresh;

    impl Component for Fresh {
        fn name(&self) -> &'static str {
            "Fresh"
        }
    }

    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let infrastructure = ComponentInfrastructure::builder()
        .with_config(ContainerConfig {
            eager_initialization: false,
            ..ContainerConfig::default()
        })
        .register(
            ComponentDeclaration::<Fresh>::transient("Fresh")
                .factory(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Fresh)
                })
                .into_registration(),
        )
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    let lookups = 4;
    let mut instances = Vec::new();
    for _ in 0..lookups {
        instances.push(infrastructure.get_component_as::<Fresh>("Fresh").unwrap());
    }

    assert_eq!(constructions.load(Ordering::SeqCst), lookups);
    for (index, left) in instances.iter().enumerate() {
        for right in &instances[index + 1..] {
            assert!(!Arc::ptr_eq(left, right));
        }
    }
}

#[test]
fn hooks_run_in_construction_order_and_reverse_on_close() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
    let record = |events: &Arc<Mutex<Vec<String>>>, label: &str| {
        let events = events.clone();
        let label = label.to_string();
        move |_: &TestRepository| -> HookResult {
            events.lock().unwrap().push(label.clone());
            Ok(())
        }
    };
    let record_service = |events: &Arc<Mutex<Vec<String>>>, label: &str| {
        let events = events.clone();
        let label = label.to_string();
        move |_: &TestSingletonService| -> HookResult {
            events.lock().unwrap().push(label.clone());
            Ok(())
        }
    };

    let infrastructure = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<TestRepository>::singleton("Repository")
                .factory(|_| Ok(TestRepository))
                .post_construct(record(&events, "post:Repository"))
                .pre_destroy(record(&events, "pre:Repository"))
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TestSingletonService>::singleton("Service")
                .depends_on("Repository")
                .factory(|deps| {
                    Ok(TestSingletonService {
                        repository: dependency_at::<TestRepository>(&deps, 0)?,
                    })
                })
                .post_construct(record_service(&events, "post:Service"))
                .pre_destroy(record_service(&events, "pre:Service"))
                .into_registration(),
        )
        .build()
        .unwrap();

    infrastructure.start().unwrap();
    assert_eq!(
        *events.lock().unwrap(),
        vec!["post:Repository", "post:Service"]
    );

    infrastructure.stop().unwrap();
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "post:Repository",
            "post:Service",
            "pre:Service",
            "pre:Repository"
        ]
    );
}

#[test]
fn end_to_end_demo_scenario() {
    let infrastructure = demo_infrastructure(true);
    infrastructure.start().unwrap();

    // 两个线程按标识查找仓储，得到同一个实例
    let mut handles = Vec::new();
    for _ in 0..2 {
        let infrastructure = infrastructure.clone();
        handles.push(thread::spawn(move || {
            infrastructure
                .get_component_as::<TestRepository>("Repository")
                .unwrap()
        }));
    }
    let first = handles.pop().unwrap().join().unwrap();
    let second = handles.pop().unwrap().join().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // 按类型查找与按标识查找一致
    let by_type = infrastructure.get_component::<TestRepository>().unwrap();
    assert!(Arc::ptr_eq(&first, &by_type));

    // 同一线程两次瞬时查找得到两个不同实例，但包装同一个共享仓储
    let t1 = infrastructure
        .get_component_as::<TestTransientService>("TransientService")
        .unwrap();
    let t2 = infrastructure
        .get_component_as::<TestTransientService>("TransientService")
        .unwrap();
    assert!(!Arc::ptr_eq(&t1, &t2));
    assert!(Arc::ptr_eq(&t1.repository, &t2.repository));
    assert!(Arc::ptr_eq(&t1.repository, &first));

    // 单例服务也包装同一个仓储
    let service = infrastructure
        .get_component_as::<TestSingletonService>("SingletonService")
        .unwrap();
    assert!(Arc::ptr_eq(&service.repository, &first));

    infrastructure.stop().unwrap();
}

#[test]
fn lookups_after_close_fail_with_container_closed() {
    let infrastructure = demo_infrastructure(true);
    infrastructure.start().unwrap();
    infrastructure.stop().unwrap();

    assert_eq!(infrastructure.state(), ContainerState::Closed);

    let err = infrastructure
        .get_component_by_name("Repository")
        .unwrap_err();
    assert!(matches!(err, DependencyError::ContainerClosed));

    let err = infrastructure
        .get_component::<TestRepository>()
        .unwrap_err();
    assert!(matches!(err, DependencyError::ContainerClosed));

    // 重复关闭是幂等的
    infrastructure.stop().unwrap();
}

#[test]
fn by_type_lookup_picks_first_registration_when_ambiguous() {
    #[derive(Debug)]
    struct Tagged {
        tag: &'static str,
    }

    impl Component for Tagged {
        fn name(&self) -> &'static str {
            "Tagged"
        }
    }

    let infrastructure = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<Tagged>::singleton("first")
                .factory(|_| Ok(Tagged { tag: "first" }))
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<Tagged>::singleton("second")
                .factory(|_| Ok(Tagged { tag: "second" }))
                .into_registration(),
        )
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    // 歧义时按注册顺序第一个匹配胜出
    let resolved = infrastructure.get_component::<Tagged>().unwrap();
    assert_eq!(resolved.tag, "first");

    infrastructure.stop().unwrap();
}

#[test]
fn construction_failure_during_initialize_leaves_container_unusable() {
    #[derive(Debug)]
    struct Broken;

    impl Component for Broken {
        fn name(&self) -> &'static str {
            "Broken"
        }
    }

    let infrastructure = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<Broken>::singleton("Broken")
                .factory(|_| Err("构造器故障".into()))
                .into_registration(),
        )
        .build()
        .unwrap();

    let err = infrastructure.start().unwrap_err();
    assert!(matches!(
        err,
        InfrastructureError::DependencyError {
            source: DependencyError::ComponentCreationFailed { .. }
        }
    ));

    assert_eq!(infrastructure.state(), ContainerState::Closed);
    let err = infrastructure.get_component_by_name("Broken").unwrap_err();
    assert!(matches!(err, DependencyError::ContainerClosed));
}

#[test]
fn failed_lazy_singleton_construction_can_be_retried() {
    #[derive(Debug)]
    struct Flaky;

    impl Component for Flaky {
        fn name(&self) -> &'static str {
            "Flaky"
        }
    }

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let infrastructure = ComponentInfrastructure::builder()
        .with_config(ContainerConfig {
            eager_initialization: false,
            ..ContainerConfig::default()
        })
        .register(
            ComponentDeclaration::<Flaky>::singleton("Flaky")
                .factory(move |_| {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("首次构造失败".into())
                    } else {
                        Ok(Flaky)
                    }
                })
                .into_registration(),
        )
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    // 失败的构造不留下缓存实例，下一次查找合法地重试
    assert!(infrastructure.get_component_as::<Flaky>("Flaky").is_err());
    assert!(infrastructure.get_component_as::<Flaky>("Flaky").is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn initialize_is_only_valid_from_uninitialized() {
    let container = DiContainerBuilder::new()
        .register(
            ComponentDeclaration::<TestRepository>::singleton("Repository")
                .factory(|_| Ok(TestRepository))
                .into_registration(),
        )
        .build()
        .unwrap();

    container.initialize().unwrap();
    assert_eq!(container.state(), ContainerState::Ready);

    let err = container.initialize().unwrap_err();
    assert!(matches!(err, InfrastructureError::LifecycleError { .. }));
}

#[test]
fn destroying_a_session_runs_pre_destroy_hooks_for_its_instances() {
    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let events = events.clone();
        move |_: &TestRepository| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            events.lock().unwrap().push("pre:ScopedRepo".to_string());
            Ok(())
        }
    };

    let infrastructure = ComponentInfrastructure::builder()
        .with_config(ContainerConfig {
            eager_initialization: false,
            ..ContainerConfig::default()
        })
        .register(
            ComponentDeclaration::<TestRepository>::scoped("ScopedRepo")
                .factory(|_| Ok(TestRepository))
                .pre_destroy(recorder)
                .into_registration(),
        )
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    let session = infrastructure.create_session("short-lived").unwrap();
    let _instance = infrastructure
        .get_component_in_scope::<TestRepository>("ScopedRepo", &session)
        .unwrap();

    infrastructure.destroy_session(&session).unwrap();
    assert_eq!(*events.lock().unwrap(), vec!["pre:ScopedRepo"]);

    // 会话销毁后句柄失效
    assert!(infrastructure.destroy_session(&session).is_err());
}

#[test]
fn pre_built_instance_is_served_as_singleton() {
    #[derive(Debug)]
    struct Settings {
        label: &'static str,
    }

    let infrastructure = ComponentInfrastructure::builder()
        .register(instance_declaration("Settings", Settings { label: "prebuilt" }))
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    let first = infrastructure
        .get_component_as::<Settings>("Settings")
        .unwrap();
    let second = infrastructure
        .get_component_as::<Settings>("Settings")
        .unwrap();

    assert_eq!(first.label, "prebuilt");
    assert!(Arc::ptr_eq(&first, &second));

    infrastructure.stop().unwrap();
}

#[test]
fn registered_declarations_are_listed_in_registration_order() {
    let infrastructure = demo_infrastructure(true);

    let names: Vec<String> = infrastructure
        .descriptors()
        .into_iter()
        .map(|descriptor| descriptor.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Repository",
            "SingletonService",
            "ScopedService",
            "TransientService"
        ]
    );

    let lifetimes: Vec<Lifetime> = infrastructure
        .descriptors()
        .into_iter()
        .map(|descriptor| descriptor.lifetime)
        .collect();
    assert_eq!(
        lifetimes,
        vec![
            Lifetime::Singleton,
            Lifetime::Singleton,
            Lifetime::Scoped,
            Lifetime::Transient
        ]
    );
}
