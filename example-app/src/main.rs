//! # 示例应用程序
//!
//! 演示组件生命周期容器：注册四种生命周期的示例服务和一个工厂
//! 方法式声明，急切初始化后由两个工作线程并发查找，最后按逆拓扑
//! 顺序关闭。

mod services;

use anyhow::Context;
use clap::Parser;
use infrastructure_composition::{dependency_at, ComponentDeclaration, ComponentInfrastructure};
use tracing::{error, info, Level};

use crate::services::{Repository, ScopedService, SingletonService, TransientService, User};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "组件生命周期容器示例应用")]
struct Args {
    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 并发查找的工作线程数
    #[arg(long, default_value_t = 2)]
    workers: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    info!("启动示例应用");

    // 装配并启动基础设施
    let infrastructure = build_infrastructure()?;
    infrastructure.start().context("基础设施启动失败")?;

    // 并发查找：每个工作线程使用自己的会话作用域
    let mut handles = Vec::with_capacity(args.workers);
    for worker_id in 0..args.workers {
        let infrastructure = infrastructure.clone();
        let handle = std::thread::Builder::new()
            .name(format!("worker-{worker_id}"))
            .spawn(move || run_worker(&infrastructure, worker_id))
            .context("工作线程创建失败")?;
        handles.push(handle);
    }

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => error!("工作线程异常退出"),
        }
    }

    let stats = infrastructure.stats();
    info!(
        "查找完成: {} 次解析成功, {} 个活跃单例",
        stats.resolved_components, stats.active_singletons
    );

    // 停止基础设施
    infrastructure.stop().context("基础设施关闭失败")?;

    info!("应用已退出");
    Ok(())
}

/// 装配基础设施
///
/// 声明按依赖顺序注册：被依赖的仓储在前，依赖方在后。
fn build_infrastructure() -> anyhow::Result<ComponentInfrastructure> {
    info!("装配基础设施");

    let infrastructure = ComponentInfrastructure::builder()
        .register(
            ComponentDeclaration::<Repository>::singleton("Repository")
                .factory(|_| Ok(Repository::new()))
                .post_construct(|_| {
                    info!("Repository 初始化完成");
                    Ok(())
                })
                .pre_destroy(|_| {
                    info!("Repository 即将销毁");
                    Ok(())
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<SingletonService>::singleton("SingletonService")
                .depends_on("Repository")
                .factory(|dependencies| {
                    let repository = dependency_at::<Repository>(&dependencies, 0)?;
                    Ok(SingletonService::new(repository))
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<ScopedService>::scoped("ScopedService")
                .depends_on("Repository")
                .factory(|dependencies| {
                    let repository = dependency_at::<Repository>(&dependencies, 0)?;
                    Ok(ScopedService::new(repository))
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<TransientService>::transient("TransientService")
                .depends_on("Repository")
                .factory(|dependencies| {
                    let repository = dependency_at::<Repository>(&dependencies, 0)?;
                    Ok(TransientService::new(repository))
                })
                .into_registration(),
        )
        .register(
            ComponentDeclaration::<User>::factory_method("user", || Ok(User::new()))
                .into_registration(),
        )
        .build()?;

    info!("基础设施装配完成");
    Ok(infrastructure)
}

/// 工作线程：在私有会话作用域内执行一轮完整查找
fn run_worker(infrastructure: &ComponentInfrastructure, worker_id: usize) -> anyhow::Result<()> {
    let session = infrastructure.create_session(&format!("worker-{worker_id}"))?;
    info!("工作线程 {} 使用会话 {}", worker_id, session.name);

    // 单例：按标识和按类型查找到的是同一个实例
    let singleton_by_name =
        infrastructure.get_component_as::<SingletonService>("SingletonService")?;
    let singleton_by_type = infrastructure.get_component::<SingletonService>()?;
    singleton_by_name.do_something();
    singleton_by_type.do_something();

    // 作用域：同一会话内共享，不同会话各自独立
    let scoped_first =
        infrastructure.get_component_in_scope::<ScopedService>("ScopedService", &session)?;
    let scoped_second =
        infrastructure.get_component_in_scope::<ScopedService>("ScopedService", &session)?;
    scoped_first.do_something();
    scoped_second.do_something();

    // 瞬时：每次查找都是新实例，但共享同一个仓储
    let transient_first =
        infrastructure.get_component_in_scope::<TransientService>("TransientService", &session)?;
    let transient_second =
        infrastructure.get_component_in_scope::<TransientService>("TransientService", &session)?;
    transient_first.do_something();
    transient_second.do_something();

    // 工厂方法式声明按方法名查找
    let user = infrastructure.get_component_as::<User>("user")?;
    user.say_hi();

    infrastructure.destroy_session(&session)?;
    info!("工作线程 {} 完成", worker_id);
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
