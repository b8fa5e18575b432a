//! # 依赖注入容器演示
//!
//! 演示容器的基本用法：
//! - 提供构造参数并注册工厂
//! - 通过 `#[derive(Injectable)]` 声明字段注入
//! - 按名称解析组件并在多个任务中共享单例
//!
//! 可以通过 `--config` 指定容器配置文件，`--log-level` 或 `RUST_LOG` 控制日志级别。

use clap::Parser;
use component_macros::Injectable;
use di_abstractions::{ComponentRegistry, DependencyResolverExt, Inject, Injectable};
use di_impl::Injector;
use infrastructure_common::{ContainerConfig, Lifetime};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "di-wiring-demo")]
#[command(about = "Lorn DI 依赖注入演示")]
struct Args {
    /// 容器配置文件路径（toml/json/yaml）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，设置了 `RUST_LOG` 时以后者为准
    #[arg(long, default_value = "info")]
    log_level: String,
}

trait ObjectIFace: Injectable {
    fn describe(&self) -> String;
}

#[derive(Debug)]
struct Config {
    attr: String,
}

#[derive(Injectable)]
struct Object1 {
    attr: String,
    #[inject("object2", require)]
    dep: Inject<dyn ObjectIFace>,
}

impl ObjectIFace for Object1 {
    fn describe(&self) -> String {
        let dep = self
            .dep
            .get()
            .map(|dep| dep.describe())
            .unwrap_or_else(|| "<unset>".to_string());
        format!("Object1 {{ attr: {}, dep: {} }}", self.attr, dep)
    }
}

#[derive(Injectable)]
struct Object2;

impl ObjectIFace for Object2 {
    fn describe(&self) -> String {
        "Object2".to_string()
    }
}

fn new_object1(cfg: Arc<Config>) -> anyhow::Result<Arc<dyn ObjectIFace>> {
    anyhow::ensure!(!cfg.attr.is_empty(), "Object1 需要非空的 attr");
    Ok(Arc::new(Object1 {
        attr: cfg.attr.clone(),
        dep: Inject::new(),
    }))
}

fn new_object2() -> anyhow::Result<Arc<dyn ObjectIFace>> {
    Ok(Arc::new(Object2))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ContainerConfig::load(args.config.as_deref())?;
    info!(?config, "容器配置");

    let injector = Arc::new(Injector::with_config(config));
    injector.set_arg(Config {
        attr: "fddgg".to_string(),
    });
    injector.register(Lifetime::Singleton, new_object1, "object1")?;
    injector.register(Lifetime::Singleton, new_object2, "object2")?;

    for unit in injector.registered_units() {
        info!("已注册: {} ({}, {})", unit.name, unit.capability, unit.lifetime);
    }

    let object1 = injector
        .resolve_by_name::<dyn ObjectIFace>("object1")?
        .ok_or_else(|| anyhow::anyhow!("object1 未注册"))?;
    info!("解析结果: {}", object1.describe());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || {
                injector.resolve_by_name::<dyn ObjectIFace>("object1")
            })
        })
        .collect();

    for handle in handles {
        let shared = handle.await??;
        let same = shared.map(|o| Arc::ptr_eq(&o, &object1)).unwrap_or(false);
        info!("并发解析得到同一个单例: {}", same);
    }

    info!(stats = ?injector.stats(), "演示结束");
    Ok(())
}
