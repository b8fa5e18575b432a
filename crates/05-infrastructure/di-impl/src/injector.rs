//! 依赖注入容器
//!
//! 对外的统一入口：注册工厂、提供构造参数、按名称或能力类型解析组件

use crate::args::ArgStore;
use crate::registry::{Registry, Unit};
use crate::resolver::Resolver;
use crate::spawner::Spawner;
use crate::strategy;
use di_abstractions::{
    Arg, CapabilityType, ComponentRegistry, ContainerStats, DependencyResolver, Factory, Instance,
    Provider, RawFactory, ResolveContext, ResolveOptions, UnitDescriptor,
};
use infrastructure_common::{ContainerConfig, DependencyResult, Lifetime};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 依赖注入容器
///
/// 注册应在启动阶段完成，之后可以在多个线程中并发解析
#[derive(Debug)]
pub struct Injector {
    registry: RwLock<Registry>,
    args: ArgStore,
    config: ContainerConfig,
    resolutions: AtomicU64,
    resolution_errors: AtomicU64,
}

impl Injector {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            args: ArgStore::new(),
            config,
            resolutions: AtomicU64::new(0),
            resolution_errors: AtomicU64::new(0),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册工厂
    ///
    /// ```ignore
    /// injector.register(Lifetime::Singleton, new_storage, "storage")?;
    /// ```
    pub fn register<Args, F>(
        &self,
        lifetime: Lifetime,
        factory: F,
        name: &str,
    ) -> DependencyResult<()>
    where
        Args: 'static,
        F: Factory<Args>,
    {
        self.register_raw(lifetime, RawFactory::from_factory(factory), name)
    }

    /// 使用字符串形式的生命周期注册工厂（`singleton`、`transient` 或 `factory`）
    ///
    /// 无法识别的生命周期在校验工厂之前失败
    pub fn register_with_strategy<Args, F>(
        &self,
        strategy: &str,
        factory: F,
        name: &str,
    ) -> DependencyResult<()>
    where
        Args: 'static,
        F: Factory<Args>,
    {
        let lifetime: Lifetime = strategy.parse()?;
        self.register(lifetime, factory, name)
    }

    /// 使用配置中的默认生命周期注册工厂
    pub fn register_default<Args, F>(&self, factory: F, name: &str) -> DependencyResult<()>
    where
        Args: 'static,
        F: Factory<Args>,
    {
        self.register(self.config.default_lifetime, factory, name)
    }

    /// 注册手写的工厂描述
    pub fn register_raw(
        &self,
        lifetime: Lifetime,
        raw: RawFactory,
        name: &str,
    ) -> DependencyResult<()> {
        let spawner = Spawner::new(raw).map_err(|e| {
            warn!(unit = name, error = %e, "工厂签名无效");
            e
        })?;
        let capability = spawner.capability();
        let unit = Unit::new(name, lifetime, strategy::apply(lifetime, spawner));

        self.registry.write().register(unit).map_err(|e| {
            warn!(unit = name, error = %e, "组件注册失败");
            e
        })?;

        info!(unit = name, capability = %capability, lifetime = %lifetime, "注册组件");
        Ok(())
    }

    /// 设置构造参数，覆盖同类型的旧值
    pub fn set_arg<C: Any + Send + Sync>(&self, value: C) {
        self.args.set_arg(value);
    }

    /// 设置已共享的构造参数
    pub fn set_shared_arg<C: Any + Send + Sync>(&self, value: Arc<C>) {
        self.args.set_shared_arg(value);
    }

    /// 批量设置构造参数
    pub fn set_args(&self, args: impl IntoIterator<Item = Arg>) {
        self.args.set_args(args);
    }

    /// 构造参数存储
    pub fn args(&self) -> &ArgStore {
        &self.args
    }

    /// 已注册的组件数量
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// 统计信息快照
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_units: self.len(),
            arguments: self.args.len(),
            resolutions: self.resolutions.load(Ordering::Relaxed),
            resolution_errors: self.resolution_errors.load(Ordering::Relaxed),
        }
    }

    fn root_context(&self) -> ResolveContext {
        ResolveContext::new(ResolveOptions {
            max_depth: self.config.max_resolution_depth,
        })
    }

    fn track(
        &self,
        result: DependencyResult<Option<Instance>>,
    ) -> DependencyResult<Option<Instance>> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = &result {
            self.resolution_errors.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "组件解析失败");
        }
        result
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyResolver for Injector {
    fn resolve_instance_by_name(
        &self,
        capability: CapabilityType,
        name: &str,
    ) -> DependencyResult<Option<Instance>> {
        let resolver = Resolver::new(&self.registry, &self.args);
        self.track(resolver.resolve_by_name(capability, name, &self.root_context()))
    }

    fn resolve_instance_by_type(
        &self,
        capability: CapabilityType,
    ) -> DependencyResult<Option<Instance>> {
        let resolver = Resolver::new(&self.registry, &self.args);
        self.track(resolver.resolve_by_type(capability, &self.root_context()))
    }
}

impl ComponentRegistry for Injector {
    fn is_registered(&self, name: &str) -> bool {
        self.registry.read().contains(name)
    }

    fn is_registered_capability(&self, capability: CapabilityType) -> bool {
        !self.registry.read().candidates(capability).is_empty()
    }

    fn registered_units(&self) -> Vec<UnitDescriptor> {
        self.registry.read().units().map(|unit| unit.descriptor()).collect()
    }
}
