//! 依赖解析器
//!
//! 通过组件的提供者取得实例，再遍历实例上的注入点递归解析并写入依赖。
//! 循环检测使用随递归传递的 [`ResolveContext`]，不依赖任何共享的可变状态。

use crate::args::ArgStore;
use crate::registry::{Registry, Unit};
use di_abstractions::{CapabilityType, InjectTarget, Instance, InjectionPoint, ResolveContext};
use infrastructure_common::{DependencyError, DependencyResult, Lifetime};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 解析器
///
/// 只在查找组件时短暂持有注册表的读锁，构造期间不持有任何锁
pub struct Resolver<'a> {
    registry: &'a RwLock<Registry>,
    args: &'a ArgStore,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a RwLock<Registry>, args: &'a ArgStore) -> Self {
        Self { registry, args }
    }

    /// 按 (能力类型, 名称) 解析，找不到时返回 `Ok(None)`
    pub fn resolve_by_name(
        &self,
        capability: CapabilityType,
        name: &str,
        ctx: &ResolveContext,
    ) -> DependencyResult<Option<Instance>> {
        let unit = self.registry.read().find(capability, name);
        match unit {
            Some(unit) => self.build(&unit, ctx),
            None => {
                trace!(capability = %capability, name, "未找到组件");
                Ok(None)
            }
        }
    }

    /// 按能力类型解析，找不到时返回 `Ok(None)`，匹配到多个组件时返回歧义错误
    pub fn resolve_by_type(
        &self,
        capability: CapabilityType,
        ctx: &ResolveContext,
    ) -> DependencyResult<Option<Instance>> {
        let unit = self.unique_candidate(capability)?;
        match unit {
            Some(unit) => self.build(&unit, ctx),
            None => {
                trace!(capability = %capability, "未找到组件");
                Ok(None)
            }
        }
    }

    fn unique_candidate(
        &self,
        capability: CapabilityType,
    ) -> DependencyResult<Option<Arc<Unit>>> {
        let registry = self.registry.read();
        match registry.candidates(capability) {
            [] => Ok(None),
            [unit] => Ok(Some(unit.clone())),
            units => Err(DependencyError::AmbiguousResolution {
                capability: capability.name(),
                count: units.len(),
                candidates: units.iter().map(|u| u.name().to_string()).collect(),
            }),
        }
    }

    /// 构造组件并完成字段注入
    ///
    /// 单例只注入一次，之后的解析直接返回已注入的缓存实例
    fn build(&self, unit: &Unit, ctx: &ResolveContext) -> DependencyResult<Option<Instance>> {
        let ctx = ctx.enter(unit.name())?;
        debug!(unit = %unit.name(), depth = ctx.depth(), "解析组件");

        let Some(instance) = unit.provider().create(self.args)? else {
            debug!(unit = %unit.name(), "工厂没有产出实例");
            return Ok(None);
        };

        match unit.lifetime() {
            Lifetime::Singleton => self.wire_once(unit, &instance, &ctx)?,
            Lifetime::Transient => self.inject_fields(unit, &instance, &ctx)?,
        }
        Ok(Some(instance))
    }

    fn inject_fields(
        &self,
        unit: &Unit,
        instance: &Instance,
        ctx: &ResolveContext,
    ) -> DependencyResult<()> {
        let points = instance.injection_points();
        let dependencies = self.resolve_points(unit, &points, ctx)?;
        assign_points(unit, &points, dependencies)
    }

    /// 单例的一次性注入
    ///
    /// 依赖在守卫之外解析，守卫内只写入字段，单例之间不会互相等待。
    /// 循环和深度超限取决于当次解析路径，不缓存
    fn wire_once(
        &self,
        unit: &Unit,
        instance: &Instance,
        ctx: &ResolveContext,
    ) -> DependencyResult<()> {
        if let Some(wired) = unit.wiring().get() {
            trace!(unit = %unit.name(), "单例已完成注入");
            return wired.clone();
        }

        let points = instance.injection_points();
        let resolved = self.resolve_points(unit, &points, ctx);
        unit.wiring()
            .get_or_try_init(|| match resolved {
                Ok(dependencies) => Ok(assign_points(unit, &points, dependencies)),
                Err(err) if err.is_path_dependent() => Err(err),
                Err(err) => Ok(Err(err)),
            })?
            .clone()
    }

    fn resolve_points(
        &self,
        unit: &Unit,
        points: &[InjectionPoint<'_>],
        ctx: &ResolveContext,
    ) -> DependencyResult<Vec<Option<Instance>>> {
        points
            .iter()
            .map(|point| self.resolve_point(unit, point, ctx))
            .collect()
    }

    fn resolve_point(
        &self,
        unit: &Unit,
        point: &InjectionPoint<'_>,
        ctx: &ResolveContext,
    ) -> DependencyResult<Option<Instance>> {
        let directive = point.directive();
        let dependency = match directive.target() {
            InjectTarget::ByType => self.resolve_by_type(point.capability(), ctx)?,
            InjectTarget::ByName(name) => self.resolve_by_name(point.capability(), name, ctx)?,
        };

        if dependency.is_none() {
            if directive.is_required() {
                warn!(
                    unit = %unit.name(),
                    field = point.field(),
                    dependency = directive.name(),
                    "必需的依赖未找到"
                );
                return Err(DependencyError::MissingRequiredDependency {
                    capability: point.capability().name(),
                    name: directive.name().to_string(),
                    field: point.field(),
                });
            }
            debug!(
                unit = %unit.name(),
                field = point.field(),
                dependency = directive.name(),
                "跳过可选依赖"
            );
        }
        Ok(dependency)
    }
}

/// 写入解析到的依赖，存在不可写的注入点时一个字段都不写
fn assign_points(
    unit: &Unit,
    points: &[InjectionPoint<'_>],
    dependencies: Vec<Option<Instance>>,
) -> DependencyResult<()> {
    let resolved: Vec<_> = points
        .iter()
        .zip(dependencies)
        .filter_map(|(point, dependency)| dependency.map(|dependency| (point, dependency)))
        .collect();

    if let Some((point, dependency)) = resolved.iter().find(|(point, _)| !point.is_settable()) {
        return point.assign(dependency);
    }

    for (point, dependency) in &resolved {
        point.assign(dependency)?;
        trace!(unit = %unit.name(), field = point.field(), "注入依赖");
    }
    Ok(())
}
