//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use crate::capability::CapabilityType;
use crate::instance::Instance;
use infrastructure_common::{DependencyError, DependencyResult};
use std::sync::Arc;

/// 依赖解析器 trait
///
/// `Ok(None)` 表示没有找到组件，这是正常结果而不是错误
pub trait DependencyResolver: Send + Sync {
    /// 按 (能力类型, 名称) 解析
    fn resolve_instance_by_name(
        &self,
        capability: CapabilityType,
        name: &str,
    ) -> DependencyResult<Option<Instance>>;

    /// 按能力类型解析，匹配到多个组件时返回歧义错误
    fn resolve_instance_by_type(
        &self,
        capability: CapabilityType,
    ) -> DependencyResult<Option<Instance>>;
}

/// 带类型的解析方法
pub trait DependencyResolverExt: DependencyResolver {
    /// 按能力类型解析，例如 `resolve::<dyn Storage>()`
    fn resolve<I: ?Sized + 'static>(&self) -> DependencyResult<Option<Arc<I>>> {
        Ok(self
            .resolve_instance_by_type(CapabilityType::of::<I>())?
            .and_then(|instance| instance.downcast::<I>()))
    }

    /// 按名称解析，例如 `resolve_by_name::<dyn Storage>("primary")`
    fn resolve_by_name<I: ?Sized + 'static>(&self, name: &str) -> DependencyResult<Option<Arc<I>>> {
        Ok(self
            .resolve_instance_by_name(CapabilityType::of::<I>(), name)?
            .and_then(|instance| instance.downcast::<I>()))
    }
}

impl<T: DependencyResolver + ?Sized> DependencyResolverExt for T {}

/// 解析上下文
///
/// 记录当前解析分支上正在构造的组件，每个分支持有自己的副本，兄弟分支互不可见
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    resolution_chain: Vec<String>,
    /// 解析选项
    options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 进入一个组件，返回包含该组件的新上下文
    ///
    /// 组件已经在解析链上时返回循环依赖错误，路径从第一次出现到重复出现
    pub fn enter(&self, name: &str) -> DependencyResult<Self> {
        if let Some(start) = self.resolution_chain.iter().position(|n| n == name) {
            let mut path = self.resolution_chain[start..].to_vec();
            path.push(name.to_string());
            return Err(DependencyError::CircularDependency { path });
        }

        if self.resolution_chain.len() >= self.options.max_depth {
            let mut path = self.resolution_chain.clone();
            path.push(name.to_string());
            return Err(DependencyError::ResolutionDepthExceeded {
                limit: self.options.max_depth,
                path,
            });
        }

        let mut next = self.clone();
        next.resolution_chain.push(name.to_string());
        Ok(next)
    }

    /// 当前解析链
    pub fn chain(&self) -> &[String] {
        &self.resolution_chain
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}
