//! 组件注册表
//!
//! 同时按名称和能力类型索引组件，名称全局唯一

use di_abstractions::{CapabilityType, Provider, UnitDescriptor};
use infrastructure_common::{DependencyError, DependencyResult, Lifetime};
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 已注册的组件
pub struct Unit {
    name: String,
    capability: CapabilityType,
    lifetime: Lifetime,
    provider: Box<dyn Provider>,
    /// 单例的字段注入结果，注入只发生一次
    wiring: OnceCell<DependencyResult<()>>,
}

impl Unit {
    /// 创建组件，能力类型取自提供者
    pub fn new(name: impl Into<String>, lifetime: Lifetime, provider: Box<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            capability: provider.capability(),
            lifetime,
            provider,
            wiring: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> CapabilityType {
        self.capability
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub(crate) fn wiring(&self) -> &OnceCell<DependencyResult<()>> {
        &self.wiring
    }

    /// 组件描述
    pub fn descriptor(&self) -> UnitDescriptor {
        UnitDescriptor {
            name: self.name.clone(),
            capability: self.capability,
            lifetime: self.lifetime,
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("lifetime", &self.lifetime)
            .field("wired", &self.wiring.get().is_some())
            .finish()
    }
}

/// 组件注册表
#[derive(Debug, Default)]
pub struct Registry {
    by_name: HashMap<String, Arc<Unit>>,
    by_capability: HashMap<TypeId, Vec<Arc<Unit>>>,
    order: Vec<Arc<Unit>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件，名称已存在时失败
    pub fn register(&mut self, unit: Unit) -> DependencyResult<Arc<Unit>> {
        if self.by_name.contains_key(unit.name()) {
            return Err(DependencyError::DuplicateName {
                name: unit.name().to_string(),
            });
        }

        let unit = Arc::new(unit);
        self.by_name.insert(unit.name().to_string(), unit.clone());
        self.by_capability
            .entry(unit.capability().id())
            .or_default()
            .push(unit.clone());
        self.order.push(unit.clone());
        Ok(unit)
    }

    /// 按 (能力类型, 名称) 查找
    pub fn find(&self, capability: CapabilityType, name: &str) -> Option<Arc<Unit>> {
        self.candidates(capability)
            .iter()
            .find(|unit| unit.name() == name)
            .cloned()
    }

    /// 能力类型下的所有组件，按注册顺序排列
    pub fn candidates(&self, capability: CapabilityType) -> &[Arc<Unit>] {
        self.by_capability
            .get(&capability.id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<Arc<Unit>> {
        self.by_name.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// 按注册顺序遍历
    pub fn units(&self) -> impl Iterator<Item = &Arc<Unit>> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
