//! 组件注册表抽象接口

use crate::capability::CapabilityType;
use infrastructure_common::Lifetime;

/// 组件注册表 trait
pub trait ComponentRegistry: Send + Sync {
    /// 检查名称是否已注册
    fn is_registered(&self, name: &str) -> bool;

    /// 检查能力类型是否至少有一个注册
    fn is_registered_capability(&self, capability: CapabilityType) -> bool;

    /// 按注册顺序获取所有组件描述
    fn registered_units(&self) -> Vec<UnitDescriptor>;
}

/// 组件描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// 组件名称
    pub name: String,
    /// 产出的能力类型
    pub capability: CapabilityType,
    /// 生命周期
    pub lifetime: Lifetime,
}
