//! 实例提供者抽象接口

use crate::capability::{CapabilityType, TypeToken};
use crate::instance::{ArgValue, Instance};
use infrastructure_common::DependencyResult;

/// 构造参数来源
///
/// 按参数的精确类型查找外部提供的值
pub trait ArgSource {
    /// 查找参数值
    fn lookup(&self, token: &TypeToken) -> Option<ArgValue>;
}

impl<F> ArgSource for F
where
    F: Fn(&TypeToken) -> Option<ArgValue>,
{
    fn lookup(&self, token: &TypeToken) -> Option<ArgValue> {
        self(token)
    }
}

/// 实例提供者 trait
///
/// 工厂本身以及包装它的生命周期策略都实现此 trait
pub trait Provider: Send + Sync {
    /// 创建（或返回缓存的）实例，`Ok(None)` 表示工厂没有产出实例
    fn create(&self, args: &dyn ArgSource) -> DependencyResult<Option<Instance>>;

    /// 产出的能力类型
    fn capability(&self) -> CapabilityType;
}
