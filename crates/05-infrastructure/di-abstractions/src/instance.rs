//! 类型擦除后的组件实例与构造参数

use crate::capability::{CapabilityType, TypeToken};
use crate::injectable::{Injectable, InjectionPoint};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 构造参数值（内部保存 `C` 本身，按 `C` 的具体类型索引）
pub type ArgValue = Arc<dyn Any + Send + Sync>;

type PointsFn = for<'a> fn(&'a (dyn Any + Send + Sync + 'static)) -> Vec<InjectionPoint<'a>>;

/// 组件实例
///
/// 保存工厂产出的 `Arc<I>`（`I` 为能力接口），克隆只增加引用计数
#[derive(Clone)]
pub struct Instance {
    capability: CapabilityType,
    value: Arc<dyn Any + Send + Sync>,
    points: PointsFn,
}

impl Instance {
    /// 包装工厂产出的实例
    pub fn new<I: ?Sized + Injectable>(value: Arc<I>) -> Self {
        Self {
            capability: CapabilityType::of::<I>(),
            value: Arc::new(value),
            points: injection_points_of::<I>,
        }
    }

    /// 实例的能力类型
    pub fn capability(&self) -> CapabilityType {
        self.capability
    }

    /// 还原为 `Arc<I>`，类型不匹配时返回 `None`
    pub fn downcast<I: ?Sized + 'static>(&self) -> Option<Arc<I>> {
        self.value.downcast_ref::<Arc<I>>().cloned()
    }

    /// 实例上声明的注入点
    pub fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        (self.points)(self.value.as_ref())
    }

    /// 是否为同一个实例（同一次构造的结果）
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("capability", &self.capability)
            .field("value", &"<erased>")
            .finish()
    }
}

fn injection_points_of<'a, I: ?Sized + Injectable>(
    value: &'a (dyn Any + Send + Sync + 'static),
) -> Vec<InjectionPoint<'a>> {
    value
        .downcast_ref::<Arc<I>>()
        .map(|instance| instance.injection_points())
        .unwrap_or_default()
}

/// 外部提供的构造参数
#[derive(Clone)]
pub struct Arg {
    token: TypeToken,
    value: ArgValue,
}

impl Arg {
    /// 以值的具体类型创建参数
    pub fn new<C: Any + Send + Sync>(value: C) -> Self {
        Self::shared(Arc::new(value))
    }

    /// 使用已共享的值创建参数
    pub fn shared<C: Any + Send + Sync>(value: Arc<C>) -> Self {
        Self {
            token: TypeToken::concrete::<C>(),
            value,
        }
    }

    /// 参数类型标记
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// 拆分为类型标记和值
    pub fn into_parts(self) -> (TypeToken, ArgValue) {
        (self.token, self.value)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg").field("token", &self.token).finish()
    }
}
