//! 字段注入
//!
//! 组件通过 [`Injectable`] 声明自己的注入点，通常由 `#[derive(Injectable)]` 生成。
//! 注入指令的语法为逗号分隔的列表：第一项是 `default`（按字段声明的能力类型解析）
//! 或一个注册名称（按名称解析），之后出现 `require` 表示该依赖必需。

use crate::capability::CapabilityType;
use crate::instance::Instance;
use infrastructure_common::{DependencyError, DependencyResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 按类型解析的指令标记
pub const DEFAULT_TARGET: &str = "default";

/// 必需依赖的指令标记
pub const REQUIRE_FLAG: &str = "require";

/// 可注入组件 trait
///
/// 能力接口应以此 trait 为父 trait（`trait Storage: Injectable {}`），
/// 解析器才能在 `dyn Storage` 上遍历注入点
pub trait Injectable: Send + Sync + 'static {
    /// 组件的注入点，没有注入字段的组件返回空列表
    fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        Vec::new()
    }
}

/// 注入目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectTarget {
    /// 按字段的能力类型解析
    ByType,
    /// 按 (能力类型, 名称) 解析
    ByName(String),
}

/// 注入指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectDirective {
    target: InjectTarget,
    required: bool,
}

impl InjectDirective {
    /// 解析指令文本，例如 `"default"`、`"storage,require"`
    ///
    /// 空的第一项等同于 `default`，无法识别的修饰项被忽略
    pub fn parse(tag: &str) -> Self {
        let mut tokens = tag.split(',').map(str::trim);

        let target = match tokens.next() {
            None | Some("") | Some(DEFAULT_TARGET) => InjectTarget::ByType,
            Some(name) => InjectTarget::ByName(name.to_string()),
        };

        let mut required = false;
        for token in tokens {
            if token == REQUIRE_FLAG {
                required = true;
            } else if !token.is_empty() {
                tracing::trace!(token, tag, "忽略无法识别的注入修饰项");
            }
        }

        Self { target, required }
    }

    /// 按类型解析的可选依赖
    pub fn by_type() -> Self {
        Self {
            target: InjectTarget::ByType,
            required: false,
        }
    }

    /// 按名称解析的可选依赖
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            target: InjectTarget::ByName(name.into()),
            required: false,
        }
    }

    /// 标记为必需依赖
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 注入目标
    pub fn target(&self) -> &InjectTarget {
        &self.target
    }

    /// 依赖名称，按类型解析时为 `default`
    pub fn name(&self) -> &str {
        match &self.target {
            InjectTarget::ByType => DEFAULT_TARGET,
            InjectTarget::ByName(name) => name,
        }
    }

    /// 是否必需
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl Default for InjectDirective {
    fn default() -> Self {
        Self::by_type()
    }
}

impl From<&str> for InjectDirective {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

/// 可赋值的注入槽
pub trait InjectSlot: Send + Sync {
    /// 写入解析出的实例，类型不匹配时返回 `false`
    fn assign(&self, value: &Instance) -> bool;
}

/// 注入字段
///
/// 组件构造时为空，解析器完成字段注入后可以通过 [`Inject::get`] 取得依赖
pub struct Inject<I: ?Sized> {
    value: RwLock<Option<Arc<I>>>,
}

impl<I: ?Sized + Send + Sync + 'static> Inject<I> {
    /// 创建空的注入字段
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<Arc<I>> {
        self.value.read().clone()
    }

    /// 是否已注入
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// 手动设置依赖
    pub fn set(&self, value: Arc<I>) {
        *self.value.write() = Some(value);
    }
}

impl<I: ?Sized + Send + Sync + 'static> Default for Inject<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized> fmt::Debug for Inject<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<I>())
            .field("set", &self.value.read().is_some())
            .finish()
    }
}

impl<I: ?Sized + Send + Sync + 'static> InjectSlot for Inject<I> {
    fn assign(&self, value: &Instance) -> bool {
        match value.downcast::<I>() {
            Some(dependency) => {
                self.set(dependency);
                true
            }
            None => false,
        }
    }
}

/// 注入点
///
/// 描述组件上的一个带注入指令的字段
pub struct InjectionPoint<'a> {
    field: &'static str,
    capability: CapabilityType,
    directive: InjectDirective,
    slot: Option<&'a dyn InjectSlot>,
}

impl<'a> InjectionPoint<'a> {
    /// 可赋值的注入点
    pub fn settable<I: ?Sized + Send + Sync + 'static>(
        field: &'static str,
        directive: InjectDirective,
        slot: &'a Inject<I>,
    ) -> Self {
        Self {
            field,
            capability: CapabilityType::of::<I>(),
            directive,
            slot: Some(slot),
        }
    }

    /// 不可赋值的注入点（注入指令标在了普通字段上）
    pub fn unsettable(
        field: &'static str,
        capability: CapabilityType,
        directive: InjectDirective,
    ) -> Self {
        Self {
            field,
            capability,
            directive,
            slot: None,
        }
    }

    /// 字段名
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// 字段声明的能力类型
    pub fn capability(&self) -> CapabilityType {
        self.capability
    }

    /// 注入指令
    pub fn directive(&self) -> &InjectDirective {
        &self.directive
    }

    /// 字段是否可赋值
    pub fn is_settable(&self) -> bool {
        self.slot.is_some()
    }

    /// 把解析出的依赖写入字段
    pub fn assign(&self, value: &Instance) -> DependencyResult<()> {
        match self.slot {
            Some(slot) if slot.assign(value) => Ok(()),
            _ => Err(DependencyError::UnsettableField {
                field: self.field,
                capability: self.capability.name(),
            }),
        }
    }
}

impl fmt::Debug for InjectionPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("field", &self.field)
            .field("capability", &self.capability)
            .field("directive", &self.directive)
            .field("settable", &self.is_settable())
            .finish()
    }
}
