//! 能力类型与类型标记
//!
//! 容器不做运行时反射，工厂的输入/输出类型在注册时被记录为 [`TypeToken`]，
//! 能力接口（`dyn Trait`）则用 [`CapabilityType`] 作为查找键。

use std::any::{type_name, TypeId};
use std::fmt;

/// 能力类型
///
/// 一个抽象接口（`dyn Trait`）的标识，作为工厂的产出类型和可注入字段的声明类型
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityType {
    id: TypeId,
    name: &'static str,
}

impl CapabilityType {
    /// 获取 `I` 的能力类型
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: type_name::<I>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityType({})", self.name)
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// 能力接口（trait object）
    Capability,
    /// 具体类型
    Concrete,
    /// 失败类型（工厂的第 2 个返回值）
    Failure,
}

/// 工厂签名中的类型标记
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeToken {
    /// 能力接口标记
    pub fn capability<I: ?Sized + 'static>() -> Self {
        Self::with_kind::<I>(TypeKind::Capability)
    }

    /// 具体类型标记
    pub fn concrete<T: ?Sized + 'static>() -> Self {
        Self::with_kind::<T>(TypeKind::Concrete)
    }

    /// 失败类型标记
    pub fn failure<E: ?Sized + 'static>() -> Self {
        Self::with_kind::<E>(TypeKind::Failure)
    }

    /// 按类型形态分类：trait object 记为能力接口，其余记为具体类型
    pub fn classify<T: ?Sized + 'static>() -> Self {
        if is_trait_object::<T>() {
            Self::capability::<T>()
        } else {
            Self::concrete::<T>()
        }
    }

    fn with_kind<T: ?Sized + 'static>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 类型分类
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// 转换为能力类型（仅能力接口标记有值）
    pub fn as_capability(&self) -> Option<CapabilityType> {
        match self.kind {
            TypeKind::Capability => Some(CapabilityType {
                id: self.id,
                name: self.name,
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.name)
    }
}

/// 判断 `T` 是否为 trait object
///
/// trait object 的指针带有 vtable 元数据，且类型名以 `dyn ` 开头；切片和 `str` 不算
pub fn is_trait_object<T: ?Sized + 'static>() -> bool {
    std::mem::size_of::<*const T>() == 2 * std::mem::size_of::<usize>()
        && type_name::<T>().starts_with("dyn ")
}
