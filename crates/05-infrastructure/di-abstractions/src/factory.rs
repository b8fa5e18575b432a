//! 组件工厂描述
//!
//! 普通的 Rust 函数或闭包通过 [`Factory`] 转换为 [`RawFactory`]：
//! 一份包含输入/输出类型标记的签名，加上类型擦除后的调用函数。
//!
//! 支持的参数类型为 `Arc<C>`（从参数存储中按 `C` 查找），
//! 支持的返回值形态为 `Arc<dyn I>`、`Option<Arc<dyn I>>` 以及它们的 `Result<_, E>` 版本。

use crate::capability::{TypeKind, TypeToken};
use crate::injectable::Injectable;
use crate::instance::{ArgValue, Instance};
use infrastructure_common::{BoxError, DependencyError, DependencyResult};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的工厂调用函数
pub type SpawnFn = Arc<dyn Fn(Vec<ArgValue>) -> DependencyResult<Option<Instance>> + Send + Sync>;

/// 工厂签名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// 按参数顺序排列的输入类型
    pub inputs: Vec<TypeToken>,
    /// 返回值类型
    pub outputs: Vec<TypeToken>,
}

impl Signature {
    /// 创建新的签名
    pub fn new(inputs: Vec<TypeToken>, outputs: Vec<TypeToken>) -> Self {
        Self { inputs, outputs }
    }

    /// 是否声明了失败返回值
    pub fn returns_failure(&self) -> bool {
        self.outputs.len() == 2 && self.outputs[1].kind() == TypeKind::Failure
    }
}

/// 工厂注册描述
#[derive(Clone)]
pub struct RawFactory {
    name: String,
    signature: Signature,
    body: Option<SpawnFn>,
}

impl RawFactory {
    /// 使用手写的签名和调用函数创建描述
    pub fn new(name: impl Into<String>, signature: Signature, body: SpawnFn) -> Self {
        Self {
            name: name.into(),
            signature,
            body: Some(body),
        }
    }

    /// 只有签名、没有调用函数的描述
    pub fn opaque(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            body: None,
        }
    }

    /// 从函数或闭包创建描述
    pub fn from_factory<Args, F>(factory: F) -> Self
    where
        Args: 'static,
        F: Factory<Args>,
    {
        let signature = Signature::new(F::inputs(), <F::Output as FactoryOutput>::outputs());
        let body: SpawnFn =
            Arc::new(move |args: Vec<ArgValue>| factory.call(args)?.into_instance());

        Self {
            name: type_name::<F>().to_string(),
            signature,
            body: Some(body),
        }
    }

    /// 工厂名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 工厂签名
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// 调用函数
    pub fn body(&self) -> Option<&SpawnFn> {
        self.body.as_ref()
    }
}

impl fmt::Debug for RawFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFactory")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("body", &self.body.as_ref().map(|_| "<function>"))
            .finish()
    }
}

/// 工厂参数
pub trait FactoryArg: Sized + 'static {
    /// 参数类型标记
    fn token() -> TypeToken;

    /// 从参数存储的值还原
    fn from_arg(value: ArgValue) -> Option<Self>;
}

impl<C: Any + Send + Sync> FactoryArg for Arc<C> {
    fn token() -> TypeToken {
        TypeToken::concrete::<C>()
    }

    fn from_arg(value: ArgValue) -> Option<Self> {
        value.downcast::<C>().ok()
    }
}

/// 工厂返回值
pub trait FactoryOutput: 'static {
    /// 返回值类型标记
    fn outputs() -> Vec<TypeToken>;

    /// 转换为实例，`None` 表示没有产出实例
    fn into_instance(self) -> DependencyResult<Option<Instance>>;
}

impl<I: ?Sized + Injectable> FactoryOutput for Arc<I> {
    fn outputs() -> Vec<TypeToken> {
        vec![TypeToken::classify::<I>()]
    }

    fn into_instance(self) -> DependencyResult<Option<Instance>> {
        Ok(Some(Instance::new(self)))
    }
}

impl<I: ?Sized + Injectable> FactoryOutput for Option<Arc<I>> {
    fn outputs() -> Vec<TypeToken> {
        vec![TypeToken::classify::<I>()]
    }

    fn into_instance(self) -> DependencyResult<Option<Instance>> {
        Ok(self.map(Instance::new))
    }
}

impl<I, E> FactoryOutput for Result<Arc<I>, E>
where
    I: ?Sized + Injectable,
    E: Into<BoxError> + 'static,
{
    fn outputs() -> Vec<TypeToken> {
        vec![TypeToken::classify::<I>(), TypeToken::failure::<E>()]
    }

    fn into_instance(self) -> DependencyResult<Option<Instance>> {
        match self {
            Ok(value) => Ok(Some(Instance::new(value))),
            Err(e) => Err(DependencyError::creation_failed(type_name::<I>(), e)),
        }
    }
}

impl<I, E> FactoryOutput for Result<Option<Arc<I>>, E>
where
    I: ?Sized + Injectable,
    E: Into<BoxError> + 'static,
{
    fn outputs() -> Vec<TypeToken> {
        vec![TypeToken::classify::<I>(), TypeToken::failure::<E>()]
    }

    fn into_instance(self) -> DependencyResult<Option<Instance>> {
        match self {
            Ok(value) => Ok(value.map(Instance::new)),
            Err(e) => Err(DependencyError::creation_failed(type_name::<I>(), e)),
        }
    }
}

/// 组件工厂 trait
///
/// 为参数个数 0 到 8 的 `Fn` 自动实现，`Args` 为参数类型元组
pub trait Factory<Args>: Send + Sync + 'static {
    /// 返回值类型
    type Output: FactoryOutput;

    /// 按顺序排列的参数类型
    fn inputs() -> Vec<TypeToken>;

    /// 使用按顺序排列的参数值调用工厂
    fn call(&self, args: Vec<ArgValue>) -> DependencyResult<Self::Output>;
}

macro_rules! impl_factory {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> Factory<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: FactoryOutput,
            $($arg: FactoryArg,)*
        {
            type Output = Out;

            fn inputs() -> Vec<TypeToken> {
                vec![$($arg::token()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, args: Vec<ArgValue>) -> DependencyResult<Out> {
                let mut args = args.into_iter();
                $(
                    let $arg = args
                        .next()
                        .and_then($arg::from_arg)
                        .ok_or_else(|| DependencyError::MissingArgument {
                            type_name: $arg::token().name(),
                        })?;
                )*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(A1);
impl_factory!(A1, A2);
impl_factory!(A1, A2, A3);
impl_factory!(A1, A2, A3, A4);
impl_factory!(A1, A2, A3, A4, A5);
impl_factory!(A1, A2, A3, A4, A5, A6);
impl_factory!(A1, A2, A3, A4, A5, A6, A7);
impl_factory!(A1, A2, A3, A4, A5, A6, A7, A8);
