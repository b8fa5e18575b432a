//! 工厂调用器
//!
//! 注册时校验工厂签名，解析时按声明顺序查找构造参数并调用工厂

use di_abstractions::{
    ArgSource, ArgValue, CapabilityType, Factory, Instance, Provider, RawFactory, SpawnFn,
    TypeKind, TypeToken,
};
use infrastructure_common::{DependencyError, DependencyResult, ShapeViolation};
use std::fmt;
use tracing::trace;

/// 经过校验的工厂
#[derive(Clone)]
pub struct Spawner {
    name: String,
    inputs: Vec<TypeToken>,
    capability: CapabilityType,
    fallible: bool,
    body: SpawnFn,
}

impl Spawner {
    /// 校验工厂描述并创建调用器
    pub fn new(raw: RawFactory) -> DependencyResult<Self> {
        let capability = Self::validate(&raw)?;
        let body = raw.body().cloned().ok_or_else(|| {
            DependencyError::invalid_shape(raw.name(), ShapeViolation::NotCallable)
        })?;

        Ok(Self {
            name: raw.name().to_string(),
            inputs: raw.signature().inputs.clone(),
            capability,
            fallible: raw.signature().returns_failure(),
            body,
        })
    }

    /// 从函数或闭包创建调用器
    pub fn from_factory<Args, F>(factory: F) -> DependencyResult<Self>
    where
        Args: 'static,
        F: Factory<Args>,
    {
        Self::new(RawFactory::from_factory(factory))
    }

    /// 校验工厂签名，返回工厂产出的能力类型
    pub fn validate(raw: &RawFactory) -> DependencyResult<CapabilityType> {
        let shape_error = |violation| DependencyError::invalid_shape(raw.name(), violation);

        if raw.body().is_none() {
            return Err(shape_error(ShapeViolation::NotCallable));
        }

        let outputs = &raw.signature().outputs;
        if outputs.is_empty() || outputs.len() > 2 {
            return Err(shape_error(ShapeViolation::OutputCount {
                count: outputs.len(),
            }));
        }

        let capability = outputs[0].as_capability().ok_or_else(|| {
            shape_error(ShapeViolation::ConcreteOutput {
                type_name: outputs[0].name(),
            })
        })?;

        if let Some(second) = outputs.get(1) {
            if second.kind() != TypeKind::Failure {
                return Err(shape_error(ShapeViolation::NonFailureOutput {
                    type_name: second.name(),
                }));
            }
        }

        Ok(capability)
    }

    /// 工厂名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 按参数顺序排列的输入类型
    pub fn inputs(&self) -> &[TypeToken] {
        &self.inputs
    }

    /// 工厂是否可能返回失败
    pub fn returns_failure(&self) -> bool {
        self.fallible
    }
}

impl Provider for Spawner {
    fn create(&self, args: &dyn ArgSource) -> DependencyResult<Option<Instance>> {
        let values = self
            .inputs
            .iter()
            .map(|token| {
                args.lookup(token).ok_or(DependencyError::MissingArgument {
                    type_name: token.name(),
                })
            })
            .collect::<DependencyResult<Vec<ArgValue>>>()?;

        trace!(factory = %self.name, inputs = values.len(), "调用工厂");
        (self.body)(values)
    }

    fn capability(&self) -> CapabilityType {
        self.capability
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("capability", &self.capability)
            .field("fallible", &self.fallible)
            .finish()
    }
}
