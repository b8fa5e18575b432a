//! 错误类型定义

use std::sync::Arc;
use thiserror::Error;

/// 装箱的错误类型，工厂函数返回的失败统一转换为此类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 可共享的错误类型
///
/// 单例策略会把第一次构造的失败缓存下来并交给所有调用者，因此底层原因必须可以克隆
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// 工厂签名违规的具体原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("工厂必须是可调用的函数")]
    NotCallable,

    #[error("工厂必须返回 1 个或 2 个值, 实际返回 {count} 个")]
    OutputCount { count: usize },

    #[error("第 1 个返回值必须是能力接口 (dyn Trait), 实际为具体类型 {type_name}")]
    ConcreteOutput { type_name: &'static str },

    #[error("第 2 个返回值必须是错误类型, 实际为 {type_name}")]
    NonFailureOutput { type_name: &'static str },
}

/// 依赖注入错误类型
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    #[error("工厂签名无效: {factory}, 原因: {violation}")]
    InvalidFactoryShape {
        factory: String,
        violation: ShapeViolation,
    },

    #[error("未知的生命周期策略: {strategy}")]
    UnknownStrategy { strategy: String },

    #[error("组件名称已被注册: {name}")]
    DuplicateName { name: String },

    #[error("构造参数未设置: {type_name}")]
    MissingArgument { type_name: &'static str },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: &'static str,
        source: SharedError,
    },

    #[error("能力类型 {capability} 匹配到 {count} 个组件 {candidates:?}, 必须通过名称区分")]
    AmbiguousResolution {
        capability: &'static str,
        count: usize,
        candidates: Vec<String>,
    },

    #[error("循环依赖检测到: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("必需的依赖未找到: {capability} (名称: {name}, 字段: {field})")]
    MissingRequiredDependency {
        capability: &'static str,
        name: String,
        field: &'static str,
    },

    #[error("字段不可赋值: {field} ({capability})")]
    UnsettableField {
        field: &'static str,
        capability: &'static str,
    },

    #[error("解析深度超过上限 {limit}: {}", .path.join(" -> "))]
    ResolutionDepthExceeded { limit: usize, path: Vec<String> },
}

impl DependencyError {
    /// 创建工厂签名错误
    pub fn invalid_shape(factory: impl Into<String>, violation: ShapeViolation) -> Self {
        Self::InvalidFactoryShape {
            factory: factory.into(),
            violation,
        }
    }

    /// 包装工厂函数返回的失败
    pub fn creation_failed(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        Self::ComponentCreationFailed {
            type_name,
            source: Arc::from(source.into()),
        }
    }

    /// 循环依赖路径（仅对 [`DependencyError::CircularDependency`] 有值）
    pub fn cycle_path(&self) -> Option<&[String]> {
        match self {
            Self::CircularDependency { path } => Some(path),
            _ => None,
        }
    }

    /// 错误是否取决于当次解析路径（循环或深度超限），这类错误不能随组件缓存
    pub fn is_path_dependent(&self) -> bool {
        matches!(
            self,
            Self::CircularDependency { .. } | Self::ResolutionDepthExceeded { .. }
        )
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
