//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`CapabilityType`] / [`TypeToken`] - 能力类型与工厂签名中的类型标记
//! - [`Instance`] - 类型擦除后的组件实例
//! - [`Injectable`] / [`Inject`] - 字段注入
//! - [`Factory`] / [`RawFactory`] - 组件工厂描述
//! - [`Provider`] / [`ArgSource`] - 实例提供者与构造参数来源
//! - [`DependencyResolver`] - 依赖解析器接口
//! - [`ComponentRegistry`] - 组件注册表接口

pub mod capability;
pub mod container;
pub mod factory;
pub mod injectable;
pub mod instance;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use capability::*;
pub use container::*;
pub use factory::*;
pub use injectable::*;
pub use instance::*;
pub use provider::*;
pub use registry::*;
pub use resolver::*;
