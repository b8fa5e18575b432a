//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn DI 容器各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 注册与解析过程中的全部错误
//! - [`Lifetime`] - 组件生命周期策略（单例 / 瞬时）
//! - [`ContainerConfig`] - 容器配置及其加载

pub mod configuration;
pub mod errors;
pub mod lifecycle;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
