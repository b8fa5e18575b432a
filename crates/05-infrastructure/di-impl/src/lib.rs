//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器、组件注册表和解析器实现
//!
//! ```ignore
//! use di_abstractions::DependencyResolverExt;
//! use di_impl::Injector;
//! use infrastructure_common::Lifetime;
//!
//! let injector = Injector::new();
//! injector.set_arg(Config { url: "pg://".into() });
//! injector.register(Lifetime::Singleton, new_storage, "storage")?;
//! let storage = injector.resolve::<dyn Storage>()?;
//! ```

pub mod args;
pub mod injector;
pub mod registry;
pub mod resolver;
pub mod spawner;
pub mod strategy;

pub use args::ArgStore;
pub use injector::Injector;
pub use registry::{Registry, Unit};
pub use resolver::Resolver;
pub use spawner::Spawner;
pub use strategy::{SingletonProvider, TransientProvider};
