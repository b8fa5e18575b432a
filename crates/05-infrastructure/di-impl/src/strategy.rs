//! 生命周期策略
//!
//! 单例策略只调用一次工厂并缓存结果（包括失败和空结果），瞬态策略每次都调用工厂

use crate::spawner::Spawner;
use di_abstractions::{ArgSource, CapabilityType, Instance, Provider};
use infrastructure_common::{DependencyResult, Lifetime};
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

/// 单例提供者
///
/// 并发的首次调用者会阻塞在同一个 [`OnceCell`] 上，直到唯一的一次构造完成
#[derive(Debug)]
pub struct SingletonProvider {
    spawner: Spawner,
    cell: OnceCell<DependencyResult<Option<Instance>>>,
}

impl SingletonProvider {
    /// 包装调用器
    pub fn new(spawner: Spawner) -> Self {
        Self {
            spawner,
            cell: OnceCell::new(),
        }
    }

    /// 是否已经完成首次构造
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Provider for SingletonProvider {
    fn create(&self, args: &dyn ArgSource) -> DependencyResult<Option<Instance>> {
        if let Some(cached) = self.cell.get() {
            trace!(factory = %self.spawner.name(), "返回缓存的单例结果");
            return cached.clone();
        }

        self.cell
            .get_or_init(|| {
                debug!(factory = %self.spawner.name(), "首次构造单例");
                self.spawner.create(args)
            })
            .clone()
    }

    fn capability(&self) -> CapabilityType {
        self.spawner.capability()
    }
}

/// 瞬态提供者
#[derive(Debug)]
pub struct TransientProvider {
    spawner: Spawner,
}

impl TransientProvider {
    /// 包装调用器
    pub fn new(spawner: Spawner) -> Self {
        Self { spawner }
    }
}

impl Provider for TransientProvider {
    fn create(&self, args: &dyn ArgSource) -> DependencyResult<Option<Instance>> {
        self.spawner.create(args)
    }

    fn capability(&self) -> CapabilityType {
        self.spawner.capability()
    }
}

/// 按生命周期包装调用器
pub fn apply(lifetime: Lifetime, spawner: Spawner) -> Box<dyn Provider> {
    match lifetime {
        Lifetime::Singleton => Box::new(SingletonProvider::new(spawner)),
        Lifetime::Transient => Box::new(TransientProvider::new(spawner)),
    }
}
