//! 构造参数存储
//!
//! 按值的具体类型索引外部提供的配置对象，查找只做精确类型匹配

use dashmap::DashMap;
use di_abstractions::{Arg, ArgSource, ArgValue, TypeToken};
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// 构造参数存储
#[derive(Debug, Default)]
pub struct ArgStore {
    values: DashMap<TypeId, ArgValue>,
}

impl ArgStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置参数，覆盖同类型的旧值
    pub fn set_arg<C: Any + Send + Sync>(&self, value: C) {
        self.set(Arg::new(value));
    }

    /// 设置已共享的参数
    pub fn set_shared_arg<C: Any + Send + Sync>(&self, value: Arc<C>) {
        self.set(Arg::shared(value));
    }

    /// 批量设置参数
    pub fn set_args(&self, args: impl IntoIterator<Item = Arg>) {
        for arg in args {
            self.set(arg);
        }
    }

    fn set(&self, arg: Arg) {
        let (token, value) = arg.into_parts();
        if self.values.insert(token.id(), value).is_some() {
            debug!(argument = token.name(), "覆盖构造参数");
        } else {
            debug!(argument = token.name(), "设置构造参数");
        }
    }

    /// 获取参数
    pub fn get<C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        self.values
            .get(&TypeId::of::<C>())
            .and_then(|value| value.value().clone().downcast::<C>().ok())
    }

    pub fn contains(&self, token: &TypeToken) -> bool {
        self.values.contains_key(&token.id())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ArgSource for ArgStore {
    fn lookup(&self, token: &TypeToken) -> Option<ArgValue> {
        self.values.get(&token.id()).map(|value| value.value().clone())
    }
}
