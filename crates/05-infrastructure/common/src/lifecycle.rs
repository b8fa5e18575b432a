//! 组件生命周期策略

use crate::errors::DependencyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// 单例模式 - 第一次解析时创建，之后一直复用同一个结果
    Singleton,
    /// 瞬时模式 - 每次解析都创建新实例
    #[serde(alias = "factory")]
    Transient,
}

impl Lifetime {
    /// 策略标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Transient => "transient",
        }
    }

    /// 是否缓存构造结果
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Singleton
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifetime {
    type Err = DependencyError;

    /// 解析策略标识符，`factory` 是 `transient` 的旧名称
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "transient" | "factory" => Ok(Self::Transient),
            _ => Err(DependencyError::UnknownStrategy {
                strategy: s.to_string(),
            }),
        }
    }
}
