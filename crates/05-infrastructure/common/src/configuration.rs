//! 容器配置

use crate::errors::{ConfigError, ConfigResult};
use crate::lifecycle::Lifetime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 环境变量覆盖前缀，例如 `LORN_DI__MAX_RESOLUTION_DEPTH=32`
pub const ENV_PREFIX: &str = "LORN_DI";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 最大解析深度（解析路径上允许的组件数量）
    pub max_resolution_depth: usize,
    /// `register_default` 使用的生命周期
    pub default_lifetime: Lifetime,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 100,
            default_lifetime: Lifetime::Singleton,
        }
    }
}

impl ContainerConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从 YAML 文本解析
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 分层加载配置：可选的配置文件（按扩展名识别 toml/json/yaml），再叠加 `LORN_DI__*` 环境变量
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        config.validate()?;
        debug!(?config, "容器配置加载完成");
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置默认生命周期
    pub fn with_default_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.default_lifetime = lifetime;
        self
    }
}
