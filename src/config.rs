use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::flow::StaticControlApiUrl;
use crate::logging::Rotation;
use crate::selector::strategy::ROUND_ROBIN;
use crate::selector::{DataPlaneInstance, DataPlaneSelector, strategy_from_name};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub control: ControlConfig,
    /// Data planes known at startup; more may join at runtime
    #[serde(default)]
    pub data_planes: Vec<DataPlaneInstance>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControlConfig {
    /// Externally reachable control endpoint that data planes call back
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub require_callback: bool,
    #[serde(default = "default_selection_strategy")]
    pub selection_strategy: String,
    #[serde(default = "default_client_timeout_ms")]
    pub client_timeout_ms: u64,
}

fn default_selection_strategy() -> String {
    ROUND_ROBIN.to_string()
}

fn default_client_timeout_ms() -> u64 {
    30_000
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            callback_url: None,
            require_callback: false,
            selection_strategy: default_selection_strategy(),
            client_timeout_ms: default_client_timeout_ms(),
        }
    }
}

impl ControlConfig {
    pub fn callback_url(&self) -> Result<Option<Url>, ConfigError> {
        self.callback_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| ConfigError::Invalid(format!("callback_url `{}`: {}", raw, e)))
            })
            .transpose()
    }

    pub fn control_api_url(&self) -> Result<StaticControlApiUrl, ConfigError> {
        Ok(StaticControlApiUrl::new(self.callback_url()?))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(&format!("config/{}.yaml", env))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rotation.parse::<Rotation>()?;
        self.control.callback_url()?;
        strategy_from_name(&self.control.selection_strategy)?;
        if self.control.client_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "client_timeout_ms must be > 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for instance in &self.data_planes {
            if instance.id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "data plane at {} has an empty id",
                    instance.url
                )));
            }
            if !seen.insert(instance.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate data plane id `{}`",
                    instance.id
                )));
            }
        }
        Ok(())
    }

    /// Selector seeded with the configured data planes
    pub fn build_selector(&self) -> Result<Arc<DataPlaneSelector>, ConfigError> {
        let strategy = strategy_from_name(&self.control.selection_strategy)?;
        Ok(Arc::new(DataPlaneSelector::with_instances(
            strategy,
            self.data_planes.iter().cloned(),
        )))
    }
}
