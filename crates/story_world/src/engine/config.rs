//! Model configurations and the registry that resolves them per call.
//!
//! The registry is an explicit value owned by the engine. Administration
//! (create/activate/delete) lives outside the core; callers push the current
//! set in via `reload` and the engine only ever reads it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

pub const ENV_LLM_MODEL: &str = "STORY_WORLD_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "STORY_WORLD_LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "STORY_WORLD_LLM_API_KEY";
pub const ENV_LLM_TEMPERATURE: &str = "STORY_WORLD_LLM_TEMPERATURE";
pub const ENV_LLM_MAX_TOKENS: &str = "STORY_WORLD_LLM_MAX_TOKENS";

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub is_active: bool,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// The hardcoded safe default used when no config is registered. The empty
/// credential makes any real call fail, which lands every operation on its
/// deterministic default content.
pub fn default_model_config() -> ModelConfig {
    ModelConfig {
        id: 0,
        name: "default".to_string(),
        api_key: String::new(),
        base_url: DEFAULT_BASE_URL.to_string(),
        model: DEFAULT_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: Some(DEFAULT_MAX_TOKENS),
        is_active: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelConfigError {
    MissingEnv { key: &'static str },
    EmptyEnv { key: &'static str },
    InvalidNumber { key: &'static str, value: String },
    ReadConfigFile { path: String, message: String },
    ParseConfigFile { path: String, message: String },
}

impl fmt::Display for ModelConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelConfigError::MissingEnv { key } => write!(f, "missing env variable: {key}"),
            ModelConfigError::EmptyEnv { key } => write!(f, "empty env variable: {key}"),
            ModelConfigError::InvalidNumber { key, value } => {
                write!(f, "invalid numeric value for {key}: {value}")
            }
            ModelConfigError::ReadConfigFile { path, message } => {
                write!(f, "read config file failed ({path}): {message}")
            }
            ModelConfigError::ParseConfigFile { path, message } => {
                write!(f, "parse config file failed ({path}): {message}")
            }
        }
    }
}

impl Error for ModelConfigError {}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    models: Vec<ModelConfig>,
}

/// Registered model configurations, resolved per generation call.
#[derive(Debug, Clone, Default)]
pub struct ModelConfigRegistry {
    configs: Vec<ModelConfig>,
}

impl ModelConfigRegistry {
    pub fn new(configs: Vec<ModelConfig>) -> Self {
        Self { configs }
    }

    /// A `[[models]]` TOML table array, e.g. the admin panel's export.
    pub fn from_config_file(path: &Path) -> Result<Self, ModelConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ModelConfigError::ReadConfigFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            ModelConfigError::ParseConfigFile { message, .. } => {
                ModelConfigError::ParseConfigFile {
                    path: path.display().to_string(),
                    message,
                }
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ModelConfigError> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|err| ModelConfigError::ParseConfigFile {
                path: "<inline>".to_string(),
                message: err.to_string(),
            })?;
        Ok(Self::new(file.models))
    }

    /// One active config from process env.
    pub fn from_env() -> Result<Self, ModelConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with<F>(mut getter: F) -> Result<Self, ModelConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let model = required_env(&mut getter, ENV_LLM_MODEL)?;
        let base_url = required_env(&mut getter, ENV_LLM_BASE_URL)?;
        let api_key = required_env(&mut getter, ENV_LLM_API_KEY)?;
        let temperature = match getter(ENV_LLM_TEMPERATURE) {
            Some(value) => {
                value
                    .parse::<f64>()
                    .map_err(|_| ModelConfigError::InvalidNumber {
                        key: ENV_LLM_TEMPERATURE,
                        value,
                    })?
            }
            None => DEFAULT_TEMPERATURE,
        };
        let max_tokens = match getter(ENV_LLM_MAX_TOKENS) {
            Some(value) => {
                Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| ModelConfigError::InvalidNumber {
                            key: ENV_LLM_MAX_TOKENS,
                            value,
                        })?,
                )
            }
            None => Some(DEFAULT_MAX_TOKENS),
        };

        Ok(Self::new(vec![ModelConfig {
            id: 1,
            name: "env".to_string(),
            api_key,
            base_url,
            model,
            temperature,
            max_tokens,
            is_active: true,
        }]))
    }

    /// Replace the registered set wholesale.
    pub fn reload(&mut self, configs: Vec<ModelConfig>) {
        self.configs = configs;
    }

    pub fn configs(&self) -> &[ModelConfig] {
        &self.configs
    }

    /// Explicit id wins, else the first active config, else the built-in
    /// default. An unknown explicit id falls back like a missing one.
    pub fn resolve(&self, id: Option<i64>) -> ModelConfig {
        if let Some(id) = id {
            if let Some(config) = self.configs.iter().find(|config| config.id == id) {
                return config.clone();
            }
        }
        self.configs
            .iter()
            .find(|config| config.is_active)
            .cloned()
            .unwrap_or_else(default_model_config)
    }
}

fn required_env<F>(getter: &mut F, key: &'static str) -> Result<String, ModelConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let value = getter(key).ok_or(ModelConfigError::MissingEnv { key })?;
    if value.trim().is_empty() {
        return Err(ModelConfigError::EmptyEnv { key });
    }
    Ok(value)
}
