use crate::error::ConfigurationError;
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable holding the completion service credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LLMConfig,
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_idle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub title: String,
    pub caption: String,
    pub input_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Load settings from `config/{CONFIG_ENV}` (optional) and `APP__*` variables.
    pub fn new() -> Result<Self, ConfigurationError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Self::defaults()?
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::finish(config)
    }

    /// Load settings from an explicit file on top of the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let config = Self::defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?;

        Self::finish(config)
    }

    /// Read the credential once; a missing or blank value is fatal.
    pub fn api_key() -> Result<String, ConfigurationError> {
        Self::credential_from(env::var(API_KEY_VAR).ok())
    }

    fn credential_from(value: Option<String>) -> Result<String, ConfigurationError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigurationError::MissingCredential(API_KEY_VAR)),
        }
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
        Ok(Config::builder()
            .set_default("llm.model", "llama-3.1-70b-versatile")?
            .set_default("llm.base_url", "https://api.groq.com/openai/v1")?
            .set_default("llm.timeout_secs", 60_i64)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8501_i64)?
            .set_default("server.session_idle_secs", 3600_i64)?
            .set_default(
                "ui.title",
                "WatsonX IT Support : Your AI-Powered IT Support Partner",
            )?
            .set_default("ui.caption", "Powered by IBM watsonX")?
            .set_default("ui.input_label", "Ask a question about your subject:")?
            .set_default("logging.level", "info")?)
    }

    fn finish(config: Config) -> Result<Self, ConfigurationError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigurationError::InvalidSetting {
                key: "llm.model",
                reason: "model identifier must not be empty".to_string(),
            });
        }
        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(ConfigurationError::InvalidSetting {
                key: "llm.base_url",
                reason: format!("`{}` is not an http(s) URL", self.llm.base_url),
            });
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigurationError::InvalidSetting {
                key: "llm.timeout_secs",
                reason: "timeout must be at least one second".to_string(),
            });
        }
        if self.server.session_idle_secs == 0 {
            return Err(ConfigurationError::InvalidSetting {
                key: "server.session_idle_secs",
                reason: "idle limit must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LLMConfig {
                model: "llama-3.1-70b-versatile".to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                timeout_secs: 60,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
                session_idle_secs: 3600,
            },
            ui: UiConfig {
                title: "WatsonX IT Support : Your AI-Powered IT Support Partner".to_string(),
                caption: "Powered by IBM watsonX".to_string(),
                input_label: "Ask a question about your subject:".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
