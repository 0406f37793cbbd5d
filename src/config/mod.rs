mod settings;

pub use settings::{LLMConfig, LoggingConfig, ServerConfig, Settings, UiConfig, API_KEY_VAR};
