//! Error taxonomy
//!
//! Two failure families exist:
//! - `ConfigurationError`: fatal, raised while loading settings or the
//!   credential at startup
//! - `ResolutionError`: recoverable, raised per query when the completion
//!   service cannot produce a reply

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("completion service unreachable: {0}")]
    Unreachable(String),

    #[error("completion service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion service returned no reply")]
    EmptyReply,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ResolutionError {
    /// Short text suitable for showing to the person asking.
    pub fn user_message(&self) -> String {
        match self {
            ResolutionError::Rejected { status: 401 | 403, .. } => {
                "The assistant could not authenticate with the model provider.".to_string()
            }
            ResolutionError::Rejected { status: 429, .. } => {
                "The model provider is rate limiting requests. Please try again shortly."
                    .to_string()
            }
            ResolutionError::Unreachable(_) => {
                "The model provider could not be reached. Please try again.".to_string()
            }
            _ => format!("Sorry, your question could not be answered: {}", self),
        }
    }
}
