//! helpdesk-chat - IT helpdesk chat backed by a hosted LLM
//!
//! A query is bound into a fixed instructional template, sent to an
//! OpenAI-compatible completion endpoint, and the exchange is appended to
//! a per-session conversation that is rendered as a chat page.

pub mod config;
pub mod conversation;
pub mod core;
pub mod error;
pub mod render;
pub mod resolver;
pub mod session;
pub mod utils;
pub mod web;

pub mod cli;

pub use config::Settings;
pub use conversation::{Conversation, Role, Turn};
pub use error::{ConfigurationError, ResolutionError};
pub use resolver::ResponseResolver;
pub use session::{ChatSession, SessionRegistry, SubmitOutcome};

use crate::core::llm::{CompletionService, LLMClient};
use std::sync::Arc;
use std::time::Duration;

/// Everything a front end needs, built once at startup.
pub struct System {
    settings: Settings,
    resolver: ResponseResolver,
}

impl System {
    /// Build the completion client from loaded settings and credential.
    ///
    /// A failure here should abort startup.
    pub fn from_parts(settings: Settings, api_key: String) -> anyhow::Result<Self> {
        let client = LLMClient::new(api_key, &settings)?;
        tracing::info!(
            "Helpdesk chat initialized (model {}, endpoint {})",
            settings.llm.model,
            settings.llm.base_url
        );
        Ok(Self::with_service(settings, Arc::new(client)))
    }

    /// Build around any completion service (used by tests and embedders).
    pub fn with_service(settings: Settings, service: Arc<dyn CompletionService>) -> Self {
        Self {
            settings,
            resolver: ResponseResolver::new(service),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> &ResponseResolver {
        &self.resolver
    }

    /// A fresh terminal session.
    pub fn session(&self, id: impl Into<String>) -> ChatSession {
        ChatSession::new(id, self.resolver.clone())
    }

    /// Shared state for the web front end.
    pub fn app_state(&self) -> web::AppState {
        web::AppState::new(
            SessionRegistry::new(self.resolver.clone()),
            self.settings.ui.clone(),
            Duration::from_secs(self.settings.server.session_idle_secs),
        )
    }
}
