//! Chat sessions
//!
//! Information Hiding:
//! - Each session owns its conversation; nothing is shared between sessions
//! - The registry's map and locking are hidden behind async methods
//! - Sessions live only as long as the process, until ended, or until idle
//!   past the configured limit

use crate::conversation::{Conversation, Turn};
use crate::error::ResolutionError;
use crate::resolver::ResponseResolver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

/// What happened to one submitted input.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended and nothing was resolved.
    Ignored,
    /// User and assistant turns were both appended.
    Answered(String),
    /// Only the user turn was appended; the notice explains the failure.
    Failed(ResolutionError),
}

/// One interactive session: its conversation plus the last failure notice.
pub struct ChatSession {
    id: String,
    conversation: Conversation,
    resolver: ResponseResolver,
    notice: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, resolver: ResponseResolver) -> Self {
        Self {
            id: id.into(),
            conversation: Conversation::new(),
            resolver,
            notice: None,
        }
    }

    /// Append the user turn, resolve it, append the reply.
    ///
    /// On failure the user turn stays and no assistant turn is added.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let Some(query) = self.record_query(input) else {
            return SubmitOutcome::Ignored;
        };

        let result = self.resolver.resolve(&query).await;
        self.record_result(result)
    }

    /// First half of a submission: append the trimmed query as a user turn.
    ///
    /// Returns `None` (and touches nothing) for blank input.
    pub fn record_query(&mut self, input: &str) -> Option<String> {
        let query = input.trim();
        if query.is_empty() {
            return None;
        }

        self.notice = None;
        self.conversation.append(Turn::user(query));

        tracing::debug!(
            "[Session {}] User turn appended ({} turns)",
            self.id,
            self.conversation.len()
        );
        Some(query.to_string())
    }

    /// Second half of a submission: append the reply or keep the failure notice.
    pub fn record_result(&mut self, result: Result<String, ResolutionError>) -> SubmitOutcome {
        match result {
            Ok(reply) => {
                self.conversation.append(Turn::assistant(reply.clone()));
                SubmitOutcome::Answered(reply)
            }
            Err(e) => {
                tracing::warn!("[Session {}] Query failed: {}", self.id, e);
                self.notice = Some(e.user_message());
                SubmitOutcome::Failed(e)
            }
        }
    }

    pub fn resolver(&self) -> &ResponseResolver {
        &self.resolver
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Visible error from the most recent failed submission, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_seen: Instant,
}

/// Session-scoped stores keyed by session id.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    resolver: ResponseResolver,
}

impl SessionRegistry {
    pub fn new(resolver: ResponseResolver) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            resolver,
        }
    }

    /// Look up the session for `id`, starting a fresh one when it is unknown.
    ///
    /// Returns the id actually in use and whether a session was created.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, Arc<Mutex<ChatSession>>, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (id.to_string(), session, false);
            }
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(ChatSession::new(id.clone(), self.resolver.clone())));

        let active = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(
                id.clone(),
                SessionEntry {
                    session: session.clone(),
                    last_seen: Instant::now(),
                },
            );
            sessions.len()
        };

        tracing::info!("[SessionRegistry] Started session '{}' ({} active)", id, active);
        (id, session, true)
    }

    /// Existing session for `id`; counts as activity for idle tracking.
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<ChatSession>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Tear a session down. Its conversation is dropped.
    pub async fn end(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!("[SessionRegistry] Ended session '{}'", id);
        }
        removed
    }

    /// End every session not seen for `max_idle`. Sessions a handler still
    /// holds are kept. Returns how many were removed.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() < max_idle || Arc::strong_count(&entry.session) > 1;
            if !keep {
                tracing::debug!("[SessionRegistry] Session '{}' idle, ending", id);
            }
            keep
        });

        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically end sessions idle longer than `max_idle`.
pub fn spawn_idle_sweeper(registry: SessionRegistry, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    let period = max_idle.clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = registry.sweep_idle(max_idle).await;
            if removed > 0 {
                tracing::info!(
                    "[SessionRegistry] Swept {} idle session(s), {} active",
                    removed,
                    registry.len().await
                );
            }
        }
    })
}
