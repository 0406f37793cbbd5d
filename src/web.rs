//! Web chat page
//!
//! Every request is one render cycle: the caller's session is looked up from
//! the session cookie, an optional query is resolved, and the whole
//! conversation is rendered again. Sessions are only created by the first
//! non-blank `/ask`; reads without one render an empty conversation.

use crate::config::UiConfig;
use crate::conversation::{Conversation, Turn};
use crate::render::render_page;
use crate::session::{spawn_idle_sweeper, ChatSession, SessionRegistry, SubmitOutcome};
use axum::{
    extract::{Form, State},
    response::{Html, Redirect},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub const SESSION_COOKIE: &str = "helpdesk_session";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub ui: Arc<UiConfig>,
    pub session_idle: Duration,
}

impl AppState {
    pub fn new(sessions: SessionRegistry, ui: UiConfig, session_idle: Duration) -> Self {
        Self {
            sessions,
            ui: Arc::new(ui),
            session_idle,
        }
    }

    async fn existing_session(&self, jar: &CookieJar) -> Option<(String, Arc<Mutex<ChatSession>>)> {
        let id = jar.get(SESSION_COOKIE)?.value().to_string();
        let session = self.sessions.get(&id).await?;
        Some((id, session))
    }
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationView {
    pub session_id: Option<String>,
    pub turns: Vec<Turn>,
    pub error: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .route("/session/end", post(end_session))
        .route("/api/conversation", get(conversation))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Helpdesk chat listening on http://{}", listener.local_addr()?);

    let sweeper = spawn_idle_sweeper(state.sessions.clone(), state.session_idle);
    let result = axum::serve(listener, create_router(state)).await;
    sweeper.abort();
    result?;
    Ok(())
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn remember(jar: CookieJar, id: String, created: bool) -> CookieJar {
    if created {
        jar.add(session_cookie(id))
    } else {
        jar
    }
}

async fn index(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let page = match state.existing_session(&jar).await {
        Some((_, session)) => {
            let session = session.lock().await;
            render_page(&state.ui, session.conversation(), session.notice())
        }
        None => render_page(&state.ui, &Conversation::new(), None),
    };

    Html(page)
}

async fn ask(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AskForm>,
) -> (CookieJar, Redirect) {
    if form.query.trim().is_empty() {
        tracing::debug!("[Web] Empty query ignored");
        return (jar, Redirect::to("/"));
    }

    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (id, session, created) = state.sessions.get_or_create(cookie_id.as_deref()).await;

    // held across the resolution so a session has one query in flight
    let mut session = session.lock().await;
    match session.submit(&form.query).await {
        SubmitOutcome::Ignored => tracing::debug!("[Web] Empty query ignored"),
        SubmitOutcome::Answered(_) => {
            tracing::info!("[Web] Session '{}' answered", id)
        }
        SubmitOutcome::Failed(e) => {
            tracing::warn!("[Web] Session '{}' query failed: {}", id, e)
        }
    }
    drop(session);

    (remember(jar, id, created), Redirect::to("/"))
}

async fn end_session(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if state.sessions.end(cookie.value()).await {
            tracing::debug!("[Web] {} session(s) active", state.sessions.len().await);
        }
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

async fn conversation(State(state): State<AppState>, jar: CookieJar) -> Json<ConversationView> {
    let view = match state.existing_session(&jar).await {
        Some((id, session)) => {
            let session = session.lock().await;
            ConversationView {
                session_id: Some(id),
                turns: session.conversation().snapshot().cloned().collect(),
                error: session.notice().map(str::to_string),
            }
        }
        None => ConversationView {
            session_id: None,
            turns: Vec::new(),
            error: None,
        },
    };

    Json(view)
}

async fn health() -> &'static str {
    "ok"
}
