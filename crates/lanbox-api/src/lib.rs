pub mod chat;
pub mod error;
pub mod extract;
pub mod files;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use lanbox_db::{DocumentStore, Store};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
}

impl AppStateInner {
    pub fn new(store: Store) -> AppState {
        Arc::new(Self { store })
    }
}

/// Builds the route table.
///
/// Uploads are buffered in memory; `upload_limit` caps request bodies when
/// set, otherwise bodies are unbounded.
pub fn router(state: AppState, upload_limit: Option<usize>) -> Router {
    let body_limit = match upload_limit {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/users", get(users::list_users))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/files", get(files::list_files))
        .route("/upload", post(files::upload_file))
        .route("/download/{name}", get(files::download_file))
        .route("/delete/{name}", delete(files::delete_file))
        .route("/chat", get(chat::list_messages).post(chat::post_message))
        .route("/health", get(health))
        .layer(body_limit)
        .with_state(state)
}

/// GET /health — liveness check, does not touch the store.
pub async fn health() -> &'static str {
    "ok"
}

/// Runs a store operation on the blocking pool.
pub(crate) async fn with_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn DocumentStore) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    let value = tokio::task::spawn_blocking(move || f(store.as_ref())).await??;
    Ok(value)
}
