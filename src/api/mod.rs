use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub mod error;
pub mod handlers;
pub mod types;

use crate::inference::ChatService;
use handlers::{chat, health};

#[derive(Clone)]
pub struct AppState {
    pub infer: Arc<ChatService>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
}
