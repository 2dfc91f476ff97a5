use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod client;
mod config;
mod inference;

use api::AppState;
use config::AppConfig;
use inference::mistral::MistralService;
use inference::{ChatService, SamplingConfig};

const READY_ATTEMPTS: usize = 20;
const READY_BACKOFF: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::from_env();

    println!("🚀 Starting finance chatbot with {}...", cfg.model_id);

    // -----------------------------
    // Shared state / Dependencies
    // -----------------------------
    // Model acquisition is fatal on failure: bubble the cause up and stop.
    let engine = Arc::new(MistralService::load(&cfg.model_id, &cfg.revision, cfg.echo_prompt).await?);
    let infer = Arc::new(ChatService::new(engine, SamplingConfig::default()));

    let state = AppState { infer };

    // -----------------------------
    // Router
    // -----------------------------
    let app = api::router()
        // CORS for browser-based callers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state);

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    println!("🌐 HTTP listening on http://{addr}");
    println!("💬 Chat endpoint at http://localhost:{}/chat", cfg.port);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            tracing::error!("server error: {e}");
        }
    });

    // Block on the health endpoint actually answering before handing the
    // terminal to the client. If the service never reports ready the client
    // still starts; its first call surfaces the transport error.
    if !wait_until_ready(&cfg.health_url()).await {
        tracing::warn!("service did not report ready; the first request may fail");
    }

    client::run(&cfg.chat_url()).await
}

async fn wait_until_ready(health_url: &str) -> bool {
    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("readiness probe unavailable: {e}");
            return false;
        }
    };

    for _ in 0..READY_ATTEMPTS {
        if let Ok(res) = http.get(health_url).send().await {
            if res.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(READY_BACKOFF).await;
    }

    false
}
