use axum::{extract::State, Json};

use crate::api::error::ApiError;
use crate::api::types::{ChatRequest, ChatResponse, HealthResponse, DEFAULT_MAX_NEW_TOKENS};
use crate::api::AppState;

const STATUS_LINE: &str = "Finance Chatbot is running 🚀";

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_LINE.to_string(),
    })
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::EmptyPrompt);
    }

    let max = if req.max_new_tokens == 0 {
        DEFAULT_MAX_NEW_TOKENS
    } else {
        req.max_new_tokens
    };

    let out = state
        .infer
        .generate(&req.prompt, max)
        .await
        .map_err(ApiError::Inference)?;

    Ok(Json(ChatResponse { response: out }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ChatService, Generation, SamplingConfig, TextGenerator};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CannedEngine {
        reply: &'static str,
        calls: Arc<AtomicUsize>,
        seen_budget: Arc<Mutex<Option<usize>>>,
    }

    #[async_trait]
    impl TextGenerator for CannedEngine {
        async fn generate(
            &self,
            _prompt: &str,
            max_new_tokens: usize,
            _sampling: &SamplingConfig,
        ) -> anyhow::Result<Vec<Generation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_budget.lock().unwrap() = Some(max_new_tokens);
            Ok(vec![Generation {
                generated_text: self.reply.to_string(),
            }])
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl TextGenerator for FailingEngine {
        async fn generate(
            &self,
            _prompt: &str,
            _max_new_tokens: usize,
            _sampling: &SamplingConfig,
        ) -> anyhow::Result<Vec<Generation>> {
            Err(anyhow!("OOM"))
        }
    }

    fn state_with(engine: Arc<dyn TextGenerator>) -> AppState {
        AppState {
            infer: Arc::new(ChatService::new(engine, SamplingConfig::default())),
        }
    }

    fn canned(reply: &'static str) -> (AppState, Arc<AtomicUsize>, Arc<Mutex<Option<usize>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_budget = Arc::new(Mutex::new(None));
        let state = state_with(Arc::new(CannedEngine {
            reply,
            calls: calls.clone(),
            seen_budget: seen_budget.clone(),
        }));
        (state, calls, seen_budget)
    }

    #[tokio::test]
    async fn health_reports_the_fixed_status() {
        let Json(body) = health().await;
        assert_eq!(body.status, STATUS_LINE);
    }

    #[tokio::test]
    async fn whitespace_prompt_is_rejected_before_generation() {
        let (state, calls, _) = canned("unused");
        let req = ChatRequest {
            prompt: "   ".to_string(),
            max_new_tokens: 50,
        };

        let err = chat(State(state), Json(req)).await.unwrap_err();
        let (status, detail) = err.parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail, "Prompt cannot be empty.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_generation() {
        let (state, calls, _) = canned("unused");
        let req = ChatRequest {
            prompt: String::new(),
            max_new_tokens: 50,
        };

        let err = chat(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_generation_returns_the_first_candidate() {
        let (state, calls, _) = canned("Start with an emergency fund.");
        let req = ChatRequest {
            prompt: "How do I save for retirement?".to_string(),
            max_new_tokens: 50,
        };

        let Json(body) = chat(State(state), Json(req)).await.unwrap();

        assert_eq!(body.response, "Start with an emergency fund.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_token_budget_falls_back_to_the_default() {
        let (state, _, seen_budget) = canned("ok");
        let req = ChatRequest {
            prompt: "hello".to_string(),
            max_new_tokens: 0,
        };

        chat(State(state), Json(req)).await.unwrap();

        assert_eq!(*seen_budget.lock().unwrap(), Some(DEFAULT_MAX_NEW_TOKENS));
    }

    #[tokio::test]
    async fn generation_failure_maps_to_500_with_the_cause() {
        let state = state_with(Arc::new(FailingEngine));
        let req = ChatRequest {
            prompt: "hello".to_string(),
            max_new_tokens: 50,
        };

        let err = chat(State(state), Json(req)).await.unwrap_err();
        let (status, detail) = err.parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(detail.contains("OOM"));
    }
}
