pub const DEFAULT_MODEL_ID: &str = "mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration, read once at startup. Every field has a default so
/// the binary runs without any environment at all.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_id: String,
    pub revision: String,
    pub port: u16,
    /// Include the prompt in the generated text. Off by default; the
    /// response then carries the continuation only.
    pub echo_prompt: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            model_id: dotenvy::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            revision: dotenvy::var("MODEL_REVISION").unwrap_or_else(|_| "main".to_string()),
            port: dotenvy::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            echo_prompt: dotenvy::var("ECHO_PROMPT")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn health_url(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }

    pub fn chat_url(&self) -> String {
        format!("http://localhost:{}/chat", self.port)
    }
}
