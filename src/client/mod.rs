use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use crate::api::types::{ChatRequest, ChatResponse, DEFAULT_MAX_NEW_TOKENS};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------
// TERMINAL CHAT LOOP
// ---------------------------------------------------------
pub async fn run(chat_url: &str) -> Result<()> {
    let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    println!("💰 Finance Chatbot");
    println!("Ask about savings, taxes, or investments (Ctrl-D to quit):");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        println!("⏳ Thinking...");

        match send_prompt(&http, chat_url, prompt).await {
            Ok(reply) => println!("🤖: {reply}"),
            Err(message) => eprintln!("{message}"),
        }
    }

    Ok(())
}

/// One request/response exchange. A failed call is rendered, never retried;
/// the user triggers again by typing another prompt.
async fn send_prompt(http: &Client, chat_url: &str, prompt: &str) -> Result<String, String> {
    let req = ChatRequest {
        prompt: prompt.to_string(),
        max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
    };

    let res = http
        .post(chat_url)
        .json(&req)
        .send()
        .await
        .map_err(|e| render_transport_error(&e))?;

    let status = res.status().as_u16();
    let body = res.text().await.map_err(|e| render_transport_error(&e))?;

    if (200..300).contains(&status) {
        Ok(parse_reply(&body))
    } else {
        Err(render_http_error(status, &body))
    }
}

fn parse_reply(body: &str) -> String {
    match serde_json::from_str::<ChatResponse>(body) {
        Ok(r) => r.response,
        // Unparseable bodies are shown verbatim.
        Err(_) => body.to_string(),
    }
}

fn render_http_error(status: u16, body: &str) -> String {
    format!("❌ Error {status}: {body}")
}

fn render_transport_error(err: &dyn std::fmt::Display) -> String {
    format!("❌ Backend error: {err}")
}
