//! Minimal chat-completions client shared by the preprocessor, the frontier
//! estimator and the deal scanner. Requires `OPENAI_API_KEY` (or an explicit
//! key via [`ChatClient::new`]).

use std::time::Duration;

use serde::{Deserialize, Serialize};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Failure modes of one completion call. Callers map these onto their own
/// error taxonomy (`ServiceUnavailable` vs `Estimation`).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("completion was empty")]
    Empty,
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
}

impl ChatClient {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("bargain-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self { http, api_key }
    }

    /// Reads `OPENAI_API_KEY`; an empty key makes every call fail with
    /// `Status(401)` server-side, which callers surface as unavailable.
    pub fn from_env() -> Self {
        Self::new(std::env::var("OPENAI_API_KEY").unwrap_or_default())
    }

    /// One system+user round trip; returns the assistant text.
    pub async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, ChatError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
        };

        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChatError::Status(resp.status()));
        }

        let body: Resp = resp.json().await?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(ChatError::Empty);
        }
        Ok(content)
    }
}
