use crate::core::error::CommentaryError;
use crate::core::signal::CommentaryProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROMPT_PREAMBLE: &str = "You are a macro strategist. Using the latest US market and \
economic indicators below, judge the current environment for equity investors. Start your \
answer with one of the words GREEN, YELLOW or RED as the overall signal. Then give three \
sections separated by lines containing only ---: inflation and rates, growth and employment, \
and positioning.";

/// Chat-completion client for OpenAI-compatible endpoints.
pub struct OpenAiCommentary {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCommentary {
    /// Fails with `MissingCredential` when no usable key is given.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CommentaryError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CommentaryError::MissingCredential)?;
        let client = reqwest::Client::builder()
            .user_agent("mktlogic/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client,
        })
    }
}

pub fn build_prompt(summary: &str) -> String {
    format!("{PROMPT_PREAMBLE}\n\n[Latest data]\n{summary}")
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl CommentaryProvider for OpenAiCommentary {
    #[instrument(name = "CommentaryRequest", skip_all, fields(model = %self.model))]
    async fn comment(&self, summary: &str) -> Result<String, CommentaryError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let prompt = build_prompt(summary);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        debug!("Requesting commentary from {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CommentaryError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let data: ChatResponse = response.json().await?;
        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CommentaryError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAiCommentary {
        OpenAiCommentary::new(
            &server.uri(),
            "gpt-4o",
            Some("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_commentary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-4o" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "YELLOW\n---\nMixed." }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).comment("- CPI: 3.1%").await.unwrap();
        assert_eq!(text, "YELLOW\n---\nMixed.");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let result = OpenAiCommentary::new(
            "http://localhost",
            "gpt-4o",
            Some("  ".to_string()),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(CommentaryError::MissingCredential)));

        let result =
            OpenAiCommentary::new("http://localhost", "gpt-4o", None, Duration::from_secs(5));
        assert!(matches!(result, Err(CommentaryError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = client(&server).comment("- CPI: 3.1%").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Commentary endpoint returned 401: invalid key"
        );
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = client(&server).comment("- CPI: 3.1%").await.unwrap_err();
        assert!(matches!(err, CommentaryError::EmptyResponse));
    }

    #[test]
    fn test_prompt_contains_summary_and_tokens() {
        let prompt = build_prompt("- US 10Y Treasury: 4.25%");
        assert!(prompt.ends_with("- US 10Y Treasury: 4.25%"));
        assert!(prompt.contains("GREEN, YELLOW or RED"));
    }
}
