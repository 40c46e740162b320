//! Narrator backed by an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use sagaforge_character::Player;
use sagaforge_core::error::DomainError;
use sagaforge_narrative::{
    NarrationPrompt, Narrator, OutlineGenerator, StoryOutline, TurnContext, render_outline_prompt,
};
use sagaforge_world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NarratorConfig;
use crate::error::AppError;

const TEMPERATURE: f32 = 0.8;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Remote narrator and outline generator.
#[derive(Clone)]
pub struct HttpNarrator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for HttpNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNarrator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl HttpNarrator {
    /// Builds a client for `config`. `timeout` bounds each request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &NarratorConfig, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, prompt: &NarrationPrompt) -> Result<String, DomainError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::NarratorUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::NarratorUnavailable(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::NarratorUnavailable(format!("unreadable response: {e}")))?;

        let text = body
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| DomainError::NarratorUnavailable("empty completion".to_owned()))?;
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl Narrator for HttpNarrator {
    async fn narrate(&self, context: &TurnContext) -> Result<String, DomainError> {
        self.complete(&context.render_prompt()).await
    }
}

#[async_trait]
impl OutlineGenerator for HttpNarrator {
    async fn generate_outline(
        &self,
        world: &World,
        party: &[Player],
    ) -> Result<Option<StoryOutline>, DomainError> {
        let raw = self.complete(&render_outline_prompt(world, party)).await?;
        let outline = StoryOutline::from_generator_output(&raw);
        if outline.is_none() {
            warn!("outline response had no usable outline");
        }
        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use sagaforge_character::CharacterClass;
    use sagaforge_world::WorldCatalog;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Option<String>, Value)>>>);

    /// Serves `reply` with `status` on `/v1/chat/completions` and returns
    /// the base URL plus what the server received.
    async fn fake_provider(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_owned);
                            captured.0.lock().unwrap().push((auth, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), captured)
    }

    fn narrator(base_url: String) -> HttpNarrator {
        HttpNarrator::new(
            &NarratorConfig {
                api_key: "sk-test".to_owned(),
                base_url,
                model: "test-model".to_owned(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn context() -> TurnContext {
        TurnContext {
            world: WorldCatalog::builtin().get("emberwood").cloned(),
            party: vec![Player::from_class("Borys", CharacterClass::Warrior)],
            outline: None,
            goal: None,
            quest_log: Vec::new(),
            recent_messages: Vec::new(),
            acting_index: 0,
            action: "I open the gate".to_owned(),
            roll: None,
            is_intro: false,
        }
    }

    #[tokio::test]
    async fn test_narrate_sends_chat_request_and_returns_content() {
        // Arrange
        let (base_url, captured) = fake_provider(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "The gate groans." } }] }),
        )
        .await;

        // Act
        let text = narrator(base_url).narrate(&context()).await.unwrap();

        // Assert
        assert_eq!(text, "The gate groans.");
        let requests = captured.0.lock().unwrap();
        let (auth, body) = &requests[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(
            body["messages"][1]["content"]
                .as_str()
                .unwrap()
                .contains("ACTION: I open the gate")
        );
    }

    #[tokio::test]
    async fn test_error_status_is_narrator_unavailable() {
        let (base_url, _) =
            fake_provider(StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" })).await;

        let result = narrator(base_url).narrate(&context()).await;

        assert!(matches!(result, Err(DomainError::NarratorUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_is_narrator_unavailable() {
        let (base_url, _) = fake_provider(StatusCode::OK, json!({ "choices": [] })).await;

        let result = narrator(base_url).narrate(&context()).await;

        assert!(matches!(result, Err(DomainError::NarratorUnavailable(_))));
    }

    #[tokio::test]
    async fn test_outline_is_parsed_from_completion() {
        let content = "```json\n{\"synopsis\": \"Ash falls.\", \"acts\": [{\"title\": \"One\", \"scenes\": []}]}\n```";
        let (base_url, _) = fake_provider(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": content } }] }),
        )
        .await;
        let world = WorldCatalog::builtin().require("emberwood").unwrap().clone();

        let outline = narrator(base_url)
            .generate_outline(&world, &[])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outline.synopsis, "Ash falls.");
        assert_eq!(outline.acts.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_narrator_unavailable() {
        let result = narrator("http://127.0.0.1:9/v1".to_owned())
            .narrate(&context())
            .await;

        assert!(matches!(result, Err(DomainError::NarratorUnavailable(_))));
    }
}
