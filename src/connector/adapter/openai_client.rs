use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{CompletionProvider, FragmentStream};
use crate::domain::{ChatMessage, DomainError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const COMPLETIONS_PATH: &str = "/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Sentinel data line closing an OpenAI stream.
const DONE_MARKER: &str = "[DONE]";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// One `chat.completion.chunk` object. Only the text deltas matter here.
#[derive(Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Streaming client for the OpenAI Chat Completions API and compatible
/// servers (vLLM, LM Studio, Ollama's `/v1` endpoint).
///
/// Requests are sent with `stream: true`; the SSE response body is decoded
/// with `eventsource-stream` and each `delta.content` is yielded as soon as its
/// event is complete. Transport, status and decoding failures all surface as
/// [`DomainError::Provider`].
///
/// ```text
/// OPENAI_API_KEY=sk-...
/// OPENAI_BASE_URL=https://api.openai.com/v1
/// OPENAI_MODEL=gpt-3.5-turbo
/// OPENAI_TEMPERATURE=0.7
/// ```
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    temperature: f32,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            url,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Construct from environment variables:
    ///
    /// | Variable             | Default                     |
    /// |----------------------|-----------------------------|
    /// | `OPENAI_API_KEY`     | required; unset or empty is a configuration error |
    /// | `OPENAI_BASE_URL`    | `https://api.openai.com/v1` |
    /// | `OPENAI_MODEL`       | `gpt-3.5-turbo`             |
    /// | `OPENAI_TEMPERATURE` | `0.7`                       |
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`OpenAiClient::from_env`], reading settings through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("OPENAI_API_KEY not found in environment variables")
            })?;
        let base = lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let temperature = match lookup("OPENAI_TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().unwrap_or_else(|_| {
                warn!("Ignoring invalid OPENAI_TEMPERATURE '{raw}', using {DEFAULT_TEMPERATURE}");
                DEFAULT_TEMPERATURE
            }),
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Self::new(key, model, base).with_temperature(temperature))
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Extract the text deltas carried by one SSE `data` payload.
    fn parse_chunk(data: &str) -> Result<Vec<String>, DomainError> {
        let chunk: ChunkResponse = serde_json::from_str(data).map_err(|e| {
            DomainError::provider(format!("OpenAiClient: malformed stream chunk: {e}"))
        })?;

        Ok(chunk
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.and_then(|delta| delta.content))
            .filter(|content| !content.is_empty())
            .collect())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<FragmentStream, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .header(ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::provider(format!("OpenAiClient: request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OpenAiClient: API returned {status}: {body}");
            return Err(DomainError::provider(format!(
                "OpenAiClient: API returned {status}"
            )));
        }

        let mut events = Box::pin(response.bytes_stream().eventsource());

        Ok(Box::pin(async_stream::stream! {
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(DomainError::provider(format!("OpenAiClient: stream error: {e}")));
                        return;
                    }
                };

                let data = event.data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == DONE_MARKER {
                    debug!("OpenAiClient: stream finished");
                    return;
                }

                match OpenAiClient::parse_chunk(data) {
                    Ok(fragments) => {
                        for fragment in fragments {
                            yield Ok(fragment);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
