use std::pin::Pin;
use std::sync::Arc;

use futures_util::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use crate::application::CompletionProvider;
use crate::domain::ChatMessage;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Sole fragment produced when no provider credentials are configured.
/// Only the process environment is read; a `.env` file has to be exported by
/// whatever launches the server.
pub const CONFIGURATION_ERROR_MESSAGE: &str =
    "Error: OpenAI API key not configured. Please check your .env file.";

/// Sole fragment appended when the provider fails.
pub const PROVIDER_ERROR_MESSAGE: &str =
    "I apologize, but I'm having trouble processing your request at the moment. Please try again later.";

/// Response fragments as seen by the relay. Provider failures have already
/// been turned into content, so the item type carries no error.
pub type ResponseFragments = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Turns one user message into a stream of reply fragments.
///
/// Failure is always expressed as stream content: a missing provider yields
/// [`CONFIGURATION_ERROR_MESSAGE`], and any provider error yields
/// [`PROVIDER_ERROR_MESSAGE`] after whatever fragments already arrived. A
/// single attempt is made per call.
pub struct StreamCompletionUseCase {
    provider: Option<Arc<dyn CompletionProvider>>,
    system_prompt: String,
}

impl StreamCompletionUseCase {
    /// `provider` is `None` when credentials are absent.
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn execute(&self, message: &str) -> ResponseFragments {
        let Some(provider) = self.provider.clone() else {
            warn!("OPENAI_API_KEY not found; answering with configuration notice");
            return Box::pin(stream::once(async {
                CONFIGURATION_ERROR_MESSAGE.to_string()
            }));
        };

        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(message),
        ];

        Box::pin(async_stream::stream! {
            debug!("Requesting streamed completion from {}", provider.model_name());

            let mut fragments = match provider.stream_completion(messages).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!("Completion request failed: {e}");
                    yield PROVIDER_ERROR_MESSAGE.to_string();
                    return;
                }
            };

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) if fragment.is_empty() => continue,
                    Ok(fragment) => yield fragment,
                    Err(e) => {
                        warn!("Completion stream failed: {e}");
                        yield PROVIDER_ERROR_MESSAGE.to_string();
                        return;
                    }
                }
            }
        })
    }
}
