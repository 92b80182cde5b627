use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::{CompletionProvider, FragmentStream};
use crate::domain::{ChatMessage, DomainError, Role};

enum Script {
    Fixed(Vec<String>),
    Echo,
}

/// Offline [`CompletionProvider`] that replays scripted fragments.
///
/// `echo()` answers with the user's own words, one fragment per word, which is
/// what `--mock-provider` serves. `failing_after(n)` emits `n` fragments and
/// then a provider error; `failing_to_open()` refuses the request outright,
/// like a rejected connection or an error status.
pub struct MockCompletionProvider {
    script: Script,
    fail_to_open: bool,
    fail_after: Option<usize>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_conversation: Mutex<Option<Vec<ChatMessage>>>,
}

impl MockCompletionProvider {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Fixed(
            fragments.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn echo() -> Self {
        Self::with_script(Script::Echo)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            fail_to_open: false,
            fail_after: None,
            delay: None,
            calls: AtomicUsize::new(0),
            last_conversation: Mutex::new(None),
        }
    }

    pub fn failing_after(mut self, fragments: usize) -> Self {
        self.fail_after = Some(fragments);
        self
    }

    pub fn failing_to_open(mut self) -> Self {
        self.fail_to_open = true;
        self
    }

    /// Pause before each fragment, to make streaming visible in a browser.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completions opened so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_conversation(&self) -> Option<Vec<ChatMessage>> {
        self.last_conversation
            .lock()
            .ok()
            .and_then(|conversation| conversation.clone())
    }

    fn echo_fragments(messages: &[ChatMessage]) -> Vec<String> {
        let said = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let mut fragments = vec!["You said:".to_string()];
        fragments.extend(said.split_whitespace().map(|word| format!(" {word}")));
        fragments
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<FragmentStream, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let fragments = match &self.script {
            Script::Fixed(fragments) => fragments.clone(),
            Script::Echo => Self::echo_fragments(&messages),
        };

        if let Ok(mut last) = self.last_conversation.lock() {
            *last = Some(messages);
        }

        if self.fail_to_open {
            return Err(DomainError::provider("mock provider refused the request"));
        }

        let fail_after = self.fail_after;
        let delay = self.delay;
        let total = fragments.len();

        Ok(Box::pin(async_stream::stream! {
            for (index, fragment) in fragments.into_iter().enumerate() {
                if fail_after == Some(index) {
                    yield Err(DomainError::provider("mock provider failure"));
                    return;
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(fragment);
            }

            if fail_after.is_some_and(|n| n >= total) {
                yield Err(DomainError::provider("mock provider failure"));
            }
        }))
    }

    fn model_name(&self) -> &str {
        "mock-completion"
    }
}
