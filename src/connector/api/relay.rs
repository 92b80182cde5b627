//! Adapts a fragment sequence into the event sequence sent to the browser.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::{Stream, StreamExt};
use tracing::{debug, error};

use crate::application::ResponseFragments;
use crate::domain::{DomainError, StreamEvent};

/// Description carried by the terminal `error` event.
pub const RELAY_ERROR_MESSAGE: &str = "An error occurred while generating the response";

/// Guard a fragment stream so that a panic while polling it becomes an `Err`
/// item instead of tearing down the connection. The stream ends after it.
pub fn guard_fragments(
    fragments: ResponseFragments,
) -> impl Stream<Item = Result<String, DomainError>> + Send {
    AssertUnwindSafe(fragments)
        .catch_unwind()
        .map(|item| item.map_err(|panic| DomainError::internal(panic_message(&*panic))))
}

/// One `message` event per non-empty fragment, in order. The first `Err`
/// produces a single terminal `error` event and ends the sequence.
pub fn relay_events<S>(request_id: String, fragments: S) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<String, DomainError>> + Send + 'static,
{
    async_stream::stream! {
        let mut fragments = Box::pin(fragments);
        let mut relayed = 0usize;

        while let Some(item) = fragments.next().await {
            let event = match item {
                Ok(fragment) if fragment.is_empty() => continue,
                Ok(fragment) => {
                    relayed += 1;
                    StreamEvent::Message(fragment)
                }
                Err(e) => {
                    error!(%request_id, "Error in event stream after {relayed} fragments: {e}");
                    StreamEvent::Error(RELAY_ERROR_MESSAGE.to_string())
                }
            };

            let terminal = event.is_terminal();
            yield event;
            if terminal {
                return;
            }
        }

        debug!(%request_id, "Chat stream completed with {relayed} fragments");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("fragment producer panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("fragment producer panicked: {msg}")
    } else {
        "fragment producer panicked".to_string()
    }
}
