use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Form;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::connector::api::relay::{guard_fragments, relay_events};
use crate::connector::api::{ApiError, Container};
use crate::domain::ChatRequest;

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    message: String,
}

/// `POST /chat`: validate the form message, then stream the reply as SSE.
///
/// Blank messages are rejected with 400 before any stream is opened.
pub async fn chat(
    State(container): State<Arc<Container>>,
    Form(form): Form<ChatForm>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    let message = ChatRequest::new(form.message)
        .map_err(|e| {
            info!(%request_id, "Rejected chat request: {e}");
            e
        })?
        .into_message();

    info!(
        %request_id,
        chars = message.chars().count(),
        "Streaming chat response"
    );

    let fragments = container.stream_use_case().execute(&message);
    let events = relay_events(request_id, guard_fragments(fragments)).map(|event| {
        Ok(Event::default().event(event.name()).data(event.data()))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
