use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use tracing::debug;

use crate::connector::api::Container;

/// Page compiled into the binary, served when the static directory has none.
const BUILTIN_INDEX_HTML: &str = include_str!("../../../../static/index.html");

/// `GET /`: the chat page, `index.html` from the static directory if present.
pub async fn index(State(container): State<Arc<Container>>) -> Html<String> {
    let path = container.static_dir().join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page),
        Err(e) => {
            debug!("Serving built-in chat page ({}: {e})", path.display());
            Html(BUILTIN_INDEX_HTML.to_string())
        }
    }
}
