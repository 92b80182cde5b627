mod chat_message;
mod chat_request;
mod stream_event;

pub use chat_message::*;
pub use chat_request::*;
pub use stream_event::*;
