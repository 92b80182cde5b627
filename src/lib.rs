pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    CompletionProvider, FragmentStream, ResponseFragments, StreamCompletionUseCase,
    CONFIGURATION_ERROR_MESSAGE, PROVIDER_ERROR_MESSAGE,
};

pub use connector::api::relay::RELAY_ERROR_MESSAGE;
pub use connector::api::{Container, ContainerConfig, Router};
pub use connector::{MockCompletionProvider, OpenAiClient};

pub use domain::{ChatMessage, ChatRequest, DomainError, Role, StreamEvent, EMPTY_MESSAGE_DETAIL};
