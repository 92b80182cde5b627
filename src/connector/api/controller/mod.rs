pub mod chat_controller;
pub mod health_controller;
pub mod page_controller;

pub use chat_controller::chat;
pub use health_controller::health;
pub use page_controller::index;
