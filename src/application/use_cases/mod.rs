mod stream_completion;

pub use stream_completion::*;
