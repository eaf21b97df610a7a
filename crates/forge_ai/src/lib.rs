pub mod client;
pub mod providers;
pub mod retry;
pub mod types;

pub use client::{GenerationClient, GenerationError};
pub use providers::{GenerationTransport, ProviderError};
pub use retry::RetryPolicy;
pub use types::{CompletionRequest, Message, MessageRole};
