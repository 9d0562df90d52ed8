//! Upstream chat completion transports

pub mod breaker_transport;
pub mod http;
pub mod messages;
pub mod sse_decoder;
pub mod transport;

pub use breaker_transport::CircuitTransport;
pub use http::HttpTransport;
pub use messages::{ChatMessage, ChatRequest, MessageRole};
pub use sse_decoder::{SseDecoder, SseEvent};
pub use transport::{ChatTransport, TextStream};
