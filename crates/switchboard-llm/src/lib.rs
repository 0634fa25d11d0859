//! Translation and relay engine for Switchboard
//!
//! Rewrites OpenAI chat completion requests into the DeepSeek shape, calls
//! the backend synchronously or as a live event stream, and rewrites the
//! backend's answers so clients only ever see the model they asked for.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
#[cfg(feature = "http")]
mod handler;
pub mod policy;
pub mod protocol;
pub mod relay;
pub mod state;
pub mod translate;
pub mod transport;
pub mod types;

pub use error::LlmError;
#[cfg(feature = "http")]
pub use handler::llm_router;
pub use policy::{ModelCapabilities, ModelPolicyTable, ResolvedModel};
pub use relay::RelayOutcome;
pub use state::{Gateway, OpenStream};
pub use translate::Degradation;
pub use transport::{Backend, HttpBackend};
