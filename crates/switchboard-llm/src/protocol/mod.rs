//! Wire formats for the client-facing and backend-facing APIs

pub mod deepseek;
pub mod openai;
