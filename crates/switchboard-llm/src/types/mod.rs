//! Message and tool vocabulary shared by both wire schemas

use serde::{Deserialize, Deserializer};

mod message;
mod tool;

pub use message::{ChatMessage, Role};
pub use tool::{FunctionCall, FunctionSpec, ToolInvocation, ToolSpec};

/// Decode an explicit JSON `null` the same as an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
