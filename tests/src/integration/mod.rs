//! Cross-crate integration flows.

pub mod lifecycle_flow;
pub mod stream_flow;
