//! CLI command implementations.

pub mod client;
pub mod extract;
pub mod refresh;
pub mod resolve;
pub mod suggest;
pub mod validate;
