//! `pagegate-core`: shared building blocks for the authorization gate.
//!
//! This crate contains **pure** primitives (no IO, no HTTP).

pub mod error;
pub mod id;
pub mod path;

pub use error::{GateError, GateResult};
pub use id::{MenuId, UserId};
pub use path::PagePath;
