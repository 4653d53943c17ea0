//! Common utilities module
//!
//! Shared error type and the bounds-checked little-endian payload reader.

pub mod error;
pub mod payload;

pub use error::{NvRawError, Result};
pub use payload::PayloadReader;
