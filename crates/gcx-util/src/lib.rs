//! gcx-util - Shared types for the gcx G-code engine.
//!
//! This crate holds the two types every other engine crate speaks:
//! [`Span`] for source locations and [`GCodeError`] for lexing, parsing
//! and evaluation failures.

pub mod error;
pub mod span;

pub use error::{GCodeError, Result};
pub use span::Span;
