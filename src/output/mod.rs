//! Rendering of result lists.
//!
//! - [`text`] - canonical text forms joined by a separator
//! - [`json`] - JSON arrays of canonical text forms

mod json;
mod text;

pub use json::to_json;
pub use text::{join, join_lines};
