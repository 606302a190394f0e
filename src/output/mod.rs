//! Serialization of reports for external consumers.
//!
//! Rendering (terminal tables, plots) lives outside this crate; a
//! presentation layer consumes the JSON form of [`Report`](crate::Report).

mod json;

pub use json::{to_json, to_json_pretty};
