//! Web UI shell: one HTML page plus the JSON/multipart API it calls.

mod http;

pub use http::{AppState, Server, router};
