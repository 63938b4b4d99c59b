//! Core application primitives (orchestrator, HTTP surface)

pub mod http;
pub mod scanner;

pub use http::*;
pub use scanner::*;
