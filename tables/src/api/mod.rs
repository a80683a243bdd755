//! HTTP API module.
//!
//! Server, request/response types and the log broadcaster.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::start_server;
pub use types::*;
