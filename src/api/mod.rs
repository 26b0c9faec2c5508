pub mod client;
pub mod wire;
pub mod worker;

pub use client::{HttpTransport, TaskClient};
pub use wire::ListParams;
pub use worker::{AddKind, ApiCommand, ApiOutcome, ApiWorker, UpdateKind};

use thiserror::Error;

/// Failures talking to the task API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx HTTP status, with the server's error text when it sent one
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    /// The server answered but did not report success
    #[error("{0}")]
    Business(String),
    /// The body was not in any shape we understand
    #[error("invalid response: {0}")]
    Parse(String),
}
