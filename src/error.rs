//! # Error Types
//!
//! Centralized error definitions for nodepulse. Transport errors are
//! always recovered at the calling session; config errors are the only
//! process-fatal class and are raised before any session starts.

use thiserror::Error;

/// Transport-level failures. Never propagated past the session that
/// issued the call; the ping loop absorbs them into `Disconnected`.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpStatus { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },
}

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("No credentials found in {path}")]
    NoCredentials { path: String },
}
