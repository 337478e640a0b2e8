//! # Nodepulse - Concurrent Account Session Keeper
//!
//! Runs many independent account sessions against a remote service:
//! each session authenticates once, then reports a liveness ping on a
//! fixed cadence (optionally through a dedicated proxy) while a daily
//! reward claim fires once per session.
//!
//! ## Modules
//!
//! - [`config`] - Session configuration and proxy definitions
//! - [`endpoints`] - Remote operation registry
//! - [`error`] - Typed error handling with thiserror
//! - [`client`] - Proxy-aware HTTP transport
//! - [`session`] - Account binding, state machine, ping cycle
//! - [`utils`] - Logging, input-file loading, session runner

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod session;
pub(crate) mod utils;

pub use client::ApiClient;
pub use config::{ProxyConfig, SessionConfig};
pub use endpoints::Endpoints;
pub use error::{ConfigError, NetworkError};
pub use session::state::{ConnectionState, PingResult};
pub use session::{bind_accounts, AccountBinding, AccountProfile, AccountSession, Session, SessionStats};

pub use utils::loader::{load_proxies, load_tokens};
pub use utils::{setup_logger, SessionRunner};
