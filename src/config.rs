use crate::endpoints::Endpoints;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Protocol version string carried in every ping payload.
pub const CLIENT_VERSION: &str = "2.2.7";

/// Fixed mission identifier for the daily reward claim.
pub const DAILY_MISSION_ID: &str = "daily";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Runtime knobs shared by every account session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed sleep between pings. The sole rate-limit mechanism;
    /// there is deliberately no backoff on failure.
    pub ping_interval: Duration,
    /// Per-request timeout. A timed-out call fails only that call,
    /// never the session's loop.
    pub request_timeout: Duration,
    /// When false, transport-level errors are demoted to debug logs.
    pub show_request_errors: bool,
    pub endpoints: Endpoints,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(60),
            show_request_errors: false,
            endpoints: Endpoints::default(),
        }
    }
}
