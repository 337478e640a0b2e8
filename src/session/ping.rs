use super::{display_value, AccountProfile, AccountSession, SessionStats};
use crate::config::CLIENT_VERSION;
use crate::session::state::{ConnectionState, PingResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Liveness report sent on every ping tick.
#[derive(Debug, Serialize)]
pub struct PingPayload<'a> {
    pub id: &'a str,
    pub browser_id: &'a str,
    pub timestamp: i64,
    pub version: &'a str,
}

/// Round-robin cursor over the equivalent ping mirrors. Advances on
/// every attempt, success or failure, so a dead mirror cannot pin the
/// rotation.
pub struct EndpointRotation {
    urls: Vec<String>,
    next: usize,
}

impl EndpointRotation {
    /// `urls` must be non-empty; sessions validate this at build time.
    pub fn new(urls: Vec<String>) -> Self {
        debug_assert!(!urls.is_empty());
        Self { urls, next: 0 }
    }

    pub fn next_url(&mut self) -> &str {
        let idx = self.next;
        self.next = (self.next + 1) % self.urls.len();
        &self.urls[idx]
    }
}

/// The remote signals a usable ping with a non-empty `data` payload.
fn has_data(body: &Value) -> bool {
    match body.get("data") {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

impl AccountSession {
    /// The account's heartbeat: an indefinite loop that pings a
    /// rotating endpoint, updates the connection state from each
    /// outcome, and sleeps the fixed interval. Individual failures are
    /// absorbed; only cancellation ends the loop.
    pub(crate) async fn run_ping_cycle(
        &self,
        profile: &AccountProfile,
        cancellation_token: CancellationToken,
    ) -> SessionStats {
        let mut rotation = EndpointRotation::new(self.config.endpoints.ping.clone());
        let mut stats = SessionStats::default();

        loop {
            if cancellation_token.is_cancelled() {
                info!("Ping cycle stopping (cancelled).");
                break;
            }

            let url = rotation.next_url().to_string();
            let payload = PingPayload {
                id: &profile.uid,
                browser_id: &self.browser_id,
                timestamp: Utc::now().timestamp(),
                version: CLIENT_VERSION,
            };

            let result = match self.client.call(&url, &payload, &self.token).await {
                Ok(body) if has_data(&body) => {
                    let quality = body
                        .get("data")
                        .and_then(|d| d.get("ip_score"))
                        .map(display_value);
                    PingResult::ok(quality)
                }
                Ok(_) => PingResult::failed("empty or missing data in response"),
                Err(e) => PingResult::failed(e.to_string()),
            };

            let state = ConnectionState::after_ping(&result);
            self.state_tx.send_replace(state);

            if result.success {
                stats.pings_ok += 1;
                info!(
                    target: "session_event",
                    "[AC:{}][P:{}] Connected - ping acknowledged, network quality: {}",
                    self.account_id,
                    self.proxy_id,
                    result.quality.as_deref().unwrap_or("N/A"),
                );
            } else {
                stats.pings_failed += 1;
                warn!(
                    target: "session_event",
                    "[AC:{}][P:{}] Disconnected - {}",
                    self.account_id,
                    self.proxy_id,
                    result.error.as_deref().unwrap_or("ping failed"),
                );
            }

            // Fixed interval, no backoff: every tick waits the same
            // duration regardless of outcome.
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Ping cycle stopping (cancelled during sleep).");
                    break;
                }
                _ = sleep(self.config.ping_interval) => {}
            }
        }

        stats
    }
}
