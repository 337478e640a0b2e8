pub mod ping;
pub mod state;

use crate::client::ApiClient;
use crate::config::{ProxyConfig, SessionConfig, DAILY_MISSION_ID};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use state::ConnectionState;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// One credential paired with its dedicated outbound proxy, assigned
/// by list position for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct AccountBinding {
    pub token: String,
    pub proxy: Option<ProxyConfig>,
}

/// Pairs credentials with proxies by index. Credentials beyond the
/// proxy list length run without a proxy; order is preserved and no
/// proxy is validated for reachability here.
pub fn bind_accounts(tokens: Vec<String>, proxies: Vec<ProxyConfig>) -> Vec<AccountBinding> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| AccountBinding {
            token,
            proxy: proxies.get(i).cloned(),
        })
        .collect()
}

/// Result of authentication. `uid` and `name` fall back to a sentinel
/// when the remote omits them; every other response field is kept
/// opaquely in `extra` and never interpreted.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub uid: String,
    pub name: String,
    pub extra: Map<String, Value>,
}

impl AccountProfile {
    fn from_data(data: &Map<String, Value>) -> Self {
        let uid = data
            .get("uid")
            .map(display_value)
            .unwrap_or_else(|| "Unknown".to_string());
        let name = data
            .get("name")
            .map(display_value)
            .unwrap_or_else(|| "Unknown".to_string());

        let extra: Map<String, Value> = data
            .iter()
            .filter(|(k, _)| k.as_str() != "uid" && k.as_str() != "name")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self { uid, name, extra }
    }
}

/// Renders a JSON scalar without surrounding quotes for strings.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn code_ok(body: &Value) -> bool {
    body.get("code").and_then(Value::as_i64) == Some(0)
}

#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub pings_ok: u64,
    pub pings_failed: u64,
}

/// A runnable account session: the full concurrent lifecycle for one
/// credential (authenticate, ping loop, reward claim).
#[async_trait]
pub trait Session: Send + Sync {
    async fn start(&self, cancellation_token: CancellationToken) -> Result<SessionStats>;
}

pub struct AccountSession {
    pub(crate) token: String,
    pub(crate) client: ApiClient,
    pub(crate) config: SessionConfig,
    /// Random identity minted once per session, reused on every ping.
    /// Distinguishes this login from other logins of the same account.
    pub(crate) browser_id: String,
    pub(crate) account_id: String,
    pub(crate) proxy_id: String,
    proxy_url: Option<String>,
    pub(crate) state_tx: watch::Sender<ConnectionState>,
}

impl AccountSession {
    pub fn new(
        binding: AccountBinding,
        config: SessionConfig,
        account_id: String,
        proxy_id: String,
    ) -> Result<Self> {
        anyhow::ensure!(
            !config.endpoints.ping.is_empty(),
            "no ping endpoints configured"
        );

        let client = ApiClient::new(
            binding.proxy.as_ref(),
            config.request_timeout,
            config.show_request_errors,
        )?;
        let (state_tx, _) = watch::channel(ConnectionState::NoneConnection);

        Ok(Self {
            token: binding.token,
            client,
            config,
            browser_id: Uuid::new_v4().to_string(),
            account_id,
            proxy_id,
            proxy_url: binding.proxy.map(|p| p.url),
            state_tx,
        })
    }

    /// Read-only view of this account's connection state.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Calls the session endpoint with an empty payload. `None` on any
    /// failure; the caller must not start a ping cycle without a
    /// profile.
    async fn authenticate(&self) -> Option<AccountProfile> {
        let url = self.config.endpoints.session.clone();
        let body = self.client.call(&url, &json!({}), &self.token).await.ok()?;

        if !code_ok(&body) {
            return None;
        }
        let data = body.get("data")?.as_object()?;
        Some(AccountProfile::from_data(data))
    }

    /// One-shot daily reward claim. Logged either way, never retried,
    /// never blocks the ping cycle.
    async fn claim_daily(&self) -> bool {
        let url = self.config.endpoints.daily_claim.clone();
        let payload = json!({ "mission_id": DAILY_MISSION_ID });

        match self.client.call(&url, &payload, &self.token).await {
            Ok(body) if code_ok(&body) => {
                info!(
                    target: "session_event",
                    "[AC:{}][P:{}] Daily reward claimed",
                    self.account_id, self.proxy_id,
                );
                true
            }
            _ => {
                warn!(
                    target: "session_event",
                    "[AC:{}][P:{}] Failed to claim daily reward",
                    self.account_id, self.proxy_id,
                );
                false
            }
        }
    }
}

#[async_trait]
impl Session for AccountSession {
    async fn start(&self, cancellation_token: CancellationToken) -> Result<SessionStats> {
        let span = tracing::info_span!(
            "session_context",
            account_id = self.account_id.as_str(),
            proxy_id = self.proxy_id.as_str()
        );

        async move {
            let Some(profile) = self.authenticate().await else {
                anyhow::bail!("authentication rejected, session not started");
            };

            info!(
                target: "session_event",
                "[AC:{}][P:{}] Authenticated as '{}' (uid {}), proxy: {}",
                self.account_id,
                self.proxy_id,
                profile.name,
                profile.uid,
                self.proxy_url.as_deref().unwrap_or("direct"),
            );

            // The claim runs alongside the heartbeat so it actually
            // fires once shortly after the first ping, instead of
            // waiting behind a loop that never completes.
            let (stats, _claimed) = tokio::join!(
                self.run_ping_cycle(&profile, cancellation_token),
                self.claim_daily()
            );

            Ok(stats)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_defaults_missing_fields_to_sentinel() {
        let data = json!({"balance": 12.5});
        let profile = AccountProfile::from_data(data.as_object().unwrap());

        assert_eq!(profile.uid, "Unknown");
        assert_eq!(profile.name, "Unknown");
        assert_eq!(profile.extra.get("balance"), Some(&json!(12.5)));
    }

    #[test]
    fn profile_keeps_unrecognized_fields_opaque() {
        let data = json!({"uid": 4217, "name": "alice", "tier": "gold"});
        let profile = AccountProfile::from_data(data.as_object().unwrap());

        assert_eq!(profile.uid, "4217");
        assert_eq!(profile.name, "alice");
        assert!(!profile.extra.contains_key("uid"));
        assert!(!profile.extra.contains_key("name"));
        assert_eq!(profile.extra.get("tier"), Some(&json!("gold")));
    }

    #[test]
    fn envelope_code_check() {
        assert!(code_ok(&json!({"code": 0, "data": {}})));
        assert!(!code_ok(&json!({"code": 1})));
        assert!(!code_ok(&json!({"data": {}})));
        assert!(!code_ok(&json!({"code": "0"})));
    }
}
