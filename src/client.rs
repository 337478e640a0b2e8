use crate::config::ProxyConfig;
use crate::error::NetworkError;
use anyhow::Result;
use rand::Rng;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const ORIGIN: &str = "https://app.nodepay.ai";
const REFERER: &str = "https://app.nodepay.ai/";
const ACCEPT: &str = "application/json, text/plain, */*";

/// Issues one authenticated POST at a time on behalf of a single
/// account, optionally through that account's proxy. No retries live
/// here; retry policy belongs to callers.
pub struct ApiClient {
    http: Client,
    timeout: Duration,
    show_request_errors: bool,
}

/// Synthetic User-Agent drawn from a bounded plausible range so that
/// accounts sharing infrastructure do not present identical clients.
fn synth_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let nt: u32 = rng.gen_range(7..=11);
    let chrome: u32 = rng.gen_range(100..=130);
    format!(
        "Mozilla/5.0 (Windows NT {nt}.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/{chrome}.0.0.0 Safari/537.36"
    )
}

impl ApiClient {
    pub fn new(
        proxy: Option<&ProxyConfig>,
        timeout: Duration,
        show_request_errors: bool,
    ) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(proxy_conf) = proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_conf.url)?;
            if let (Some(u), Some(p)) = (&proxy_conf.username, &proxy_conf.password) {
                proxy = proxy.basic_auth(u, p);
            }
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            http: builder.build()?,
            timeout,
            show_request_errors,
        })
    }

    /// One network round trip: POST `payload` to `url` as the given
    /// bearer token. Returns the parsed JSON envelope or a classified
    /// transport error. Errors are logged here (level depends on the
    /// verbose-error switch) so callers can simply drop them.
    pub async fn call<P: Serialize>(
        &self,
        url: &str,
        payload: &P,
        token: &str,
    ) -> Result<Value, NetworkError> {
        match self.post_json(url, payload, token).await {
            Ok(body) => Ok(body),
            Err(e) => {
                if self.show_request_errors {
                    error!("API call failed: {e}");
                } else {
                    debug!("API call failed: {e}");
                }
                Err(e)
            }
        }
    }

    async fn post_json<P: Serialize>(
        &self,
        url: &str,
        payload: &P,
        token: &str,
    ) -> Result<Value, NetworkError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", synth_user_agent())
            .header("Accept", ACCEPT)
            .header("Origin", ORIGIN)
            .header("Referer", REFERER)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus {
                status_code: status.as_u16(),
                endpoint: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn classify(&self, url: &str, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: url.to_string(),
            }
        } else {
            NetworkError::RequestFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
