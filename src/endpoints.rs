use serde::{Deserialize, Serialize};

/// Registry of remote operations. Every operation is a POST with a
/// JSON body; the ping operation may have several equivalent mirrors.
///
/// Injected into sessions so tests can point it at a local server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub session: String,
    pub ping: Vec<String>,
    pub daily_claim: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            session: "http://api.nodepay.ai/api/auth/session".to_string(),
            ping: vec!["https://nw.nodepay.org/api/network/ping".to_string()],
            daily_claim: "https://api.nodepay.org/api/mission/complete-mission".to_string(),
        }
    }
}
