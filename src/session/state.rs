/// Local belief about whether the last ping for an account succeeded.
/// One instance per account, written only by that account's ping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Before the first ping attempt.
    NoneConnection,
    /// Last ping succeeded with usable data.
    Connected,
    /// Last ping failed or returned no data.
    Disconnected,
}

impl ConnectionState {
    /// Transitions are memoryless: the state after a ping depends only
    /// on that ping's outcome, never on the previous state.
    pub fn after_ping(result: &PingResult) -> Self {
        if result.success {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

/// Outcome of a single ping attempt. Consumed immediately to update
/// the connection state and logs; never retained.
#[derive(Debug, Clone, Default)]
pub struct PingResult {
    pub success: bool,
    /// Network quality score reported by the remote, when present.
    pub quality: Option<String>,
    pub error: Option<String>,
}

impl PingResult {
    pub fn ok(quality: Option<String>) -> Self {
        Self {
            success: true,
            quality,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            quality: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_always_yields_connected() {
        let result = PingResult::ok(Some("92".to_string()));
        assert_eq!(
            ConnectionState::after_ping(&result),
            ConnectionState::Connected
        );
    }

    #[test]
    fn failure_always_yields_disconnected() {
        let result = PingResult::failed("timeout");
        assert_eq!(
            ConnectionState::after_ping(&result),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn transition_ignores_prior_state() {
        // Memoryless: the same outcome maps to the same state no
        // matter what came before.
        let ok = PingResult::ok(None);
        let fail = PingResult::failed("no data");

        for _prior in [
            ConnectionState::NoneConnection,
            ConnectionState::Connected,
            ConnectionState::Disconnected,
        ] {
            assert_eq!(
                ConnectionState::after_ping(&ok),
                ConnectionState::Connected
            );
            assert_eq!(
                ConnectionState::after_ping(&fail),
                ConnectionState::Disconnected
            );
        }
    }
}
