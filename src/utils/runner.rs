use crate::session::Session;
use anyhow::Result;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

pub struct SessionRunner;

impl SessionRunner {
    /// Spawns every account session as an independent concurrent task
    /// and waits for all of them. Sessions run until Ctrl+C cancels
    /// the shared token; one session's failure never touches another.
    pub async fn run_sessions(sessions: Vec<Box<dyn Session>>) -> Result<()> {
        let mut set = JoinSet::new();

        let token = CancellationToken::new();
        let cloned_token = token.clone();

        // Listen for Ctrl+C and turn it into cooperative cancellation
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let start_time = std::time::Instant::now();
        info!("Starting {} account sessions...", sessions.len());

        for (i, session) in sessions.into_iter().enumerate() {
            let id = i + 1;
            let span = tracing::info_span!("session", session_id = format!("{:03}", id));
            let child_token = token.clone();

            set.spawn(
                async move {
                    match session.start(child_token).await {
                        Ok(stats) => Ok(stats),
                        Err(e) => {
                            error!("Session {} ended: {:?}", id, e);
                            Err(e)
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut total_ok = 0;
        let mut total_failed = 0;
        let mut rejected = 0;

        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(stats)) => {
                    total_ok += stats.pings_ok;
                    total_failed += stats.pings_failed;
                }
                Ok(Err(_)) => {
                    // Already logged in the session task
                    rejected += 1;
                }
                Err(e) => {
                    error!("A session task panicked or failed to join: {:?}", e);
                }
            }
        }

        let total_duration = start_time.elapsed();
        info!("Shutdown Complete.");
        info!(
            "Uptime: {:.1}s | Pings OK: {} | Pings Failed: {} | Sessions Rejected: {}",
            total_duration.as_secs_f64(),
            total_ok,
            total_failed,
            rejected
        );

        Ok(())
    }
}
