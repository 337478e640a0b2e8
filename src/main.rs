use anyhow::Result;
use clap::Parser;
use nodepulse::{
    bind_accounts, load_proxies, load_tokens, setup_logger, AccountSession, Session,
    SessionConfig, SessionRunner,
};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bearer tokens file, one per line
    #[arg(long, default_value = "tokens.txt")]
    tokens: String,
    /// Proxies file, one per line (optional)
    #[arg(long, default_value = "proxies.txt")]
    proxies: String,
    /// Seconds between pings
    #[arg(long, default_value = "60")]
    interval: u64,
    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,
    /// Log transport-level request errors at error level
    #[arg(long)]
    show_request_errors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    // Keep guard alive for file logging
    std::mem::forget(_log_guard);

    let args = Args::parse();
    info!("Nodepulse starting - automate your account sessions");

    let tokens = match load_tokens(&args.tokens) {
        Ok(t) => t,
        Err(e) => {
            error!("{}. No sessions started.", e);
            return Ok(());
        }
    };

    let proxies = match load_proxies(&args.proxies) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to read proxies: {}. Running without proxies.", e);
            Vec::new()
        }
    };

    let config = SessionConfig {
        ping_interval: Duration::from_secs(args.interval),
        request_timeout: Duration::from_secs(args.timeout),
        show_request_errors: args.show_request_errors,
        ..SessionConfig::default()
    };

    let bindings = bind_accounts(tokens, proxies);
    let mut sessions: Vec<Box<dyn Session>> = Vec::new();

    for (i, binding) in bindings.into_iter().enumerate() {
        let account_id = format!("{:03}", i + 1);
        let proxy_id = if binding.proxy.is_some() {
            format!("{:03}", i + 1)
        } else {
            "000".to_string()
        };

        match AccountSession::new(binding, config.clone(), account_id, proxy_id) {
            Ok(session) => sessions.push(Box::new(session)),
            Err(e) => {
                error!("Failed to build session for account {}: {}", i + 1, e);
            }
        }
    }

    SessionRunner::run_sessions(sessions).await?;

    Ok(())
}
