use std::io as stdio;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{self, BufReader};

use pitwall::config::Config;
use pitwall::dashboard::Dashboard;
use pitwall::logging::{log, obj, v_str, Domain, Level};
use pitwall::service::{self, PredictionService};
use pitwall::ui::{RenderTarget, TerminalDisplay};

/// Resolves on every Ctrl-C. Never resolves if the handler can't be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("msg", v_str("F1 Pit Strategy Optimizer")), ("api_url", v_str(cfg.api_url.as_str()))]),
    );

    let service: Arc<dyn PredictionService + Send + Sync> = Arc::from(service::build(&cfg)?);
    let mut dashboard = Dashboard::new(service, &cfg);
    let mut display = TerminalDisplay::new(stdio::stdout());

    dashboard.start(&mut display).await;
    display.line("type help for commands");

    // Ctrl-C at the prompt ends the session; during a submit it cancels the request.
    dashboard.run_session(BufReader::new(io::stdin()), &mut display, interrupted).await?;

    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[("predictions", serde_json::json!(dashboard.orchestrator().history().len()))]),
    );
    Ok(())
}
