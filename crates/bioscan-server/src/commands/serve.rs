use super::{runtime, Context};
use anyhow::{Context as _, Result};
use bioscan_server::router;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn serve(ctx: Context, args: ServeArgs) -> Result<()> {
    let host = args.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = args.port.unwrap_or(ctx.config.server.port);
    if ctx.credentials().is_none() {
        warn!("no upstream credentials configured; POST /login before fetching profiles");
    }
    let state = Arc::new(ctx.build_state()?);
    let app = router(state);

    runtime()?.block_on(async move {
        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        info!(%addr, "listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .with_context(|| "serve http")
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not install shutdown handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
