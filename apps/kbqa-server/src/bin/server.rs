use std::sync::Arc;

use anyhow::Context;
use kbqa_core::config::{resolve_with_base, Config};
use kbqa_server::telemetry::init_tracing;
use kbqa_server::{build_router, ServiceContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Config::load()?.settings()?;
    let base = std::env::current_dir()?;

    let ctx = match ServiceContext::from_settings(&settings, &base).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "startup failed");
            return Err(e);
        }
    };
    tracing::info!(chunks = ctx.chunks_loaded(), rows = ctx.index_size(), "knowledge base ready");

    let static_dir = resolve_with_base(&base, &settings.server.static_dir);
    let app = build_router(Arc::new(ctx), &static_dir);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
