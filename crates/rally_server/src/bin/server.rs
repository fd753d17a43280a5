use anyhow::Result;
use rally_server::{config, router, App};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;
    rally_server::logging::init_tracing(&cfg);

    let bind_addr = cfg.bind_addr.clone();
    let app = App::init_from(cfg)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "rally server listening");
    axum::serve(listener, router(app)).await?;
    Ok(())
}
