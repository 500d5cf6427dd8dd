use anyhow::{Context, Result};
use clap::Parser;
use iris_dashboard::{create_router, query, AppState, Config};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "iris-dashboard", about = "Interactive iris data dashboard")]
struct Cli {
    /// Config file name (without extension)
    #[arg(long, default_value = "config/iris-dashboard")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iris_dashboard=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "HTTP server will bind to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );

    // The dataset and the query engine are process-wide; both are set up
    // once here, before the first request.
    let dataset = iris_dashboard::dataset::get().context("failed to load bundled dataset")?;
    info!(rows = dataset.len(), "dataset ready");

    query::init();

    let state = AppState::new(&cfg)?;
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("serving dashboard on http://{}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
