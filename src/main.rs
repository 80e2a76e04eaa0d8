//! Depot Router CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use depot_router::config::RunConfig;
use depot_router::pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("depot_router=info".parse().unwrap()))
        .init();

    let config = RunConfig::parse();

    if let Err(e) = pipeline::run(&config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
