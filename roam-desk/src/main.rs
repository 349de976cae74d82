use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod checkout;
mod cli;
mod commands;
mod term;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roam_desk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();

    let config = roam_client::Config::load()?;
    let client = Arc::new(roam_client::StorefrontClient::new(&config)?);
    if let Some(token) = cli.token.clone() {
        client.set_session_token(Some(token));
    }

    commands::run(cli, config, client).await
}
