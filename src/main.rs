use std::sync::Arc;

use tracing::{error, info};
use twittervotes::adapter::outbound::twitter::TwitterCredentials;
use twittervotes::error::Result;
use twittervotes::infrastructure::bootstrap;
use twittervotes::infrastructure::config::settings::Config;
use twittervotes::infrastructure::shutdown::SignalListener;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load_or_default(Config::path_from_env()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "twittervotes starting");

    if let Err(e) = run(config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("twittervotes stopped");
}

async fn run(config: Config) -> Result<()> {
    let signals = SignalListener::install()?;
    let credentials = TwitterCredentials::from_env()?;
    let store = Arc::new(bootstrap::init_poll_store(&config)?);
    let pipeline = bootstrap::build_pipeline(&config, credentials, Arc::clone(&store))?;

    let summary = pipeline
        .run(async move {
            let signal = signals.recv().await;
            info!(signal, "Shutdown signal received");
        })
        .await?;

    info!(
        published = summary.published,
        failed = summary.failed,
        "Votes published"
    );
    bootstrap::close_poll_store(store);
    Ok(())
}
