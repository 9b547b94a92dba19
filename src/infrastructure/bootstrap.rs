//! Composition root: concrete adapters wired into a [`Pipeline`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::nsq::NsqProducer;
use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqlitePollStore;
use crate::adapter::outbound::twitter::{TwitterCredentials, TwitterStream};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::{Pipeline, PipelineSettings};
use crate::port::outbound::options::OptionProvider;
use crate::port::outbound::stream::StreamSource;

/// Open the poll store at `config.database`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub fn init_poll_store(config: &Config) -> Result<SqlitePollStore> {
    let pool = connection::open(&config.database)?;
    info!(database = %config.database, "Poll store opened");
    Ok(SqlitePollStore::new(pool))
}

/// Release the poll store once the pipeline has let go of it.
///
/// Returns `false` if another owner still holds the store.
pub fn close_poll_store(store: Arc<SqlitePollStore>) -> bool {
    match Arc::try_unwrap(store) {
        Ok(store) => {
            drop(store);
            info!("Poll store closed");
            true
        }
        Err(_) => {
            warn!("Poll store still in use at exit");
            false
        }
    }
}

/// Build the production pipeline: SQLite options, Twitter stream, nsqd.
///
/// # Errors
///
/// Returns an error if the stream client cannot be built.
pub fn build_pipeline(
    config: &Config,
    credentials: TwitterCredentials,
    store: Arc<SqlitePollStore>,
) -> Result<Pipeline> {
    let options: Arc<dyn OptionProvider> = store;

    let source: Arc<dyn StreamSource> = Arc::new(TwitterStream::new(&config.stream, credentials)?);
    info!(endpoint = %config.stream.endpoint, "Stream client ready");

    let broker = NsqProducer::new(&config.broker);
    info!(
        address = broker.address(),
        topic = %config.broker.topic,
        "Broker producer ready"
    );

    Ok(Pipeline::assemble(
        options,
        source,
        Box::new(broker),
        PipelineSettings::from_config(config),
    ))
}
