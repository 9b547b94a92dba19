//! SQLite poll store implementation.
//!
//! Every poll carries a list of options; the union of all options across all
//! polls is the set of tracked terms.

use async_trait::async_trait;
use diesel::prelude::*;
use tracing::debug;

use super::database::connection::DbPool;
use super::database::model::{NewPollRow, PollRow};
use super::database::schema::polls;
use crate::domain::TrackedTerm;
use crate::error::{Error, Result};
use crate::port::outbound::options::OptionProvider;

/// SQLite-backed poll store.
///
/// Implements [`OptionProvider`] by reading every poll on each call.
#[derive(Clone)]
pub struct SqlitePollStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqlitePollStore {
    /// Create a new SQLite poll store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a poll with the given options.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    pub fn insert_poll(&self, title: &str, options: &[TrackedTerm]) -> Result<()> {
        let row = NewPollRow {
            title: title.to_string(),
            options: serde_json::to_string(options)?,
        };
        let mut conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        diesel::insert_into(polls::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Options of every poll, concatenated in poll order.
    ///
    /// # Errors
    /// Returns an error if the query fails or a poll's options are not a JSON
    /// array of strings.
    pub fn load_options(&self) -> Result<Vec<TrackedTerm>> {
        let mut conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let rows: Vec<PollRow> = polls::table
            .order(polls::id.asc())
            .select(PollRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut terms = Vec::new();
        for row in rows {
            let options: Vec<TrackedTerm> = serde_json::from_str(&row.options).map_err(|e| {
                Error::Database(format!(
                    "poll {} ('{}') has malformed options: {e}",
                    row.id.unwrap_or_default(),
                    row.title
                ))
            })?;
            terms.extend(options);
        }
        Ok(terms)
    }
}

#[async_trait]
impl OptionProvider for SqlitePollStore {
    async fn load_tracked_terms(&self) -> Result<Vec<TrackedTerm>> {
        let store = self.clone();
        let terms = tokio::task::spawn_blocking(move || store.load_options()).await??;
        debug!(terms = terms.len(), "Loaded tracked terms");
        Ok(terms)
    }
}
