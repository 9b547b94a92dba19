use tempfile::TempDir;
use twittervotes::adapter::outbound::sqlite::database::connection::{open, DbPool};
use twittervotes::adapter::outbound::sqlite::SqlitePollStore;

/// Temporary poll database, removed on drop.
pub struct TempDb {
    pool: DbPool,
    path: String,
    _dir: TempDir,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ballots.db").display().to_string();
        let pool = open(&path).expect("open poll database");
        Self {
            pool,
            path,
            _dir: dir,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> SqlitePollStore {
        SqlitePollStore::new(self.pool.clone())
    }
}
