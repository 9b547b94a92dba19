//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::polls;

/// Database row for a poll (queryable).
///
/// `options` is a JSON array of strings.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = polls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PollRow {
    pub id: Option<i32>,
    pub title: String,
    pub options: String,
}

/// Database row for a poll (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = polls)]
pub struct NewPollRow {
    pub title: String,
    pub options: String,
}
