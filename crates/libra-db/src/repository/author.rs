//! # Author Repository
//!
//! Database operations for authors.
//!
//! Authors have a UNIQUE name and are never deleted: removing a book
//! leaves its author row in place, since other books may share it. The
//! surface here is read-side only — author creation and bio edits ride
//! the book repository's transactions, where they belong to a larger
//! atomic write.

use sqlx::SqlitePool;

use crate::error::DbResult;
use libra_core::Author;

/// Raw `authors` row. `bio` is nullable in the schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author::new(row.id, row.name, row.bio.unwrap_or_default())
    }
}

/// Repository for author database operations.
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    /// Creates a new AuthorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuthorRepository { pool }
    }

    /// Lists all authors in id order.
    pub async fn list(&self) -> DbResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            "SELECT id, name, bio FROM authors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }
}
