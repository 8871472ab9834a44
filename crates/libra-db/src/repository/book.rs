//! # Book Repository
//!
//! Database operations for the book catalog.
//!
//! ## Add-Book Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  insert_with_author("War and Peace", "Leo Tolstoy", bio, 1869)  │
//! │                                                                 │
//! │  BEGIN                                                          │
//! │    SELECT id FROM authors WHERE name = 'Leo Tolstoy'            │
//! │       │                                                         │
//! │       ├── found    → reuse id (bio untouched: first writer      │
//! │       │              wins the bio at creation only)             │
//! │       └── absent   → INSERT INTO authors (name, bio)            │
//! │                                                                 │
//! │    INSERT INTO books (title, author_id, year, 'available')      │
//! │  COMMIT  ← both writes or neither                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use libra_core::BookStatus;

/// Raw `books` row, unresolved. The snapshot loader joins `author_id`
/// against the author set; a row whose author cannot be resolved is
/// dropped and reported rather than crashing startup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub year: i64,
    pub status: BookStatus,
}

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Lists all book rows in id order.
    pub async fn list_rows(&self) -> DbResult<Vec<BookRow>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT id, title, author_id, year, status FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a book, creating its author when absent.
    ///
    /// Author lookup is by exact name. When the author already exists
    /// its row - including the bio - is reused untouched; `author_bio`
    /// only lands on a freshly created author.
    ///
    /// ## Returns
    /// The new book's id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - racing duplicate author name
    /// * `DbError::CheckViolation` - non-positive year
    pub async fn insert_with_author(
        &self,
        title: &str,
        author_name: &str,
        author_bio: &str,
        year: i64,
    ) -> DbResult<i64> {
        debug!(title = %title, author = %author_name, "Inserting book");

        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE name = ?1")
            .bind(author_name)
            .fetch_optional(&mut *tx)
            .await?;

        let author_id = match existing {
            Some(id) => id,
            None => {
                let result = sqlx::query("INSERT INTO authors (name, bio) VALUES (?1, ?2)")
                    .bind(author_name)
                    .bind(author_bio)
                    .execute(&mut *tx)
                    .await?;
                result.last_insert_rowid()
            }
        };

        let result = sqlx::query(
            "INSERT INTO books (title, author_id, year, status) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(title)
        .bind(author_id)
        .bind(year)
        .bind(BookStatus::Available)
        .execute(&mut *tx)
        .await?;

        let book_id = result.last_insert_rowid();
        tx.commit().await?;

        Ok(book_id)
    }

    /// Edits a book. Each provided field updates independently, but all
    /// updates ride ONE transaction: if any statement fails, none of the
    /// already-issued updates survive.
    ///
    /// ## Arguments
    /// * `title` - new title, when provided
    /// * `year` - new publication year, when provided (the schema's
    ///   CHECK rejects non-positive values; the engine validates earlier)
    /// * `author_bio` - new biography for the book's author, when provided
    pub async fn edit(
        &self,
        book_id: i64,
        title: Option<&str>,
        year: Option<i64>,
        author_bio: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %book_id, "Editing book");

        let mut tx = self.pool.begin().await?;

        // Target must exist; a blind UPDATE would silently no-op.
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?1")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Book", book_id));
        }

        if let Some(title) = title {
            sqlx::query("UPDATE books SET title = ?2 WHERE id = ?1")
                .bind(book_id)
                .bind(title)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(year) = year {
            sqlx::query("UPDATE books SET year = ?2 WHERE id = ?1")
                .bind(book_id)
                .bind(year)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(bio) = author_bio {
            sqlx::query(
                "UPDATE authors SET bio = ?2 \
                 WHERE id = (SELECT author_id FROM books WHERE id = ?1)",
            )
            .bind(book_id)
            .bind(bio)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a book row.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such book
    /// * `DbError::ForeignKeyViolation` - loans still reference the book
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting book");

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Counts books (used by the first-run bootstrap check).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
