//! # Borrower Repository
//!
//! Database operations for the two people tables: `users` (regular
//! members, AUTOINCREMENT ids) and `librarians` (administrator-assigned
//! ids, access-level gated).
//!
//! The held-book set is not a column anywhere; the snapshot loader
//! rebuilds it from open loans.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Raw `users` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
}

/// Raw `librarians` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LibrarianRow {
    pub id: i64,
    pub name: String,
    pub access_level: i64,
}

/// Repository for user and librarian database operations.
#[derive(Debug, Clone)]
pub struct BorrowerRepository {
    pool: SqlitePool,
}

impl BorrowerRepository {
    /// Creates a new BorrowerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BorrowerRepository { pool }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Lists all users in id order.
    pub async fn list_users(&self) -> DbResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Inserts a new user, returning the generated id.
    pub async fn insert_user(&self, name: &str) -> DbResult<i64> {
        debug!(name = %name, "Inserting user");

        let result = sqlx::query("INSERT INTO users (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Renames a user.
    pub async fn update_user_name(&self, id: i64, name: &str) -> DbResult<()> {
        debug!(id = %id, "Updating user name");

        let result = sqlx::query("UPDATE users SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes a user row.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such user
    /// * `DbError::ForeignKeyViolation` - loans still reference the user
    pub async fn delete_user(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    // =========================================================================
    // Librarians
    // =========================================================================

    /// Lists all librarians in id order.
    pub async fn list_librarians(&self) -> DbResult<Vec<LibrarianRow>> {
        let rows = sqlx::query_as::<_, LibrarianRow>(
            "SELECT id, name, access_level FROM librarians ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Gets a librarian by id.
    ///
    /// This lookup IS the authentication check: row presence is the sole
    /// factor in the current trust model.
    pub async fn get_librarian(&self, id: i64) -> DbResult<Option<LibrarianRow>> {
        let row = sqlx::query_as::<_, LibrarianRow>(
            "SELECT id, name, access_level FROM librarians WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Registers a librarian under an administrator-assigned id.
    ///
    /// INSERT OR IGNORE: re-registering an existing id is a no-op, never
    /// an error.
    pub async fn insert_librarian(&self, id: i64, name: &str, access_level: i64) -> DbResult<()> {
        debug!(id = %id, name = %name, "Registering librarian");

        sqlx::query(
            "INSERT OR IGNORE INTO librarians (id, name, access_level) VALUES (?1, ?2, ?3)",
        )
        .bind(id)
        .bind(name)
        .bind(access_level)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
