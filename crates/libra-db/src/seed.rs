//! # First-Run Demo Seed
//!
//! Populates an empty catalog with a handful of demo rows so a fresh
//! install has something to show: two authors, their two books, and two
//! users.
//!
//! This is a one-time convenience, not a schema migration step. The
//! engine triggers it only when the book catalog loads empty, and a
//! seeding failure is logged rather than treated as fatal.

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use libra_core::BookStatus;

/// Demo rows: (author name, bio, book title, year).
const DEMO_BOOKS: &[(&str, &str, &str, i64)] = &[
    (
        "Leo Tolstoy",
        "Great Russian writer",
        "War and Peace",
        1869,
    ),
    (
        "Fyodor Dostoevsky",
        "Classic of Russian literature",
        "Crime and Punishment",
        1866,
    ),
];

/// Demo user names.
const DEMO_USERS: &[&str] = &["Ivan Ivanov", "Maria Petrova"];

/// Inserts the demo catalog in one transaction.
pub async fn seed_demo_data(db: &Database) -> DbResult<()> {
    info!("Seeding demo data into an empty catalog");

    let mut tx = db.pool().begin().await?;

    for (author_name, bio, title, year) in DEMO_BOOKS {
        let result = sqlx::query("INSERT INTO authors (name, bio) VALUES (?1, ?2)")
            .bind(author_name)
            .bind(bio)
            .execute(&mut *tx)
            .await?;
        let author_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO books (title, author_id, year, status) VALUES (?1, ?2, ?3, ?4)")
            .bind(title)
            .bind(author_id)
            .bind(year)
            .bind(BookStatus::Available)
            .execute(&mut *tx)
            .await?;
    }

    for name in DEMO_USERS {
        sqlx::query("INSERT INTO users (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Demo data seeded");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
