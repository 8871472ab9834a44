//! Integration tests for the lending engine.
//!
//! Each test opens a fresh engine (in-memory unless it needs to survive
//! a restart) and drives it through the public surface only.

use libra_core::BookStatus;
use libra_engine::{DbConfig, EngineError, LendingEngine};
use tracing_subscriber::EnvFilter;

/// Routes engine logs to the test harness; `RUST_LOG` controls the
/// level. Safe to call from every test; only the first install wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn test_engine() -> LendingEngine {
    init_tracing();
    LendingEngine::open(DbConfig::in_memory()).await.unwrap()
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
async fn empty_store_is_seeded_with_demo_data() {
    let engine = test_engine().await;

    assert_eq!(engine.books().len(), 2);
    assert_eq!(engine.authors().len(), 2);
    assert_eq!(engine.users().len(), 2);
    assert!(engine.loans().is_empty());
    assert!(engine.reconciliation_report().is_clean());

    let hits = engine.find_books_by_title("war and peace");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].author.name, "Leo Tolstoy");
}

// =============================================================================
// Lending Lifecycle
// =============================================================================

#[tokio::test]
async fn issue_and_return_full_cycle() {
    let mut engine = test_engine().await;

    let book_id = engine.books()[0].id;
    let user_id = engine.users()[0].id;

    let loan = engine.issue_book(user_id, book_id).await.unwrap();
    assert!(loan.is_open());
    assert_eq!(loan.book_id, book_id);
    assert_eq!(loan.user_id, user_id);

    // Status flipped, held-set rebuilt, loan visible as active
    assert_eq!(engine.book(book_id).unwrap().status, BookStatus::OnLoan);
    assert!(engine.user(user_id).unwrap().holds(book_id));
    assert_eq!(engine.active_loans().len(), 1);

    let closed = engine.return_book(loan.id).await.unwrap();
    assert!(!closed.is_open());

    assert_eq!(engine.book(book_id).unwrap().status, BookStatus::Available);
    assert!(!engine.user(user_id).unwrap().holds(book_id));
    assert!(engine.active_loans().is_empty());
    // The closed loan stays on record
    assert_eq!(engine.loans().len(), 1);
}

#[tokio::test]
async fn book_on_loan_cannot_be_issued_again() {
    let mut engine = test_engine().await;

    let book_id = engine.books()[0].id;
    let first_user = engine.users()[0].id;
    let second_user = engine.users()[1].id;

    engine.issue_book(first_user, book_id).await.unwrap();

    let err = engine.issue_book(second_user, book_id).await.unwrap_err();
    assert!(matches!(err, EngineError::BookUnavailable { book_id: b } if b == book_id));

    // Only one open loan exists for the book
    assert_eq!(engine.active_loans().len(), 1);
}

#[tokio::test]
async fn member_capacity_is_three() {
    let mut engine = test_engine().await;

    let user = engine.register_user("Heavy Reader").await.unwrap();
    let mut book_ids = Vec::new();
    for i in 0..4 {
        let book = engine
            .add_book(&format!("Volume {i}"), "Prolific Author", "", 2000)
            .await
            .unwrap();
        book_ids.push(book.id);
    }

    for &book_id in &book_ids[..3] {
        engine.issue_book(user.id, book_id).await.unwrap();
    }

    let err = engine.issue_book(user.id, book_ids[3]).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::BorrowLimitReached { limit: 3, .. }
    ));
    // The fourth book is untouched
    assert_eq!(
        engine.book(book_ids[3]).unwrap().status,
        BookStatus::Available
    );
}

#[tokio::test]
async fn return_is_not_repeatable() {
    let mut engine = test_engine().await;

    let book_id = engine.books()[0].id;
    let user_id = engine.users()[0].id;

    let loan = engine.issue_book(user_id, book_id).await.unwrap();
    let closed = engine.return_book(loan.id).await.unwrap();
    let first_return_date = closed.return_date;

    let err = engine.return_book(loan.id).await.unwrap_err();
    assert!(matches!(err, EngineError::LoanAlreadyClosed { loan_id } if loan_id == loan.id));

    // The first return's date was not rewritten
    assert_eq!(engine.loan(loan.id).unwrap().return_date, first_return_date);
}

#[tokio::test]
async fn issue_checks_user_before_book() {
    let mut engine = test_engine().await;

    // Both ids unknown: the user check fires first
    let err = engine.issue_book(999, 888).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "user", id: 999 }));

    // Known user, unknown book
    let user_id = engine.users()[0].id;
    let err = engine.issue_book(user_id, 888).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "book", id: 888 }));
}

// =============================================================================
// Catalog Management
// =============================================================================

#[tokio::test]
async fn duplicate_author_name_reuses_the_author() {
    let mut engine = test_engine().await;
    let authors_before = engine.authors().len();

    let first = engine
        .add_book("Anna Karenina", "New Author", "Original bio", 1878)
        .await
        .unwrap();
    let second = engine
        .add_book("Resurrection", "New Author", "A different bio", 1899)
        .await
        .unwrap();
    let third = engine
        .add_book("Hadji Murat", "New Author", "Yet another bio", 1912)
        .await
        .unwrap();

    // One author row, first writer's bio kept
    assert_eq!(engine.authors().len(), authors_before + 1);
    assert_eq!(second.author.id, first.author.id);
    assert_eq!(third.author.id, first.author.id);
    assert_eq!(second.author.bio, "Original bio");
    assert_eq!(third.author.bio, "Original bio");
}

#[tokio::test]
async fn add_book_rejects_bad_input_before_writing() {
    let mut engine = test_engine().await;
    let books_before = engine.books().len();

    let err = engine.add_book("", "Leo Tolstoy", "", 1869).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_book("Future Book", "Leo Tolstoy", "", 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(engine.books().len(), books_before);
}

#[tokio::test]
async fn edit_book_is_all_or_nothing() {
    let mut engine = test_engine().await;

    let book = engine
        .add_book("Draft Title", "Some Author", "bio", 1990)
        .await
        .unwrap();

    // A bad year in the same call as a good title changes nothing
    let err = engine
        .edit_book(book.id, Some("Final Title"), Some(-5), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.book(book.id).unwrap().title, "Draft Title");

    // A valid edit updates every provided field
    let edited = engine
        .edit_book(book.id, Some("Final Title"), Some(1991), Some("new bio"))
        .await
        .unwrap();
    assert_eq!(edited.title, "Final Title");
    assert_eq!(edited.year, 1991);
    assert_eq!(edited.author.bio, "new bio");

    let err = engine
        .edit_book(999, Some("Ghost"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "book", .. }));
}

#[tokio::test]
async fn remove_book_refused_while_loans_reference_it() {
    let mut engine = test_engine().await;

    let book_id = engine.books()[0].id;
    let user_id = engine.users()[0].id;

    // Open loan blocks removal
    let loan = engine.issue_book(user_id, book_id).await.unwrap();
    let err = engine.remove_book(book_id).await.unwrap_err();
    assert!(matches!(err, EngineError::EntityInUse { entity: "book", .. }));

    // Closed loan is history and still blocks removal
    engine.return_book(loan.id).await.unwrap();
    let err = engine.remove_book(book_id).await.unwrap_err();
    assert!(matches!(err, EngineError::EntityInUse { entity: "book", .. }));

    // A never-lent book removes cleanly; its author survives
    let fresh = engine
        .add_book("Unread", "Leo Tolstoy", "", 1880)
        .await
        .unwrap();
    engine.remove_book(fresh.id).await.unwrap();
    assert!(engine.book(fresh.id).is_none());
    assert!(!engine.find_authors_by_name("Tolstoy").is_empty());
}

// =============================================================================
// People Management
// =============================================================================

#[tokio::test]
async fn user_lifecycle() {
    let mut engine = test_engine().await;

    let user = engine.register_user("Anna Sokolova").await.unwrap();
    assert_eq!(engine.user(user.id).unwrap().name, "Anna Sokolova");

    engine.edit_user(user.id, "Anna Orlova").await.unwrap();
    assert_eq!(engine.user(user.id).unwrap().name, "Anna Orlova");

    // An open loan blocks deletion
    let book_id = engine.books()[0].id;
    engine.issue_book(user.id, book_id).await.unwrap();
    let err = engine.delete_user(user.id).await.unwrap_err();
    assert!(matches!(err, EngineError::EntityInUse { entity: "user", .. }));

    // A user with no loan history deletes cleanly
    let disposable = engine.register_user("One Visit").await.unwrap();
    engine.delete_user(disposable.id).await.unwrap();
    assert!(engine.user(disposable.id).is_none());
}

#[tokio::test]
async fn librarian_registration_and_authentication() {
    let mut engine = test_engine().await;

    let librarian = engine
        .register_librarian(100, "Head Librarian", 2)
        .await
        .unwrap();
    assert_eq!(librarian.access_level(), Some(2));
    assert!(librarian.can_manage_catalog());

    // Known id authenticates
    let authed = engine.authenticate(100).await.unwrap().unwrap();
    assert_eq!(authed.name, "Head Librarian");

    // Unknown id is an ordinary None, not an error
    assert!(engine.authenticate(777).await.unwrap().is_none());

    // Re-registering the same id is a no-op
    let again = engine
        .register_librarian(100, "Impostor", 5)
        .await
        .unwrap();
    assert_eq!(again.name, "Head Librarian");
    assert_eq!(again.access_level(), Some(2));
}

// =============================================================================
// Durability
// =============================================================================

#[tokio::test]
async fn state_survives_a_restart() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");

    let (book_id, user_id, loan_id) = {
        let mut engine = LendingEngine::open(DbConfig::new(&path)).await.unwrap();

        let book = engine
            .add_book("Persistent Novel", "Durable Author", "bio", 2001)
            .await
            .unwrap();
        let user = engine.register_user("Returning Patron").await.unwrap();
        let loan = engine.issue_book(user.id, book.id).await.unwrap();

        engine.close().await;
        (book.id, user.id, loan.id)
    };

    let engine = LendingEngine::open(DbConfig::new(&path)).await.unwrap();

    // No reseed on a non-empty store: demo rows + the one added book
    assert_eq!(engine.books().len(), 3);

    let book = engine.book(book_id).unwrap();
    assert_eq!(book.title, "Persistent Novel");
    assert_eq!(book.author.name, "Durable Author");
    assert_eq!(book.status, BookStatus::OnLoan);

    let loan = engine.loan(loan_id).unwrap();
    assert!(loan.is_open());
    assert_eq!(loan.book_id, book_id);

    // The held-set is rebuilt from open loans on load
    assert!(engine.user(user_id).unwrap().holds(book_id));
    assert!(engine.reconciliation_report().is_clean());
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn searches_are_case_insensitive_substring_matches() {
    let mut engine = test_engine().await;
    engine.register_user("Dmitri Volkov").await.unwrap();

    assert_eq!(engine.find_books_by_title("CRIME").len(), 1);
    assert_eq!(engine.find_books_by_title("an").len(), 2); // "War and Peace", "Crime and Punishment"
    assert!(engine.find_books_by_title("zzz").is_empty());

    assert_eq!(engine.find_users_by_name("volkov").len(), 1);
    assert_eq!(engine.find_authors_by_name("dostoevsky").len(), 1);
}

#[tokio::test]
async fn overdue_loans_are_empty_for_fresh_issues() {
    let mut engine = test_engine().await;

    let book_id = engine.books()[0].id;
    let user_id = engine.users()[0].id;
    engine.issue_book(user_id, book_id).await.unwrap();

    // Issued just now: inside the loan period
    assert!(engine.overdue_loans().is_empty());
}
