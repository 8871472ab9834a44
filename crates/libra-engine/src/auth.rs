//! # Librarian Authentication
//!
//! The authentication seam. The engine delegates every `authenticate`
//! call to an [`Authenticator`], so the trust model can change (tokens,
//! passwords, an external directory) without touching the lending
//! logic.
//!
//! The default implementation is deliberately thin: presenting a known
//! librarian id IS the whole check. There are no credentials in the
//! data model, so there is nothing stronger to verify against.

use tracing::debug;

use crate::error::EngineResult;
use libra_core::Borrower;
use libra_db::BorrowerRepository;

/// Verifies a claimed librarian identity.
pub trait Authenticator: Send + Sync {
    /// Resolves a claimed librarian id to the librarian, or `None` when
    /// the claim does not check out. `None` is an ordinary outcome, not
    /// an error; errors are reserved for storage trouble.
    fn authenticate(
        &self,
        librarian_id: i64,
    ) -> impl std::future::Future<Output = EngineResult<Option<Borrower>>> + Send;
}

/// Id-presence authentication: the claim succeeds iff a librarian row
/// with that id exists.
#[derive(Debug, Clone)]
pub struct IdPresenceAuthenticator {
    borrowers: BorrowerRepository,
}

impl IdPresenceAuthenticator {
    pub fn new(borrowers: BorrowerRepository) -> Self {
        IdPresenceAuthenticator { borrowers }
    }
}

impl Authenticator for IdPresenceAuthenticator {
    async fn authenticate(&self, librarian_id: i64) -> EngineResult<Option<Borrower>> {
        let row = self.borrowers.get_librarian(librarian_id).await?;

        match row {
            Some(row) => {
                debug!(id = %row.id, "Librarian authenticated");
                Ok(Some(Borrower::new_librarian(row.id, row.name, row.access_level)))
            }
            None => {
                debug!(id = %librarian_id, "Unknown librarian id");
                Ok(None)
            }
        }
    }
}
