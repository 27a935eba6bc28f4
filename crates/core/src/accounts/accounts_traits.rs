//! Account repository traits.
//!
//! These traits define the contract for reading account data without any
//! database-specific types, allowing for different storage implementations.

use super::accounts_model::Account;
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
///
/// The engine only reads accounts; creation and updates belong to the
/// bookkeeping application.
pub trait AccountRepositoryTrait: Send + Sync {
    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Lists accounts with optional filters.
    ///
    /// # Arguments
    /// * `is_active_filter` - If Some, filter by active status
    /// * `account_ids` - If Some, filter to only these account IDs
    fn list(
        &self,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>>;
}
