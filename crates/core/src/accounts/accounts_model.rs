//! Account domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a tracked investment account.
///
/// Only the fields the performance engine consumes are modelled here; the
/// bookkeeping application owns the rest of the account record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub currency: String,
    /// Declared starting capital. Seeds the first day's return base.
    pub initial_equity: Decimal,
    /// Reference instrument the account is compared against by default
    #[serde(default)]
    pub benchmark_symbol: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Account {
    /// Validates the account data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.initial_equity.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Account {} has a negative initial equity ({})",
                self.id, self.initial_equity
            ))));
        }
        Ok(())
    }
}
