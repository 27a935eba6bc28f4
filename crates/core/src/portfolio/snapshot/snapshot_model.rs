//! Equity snapshot domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// End-of-day state of an account.
///
/// One row per account per valuation day, ascending by date. The source
/// system folds the day's external cash flow into the row (`deposit`) rather
/// than keeping a separate ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EquitySnapshot {
    pub account_id: String,
    pub date: NaiveDate,
    /// Total account value at the close, cash flows included
    pub net_equity: Decimal,
    pub cash_balance: Option<Decimal>,
    /// Signed external flow for the day: positive contribution, negative withdrawal
    #[serde(default)]
    pub deposit: Decimal,
    pub management_fee: Option<Decimal>,
}

impl EquitySnapshot {
    pub fn new(
        account_id: impl Into<String>,
        date: NaiveDate,
        net_equity: Decimal,
        deposit: Decimal,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            date,
            net_equity,
            cash_balance: None,
            deposit,
            management_fee: None,
        }
    }

    /// The day's external cash flow, if any.
    pub fn cash_flow(&self) -> Option<CashFlowEvent> {
        if self.deposit.is_zero() {
            None
        } else {
            Some(CashFlowEvent {
                date: self.date,
                amount: self.deposit,
            })
        }
    }
}

/// A signed external cash flow: positive contribution, negative withdrawal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEvent {
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl CashFlowEvent {
    pub fn is_contribution(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn is_withdrawal(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

/// Extracts the non-zero cash flows from a snapshot series, in series order.
pub fn cash_flows(snapshots: &[EquitySnapshot]) -> Vec<CashFlowEvent> {
    snapshots.iter().filter_map(EquitySnapshot::cash_flow).collect()
}

/// Sum of all deposits and withdrawals in a snapshot series.
pub fn net_cash_flow(snapshots: &[EquitySnapshot]) -> Decimal {
    snapshots.iter().map(|s| s.deposit).sum()
}

/// Checks that a series is strictly ascending by date (so dates are unique).
pub fn is_strictly_ascending(snapshots: &[EquitySnapshot]) -> bool {
    snapshots.windows(2).all(|w| w[0].date < w[1].date)
}
