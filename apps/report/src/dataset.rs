//! JSON dataset loading and in-memory repositories backing the report.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use equitybook_core::accounts::{Account, AccountRepositoryTrait};
use equitybook_core::errors::{Error, Result};
use equitybook_core::quotes::{PricePoint, PriceRepositoryTrait};
use equitybook_core::snapshot::{EquitySnapshot, SnapshotRepositoryTrait};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub snapshots: Vec<EquitySnapshot>,
    #[serde(default)]
    pub prices: Vec<PricePoint>,
}

impl Dataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))?;
        tracing::info!(
            "Loaded {} accounts, {} snapshots, {} prices from {}",
            dataset.accounts.len(),
            dataset.snapshots.len(),
            dataset.prices.len(),
            path.display()
        );
        Ok(dataset)
    }
}

pub struct InMemoryAccountRepository {
    accounts: Vec<Account>,
}

impl InMemoryAccountRepository {
    pub fn new(mut accounts: Vec<Account>) -> Self {
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Self { accounts }
    }
}

impl AccountRepositoryTrait for InMemoryAccountRepository {
    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("Account {} not found", account_id)))
    }

    fn list(
        &self,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| is_active_filter.map_or(true, |active| a.is_active == active))
            .filter(|a| account_ids.map_or(true, |ids| ids.contains(&a.id)))
            .cloned()
            .collect())
    }
}

/// Snapshots grouped per account, ascending by date, one row per date.
pub struct InMemorySnapshotRepository {
    by_account: HashMap<String, Vec<EquitySnapshot>>,
}

impl InMemorySnapshotRepository {
    pub fn new(snapshots: Vec<EquitySnapshot>) -> Self {
        let mut by_account: HashMap<String, Vec<EquitySnapshot>> = HashMap::new();
        for snapshot in snapshots {
            by_account
                .entry(snapshot.account_id.clone())
                .or_default()
                .push(snapshot);
        }
        for rows in by_account.values_mut() {
            // stable, so a repeated date keeps its last row after the reverse/dedup
            rows.sort_by_key(|s| s.date);
            rows.reverse();
            rows.dedup_by_key(|s| s.date);
            rows.reverse();
        }
        Self { by_account }
    }
}

impl SnapshotRepositoryTrait for InMemorySnapshotRepository {
    fn get_snapshots_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<EquitySnapshot>> {
        Ok(self
            .by_account
            .get(account_id)
            .map(|rows| {
                rows.iter()
                    .filter(|s| within(s.date, start_date, end_date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_latest_snapshot_before_date(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<EquitySnapshot>> {
        Ok(self.by_account.get(account_id).and_then(|rows| {
            let idx = rows.partition_point(|s| s.date <= date);
            idx.checked_sub(1).map(|i| rows[i].clone())
        }))
    }
}

pub struct InMemoryPriceRepository {
    by_symbol: HashMap<String, Vec<PricePoint>>,
}

impl InMemoryPriceRepository {
    pub fn new(prices: Vec<PricePoint>) -> Self {
        let mut by_symbol: HashMap<String, Vec<PricePoint>> = HashMap::new();
        for point in prices {
            by_symbol.entry(point.symbol.clone()).or_default().push(point);
        }
        for points in by_symbol.values_mut() {
            points.sort_by_key(|p| p.date);
        }
        Self { by_symbol }
    }
}

impl PriceRepositoryTrait for InMemoryPriceRepository {
    fn get_price_history(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>> {
        Ok(self
            .by_symbol
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| within(p.date, start_date, end_date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn within(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}
