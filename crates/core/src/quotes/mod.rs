//! Market price module.
//!
//! This module provides the types and traits the engine needs from market data:
//!
//! - [`model`] - Closing-price observations for a symbol
//! - [`price_lookup`] - "Latest observation at or before" price resolution
//! - [`store`] - Storage trait for loading a symbol's price history
//!
//! Prices are sparse (no rows on non-trading days). Resolution treats a
//! series as a step function that holds its last known value forward.

pub mod model;
pub mod price_lookup;
pub mod store;

// Re-export commonly used types for convenience
pub use model::PricePoint;
pub use price_lookup::{resolve_price, PriceSeries};
pub use store::PriceRepositoryTrait;
