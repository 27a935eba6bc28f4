//! Account equity snapshot module - daily valuation rows and their cash flows.

mod snapshot_model;
mod snapshot_traits;

pub use snapshot_model::*;
pub use snapshot_traits::*;
