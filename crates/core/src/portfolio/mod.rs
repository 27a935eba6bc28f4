pub mod performance;
pub mod snapshot;

pub use performance::*;
pub use snapshot::*;
