pub mod benchmark_simulator;
pub mod performance_model;
pub mod performance_service;
pub mod performance_summary;
pub mod twr_calculator;

pub use benchmark_simulator::{
    simulate_benchmark, simulate_benchmark_with, BenchmarkOptions, ReseedPolicy,
};
pub use performance_model::*;
pub use performance_service::{PerformanceService, PerformanceServiceTrait};
pub use performance_summary::{annualize_return, summarize, summarize_with};
pub use twr_calculator::{compute_daily_metrics, daily_return, TwrRecurrence};

#[cfg(test)]
mod performance_service_tests;
