mod config;
mod dataset;
mod main_lib;

use config::Config;
use dataset::Dataset;
use main_lib::{build_service, init_tracing, run_report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let dataset = Dataset::load(&config.dataset_path)?;
    let service = build_service(&config, dataset);
    let report = run_report(service.as_ref(), &config).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
