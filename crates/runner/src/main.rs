//! Demo binary: bootstrap the marketplace against simulators and run the
//! fixed-price + auction scenario

use log::info;

use agora_runner::{BootstrapConfig, bootstrap, run_demo};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let setup = bootstrap(BootstrapConfig::default())?;
    let report = run_demo(&setup).await?;

    info!(
        "demo complete: {} sales, volume {}, platform revenue {}",
        report.sales, report.total_volume, report.platform_revenue
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
