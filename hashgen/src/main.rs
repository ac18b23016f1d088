// hashgen binary entry point
//
// Hashes the configured password and checks the configured password against
// a stored hash, printing the new record and the verification result.
// Inputs come from config files and PASSHASH__* environment variables only.

mod demo;
mod settings;

use anyhow::{anyhow, Result};
use passhash::telemetry;
use settings::HashgenSettings;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = HashgenSettings::load_from_path("config").map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    telemetry::init_logging(&settings.common.observability.log_level)?;
    telemetry::describe_metrics();

    settings.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        anyhow!(e)
    })?;

    let outcome = demo::run(&settings).await?;
    println!("{}", outcome.record);
    println!("{}", outcome.matches);

    Ok(())
}
