// Hash-then-verify flow driven by HashgenSettings

use crate::settings::HashgenSettings;
use anyhow::{Context, Result};
use passhash::{HashRecord, PasswordHasher};
use tracing::{error, info};

/// What hashgen prints: the new record and the stored-hash check result
#[derive(Debug)]
pub struct DemoOutcome {
    pub record: HashRecord,
    pub matches: bool,
}

pub async fn run(settings: &HashgenSettings) -> Result<DemoOutcome> {
    let hasher = PasswordHasher::from_settings(&settings.common.hasher)
        .context("Failed to build password hasher")?;
    let cost = settings.common.hasher.default_cost;

    info!(
        cost = cost,
        algorithm = %hasher.algorithm(),
        "Configuration loaded"
    );

    let record = hasher
        .hash_async(settings.demo.password.clone(), cost)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to generate hash");
            e
        })?;

    let stored = HashRecord::parse(&settings.demo.stored_hash).map_err(|e| {
        error!(error = %e, "Stored hash is malformed");
        e
    })?;

    if hasher.needs_rehash(&stored, cost) {
        info!(
            stored_cost = stored.cost(),
            stored_algorithm = %stored.algorithm(),
            "Stored hash uses outdated parameters"
        );
    }

    let matches = hasher
        .verify_async(settings.demo.check_password().to_string(), stored)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to verify password");
            e
        })?;

    Ok(DemoOutcome { record, matches })
}
