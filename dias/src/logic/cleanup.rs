use crate::logic::client::inventory::InventoryClient;
use crate::logic::client::removal::RemovalClient;
use crate::logic::client::http_client;
use crate::logic::config::{CleanupConfig, Config};
use crate::logic::filter;
use anyhow::Context;
use tracing::info;

/// Outcome of one cleanup pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Devices returned by the inventory
    pub fetched: usize,
    /// Offline clones selected for removal
    pub candidates: usize,
    pub removed: usize,
    pub failed: usize,
}

/// One linear pass: fetch, select, remove.
pub async fn run(config: &Config) -> anyhow::Result<CleanupSummary> {
    let http = http_client().context("failed to build HTTP client")?;
    let inventory = InventoryClient::new(http.clone(), config.appliance.clone());
    let removal = RemovalClient::new(http, config.appliance.clone());
    Ok(run_with(&inventory, &removal, &config.cleanup).await)
}

pub async fn run_with(
    inventory: &InventoryClient,
    removal: &RemovalClient,
    cleanup: &CleanupConfig,
) -> CleanupSummary {
    let devices = inventory.fetch_all(cleanup.include_deactivated).await;
    let offline_clones = filter::select(&devices, &cleanup.tag, &cleanup.group, cleanup.offline_hours);

    let mut summary = CleanupSummary {
        fetched: devices.len(),
        candidates: offline_clones.len(),
        ..Default::default()
    };

    for device in &offline_clones {
        info!("removing device {}: {}", device.id, device.display_name());
        if removal.remove(device.id).await {
            summary.removed += 1;
        } else {
            summary.failed += 1;
        }
    }

    summary
}
