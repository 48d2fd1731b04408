use crate::logic::types::{ConnectivityStatus, DeploymentStatus, Device};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::{debug, info};

/// Parse an appliance timestamp as UTC.
///
/// The appliance appends a `Z` to naive UTC timestamps; it is stripped before
/// parsing. Timestamps with an explicit offset are converted to UTC.
pub fn parse_last_contact(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(parsed.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn is_offline_clone(
    device: &Device,
    tag: &str,
    group: &str,
    threshold: Duration,
    now: DateTime<Utc>,
) -> bool {
    let Some(device_tag) = device.tag.as_deref() else {
        return false;
    };
    if device_tag != tag || device.group_name.as_deref() != Some(group) {
        return false;
    }
    if device.connectivity_status != ConnectivityStatus::Offline
        || device.deployment_status != DeploymentStatus::Registered
    {
        return false;
    }

    match device.last_contact.as_deref().and_then(parse_last_contact) {
        Some(last_contact) => now.signed_duration_since(last_contact) > threshold,
        None => {
            debug!(
                "skipping device {} ({}): unusable last_contact {:?}",
                device.id,
                device.display_name(),
                device.last_contact
            );
            false
        }
    }
}

/// Devices that are offline clones as seen from `now`, in input order.
pub fn select_at(
    devices: &[Device],
    tag: &str,
    group: &str,
    offline_hours: u32,
    now: DateTime<Utc>,
) -> Vec<Device> {
    let threshold = Duration::hours(i64::from(offline_hours));
    devices
        .iter()
        .filter(|device| is_offline_clone(device, tag, group, threshold, now))
        .cloned()
        .collect()
}

/// Select the instant clones with `tag` in `group` that have not contacted
/// the appliance for more than `offline_hours`.
pub fn select(devices: &[Device], tag: &str, group: &str, offline_hours: u32) -> Vec<Device> {
    let offline_clones = select_at(devices, tag, group, offline_hours, Utc::now());
    info!("{} offline vdi clones identified", offline_clones.len());
    offline_clones
}
