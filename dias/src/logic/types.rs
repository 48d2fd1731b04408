use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Decode a field without failing the record: `null`, a wrong JSON type or
/// an unexpected value all become `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// License state reported by the appliance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Activated,
    Deactivated,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Whether the agent is currently talking to the appliance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectivityStatus {
    Online,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    Registered,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Snapshot of one endpoint as returned by `/api/v1/devices`.
///
/// Only the fields the cleanup looks at are modelled; everything else the
/// appliance sends is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub license_status: LicenseStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub connectivity_status: ConnectivityStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub deployment_status: DeploymentStatus,
    /// Raw timestamp, usually with a trailing `Z`
    #[serde(default, deserialize_with = "lenient")]
    pub last_contact: Option<String>,
}

impl Device {
    /// Hostname for log lines, `-` when the appliance sent none
    pub fn display_name(&self) -> &str {
        self.hostname.as_deref().unwrap_or("-")
    }
}

/// One page of the device inventory
#[derive(Debug, Default, Deserialize)]
pub struct InventoryPage {
    /// Records are decoded one by one in `into_devices`
    #[serde(default, deserialize_with = "lenient")]
    pub devices: Vec<Value>,
    /// Highest id on this page; absent (or unusable) on the last page
    #[serde(default, deserialize_with = "lenient")]
    pub last_id: Option<u64>,
}

impl InventoryPage {
    /// Decode the page's records in order, dropping any that lack a usable
    /// `id` instead of discarding the whole page.
    pub fn into_devices(self) -> Vec<Device> {
        self.devices
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Device>(record.clone()) {
                Ok(device) => Some(device),
                Err(e) => {
                    warn!("skipping malformed device record {}: {}", record, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_from_appliance_json() {
        let device: Device = serde_json::from_value(json!({
            "id": 42,
            "hostname": "VDI-POOL-A-017",
            "license_status": "ACTIVATED",
            "tag": "vdi",
            "group_name": "pool-a",
            "connectivity_status": "OFFLINE",
            "deployment_status": "REGISTERED",
            "last_contact": "2022-05-03T08:15:00.123456Z",
            "os": "WINDOWS",
            "comment": null
        }))
        .unwrap();

        assert_eq!(device.id, 42);
        assert_eq!(device.display_name(), "VDI-POOL-A-017");
        assert_eq!(device.license_status, LicenseStatus::Activated);
        assert_eq!(device.tag.as_deref(), Some("vdi"));
        assert_eq!(device.connectivity_status, ConnectivityStatus::Offline);
        assert_eq!(device.deployment_status, DeploymentStatus::Registered);
    }

    #[test]
    fn test_unknown_enum_values() {
        let device: Device = serde_json::from_value(json!({
            "id": 1,
            "license_status": "PENDING",
            "connectivity_status": "EXPIRED",
            "deployment_status": "UNINSTALLED"
        }))
        .unwrap();

        assert_eq!(device.license_status, LicenseStatus::Unknown);
        assert_eq!(device.connectivity_status, ConnectivityStatus::Unknown);
        assert_eq!(device.deployment_status, DeploymentStatus::Unknown);
    }

    #[test]
    fn test_missing_optional_fields() {
        let device: Device = serde_json::from_value(json!({ "id": 7 })).unwrap();

        assert_eq!(device.tag, None);
        assert_eq!(device.last_contact, None);
        assert_eq!(device.display_name(), "-");
        assert_eq!(device.license_status, LicenseStatus::Unknown);
    }

    #[test]
    fn test_null_and_mistyped_fields() {
        let device: Device = serde_json::from_value(json!({
            "id": 3,
            "hostname": null,
            "license_status": null,
            "tag": 17,
            "group_name": ["pool-a"],
            "connectivity_status": null,
            "deployment_status": { "state": "REGISTERED" },
            "last_contact": null
        }))
        .unwrap();

        assert_eq!(device.id, 3);
        assert_eq!(device.hostname, None);
        assert_eq!(device.license_status, LicenseStatus::Unknown);
        assert_eq!(device.tag, None);
        assert_eq!(device.group_name, None);
        assert_eq!(device.connectivity_status, ConnectivityStatus::Unknown);
        assert_eq!(device.deployment_status, DeploymentStatus::Unknown);
        assert_eq!(device.last_contact, None);
    }

    #[test]
    fn test_page_drops_only_malformed_records() {
        let page: InventoryPage = serde_json::from_value(json!({
            "devices": [
                { "id": 1, "connectivity_status": "OFFLINE" },
                { "id": "two" },
                { "hostname": "no-id" },
                "garbage",
                { "id": 4, "connectivity_status": null }
            ],
            "last_id": 4
        }))
        .unwrap();

        let devices = page.into_devices();
        let ids: Vec<u64> = devices.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(devices[0].connectivity_status, ConnectivityStatus::Offline);
        assert_eq!(devices[1].connectivity_status, ConnectivityStatus::Unknown);
    }

    #[test]
    fn test_page_without_last_id() {
        let page: InventoryPage = serde_json::from_value(json!({
            "devices": [{ "id": 1 }, { "id": 2 }]
        }))
        .unwrap();
        assert_eq!(page.devices.len(), 2);
        assert_eq!(page.last_id, None);

        let page: InventoryPage =
            serde_json::from_value(json!({ "devices": [], "last_id": null })).unwrap();
        assert_eq!(page.last_id, None);

        let page: InventoryPage = serde_json::from_value(json!({ "last_id": 50 })).unwrap();
        assert!(page.devices.is_empty());
        assert_eq!(page.last_id, Some(50));
    }

    #[test]
    fn test_page_with_null_devices_and_bad_cursor() {
        let page: InventoryPage =
            serde_json::from_value(json!({ "devices": null, "last_id": "fifty" })).unwrap();
        assert!(page.devices.is_empty());
        assert_eq!(page.last_id, None);
    }
}
