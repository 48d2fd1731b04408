use crate::logic::client::url_utils::remove_device_url;
use crate::logic::config::ApplianceConfig;
use reqwest::{header, Client, StatusCode};
use tracing::{error, info};

pub struct RemovalClient {
    http: Client,
    appliance: ApplianceConfig,
}

impl RemovalClient {
    pub fn new(http: Client, appliance: ApplianceConfig) -> Self {
        Self { http, appliance }
    }

    /// Ask the appliance to remove one device. Only `204 No Content` counts
    /// as success; failures are logged and never retried.
    pub async fn remove(&self, device_id: u64) -> bool {
        let url = remove_device_url(&self.appliance.fqdn, device_id);
        let result = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, &self.appliance.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::NO_CONTENT => {
                info!("Successfully removed device: {}", device_id);
                true
            }
            Ok(response) => {
                error!(
                    "Failed to remove device: {} (status {})",
                    device_id,
                    response.status()
                );
                false
            }
            Err(e) => {
                error!("Failed to remove device: {} ({})", device_id, e);
                false
            }
        }
    }
}
