use crate::logic::client::url_utils::devices_url;
use crate::logic::config::ApplianceConfig;
use crate::logic::types::{Device, InventoryPage, LicenseStatus};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Failed page requests tolerated over a whole fetch
pub const MAX_FETCH_ERRORS: u32 = 10;
/// Pause before re-issuing a failed page request
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum PageError {
    #[error("unexpected return code {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("undecodable response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Reads the device inventory page by page.
pub struct InventoryClient {
    http: Client,
    appliance: ApplianceConfig,
    retry_delay: Duration,
    max_errors: u32,
}

impl InventoryClient {
    pub fn new(http: Client, appliance: ApplianceConfig) -> Self {
        Self {
            http,
            appliance,
            retry_delay: RETRY_DELAY,
            max_errors: MAX_FETCH_ERRORS,
        }
    }

    #[cfg(test)]
    pub fn with_retry(mut self, retry_delay: Duration, max_errors: u32) -> Self {
        self.retry_delay = retry_delay;
        self.max_errors = max_errors;
        self
    }

    async fn fetch_page(&self, url: &str) -> Result<InventoryPage, PageError> {
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, &self.appliance.api_key)
            .send()
            .await
            .map_err(PageError::Transport)?;

        if response.status() != StatusCode::OK {
            return Err(PageError::Status(response.status()));
        }
        response.json().await.map_err(PageError::Decode)
    }

    /// Collect every device visible to the API key.
    ///
    /// The appliance hands out at most 50 devices per request together with
    /// the highest id returned (`last_id`); the next request continues after
    /// it. A page without `last_id` is the last one.
    ///
    /// A failed request is repeated with the same cursor after
    /// `retry_delay`. Failures are counted over the whole fetch, not per
    /// page, and once `max_errors` is reached whatever was collected so far
    /// is returned.
    pub async fn fetch_all(&self, include_deactivated: bool) -> Vec<Device> {
        let mut cursor = Some(0);
        let mut error_count = 0;
        let mut collected = Vec::new();

        while let Some(after) = cursor {
            if error_count >= self.max_errors {
                error!(
                    "giving up after {} failed requests, inventory is incomplete",
                    error_count
                );
                break;
            }

            let url = devices_url(&self.appliance.fqdn, after);
            match self.fetch_page(&url).await {
                Ok(page) => {
                    debug!("{} returned 200 with last_id {:?}", url, page.last_id);
                    cursor = match page.last_id {
                        Some(next) if next <= after => {
                            warn!(
                                "last_id {} does not advance past {}, stopping pagination",
                                next, after
                            );
                            None
                        }
                        next => next,
                    };
                    collected.extend(page.into_devices().into_iter().filter(|device| {
                        include_deactivated || device.license_status == LicenseStatus::Activated
                    }));
                }
                Err(e) => {
                    error_count += 1;
                    error!(
                        "{} on request to {} ({}/{})",
                        e, url, error_count, self.max_errors
                    );
                    if error_count < self.max_errors {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        info!("{} devices found", collected.len());
        collected
    }
}
