pub mod inventory;
pub mod removal;
pub mod url_utils;

#[cfg(test)]
pub(crate) mod stub;

use std::time::Duration;

/// Upper bound for a single appliance request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client shared by the inventory and removal clients
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("dias/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
}
