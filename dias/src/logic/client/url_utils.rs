/// Utility functions for building URLs for appliance API requests

/// Build an API URL from the configured appliance address.
///
/// A bare FQDN (optionally with `:port`) is reached over https. An address
/// that already carries a scheme is used as-is, which lets a plain-http
/// appliance or test server be targeted.
pub fn build_api_url(fqdn: &str, path: &str) -> String {
    let fqdn = fqdn.trim().trim_end_matches('/');
    if fqdn.starts_with("http://") || fqdn.starts_with("https://") {
        format!("{}{}", fqdn, path)
    } else {
        format!("https://{}{}", fqdn, path)
    }
}

pub fn devices_url(fqdn: &str, after_device_id: u64) -> String {
    build_api_url(
        fqdn,
        &format!("/api/v1/devices?after_device_id={}", after_device_id),
    )
}

pub fn remove_device_url(fqdn: &str, device_id: u64) -> String {
    build_api_url(fqdn, &format!("/api/v1/devices/{}/actions/remove", device_id))
}
