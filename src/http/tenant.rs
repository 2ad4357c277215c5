//! Hostname-based tenant resolution.

/// Extract the tenant subdomain from a Host header value.
///
/// Port suffixes are ignored. On `localhost` hosts any leading label is a
/// subdomain (`docs-site.localhost`); public hosts need at least three
/// labels (`docs-site.example.com`), so apex domains resolve to no tenant.
pub fn subdomain(host: &str) -> Option<String> {
    let hostname = host.split(':').next().unwrap_or_default();
    if hostname.is_empty() || hostname.starts_with('[') {
        return None;
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    let min_labels = if hostname == "localhost" || hostname.ends_with(".localhost") {
        2
    } else {
        3
    };

    if labels.len() < min_labels {
        return None;
    }

    let first = labels[0];
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
