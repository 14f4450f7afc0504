//! Resource URI helpers

use url::Url;

/// Derive a short display name from a resource URI
///
/// Used to label resource context blocks in the outgoing model prompt:
/// the last non-empty path segment wins, falling back to the host, then to
/// the raw URI with its scheme stripped.
///
/// `api://total_profit` → `total_profit`,
/// `file:///data/report.txt` → `report.txt`.
pub fn short_name(uri: &str) -> String {
    if let Ok(parsed) = Url::parse(uri) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        {
            return segment.to_string();
        }
        if let Some(host) = parsed.host_str() {
            return host.to_string();
        }
    }

    uri.split_once("://")
        .map_or(uri, |(_, rest)| rest)
        .to_string()
}
