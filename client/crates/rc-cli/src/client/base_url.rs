use rc_config::DEFAULT_API_URL;

use log::warn;
use reqwest::Url;

/// Resolve the configured server root.
///
/// Blank or unparsable values fall back to the local default. The result
/// never ends with `/`.
pub fn resolve_base_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return DEFAULT_API_URL.to_string();
    }

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            url.as_str().trim_end_matches('/').to_string()
        }
        _ => {
            warn!("Ignoring invalid API URL {raw:?}, using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        }
    }
}
