// HTTP client utilities
use crate::domain::error::RinthError;
use crate::infrastructure::config::ApiConfig;
use reqwest::Client;
use std::time::Duration;

/// Create the shared HTTP client from the API settings
pub fn create_client(api: &ApiConfig) -> Result<Client, RinthError> {
    Ok(Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(api.timeout_secs))
        .user_agent(api.user_agent.clone())
        .build()?)
}

/// Turn a stored credential into an `Authorization` header value.
///
/// Values that already carry a scheme are kept. JWT-shaped OAuth tokens get
/// `Bearer`; opaque personal access tokens are sent bare, as the API expects.
pub fn normalize_authorization(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() || trimmed.contains(' ') {
        return trimmed.to_string();
    }
    if trimmed.split('.').count() == 3 {
        return format!("Bearer {}", trimmed);
    }
    trimmed.to_string()
}

/// Recognize the 404 body a deployment sends for a route it does not have.
pub fn is_route_missing(status: u16, body: &str) -> bool {
    if status != 404 {
        return false;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        let not_found = map.get("error").and_then(|v| v.as_str()) == Some("not_found");
        let route_text = map
            .values()
            .filter_map(|v| v.as_str())
            .any(|s| s.contains("route does not exist"));
        if not_found && route_text {
            return true;
        }
    }

    body.contains("\"error\":\"not_found\"") && body.contains("route does not exist")
}

/// Extension taken from a file name, without the dot.
pub fn file_extension(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Content type for an uploaded image, from its extension.
pub fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" | "svgz" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
