//! Response handling shared by the portal clients.

use proto::PortalError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Reads a response, mapping non-2xx statuses to [`PortalError`]. The server's
/// `message` field is preferred over `fallback` for the user-facing text.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, PortalError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PortalError::Network(e.to_string()))?;
    debug!(status = %status.as_u16(), bytes = %body.len(), "Portal response received");

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(PortalError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let text = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str(text).map_err(|e| {
        PortalError::InvalidResponse(format!(
            "{e}; body: {}",
            body.chars().take(200).collect::<String>()
        ))
    })
}

pub(crate) fn network(e: reqwest::Error) -> PortalError {
    PortalError::Network(e.to_string())
}
