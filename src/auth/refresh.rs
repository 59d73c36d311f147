// Token refresh logic

use reqwest::{Client, Url};

use super::types::{Envelope, RefreshData, RefreshRequest, TokenPair};
use crate::error::ClientError;
use crate::session::SessionManager;

/// Path of the refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "auth/refresh-token";

/// Exchange the stored refresh token for a new credential pair
///
/// Talks to the refresh endpoint directly (no bearer header, no retry) so a
/// 401 from the refresh call itself can never recurse. Any failure here —
/// missing refresh token, transport error, non-success status, malformed
/// body — is a refresh failure; the caller decides what to tear down.
pub async fn refresh_session(
    client: &Client,
    base_url: &Url,
    session: &SessionManager,
) -> Result<TokenPair, ClientError> {
    let refresh_token = session
        .refresh_token()?
        .ok_or_else(|| ClientError::Auth("No refresh token in session storage".to_string()))?;

    let url = base_url
        .join(REFRESH_PATH)
        .map_err(|e| ClientError::Auth(format!("Invalid refresh URL: {}", e)))?;

    tracing::debug!(url = %url, "Refreshing access token...");

    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| ClientError::Auth(format!("Refresh request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ClientError::Auth(format!(
            "Refresh rejected: {} - {}",
            status, error_text
        )));
    }

    let envelope: Envelope<RefreshData> = response
        .json()
        .await
        .map_err(|e| ClientError::Auth(format!("Failed to parse refresh response: {}", e)))?;

    if envelope.data.access_token.is_empty() {
        return Err(ClientError::Auth(
            "Refresh response does not contain accessToken".to_string(),
        ));
    }

    let pair = TokenPair {
        access_token: envelope.data.access_token,
        refresh_token: envelope.data.refresh_token,
    };

    session.apply_refresh(&pair)?;
    tracing::debug!("Access token refreshed");

    Ok(pair)
}
