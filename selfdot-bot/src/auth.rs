//! Discord token validation: offline shape checks and an API probe

use std::time::Duration;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{debug, warn};

use selfdot_common::{Result, SelfbotError, TokenInfo};

const USER_ENDPOINT: &str = "https://discord.com/api/v10/users/@me";

/// Identity payload returned by the users/@me endpoint
#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
    username: String,
    verified: Option<bool>,
    mfa_enabled: Option<bool>,
}

/// Offline structural check: three dot-separated base64ish segments of
/// a plausible total length
pub fn validate_format(token: &str) -> bool {
    let token = token.trim();
    if token.len() < 50 {
        return false;
    }
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3
        && parts.iter().all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

/// Check the token shape and fail loud with a configuration error
pub fn require_valid_format(token: &str) -> Result<()> {
    if !validate_format(token) {
        return Err(SelfbotError::config_key(
            "Discord token format is invalid; expected a user token",
            "discord.token",
        ));
    }
    Ok(())
}

/// Extract the user id embedded in the token's first segment
pub fn extract_user_id(token: &str) -> Option<String> {
    let first = token.trim().split('.').next()?;
    let decoded = STANDARD_NO_PAD.decode(first).ok()?;
    let id = String::from_utf8(decoded).ok()?;
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

/// Validates tokens against the Discord API
pub struct TokenValidator {
    client: reqwest::Client,
}

impl TokenValidator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SelfbotError::connection(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Full validation: shape check, embedded user id extraction, then a
    /// users/@me probe. Never returns the raw token; the result carries a
    /// masked copy only.
    pub async fn validate(&self, token: &str) -> TokenInfo {
        if !validate_format(token) {
            return TokenInfo::invalid(token, "Invalid token format");
        }

        let embedded_user_id = extract_user_id(token);

        let response = match self
            .client
            .get(USER_ENDPOINT)
            .header("Authorization", token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token API validation request failed");
                let mut info = TokenInfo::invalid(token, format!("API request failed: {e}"));
                info.user_id = embedded_user_id;
                return info;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Token rejected by API");
            let mut info = TokenInfo::invalid(token, "Token is invalid or expired");
            info.user_id = embedded_user_id;
            return info;
        }

        match response.json::<CurrentUser>().await {
            Ok(user) => {
                debug!(user_id = %user.id, "Token API validation passed");
                TokenInfo {
                    token: selfdot_common::utils::mask_token(token),
                    is_valid: true,
                    user_id: Some(user.id),
                    username: Some(user.username),
                    verified: user.verified,
                    mfa_enabled: user.mfa_enabled,
                    error_message: None,
                }
            }
            Err(e) => {
                let mut info =
                    TokenInfo::invalid(token, format!("Malformed identity response: {e}"));
                info.user_id = embedded_user_id;
                info
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // structurally valid, but not a live credential
    const SHAPED_TOKEN: &str =
        "MTExNzU4MzQ4NzEyNzY1NjQxNw.GZKbkF.1234567890123456789012345678901234567890";

    #[test]
    fn test_validate_format() {
        assert!(validate_format(SHAPED_TOKEN));
        assert!(!validate_format("short"));
        assert!(!validate_format(&"a".repeat(60)), "needs three segments");
        assert!(!validate_format(
            "has spaces in it.aaaaaaaaaaaaaaaaaaaaaa.bbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
        ));
    }

    #[test]
    fn test_require_valid_format() {
        assert!(require_valid_format(SHAPED_TOKEN).is_ok());
        assert!(require_valid_format("nope").is_err());
    }

    #[test]
    fn test_extract_user_id() {
        // first segment is base64("1117583487127656417")
        let user_id = extract_user_id(SHAPED_TOKEN).unwrap();
        assert_eq!(user_id, "1117583487127656417");

        assert!(extract_user_id("!!!.a.b").is_none());
    }
}
