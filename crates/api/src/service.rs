//! Shared business logic — framework-agnostic pure functions.
//!
//! Route handlers stay thin adapters over these.

use crate::{strengths, AuthTokenResponse, ServiceError};

/// Number of strengths on every profile.
pub const STRENGTH_COUNT: usize = 5;
/// Maximum length of a single strength entry.
pub const MAX_STRENGTH_LEN: usize = 50;
/// Maximum length of a team member's name.
pub const MAX_MEMBER_NAME_LEN: usize = 100;
/// Maximum length of a chat message.
pub const MAX_CHAT_MESSAGE_LEN: usize = 4000;

// ─── Account validation ─────────────────────────────────────────────────────

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

/// Validate a password (8-128 bytes).
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < 8 {
        return Err(ServiceError::BadRequest(
            "password must be at least 8 characters".into(),
        ));
    }
    if password.len() > 128 {
        return Err(ServiceError::BadRequest(
            "password must be at most 128 characters".into(),
        ));
    }
    Ok(())
}

/// Validate and trim a first name (1-50 characters).
pub fn validate_first_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(ServiceError::BadRequest(
            "first name must be 1-50 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional last name; blank becomes `None`.
pub fn validate_last_name(name: Option<&str>) -> Result<Option<String>, ServiceError> {
    let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > 50 {
        return Err(ServiceError::BadRequest(
            "last name must be at most 50 characters".into(),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

// ─── Profile validation ─────────────────────────────────────────────────────

/// Validate a team member's name (trimmed, 1-100 characters).
pub fn validate_member_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_MEMBER_NAME_LEN {
        return Err(ServiceError::BadRequest(
            "name is required and must be at most 100 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a top-five list: exactly 5 non-empty entries of at most 50 characters.
/// Returns the trimmed entries, with known strength names in catalog spelling.
pub fn validate_strengths(list: &[String]) -> Result<Vec<String>, ServiceError> {
    if list.len() != STRENGTH_COUNT {
        return Err(ServiceError::BadRequest(
            "exactly 5 strengths are required".into(),
        ));
    }
    list.iter()
        .map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.chars().count() > MAX_STRENGTH_LEN {
                Err(ServiceError::BadRequest(
                    "each strength must be 1-50 characters".into(),
                ))
            } else {
                Ok(strengths::canonical_name(trimmed)
                    .map_or_else(|| trimmed.to_string(), str::to_string))
            }
        })
        .collect()
}

/// Validate the caller's own top five: [`validate_strengths`] plus every entry
/// must be a distinct CliftonStrengths name. Returns catalog spellings.
pub fn validate_user_strengths(list: &[String]) -> Result<Vec<String>, ServiceError> {
    let trimmed = validate_strengths(list)?;
    let mut canonical: Vec<String> = Vec::with_capacity(STRENGTH_COUNT);
    for entry in &trimmed {
        let name = strengths::canonical_name(entry).ok_or_else(|| {
            ServiceError::BadRequest(format!("unknown strength: {entry}"))
        })?;
        if canonical.iter().any(|c| c == name) {
            return Err(ServiceError::BadRequest(format!(
                "duplicate strength: {name}"
            )));
        }
        canonical.push(name.to_string());
    }
    Ok(canonical)
}

/// Validate a chat message (trimmed, 1-4000 characters).
pub fn validate_chat_message(message: &str) -> Result<String, ServiceError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::BadRequest("message is required".into()));
    }
    if trimmed.chars().count() > MAX_CHAT_MESSAGE_LEN {
        return Err(ServiceError::BadRequest(
            "message must be at most 4000 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Decode a JSON-array column; malformed data reads as an empty profile.
pub fn decode_strengths(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Encode a strengths list for a JSON-array column.
pub fn encode_strengths(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

// ─── Timestamps ─────────────────────────────────────────────────────────────

/// SQLite `datetime` text for a unix timestamp.
pub fn sqlite_datetime(unix: i64) -> Result<String, ServiceError> {
    chrono::DateTime::from_timestamp(unix, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .ok_or_else(|| ServiceError::Internal("invalid timestamp".into()))
}

// ─── Token Bundle ───────────────────────────────────────────────────────────

/// Pre-computed token bundle returned by [`prepare_token_bundle`].
///
/// The caller only needs to insert the refresh token row.
pub struct TokenBundle {
    /// SHA-256 hash of the refresh token (stored in DB).
    pub token_hash: String,
    /// UUID primary key for the refresh_tokens row.
    pub token_id: String,
    /// `datetime` string for the refresh token expiry.
    pub expires_at: String,
    /// Ready-to-return API response.
    pub response: AuthTokenResponse,
}

/// Build a [`TokenBundle`] containing a JWT, refresh token, and the auth response.
pub fn prepare_token_bundle(
    jwt_secret: &str,
    user_id: &str,
    first_name: &str,
    now_unix: u64,
) -> Result<TokenBundle, ServiceError> {
    use crate::crypto;

    let access_token = crypto::sign_jwt(user_id, jwt_secret, now_unix);
    let refresh_token = crypto::generate_token()?;
    let token_hash = crypto::hash_token(&refresh_token);
    let expires_at = sqlite_datetime((now_unix + crypto::REFRESH_EXPIRY_SECS) as i64)?;

    Ok(TokenBundle {
        token_hash,
        token_id: uuid::Uuid::new_v4().to_string(),
        expires_at,
        response: AuthTokenResponse {
            access_token,
            refresh_token,
            expires_in: crypto::JWT_EXPIRY_SECS,
            user_id: user_id.to_string(),
            first_name: first_name.to_string(),
        },
    })
}
