//! Cryptographic helpers for authentication and one-time links.
//!
//! - PBKDF2-SHA256 password hashing
//! - HMAC-SHA256 JWT access tokens
//! - random hex tokens for refresh and unsubscribe links

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};

use crate::ServiceError;

const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TOKEN_LEN: usize = 32;

/// JWT header (always HS256).
const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Access token lifetime: 1 hour.
pub const JWT_EXPIRY_SECS: u64 = 3600;

/// Refresh token lifetime: 30 days.
pub const REFRESH_EXPIRY_SECS: u64 = 30 * 24 * 3600;

// ── Password hashing ────────────────────────────────────────────────────────

/// Hash a password with a fresh random salt. Returns `(hash_hex, salt_hex)`.
pub fn hash_password(password: &str) -> Result<(String, String), ServiceError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok((hex::encode(derive_key(password, &salt)), hex::encode(salt)))
}

/// Verify a password against a stored hash and salt (both hex-encoded).
pub fn verify_password(password: &str, hash_hex: &str, salt_hex: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    constant_time_eq(&derive_key(password, &salt), &expected)
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}

// ── JWT (HMAC-SHA256) ───────────────────────────────────────────────────────

/// Sign an access token for `user_id`, valid for [`JWT_EXPIRY_SECS`].
pub fn sign_jwt(user_id: &str, secret: &str, now_unix: u64) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
    let payload = serde_json::json!({
        "sub": user_id,
        "iat": now_unix,
        "exp": now_unix + JWT_EXPIRY_SECS,
    });
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());

    let signing_input = format!("{header_b64}.{payload_b64}");
    let sig_b64 = URL_SAFE_NO_PAD.encode(hmac_sha256(secret.as_bytes(), signing_input.as_bytes()));
    format!("{signing_input}.{sig_b64}")
}

/// Verify an access token and return its `sub` (user id).
pub fn verify_jwt(token: &str, secret: &str, now_unix: u64) -> Result<String, ServiceError> {
    let unauthorized = |msg: &str| ServiceError::Unauthorized(msg.to_string());

    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(unauthorized("invalid token format"));
    };

    let expected = hmac_sha256(secret.as_bytes(), format!("{header}.{payload}").as_bytes());
    let actual = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| unauthorized("invalid token signature encoding"))?;
    if !constant_time_eq(&expected, &actual) {
        return Err(unauthorized("invalid token signature"));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| unauthorized("invalid token payload encoding"))?;
    let claims: serde_json::Value =
        serde_json::from_slice(&payload_bytes).map_err(|_| unauthorized("invalid token payload"))?;

    let exp = claims["exp"]
        .as_u64()
        .ok_or_else(|| unauthorized("missing exp claim"))?;
    if now_unix > exp {
        return Err(unauthorized("token expired"));
    }

    claims["sub"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| unauthorized("missing sub claim"))
}

// ── Opaque tokens ───────────────────────────────────────────────────────────

/// Generate a random token (refresh tokens, unsubscribe links). Hex-encoded.
pub fn generate_token() -> Result<String, ServiceError> {
    let mut bytes = [0u8; TOKEN_LEN];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| ServiceError::Internal(format!("RNG failure: {e}")))?;
    Ok(hex::encode(bytes))
}

/// SHA-256 of a token for storage. Hex-encoded.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// ── Internal ────────────────────────────────────────────────────────────────

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match Hmac::<Sha256>::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Compare a caller-supplied shared secret without leaking where it differs.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    constant_time_eq(provided.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
