//! Bearer-token auth and password digests.

use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ApiError, ApiResult};

const SALT_LEN: usize = 16;

/// JWT claims for an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Creator username.
    pub sub: String,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issue an HS256 access token for `username`.
pub fn create_access_token(username: &str, secret: &str, expiry_days: i64) -> ApiResult<String> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now() + Duration::days(expiry_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("failed to sign token: {}", e)))
}

/// Decode and validate an access token, returning the subject username.
pub fn decode_access_token(token: &str, secret: &str) -> ApiResult<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|_| ApiError::unauthorized("Could not validate credentials"))
}

/// Hash a password as `salt$digest` with a random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let b64 = base64::engine::general_purpose::STANDARD;
    format!("{}${}", b64.encode(salt), b64.encode(digest(&salt, password)))
}

/// Verify a password against a stored `salt$digest` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let b64 = base64::engine::general_purpose::STANDARD;
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (b64.decode(salt_b64), b64.decode(digest_b64)) else {
        return false;
    };
    digest(&salt, password) == expected
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}
