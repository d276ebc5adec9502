//! Signed credential minting and verification.
//!
//! # Purpose
//! Define the credential claims and helpers for signing/verifying the
//! bearer tokens carried on every authenticated request.
//!
//! # Key invariants
//! - Credentials are always EdDSA (Ed25519); no other algorithm verifies.
//! - `iss` and `aud` are pinned to this service and validated on decode.
//! - The signing key is process-wide state built once from the configured
//!   32-byte seed; there is no rotation and no refresh. An expired
//!   credential requires a fresh login.
//!
//! # Security boundary
//! The seed only exists inside [`TokenKeys`]; it is never logged and never
//! serialized.
use crate::model::{Identity, Role};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

const ISSUER: &str = "registrar";
const AUDIENCE: &str = "registrar-clients";

/// Fixed validity window for issued credentials.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Claims carried by registrar-issued credentials. `sub` is the normalized
/// account email; `role` drives every downstream authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("key error: {0}")]
    Key(String),
}

/// Process-wide signing key material, derived once at startup from the
/// configured Ed25519 seed.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// Build encoding and decoding keys from a raw 32-byte Ed25519 seed.
    ///
    /// jsonwebtoken wants PKCS8 DER for the private side and the base64url
    /// JWK `x` component for the public side.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, TokenError> {
        let signing_key = Ed25519SigningKey::from_bytes(seed);
        let der = signing_key
            .to_pkcs8_der()
            .map_err(|err| TokenError::Key(format!("encode Ed25519 key: {err}")))?;
        let encoding = EncodingKey::from_ed_der(der.as_bytes());
        let x = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().to_bytes());
        let decoding = DecodingKey::from_ed_components(&x).map_err(TokenError::Jwt)?;
        Ok(Self { encoding, decoding })
    }
}

/// Mint a credential for an authenticated identity.
pub fn issue(keys: &TokenKeys, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
    let now = now_epoch_seconds();
    let claims = Claims {
        iss: ISSUER.to_string(),
        aud: AUDIENCE.to_string(),
        sub: identity.email.clone(),
        role: identity.role,
        name: identity.display_name.clone(),
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };
    let header = Header::new(Algorithm::EdDSA);
    Ok(jsonwebtoken::encode(&header, &claims, &keys.encoding)?)
}

/// Verify a credential string and return its claims.
///
/// Fails on bad signature, malformed payload, wrong issuer/audience, and
/// expiry (with a small leeway for clock skew).
pub fn verify(keys: &TokenKeys, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);
    validation.leeway = 5;
    let decoded = jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation)?;
    Ok(decoded.claims)
}

fn now_epoch_seconds() -> i64 {
    // If the clock is skewed backwards, clamp to zero to avoid panics.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
