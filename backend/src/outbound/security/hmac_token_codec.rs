//! HS256 JSON Web Tokens signed with a shared secret.
//!
//! Tokens use the compact `header.payload.signature` form with unpadded
//! URL-safe base64. The payload carries `{id, email, role, iat, exp}` with
//! second-resolution timestamps.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::ports::{AccessTokenCodec, AccessTokenError};
use crate::domain::{AccessToken, Role, TokenClaims, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Shortest signing key accepted outside ephemeral development setups.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Serialize, Deserialize)]
struct WireClaims {
    id: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// [`AccessTokenCodec`] producing HS256 JWTs.
pub struct HmacTokenCodec {
    key: Zeroizing<Vec<u8>>,
}

impl HmacTokenCodec {
    /// Create a codec signing with `key`.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AccessTokenError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|err| AccessTokenError::encode(format!("invalid signing key: {err}")))
    }

    fn encode_segment<T: Serialize>(value: &T) -> Result<String, AccessTokenError> {
        serde_json::to_vec(value)
            .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
            .map_err(|err| AccessTokenError::encode(err.to_string()))
    }

    fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AccessTokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|err| AccessTokenError::malformed(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| AccessTokenError::malformed(err.to_string()))
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, AccessTokenError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AccessTokenError::malformed(format!("timestamp out of range: {seconds}")))
}

impl AccessTokenCodec for HmacTokenCodec {
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, AccessTokenError> {
        let header = Self::encode_segment(&Header {
            alg: ALGORITHM.to_owned(),
            typ: "JWT".to_owned(),
        })?;
        let payload = Self::encode_segment(&WireClaims {
            id: claims.user_id.to_string(),
            email: claims.email.clone(),
            role: claims.role,
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        })?;
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(AccessToken::new(format!("{signing_input}.{signature}")))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AccessTokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AccessTokenError::malformed("expected three segments"));
        };

        let decoded_header: Header = Self::decode_segment(header)?;
        if decoded_header.alg != ALGORITHM {
            return Err(AccessTokenError::malformed(format!(
                "unsupported algorithm {}",
                decoded_header.alg
            )));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|err| AccessTokenError::malformed(err.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AccessTokenError::bad_signature())?;

        let wire: WireClaims = Self::decode_segment(payload)?;
        let claims = TokenClaims {
            user_id: UserId::new(&wire.id)
                .map_err(|err| AccessTokenError::malformed(err.to_string()))?,
            email: wire.email,
            role: wire.role,
            issued_at: timestamp(wire.iat)?,
            expires_at: timestamp(wire.exp)?,
        };
        if claims.is_expired(now) {
            return Err(AccessTokenError::expired());
        }
        Ok(claims)
    }
}
