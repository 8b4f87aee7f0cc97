//! Bearer-token signing key loading.
//!
//! The key is read from `TOKEN_KEY_FILE` (default
//! `/var/run/secrets/token_key`). Release builds insist on a real key of at
//! least [`MIN_SIGNING_KEY_LEN`] bytes; debug builds fall back to a random
//! per-process key unless `TOKEN_ALLOW_EPHEMERAL=0`.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::outbound::security::MIN_SIGNING_KEY_LEN;

const KEY_FILE_ENV: &str = "TOKEN_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_key";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const FINGERPRINT_BYTES: usize = 8;

/// Build mode governing how strictly the key is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode of the running binary, from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read token key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Where the active key came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeySource {
    File,
    Ephemeral,
}

/// Token signing secret, wiped from memory on drop.
pub struct TokenSigningKey {
    bytes: Zeroizing<Vec<u8>>,
    source: KeySource,
}

impl TokenSigningKey {
    /// Truncated SHA-256 of the key as lowercase hex, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes.as_slice());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hand the key material over, leaving nothing behind to wipe.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        std::mem::take(&mut *self.bytes)
    }
}

/// Load the signing key according to `mode`.
pub fn token_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSigningKey, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );

    let key = match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let length = bytes.len();
            if length < MIN_SIGNING_KEY_LEN {
                if !mode.is_debug() {
                    return Err(TokenConfigError::KeyTooShort {
                        path,
                        length,
                        min_len: MIN_SIGNING_KEY_LEN,
                    });
                }
                warn!(path = %path.display(), length, "token key shorter than recommended");
            }
            TokenSigningKey {
                bytes,
                source: KeySource::File,
            }
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token key (dev only); tokens die with the process"
            );
            ephemeral_key()
        }
        Err(error) => {
            return Err(TokenConfigError::KeyRead {
                path,
                source: error,
            });
        }
    };
    info!(fingerprint = %key.fingerprint(), source = ?key.source(), "token signing key loaded");
    Ok(key)
}

fn ephemeral_key() -> TokenSigningKey {
    let mut bytes = Zeroizing::new(vec![0_u8; MIN_SIGNING_KEY_LEN * 2]);
    rand::thread_rng().fill_bytes(bytes.as_mut_slice());
    TokenSigningKey {
        bytes,
        source: KeySource::Ephemeral,
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(mode.is_debug());
    };
    match (parse_bool(&value), mode) {
        (Some(true), BuildMode::Release) => Err(TokenConfigError::EphemeralNotAllowed),
        (Some(flag), _) => Ok(flag),
        (None, BuildMode::Debug) => {
            warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to enabled");
            Ok(true)
        }
        (None, BuildMode::Release) => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
