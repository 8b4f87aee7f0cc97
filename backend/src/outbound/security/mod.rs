//! Credential hashing and bearer-token signing adapters.

mod argon2_hasher;
mod hmac_token_codec;

pub use argon2_hasher::{Argon2CredentialHasher, HashCost};
pub use hmac_token_codec::{HmacTokenCodec, MIN_SIGNING_KEY_LEN};
