//! BLS keypair generation and BLS-to-BBS public key derivation.
//!
//! A BLS public key is the short commitment to the secret key; deriving a
//! BBS public key expands it with one deterministically derived generator
//! per message slot, so both sides of a protocol can rebuild the same
//! generators from the short key and a message count alone.

use bbs::prelude::*;

use crate::errors::prelude::*;

/// Number of bytes in a BLS public key.
pub const BLS_PUBLIC_KEY_SIZE: usize = G2_COMPRESSED_SIZE;
/// Number of bytes in a BLS secret key.
pub const BLS_SECRET_KEY_SIZE: usize = FR_COMPRESSED_SIZE;

/// Generates a BLS keypair, deterministically when a seed is given.
/// Returns `(public key bytes, secret key bytes)`.
pub fn generate_bls_key(seed: Option<Vec<u8>>) -> (Vec<u8>, Vec<u8>) {
    let (dpk, sk) = DeterministicPublicKey::new(seed.map(KeyGenOption::UseSeed));
    (
        dpk.to_bytes_compressed_form().to_vec(),
        sk.to_bytes_compressed_form().to_vec(),
    )
}

/// Recomputes the BLS public key belonging to `secret_key`.
pub fn bls_public_key(secret_key: &[u8]) -> BbsNativeResult<Vec<u8>> {
    let sk = parse_secret_key(secret_key)?;
    let (dpk, _) = DeterministicPublicKey::new(Some(KeyGenOption::FromSecretKey(sk)));
    Ok(dpk.to_bytes_compressed_form().to_vec())
}

/// Derives a BBS public key sized for `message_count` message slots from a
/// BLS public key.
pub fn bbs_key_from_public_key(
    public_key: &[u8],
    message_count: usize,
) -> BbsNativeResult<Vec<u8>> {
    if public_key.len() != BLS_PUBLIC_KEY_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "BLS public key must be {} bytes, found {}",
                BLS_PUBLIC_KEY_SIZE,
                public_key.len()
            ),
        ));
    }
    let dpk = DeterministicPublicKey::from(array_ref![public_key, 0, G2_COMPRESSED_SIZE]);
    derive_bbs_key(&dpk, message_count)
}

/// Derives a BBS public key sized for `message_count` message slots from a
/// BLS secret key, computing the public counterpart first.
pub fn bbs_key_from_secret_key(
    secret_key: &[u8],
    message_count: usize,
) -> BbsNativeResult<Vec<u8>> {
    let sk = parse_secret_key(secret_key)?;
    let (dpk, _) = DeterministicPublicKey::new(Some(KeyGenOption::FromSecretKey(sk)));
    derive_bbs_key(&dpk, message_count)
}

fn derive_bbs_key(dpk: &DeterministicPublicKey, message_count: usize) -> BbsNativeResult<Vec<u8>> {
    if message_count == 0 {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            "message count must be greater than zero",
        ));
    }
    let pk = dpk.to_public_key(message_count)?;
    pk.validate()?;
    Ok(pk.to_bytes_compressed_form())
}

pub(crate) fn parse_secret_key(data: &[u8]) -> BbsNativeResult<SecretKey> {
    if data.len() != BLS_SECRET_KEY_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "secret key must be {} bytes, found {}",
                BLS_SECRET_KEY_SIZE,
                data.len()
            ),
        ));
    }
    Ok(SecretKey::from(array_ref![data, 0, FR_COMPRESSED_SIZE]))
}

pub(crate) fn parse_public_key(data: &[u8]) -> BbsNativeResult<PublicKey> {
    let pk = PublicKey::from_bytes_compressed_form(data).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("malformed public key: {}", e),
        )
    })?;
    pk.validate().map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("malformed public key: {}", e),
        )
    })?;
    Ok(pk)
}
