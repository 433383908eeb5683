//! BLS key generation and BLS-to-BBS derivation entry points, plus the
//! fixed-size queries.

use bbs::prelude::*;
use ffi_support::{ByteBuffer, ExternError};

use super::{map_buffer, map_unit, ByteArray};
use crate::keys;

/// Return the number of bytes in a BBS+ signature - 112 bytes
#[no_mangle]
pub extern "C" fn bbs_signature_size() -> i32 {
    SIGNATURE_COMPRESSED_SIZE as i32
}

/// Return the number of bytes in a BBS+ blinded signature - 112 bytes
#[no_mangle]
pub extern "C" fn bbs_blind_signature_size() -> i32 {
    SIGNATURE_COMPRESSED_SIZE as i32
}

/// Return the number of bytes in a BLS public key - 96 bytes
#[no_mangle]
pub extern "C" fn bls_public_key_size() -> i32 {
    keys::BLS_PUBLIC_KEY_SIZE as i32
}

/// Return the number of bytes in a BLS secret key - 32 bytes
#[no_mangle]
pub extern "C" fn bls_secret_key_size() -> i32 {
    keys::BLS_SECRET_KEY_SIZE as i32
}

/// Create a new BLS keypair, deterministically when `seed` is non-empty.
/// Caller will need to call `bbs_byte_buffer_free` on `public_key` and
/// `secret_key` to free the memory.
#[no_mangle]
pub extern "C" fn bls_generate_key(
    seed: &ByteArray,
    public_key: &mut ByteBuffer,
    secret_key: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    let (pk, sk) = keys::generate_bls_key(seed.to_opt_vec());
    *public_key = ByteBuffer::from_vec(pk);
    *secret_key = ByteBuffer::from_vec(sk);
    map_unit(err, Ok(()))
}

/// Recompute the BLS public key for a secret key.
/// Caller will need to call `bbs_byte_buffer_free` on `public_key`.
#[no_mangle]
pub extern "C" fn bls_get_public_key(
    secret_key: &ByteArray,
    public_key: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(err, keys::bls_public_key(&secret_key.to_vec()), public_key)
}

/// Derive a BBS public key sized for `message_count` messages from a BLS
/// public key.
/// Caller will need to call `bbs_byte_buffer_free` on `public_key`.
#[no_mangle]
pub extern "C" fn bls_public_key_to_bbs_key(
    d_public_key: &ByteArray,
    message_count: u32,
    public_key: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(
        err,
        keys::bbs_key_from_public_key(&d_public_key.to_vec(), message_count as usize),
        public_key,
    )
}

/// Derive a BBS public key sized for `message_count` messages from a BLS
/// secret key.
/// Caller will need to call `bbs_byte_buffer_free` on `public_key`.
#[no_mangle]
pub extern "C" fn bls_secret_key_to_bbs_key(
    secret_key: &ByteArray,
    message_count: u32,
    public_key: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(
        err,
        keys::bbs_key_from_secret_key(&secret_key.to_vec(), message_count as usize),
        public_key,
    )
}
