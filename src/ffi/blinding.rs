//! Blind issuance entry points: holder-side commitment, signer-side
//! commitment verification and blind signing.

use ffi_support::{ByteBuffer, ExternError, FfiStr};

use super::{invalid_string, map_buffer, map_status, map_unit, ByteArray};
use crate::contexts::messages::MessageEncoding;
use crate::contexts::{blind_commitment, blind_sign, verify_blind_commitment};

/// Start a blind commitment context. The returned handle is consumed by
/// `bbs_blind_commitment_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    blind_commitment::init()
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_add_message_bytes(
    handle: u64,
    index: u32,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_commitment::add_message(
            handle,
            index as usize,
            &message.to_vec(),
            MessageEncoding::Raw,
        ),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_add_message_string(
    handle: u64,
    index: u32,
    message: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => blind_commitment::add_message(
            handle,
            index as usize,
            s.as_bytes(),
            MessageEncoding::Raw,
        ),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_add_message_prehashed(
    handle: u64,
    index: u32,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_commitment::add_message(
            handle,
            index as usize,
            &message.to_vec(),
            MessageEncoding::PreHashed,
        ),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_commitment::set_public_key(handle, &public_key.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_set_nonce_bytes(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_commitment::set_nonce(handle, &nonce.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_set_nonce_string(
    handle: u64,
    nonce: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match nonce.as_opt_str() {
        Some(s) => blind_commitment::set_nonce(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_set_nonce_prehashed(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_commitment::set_nonce(handle, &nonce.to_vec(), MessageEncoding::PreHashed),
    )
}

/// Consume the context and produce the commitment proof and the blinding
/// factor the holder must keep for unblinding. `out_context` is laid out
/// as commitment (48 bytes), challenge hash (32 bytes), proof of the
/// committed exponents (remainder).
/// Caller will need to call `bbs_byte_buffer_free` on both buffers.
#[no_mangle]
pub extern "C" fn bbs_blind_commitment_context_finish(
    handle: u64,
    out_context: &mut ByteBuffer,
    blinding_factor: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    match blind_commitment::finish(handle) {
        Ok((commitment_proof, blinding)) => {
            *err = ExternError::success();
            *out_context = ByteBuffer::from_vec(commitment_proof);
            *blinding_factor = ByteBuffer::from_vec(blinding);
            1
        }
        Err(e) => {
            *err = super::extern_error(&e);
            0
        }
    }
}

/// Start a context for verifying a holder's blind commitment. The
/// returned handle is consumed by
/// `bbs_verify_blind_commitment_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    verify_blind_commitment::init()
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_add_blinded(
    handle: u64,
    index: u32,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::add_blinded(handle, index as usize),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_commitment(
    handle: u64,
    commitment: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_commitment(handle, &commitment.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_challenge_hash(
    handle: u64,
    challenge_hash: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_challenge_hash(handle, &challenge_hash.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_proof(
    handle: u64,
    proof: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_proof(handle, &proof.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_public_key(handle, &public_key.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_nonce_bytes(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_nonce(handle, &nonce.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_nonce_string(
    handle: u64,
    nonce: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match nonce.as_opt_str() {
        Some(s) => verify_blind_commitment::set_nonce(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_set_nonce_prehashed(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_blind_commitment::set_nonce(handle, &nonce.to_vec(), MessageEncoding::PreHashed),
    )
}

/// Consume the context and report the outcome: 200 when the holder
/// proved knowledge of the committed values, 401 otherwise, 0 with `err`
/// set on API misuse.
#[no_mangle]
pub extern "C" fn bbs_verify_blind_commitment_context_finish(
    handle: u64,
    err: &mut ExternError,
) -> i32 {
    map_status(err, verify_blind_commitment::finish(handle))
}

/// Start a blind signing context. The returned handle is consumed by
/// `bbs_blind_sign_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    blind_sign::init()
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_add_message_bytes(
    handle: u64,
    index: u32,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_sign::add_message(handle, index as usize, &message.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_add_message_string(
    handle: u64,
    index: u32,
    message: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => {
            blind_sign::add_message(handle, index as usize, s.as_bytes(), MessageEncoding::Raw)
        }
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_add_message_prehashed(
    handle: u64,
    index: u32,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        blind_sign::add_message(
            handle,
            index as usize,
            &message.to_vec(),
            MessageEncoding::PreHashed,
        ),
    )
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_set_commitment(
    handle: u64,
    commitment: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, blind_sign::set_commitment(handle, &commitment.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_set_secret_key(
    handle: u64,
    secret_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, blind_sign::set_secret_key(handle, &secret_key.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, blind_sign::set_public_key(handle, &public_key.to_vec()))
}

/// Consume the context and produce the blinded signature. The holder
/// unblinds it with the blinding factor kept from the commitment step.
/// Caller will need to call `bbs_byte_buffer_free` on `blinded_signature`.
#[no_mangle]
pub extern "C" fn bbs_blind_sign_context_finish(
    handle: u64,
    blinded_signature: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(err, blind_sign::finish(handle), blinded_signature)
}
