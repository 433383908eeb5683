//! Selective-disclosure proof entry points.

use ffi_support::{ByteBuffer, ExternError, FfiStr};

use super::{invalid_string, map_buffer, map_status, map_unit, ByteArray};
use crate::contexts::messages::{parse_blinding, MessageClass, MessageEncoding};
use crate::contexts::{create_proof, verify_proof};
use crate::errors::prelude::*;

/// Classification values accepted on `bbs_create_proof_context_add_proof_message_*`.
pub mod proof_message_types {
    /// Cleartext value known to the verifier
    pub const REVEALED: i32 = 1;
    /// Hidden, blinding factor generated for this proof only
    pub const HIDDEN_PROOF_SPECIFIC_BLINDING: i32 = 2;
    /// Hidden, blinding factor supplied by the caller
    pub const HIDDEN_EXTERNAL_BLINDING: i32 = 3;
}

fn message_class(xtype: i32, blinding_factor: &ByteArray) -> BbsNativeResult<MessageClass> {
    match xtype {
        proof_message_types::REVEALED => Ok(MessageClass::Revealed),
        proof_message_types::HIDDEN_PROOF_SPECIFIC_BLINDING => {
            Ok(MessageClass::HiddenProofSpecific)
        }
        proof_message_types::HIDDEN_EXTERNAL_BLINDING => Ok(MessageClass::HiddenExternal(
            parse_blinding(&blinding_factor.to_vec())?,
        )),
        other => Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("unknown proof message type {}", other),
        )),
    }
}

/// Start a proof creation context. The returned handle is consumed by
/// `bbs_create_proof_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_create_proof_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    create_proof::init()
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_add_proof_message_bytes(
    handle: u64,
    message: &ByteArray,
    xtype: i32,
    blinding_factor: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    let res = message_class(xtype, blinding_factor).and_then(|class| {
        create_proof::add_proof_message(handle, &message.to_vec(), MessageEncoding::Raw, class)
    });
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_add_proof_message_string(
    handle: u64,
    message: FfiStr<'_>,
    xtype: i32,
    blinding_factor: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => message_class(xtype, blinding_factor).and_then(|class| {
            create_proof::add_proof_message(handle, s.as_bytes(), MessageEncoding::Raw, class)
        }),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_add_proof_message_prehashed(
    handle: u64,
    message: &ByteArray,
    xtype: i32,
    blinding_factor: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    let res = message_class(xtype, blinding_factor).and_then(|class| {
        create_proof::add_proof_message(
            handle,
            &message.to_vec(),
            MessageEncoding::PreHashed,
            class,
        )
    });
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_set_signature(
    handle: u64,
    signature: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, create_proof::set_signature(handle, &signature.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        create_proof::set_public_key(handle, &public_key.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_set_nonce_bytes(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        create_proof::set_nonce(handle, &nonce.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_set_nonce_string(
    handle: u64,
    nonce: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match nonce.as_opt_str() {
        Some(s) => create_proof::set_nonce(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_create_proof_context_set_nonce_prehashed(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        create_proof::set_nonce(handle, &nonce.to_vec(), MessageEncoding::PreHashed),
    )
}

/// Consume the context and produce the proof.
/// Caller will need to call `bbs_byte_buffer_free` on `proof`.
#[no_mangle]
pub extern "C" fn bbs_create_proof_context_finish(
    handle: u64,
    proof: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(err, create_proof::finish(handle), proof)
}

/// Start a proof verification context. The returned handle is consumed by
/// `bbs_verify_proof_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    verify_proof::init()
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_add_revealed_index(
    handle: u64,
    index: u32,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, verify_proof::add_revealed_index(handle, index as usize))
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_add_message_bytes(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_proof::add_message(handle, &message.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_add_message_string(
    handle: u64,
    message: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => verify_proof::add_message(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_add_message_prehashed(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_proof::add_message(handle, &message.to_vec(), MessageEncoding::PreHashed),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_set_proof(
    handle: u64,
    proof: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, verify_proof::set_proof(handle, &proof.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_proof::set_public_key(handle, &public_key.to_vec()),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_set_nonce_bytes(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_proof::set_nonce(handle, &nonce.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_set_nonce_string(
    handle: u64,
    nonce: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match nonce.as_opt_str() {
        Some(s) => verify_proof::set_nonce(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_set_nonce_prehashed(
    handle: u64,
    nonce: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify_proof::set_nonce(handle, &nonce.to_vec(), MessageEncoding::PreHashed),
    )
}

/// Consume the context and report the outcome: 200 on success, 400 when
/// the signature-level pairing check fails, 401 when a hidden-message
/// response is inconsistent, 402 when a revealed plaintext does not match
/// the proof, 0 with `err` set on API misuse.
#[no_mangle]
pub extern "C" fn bbs_verify_proof_context_finish(handle: u64, err: &mut ExternError) -> i32 {
    map_status(err, verify_proof::finish(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::error_codes;

    #[test]
    fn unknown_proof_message_type_is_rejected() {
        let mut error = ExternError::success();
        let handle = bbs_create_proof_context_init(&mut error);
        let message = b"m".to_vec();
        let res = bbs_create_proof_context_add_proof_message_bytes(
            handle,
            &ByteArray::from(&message),
            7,
            &ByteArray::default(),
            &mut error,
        );
        assert_eq!(res, 0);
        assert_eq!(error.get_code().code(), error_codes::INVALID_ARGUMENT);
        crate::ffi::bbs_context_release(handle, &mut error);
    }

    #[test]
    fn external_blinding_requires_a_scalar() {
        let mut error = ExternError::success();
        let handle = bbs_create_proof_context_init(&mut error);
        let message = b"m".to_vec();
        let short = vec![1u8; 8];
        let res = bbs_create_proof_context_add_proof_message_bytes(
            handle,
            &ByteArray::from(&message),
            proof_message_types::HIDDEN_EXTERNAL_BLINDING,
            &ByteArray::from(&short),
            &mut error,
        );
        assert_eq!(res, 0);
        assert_eq!(error.get_code().code(), error_codes::INVALID_ARGUMENT);
        crate::ffi::bbs_context_release(handle, &mut error);
    }
}
