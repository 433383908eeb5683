//! Sign and verify context entry points.

use ffi_support::{ByteBuffer, ExternError, FfiStr};

use super::{invalid_string, map_buffer, map_status, map_unit, ByteArray};
use crate::contexts::messages::MessageEncoding;
use crate::contexts::{sign, verify};

/// Start a signing context. The returned handle is consumed by
/// `bbs_sign_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_sign_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    sign::init()
}

#[no_mangle]
pub extern "C" fn bbs_sign_context_add_message_bytes(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        sign::add_message(handle, &message.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_sign_context_add_message_string(
    handle: u64,
    message: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => sign::add_message(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_sign_context_add_message_prehashed(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        sign::add_message(handle, &message.to_vec(), MessageEncoding::PreHashed),
    )
}

#[no_mangle]
pub extern "C" fn bbs_sign_context_set_secret_key(
    handle: u64,
    secret_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, sign::set_secret_key(handle, &secret_key.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_sign_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, sign::set_public_key(handle, &public_key.to_vec()))
}

/// Consume the context and produce the signature.
/// Caller will need to call `bbs_byte_buffer_free` on `signature`.
#[no_mangle]
pub extern "C" fn bbs_sign_context_finish(
    handle: u64,
    signature: &mut ByteBuffer,
    err: &mut ExternError,
) -> i32 {
    map_buffer(err, sign::finish(handle), signature)
}

/// Start a verification context. The returned handle is consumed by
/// `bbs_verify_context_finish`.
#[no_mangle]
pub extern "C" fn bbs_verify_context_init(err: &mut ExternError) -> u64 {
    *err = ExternError::success();
    verify::init()
}

#[no_mangle]
pub extern "C" fn bbs_verify_context_add_message_bytes(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify::add_message(handle, &message.to_vec(), MessageEncoding::Raw),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_context_add_message_string(
    handle: u64,
    message: FfiStr<'_>,
    err: &mut ExternError,
) -> i32 {
    let res = match message.as_opt_str() {
        Some(s) => verify::add_message(handle, s.as_bytes(), MessageEncoding::Raw),
        None => Err(invalid_string()),
    };
    map_unit(err, res)
}

#[no_mangle]
pub extern "C" fn bbs_verify_context_add_message_prehashed(
    handle: u64,
    message: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(
        err,
        verify::add_message(handle, &message.to_vec(), MessageEncoding::PreHashed),
    )
}

#[no_mangle]
pub extern "C" fn bbs_verify_context_set_public_key(
    handle: u64,
    public_key: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, verify::set_public_key(handle, &public_key.to_vec()))
}

#[no_mangle]
pub extern "C" fn bbs_verify_context_set_signature(
    handle: u64,
    signature: &ByteArray,
    err: &mut ExternError,
) -> i32 {
    map_unit(err, verify::set_signature(handle, &signature.to_vec()))
}

/// Consume the context and report the outcome: 200 when the signature
/// verifies, 400 when the pairing check fails, 0 with `err` set on API
/// misuse.
#[no_mangle]
pub extern "C" fn bbs_verify_context_finish(handle: u64, err: &mut ExternError) -> i32 {
    map_status(err, verify::finish(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::error_codes;
    use crate::ffi::keys::{bls_generate_key, bls_secret_key_to_bbs_key};
    use crate::VerificationStatus;

    fn keypair(message_count: u32) -> (Vec<u8>, Vec<u8>) {
        let mut public_key = ByteBuffer::default();
        let mut secret_key = ByteBuffer::default();
        let mut error = ExternError::success();
        let seed = b"ffi-signing-tests".to_vec();
        bls_generate_key(
            &ByteArray::from(&seed),
            &mut public_key,
            &mut secret_key,
            &mut error,
        );
        public_key.destroy();
        let sk = secret_key.into_vec();

        let mut bbs_key = ByteBuffer::default();
        assert_eq!(
            bls_secret_key_to_bbs_key(
                &ByteArray::from(&sk),
                message_count,
                &mut bbs_key,
                &mut error
            ),
            1
        );
        (bbs_key.into_vec(), sk)
    }

    #[test]
    fn ffi_sign_and_verify() {
        let (pk, sk) = keypair(2);
        let mut error = ExternError::success();

        let handle = bbs_sign_context_init(&mut error);
        assert_eq!(
            bbs_sign_context_set_secret_key(handle, &ByteArray::from(&sk), &mut error),
            1
        );
        assert_eq!(
            bbs_sign_context_set_public_key(handle, &ByteArray::from(&pk), &mut error),
            1
        );
        assert_eq!(
            bbs_sign_context_add_message_bytes(
                handle,
                &ByteArray::from(&b"message_1"[..]),
                &mut error
            ),
            1
        );
        assert_eq!(
            bbs_sign_context_add_message_bytes(
                handle,
                &ByteArray::from(&b"message_2"[..]),
                &mut error
            ),
            1
        );

        let mut signature = ByteBuffer::default();
        assert_eq!(
            bbs_sign_context_finish(handle, &mut signature, &mut error),
            1
        );
        let sig = signature.into_vec();
        assert_eq!(sig.len(), crate::ffi::keys::bbs_signature_size() as usize);

        let handle = bbs_verify_context_init(&mut error);
        bbs_verify_context_set_public_key(handle, &ByteArray::from(&pk), &mut error);
        bbs_verify_context_set_signature(handle, &ByteArray::from(&sig), &mut error);
        bbs_verify_context_add_message_bytes(
            handle,
            &ByteArray::from(&b"message_1"[..]),
            &mut error,
        );
        bbs_verify_context_add_message_bytes(
            handle,
            &ByteArray::from(&b"message_2"[..]),
            &mut error,
        );
        assert_eq!(
            bbs_verify_context_finish(handle, &mut error),
            VerificationStatus::Success.code()
        );

        // a finished handle is dead
        assert_eq!(bbs_verify_context_finish(handle, &mut error), 0);
        assert_eq!(error.get_code().code(), error_codes::INVALID_HANDLE);
    }

    #[test]
    fn ffi_wrong_kind_handle() {
        let mut error = ExternError::success();
        let handle = bbs_sign_context_init(&mut error);

        assert_eq!(bbs_verify_context_finish(handle, &mut error), 0);
        assert_eq!(error.get_code().code(), error_codes::KIND_MISMATCH);

        crate::ffi::bbs_context_release(handle, &mut error);
    }
}
