//! C-callable surface.
//!
//! Every operation of the context layer is mirrored here as an
//! `extern "C"` function. Multi-byte outputs are returned through
//! `ffi_support::ByteBuffer` values the caller must release with
//! [`bbs_byte_buffer_free`]; failures are reported through an
//! `ExternError` out-parameter whose message the caller releases with
//! [`bbs_string_free`]. Builder and producer calls return 1 on success
//! and 0 on error; verification finishes return the verification status
//! code instead.

pub mod blinding;
pub mod keys;
pub mod proofs;
pub mod signing;

use ffi_support::{ByteBuffer, ErrorCode, ExternError};

use crate::contexts::registry::registry;
use crate::contexts::VerificationStatus;
use crate::errors::prelude::*;

/// Used for receiving a byte buffer from C that was allocated by either
/// C or Rust. If Rust allocated, then the outgoing struct is
/// `ffi_support::ByteBuffer`. Caller is responsible for calling free
/// where applicable.
///
/// C will not notice a difference and can use the same struct
#[repr(C)]
pub struct ByteArray {
    length: usize,
    data: *const u8,
}

impl Default for ByteArray {
    fn default() -> ByteArray {
        ByteArray {
            length: 0,
            data: std::ptr::null(),
        }
    }
}

impl ByteArray {
    pub fn to_vec(&self) -> Vec<u8> {
        if self.data.is_null() || self.length == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(self.data, self.length).to_vec() }
        }
    }

    /// `None` when no bytes were supplied; used for optional inputs
    /// such as key generation seeds.
    pub fn to_opt_vec(&self) -> Option<Vec<u8>> {
        if self.data.is_null() || self.length == 0 {
            None
        } else {
            Some(self.to_vec())
        }
    }
}

impl From<&Vec<u8>> for ByteArray {
    fn from(input: &Vec<u8>) -> ByteArray {
        ByteArray {
            length: input.len(),
            data: input.as_slice().as_ptr() as *const u8,
        }
    }
}

impl From<&[u8]> for ByteArray {
    fn from(input: &[u8]) -> ByteArray {
        ByteArray {
            length: input.len(),
            data: input.as_ptr() as *const u8,
        }
    }
}

/// Stable numeric codes carried in `ExternError.code`. 0 is success.
pub mod error_codes {
    pub const INVALID_HANDLE: i32 = 1;
    pub const KIND_MISMATCH: i32 = 2;
    pub const INVALID_ARGUMENT: i32 = 3;
    pub const MESSAGE_COUNT_MISMATCH: i32 = 4;
    pub const CRYPTO_FAILURE: i32 = 5;
}

fn code_for(kind: BbsNativeErrorKind) -> i32 {
    match kind {
        BbsNativeErrorKind::InvalidHandle => error_codes::INVALID_HANDLE,
        BbsNativeErrorKind::KindMismatch => error_codes::KIND_MISMATCH,
        BbsNativeErrorKind::InvalidArgument => error_codes::INVALID_ARGUMENT,
        BbsNativeErrorKind::MessageCountMismatch => error_codes::MESSAGE_COUNT_MISMATCH,
        BbsNativeErrorKind::CryptoFailure => error_codes::CRYPTO_FAILURE,
    }
}

pub(crate) fn extern_error(e: &BbsNativeError) -> ExternError {
    ExternError::new_error(ErrorCode::new(code_for(e.kind())), e.to_string())
}

/// Maps a builder-call result onto the 1/0 convention.
pub(crate) fn map_unit(err: &mut ExternError, res: BbsNativeResult<()>) -> i32 {
    match res {
        Ok(()) => {
            *err = ExternError::success();
            1
        }
        Err(e) => {
            *err = extern_error(&e);
            0
        }
    }
}

/// Maps a producing call's result into an output buffer.
pub(crate) fn map_buffer(
    err: &mut ExternError,
    res: BbsNativeResult<Vec<u8>>,
    out: &mut ByteBuffer,
) -> i32 {
    match res {
        Ok(bytes) => {
            *err = ExternError::success();
            *out = ByteBuffer::from_vec(bytes);
            1
        }
        Err(e) => {
            *err = extern_error(&e);
            0
        }
    }
}

/// Maps a verification result onto its status code; API misuse returns 0
/// with the error set.
pub(crate) fn map_status(err: &mut ExternError, res: BbsNativeResult<VerificationStatus>) -> i32 {
    match res {
        Ok(status) => {
            *err = ExternError::success();
            status.code()
        }
        Err(e) => {
            *err = extern_error(&e);
            0
        }
    }
}

pub(crate) fn invalid_string() -> BbsNativeError {
    err_msg(BbsNativeErrorKind::InvalidArgument, "string must not be null")
}

/// Releases the context behind `handle` without running its protocol
/// step. This is the cancellation path; the handle is dead afterwards.
#[no_mangle]
pub extern "C" fn bbs_context_release(handle: u64, err: &mut ExternError) -> i32 {
    map_unit(err, registry().release(handle))
}

define_bytebuffer_destructor!(bbs_byte_buffer_free);
define_string_destructor!(bbs_string_free);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::sign;

    #[test]
    fn release_frees_a_live_handle() {
        let handle = sign::init();
        let mut error = ExternError::success();
        assert_eq!(bbs_context_release(handle, &mut error), 1);
        assert!(error.get_code().is_success());

        // second release reports an invalid handle
        assert_eq!(bbs_context_release(handle, &mut error), 0);
        assert_eq!(error.get_code().code(), error_codes::INVALID_HANDLE);
    }

    #[test]
    fn byte_array_roundtrip() {
        let data = vec![1u8, 2u8, 3u8];
        let wrapper = ByteArray::from(&data);
        assert_eq!(wrapper.to_vec(), data);
        assert_eq!(wrapper.to_opt_vec(), Some(data));

        let empty = ByteArray::default();
        assert!(empty.to_vec().is_empty());
        assert_eq!(empty.to_opt_vec(), None);
    }
}
