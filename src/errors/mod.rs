use bbs::errors::BBSError;
use std::fmt;

pub mod prelude {
    pub use super::{err_msg, BbsNativeError, BbsNativeErrorKind, BbsNativeResult};
}

/// The kinds of failures the context layer reports to callers.
///
/// Verification verdicts (`BadSignature` and friends) are not errors and
/// are carried by [`crate::contexts::VerificationStatus`] instead.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum BbsNativeErrorKind {
    /// The handle is unknown, already finished, or released
    #[error("Invalid handle")]
    InvalidHandle,
    /// The handle is live but belongs to a different context kind
    #[error("Handle refers to a different context kind")]
    KindMismatch,
    /// Malformed or out-of-range input, or a required field is missing
    #[error("Invalid argument")]
    InvalidArgument,
    /// The public key's message slots disagree with the accumulated messages
    #[error("Public key message count mismatch")]
    MessageCountMismatch,
    /// The algebra layer reported an internal fault
    #[error("Cryptographic operation failed")]
    CryptoFailure,
}

/// Error type carrying a [`BbsNativeErrorKind`] and a human-readable detail
/// message suitable for surfacing across the call boundary.
#[derive(Debug)]
pub struct BbsNativeError {
    kind: BbsNativeErrorKind,
    message: String,
}

impl BbsNativeError {
    pub fn from_msg<D>(kind: BbsNativeErrorKind, msg: D) -> BbsNativeError
    where
        D: fmt::Display,
    {
        BbsNativeError {
            kind,
            message: msg.to_string(),
        }
    }

    pub fn from_kind(kind: BbsNativeErrorKind) -> BbsNativeError {
        BbsNativeError {
            kind,
            message: String::new(),
        }
    }

    pub fn kind(&self) -> BbsNativeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BbsNativeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for BbsNativeError {}

impl From<BBSError> for BbsNativeError {
    fn from(err: BBSError) -> BbsNativeError {
        BbsNativeError::from_msg(BbsNativeErrorKind::CryptoFailure, err)
    }
}

pub fn err_msg<D>(kind: BbsNativeErrorKind, msg: D) -> BbsNativeError
where
    D: fmt::Display,
{
    BbsNativeError::from_msg(kind, msg)
}

pub type BbsNativeResult<T> = Result<T, BbsNativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = err_msg(BbsNativeErrorKind::InvalidArgument, "nonce must be set");
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Invalid argument: nonce must be set");

        let bare = BbsNativeError::from_kind(BbsNativeErrorKind::InvalidHandle);
        assert_eq!(bare.to_string(), "Invalid handle");
    }
}
