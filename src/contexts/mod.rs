//! Protocol contexts and the registry that owns them.
//!
//! Every context is a variant of the closed [`Context`] sum type. The
//! registry is the sole owner of a live context; builder calls borrow it
//! mutably through the registry and `finish` takes it out, so use after
//! finish is impossible by construction.

/// Unwraps a context taken from the registry into the expected variant.
/// The registry has already checked the kind, so any other variant here is
/// a registry bug.
macro_rules! expect_context {
    ($ctx:expr, $variant:ident) => {
        match $ctx {
            $crate::contexts::Context::$variant(inner) => inner,
            _ => unreachable!("registry returned a context of the wrong kind"),
        }
    };
}

pub mod blind_commitment;
pub mod blind_sign;
pub mod create_proof;
pub mod messages;
pub mod registry;
pub mod sign;
pub mod verify;
pub mod verify_blind_commitment;
pub mod verify_proof;

use bbs::prelude::*;
use std::convert::TryFrom;

use crate::errors::prelude::*;

/// Identifies which protocol step a live context belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContextKind {
    Sign,
    Verify,
    BlindCommitment,
    VerifyBlindCommitment,
    BlindSign,
    CreateProof,
    VerifyProof,
}

impl ContextKind {
    pub fn name(self) -> &'static str {
        match self {
            ContextKind::Sign => "sign",
            ContextKind::Verify => "verify",
            ContextKind::BlindCommitment => "blind commitment",
            ContextKind::VerifyBlindCommitment => "verify blind commitment",
            ContextKind::BlindSign => "blind sign",
            ContextKind::CreateProof => "create proof",
            ContextKind::VerifyProof => "verify proof",
        }
    }
}

/// A live protocol context, exclusively owned by the registry between
/// `init` and `finish`.
#[derive(Debug)]
pub enum Context {
    Sign(sign::SignContext),
    Verify(verify::VerifyContext),
    BlindCommitment(blind_commitment::BlindCommitmentContext),
    VerifyBlindCommitment(verify_blind_commitment::VerifyBlindCommitmentContext),
    BlindSign(blind_sign::BlindSignContext),
    CreateProof(create_proof::CreateProofContext),
    VerifyProof(verify_proof::VerifyProofContext),
}

impl Context {
    pub fn kind(&self) -> ContextKind {
        match self {
            Context::Sign(_) => ContextKind::Sign,
            Context::Verify(_) => ContextKind::Verify,
            Context::BlindCommitment(_) => ContextKind::BlindCommitment,
            Context::VerifyBlindCommitment(_) => ContextKind::VerifyBlindCommitment,
            Context::BlindSign(_) => ContextKind::BlindSign,
            Context::CreateProof(_) => ContextKind::CreateProof,
            Context::VerifyProof(_) => ContextKind::VerifyProof,
        }
    }
}

/// Outcome of a verification step.
///
/// A failed verification is a legitimate, fully-reported result, not an
/// API error; the numeric codes travel unchanged across the call boundary.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VerificationStatus {
    /// All checks passed
    Success,
    /// The signature-level pairing check failed
    BadSignature,
    /// A sigma-protocol response for a hidden value is inconsistent
    BadHiddenMessage,
    /// A revealed plaintext does not match what the proof commits to
    BadRevealedMessage,
}

impl VerificationStatus {
    pub fn code(self) -> i32 {
        match self {
            VerificationStatus::Success => 200,
            VerificationStatus::BadSignature => 400,
            VerificationStatus::BadHiddenMessage => 401,
            VerificationStatus::BadRevealedMessage => 402,
        }
    }

    pub fn is_success(self) -> bool {
        self == VerificationStatus::Success
    }
}

impl From<PoKOfSignatureProofStatus> for VerificationStatus {
    fn from(status: PoKOfSignatureProofStatus) -> Self {
        match status {
            PoKOfSignatureProofStatus::Success => VerificationStatus::Success,
            PoKOfSignatureProofStatus::BadSignature => VerificationStatus::BadSignature,
            PoKOfSignatureProofStatus::BadHiddenMessage => VerificationStatus::BadHiddenMessage,
            PoKOfSignatureProofStatus::BadRevealedMessage => VerificationStatus::BadRevealedMessage,
        }
    }
}

pub(crate) fn parse_signature(data: &[u8]) -> BbsNativeResult<Signature> {
    if data.len() != SIGNATURE_COMPRESSED_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "signature must be {} bytes, found {}",
                SIGNATURE_COMPRESSED_SIZE,
                data.len()
            ),
        ));
    }
    Ok(Signature::from(array_ref![
        data,
        0,
        SIGNATURE_COMPRESSED_SIZE
    ]))
}

pub(crate) fn parse_commitment(data: &[u8]) -> BbsNativeResult<Commitment> {
    if data.len() != G1_COMPRESSED_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "commitment must be {} bytes, found {}",
                G1_COMPRESSED_SIZE,
                data.len()
            ),
        ));
    }
    Commitment::try_from(data).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("commitment is not a valid curve point: {}", e),
        )
    })
}

pub(crate) fn parse_challenge(data: &[u8]) -> BbsNativeResult<ProofChallenge> {
    if data.len() != FR_COMPRESSED_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "challenge hash must be {} bytes, found {}",
                FR_COMPRESSED_SIZE,
                data.len()
            ),
        ));
    }
    ProofChallenge::try_from(data).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("challenge hash is not a valid scalar: {}", e),
        )
    })
}

pub(crate) fn missing(field: &str) -> BbsNativeError {
    err_msg(
        BbsNativeErrorKind::InvalidArgument,
        format!("{} must be set before finish", field),
    )
}
