//! Message accumulation shared by every context kind.
//!
//! Callers hand over either raw bytes that still need the hash-to-scalar
//! step or a value that is already a scalar; the two cases are told apart
//! by an explicit [`MessageEncoding`] tag rather than by which entry point
//! happened to be called. The disclosure class and, for externally blinded
//! messages, the blinding factor travel together with the value as one
//! record.

use bbs::prelude::*;
use std::convert::TryFrom;

use crate::errors::prelude::*;

/// How a caller-supplied value maps onto a field element.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageEncoding {
    /// Arbitrary bytes; the hash-to-scalar step is still needed.
    Raw,
    /// Already a scalar in its 32-byte serialized form.
    PreHashed,
}

/// Disclosure class of an accumulated message.
#[derive(Copy, Clone, Debug)]
pub enum MessageClass {
    /// Cleartext value known to the verifier.
    Revealed,
    /// Hidden; the blinding factor is generated for this proof only.
    HiddenProofSpecific,
    /// Hidden; the caller supplies the blinding factor so the same hidden
    /// value can be correlated across independent proofs.
    HiddenExternal(ProofNonce),
}

/// One accumulated message together with its disclosure class.
#[derive(Copy, Clone, Debug)]
pub struct ClassifiedMessage {
    pub message: SignatureMessage,
    pub class: MessageClass,
}

impl ClassifiedMessage {
    pub fn revealed(message: SignatureMessage) -> ClassifiedMessage {
        ClassifiedMessage {
            message,
            class: MessageClass::Revealed,
        }
    }

    fn into_proof_message(self) -> ProofMessage {
        match self.class {
            MessageClass::Revealed => ProofMessage::Revealed(self.message),
            MessageClass::HiddenProofSpecific => {
                ProofMessage::Hidden(HiddenMessage::ProofSpecificBlinding(self.message))
            }
            MessageClass::HiddenExternal(blinding) => {
                ProofMessage::Hidden(HiddenMessage::ExternalBlinding(self.message, blinding))
            }
        }
    }
}

/// Ordered, append-only list of classified messages.
///
/// A message's position is assigned by insertion order and is significant:
/// prover and verifier must place the same logical message at the same
/// index for the underlying protocol to line up.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    entries: Vec<ClassifiedMessage>,
}

impl MessageAccumulator {
    pub fn push(&mut self, entry: ClassifiedMessage) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Class-agnostic view of the accumulated values, in order.
    pub fn to_signature_messages(&self) -> Vec<SignatureMessage> {
        self.entries.iter().map(|e| e.message).collect()
    }

    /// Class-preserving conversion for the proof-of-knowledge step.
    pub fn into_proof_messages(self) -> Vec<ProofMessage> {
        self.entries
            .into_iter()
            .map(ClassifiedMessage::into_proof_message)
            .collect()
    }
}

/// Maps caller-supplied bytes to a message scalar according to `encoding`.
pub fn encode_message(data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<SignatureMessage> {
    match encoding {
        MessageEncoding::Raw => Ok(SignatureMessage::hash(data)),
        MessageEncoding::PreHashed => {
            check_scalar_len(data, "pre-hashed message")?;
            SignatureMessage::try_from(data).map_err(|e| {
                err_msg(
                    BbsNativeErrorKind::InvalidArgument,
                    format!("pre-hashed message is not a valid scalar: {}", e),
                )
            })
        }
    }
}

/// Maps caller-supplied bytes to a proof nonce according to `encoding`.
pub fn encode_nonce(data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<ProofNonce> {
    match encoding {
        MessageEncoding::Raw => Ok(ProofNonce::hash(data)),
        MessageEncoding::PreHashed => {
            check_scalar_len(data, "pre-hashed nonce")?;
            ProofNonce::try_from(data).map_err(|e| {
                err_msg(
                    BbsNativeErrorKind::InvalidArgument,
                    format!("pre-hashed nonce is not a valid scalar: {}", e),
                )
            })
        }
    }
}

/// Parses an externally supplied blinding factor. The caller must hand the
/// same serialized scalar to every context that should correlate.
pub fn parse_blinding(data: &[u8]) -> BbsNativeResult<ProofNonce> {
    check_scalar_len(data, "blinding factor")?;
    ProofNonce::try_from(data).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("blinding factor is not a valid scalar: {}", e),
        )
    })
}

fn check_scalar_len(data: &[u8], what: &str) -> BbsNativeResult<()> {
    if data.len() != FR_COMPRESSED_SIZE {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "{} must be {} bytes, found {}",
                what,
                FR_COMPRESSED_SIZE,
                data.len()
            ),
        ));
    }
    Ok(())
}
