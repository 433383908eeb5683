//! Selective-disclosure proof creation.
//!
//! Every message position of the signed vector must be supplied, each
//! tagged with its disclosure class. The signature is re-randomized before
//! the sigma protocol runs, so proofs over the same signature are
//! unlinkable to each other unless a hidden message deliberately carries
//! an external blinding factor.

use bbs::prelude::*;

use crate::contexts::messages::{
    encode_message, encode_nonce, ClassifiedMessage, MessageAccumulator, MessageClass,
    MessageEncoding,
};
use crate::contexts::registry::registry;
use crate::contexts::{missing, parse_signature, Context, ContextKind};
use crate::errors::prelude::*;
use crate::keys::parse_public_key;

/// Accumulates the classified message vector, signature, key and nonce
/// for proof generation.
#[derive(Debug, Default)]
pub struct CreateProofContext {
    messages: MessageAccumulator,
    signature: Option<Signature>,
    public_key: Option<PublicKey>,
    nonce: Option<ProofNonce>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut CreateProofContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::CreateProof(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a create proof context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::CreateProof(CreateProofContext::default()))
}

/// Appends the message at the next position with its disclosure class.
/// Positions must follow signing order exactly.
pub fn add_proof_message(
    handle: u64,
    data: &[u8],
    encoding: MessageEncoding,
    class: MessageClass,
) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        ctx.messages.push(ClassifiedMessage { message, class });
        Ok(())
    })
}

pub fn set_signature(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let signature = parse_signature(data)?;
    with_context(handle, |ctx| {
        ctx.signature = Some(signature);
        Ok(())
    })
}

pub fn set_public_key(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let public_key = parse_public_key(data)?;
    with_context(handle, |ctx| {
        ctx.public_key = Some(public_key);
        Ok(())
    })
}

pub fn set_nonce(handle: u64, data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<()> {
    let nonce = encode_nonce(data, encoding)?;
    with_context(handle, |ctx| {
        ctx.nonce = Some(nonce);
        Ok(())
    })
}

/// Consumes the context and returns the proof bytes: the re-randomized
/// signature elements and the per-message sigma responses, bound to the
/// nonce through the Fiat-Shamir challenge.
pub fn finish(handle: u64) -> BbsNativeResult<Vec<u8>> {
    let ctx = expect_context!(
        registry().take(handle, ContextKind::CreateProof)?,
        CreateProof
    );
    let CreateProofContext {
        messages,
        signature,
        public_key,
        nonce,
    } = ctx;
    let signature = signature.ok_or_else(|| missing("signature"))?;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    let nonce = nonce.ok_or_else(|| missing("nonce"))?;
    if messages.len() != public_key.message_count() {
        return Err(err_msg(
            BbsNativeErrorKind::MessageCountMismatch,
            format!(
                "public key expects {} messages, {} were added",
                public_key.message_count(),
                messages.len()
            ),
        ));
    }
    let proof_messages = messages.into_proof_messages();
    let pok = PoKOfSignature::init(&signature, &public_key, proof_messages.as_slice())?;
    let mut challenge_bytes = pok.to_bytes();
    challenge_bytes.extend_from_slice(&nonce.to_bytes_uncompressed_form()[..]);
    let challenge = ProofChallenge::hash(&challenge_bytes);
    let proof = pok.gen_proof(&challenge)?;
    Ok(proof.to_bytes_compressed_form())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_requires_signature_key_and_nonce() {
        let handle = init();
        add_proof_message(handle, b"m", MessageEncoding::Raw, MessageClass::Revealed).unwrap();
        let err = finish(handle).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
    }

    #[test]
    fn signature_size_is_checked() {
        let handle = init();
        let err = set_signature(handle, &[0u8; 64]).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }
}
