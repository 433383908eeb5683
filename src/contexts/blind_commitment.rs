//! Holder-side commitment to messages that stay hidden from the signer.
//!
//! Hidden messages are added with their global position in the eventual
//! full message vector; the positions left out are the ones the signer
//! will fill in with its own messages at blind-signing time.

use bbs::prelude::*;
use std::collections::BTreeMap;

use crate::contexts::messages::{encode_message, encode_nonce, MessageEncoding};
use crate::contexts::registry::registry;
use crate::contexts::{missing, Context, ContextKind};
use crate::errors::prelude::*;
use crate::keys::parse_public_key;

/// Accumulates the hidden messages, key and nonce for a blind commitment.
#[derive(Debug, Default)]
pub struct BlindCommitmentContext {
    hidden: BTreeMap<usize, SignatureMessage>,
    public_key: Option<PublicKey>,
    nonce: Option<ProofNonce>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut BlindCommitmentContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::BlindCommitment(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a blind commitment context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::BlindCommitment(BlindCommitmentContext::default()))
}

/// Adds a hidden message at global position `index`.
pub fn add_message(
    handle: u64,
    index: usize,
    data: &[u8],
    encoding: MessageEncoding,
) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        if ctx.hidden.contains_key(&index) {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!("a message was already committed at index {}", index),
            ));
        }
        ctx.hidden.insert(index, message);
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

/// Consumes the context and returns `(commitment proof bytes, blinding
/// factor bytes)`.
///
/// The first buffer is the serialized commitment context the signer
/// verifies: the commitment (48 bytes), the Fiat-Shamir challenge hash
/// (32 bytes) and the proof of knowledge of the committed exponents. The
/// blinding factor must be kept by the holder to unblind the eventual
/// blind signature.
pub fn finish(handle: u64) -> BbsNativeResult<(Vec<u8>, Vec<u8>)> {
    let ctx = expect_context!(
        registry().take(handle, ContextKind::BlindCommitment)?,
        BlindCommitment
    );
    let BlindCommitmentContext {
        hidden,
        public_key,
        nonce,
    } = ctx;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    let nonce = nonce.ok_or_else(|| missing("nonce"))?;
    if let Some(index) = hidden.keys().rev().next() {
        if *index >= public_key.message_count() {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!(
                    "message index {} is out of range for a key with {} slots",
                    index,
                    public_key.message_count()
                ),
            ));
        }
    }
    let (commitment_ctx, blinding) =
        Prover::new_blind_signature_context(&public_key, &hidden, &nonce)?;
    Ok((
        commitment_ctx.to_bytes_compressed_form(),
        blinding.to_bytes_compressed_form().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn duplicate_index_is_rejected() {
        let handle = init();
        add_message(handle, 0, b"hidden", MessageEncoding::Raw).unwrap();
        let err = add_message(handle, 0, b"hidden again", MessageEncoding::Raw).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }

    #[test]
    fn out_of_range_index_fails_at_finish() {
        let (_, sk) = keys::generate_bls_key(Some(b"commit-range".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 2).unwrap();

        let handle = init();
        set_public_key(handle, &pk).unwrap();
        set_nonce(handle, b"nonce", MessageEncoding::Raw).unwrap();
        add_message(handle, 5, b"hidden", MessageEncoding::Raw).unwrap();
        let err = finish(handle).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
    }

    #[test]
    fn output_layout_is_commitment_challenge_proof() {
        let (_, sk) = keys::generate_bls_key(Some(b"commit-layout".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 3).unwrap();

        let handle = init();
        set_public_key(handle, &pk).unwrap();
        set_nonce(handle, b"signing nonce", MessageEncoding::Raw).unwrap();
        add_message(handle, 0, b"link secret", MessageEncoding::Raw).unwrap();
        let (commitment_proof, blinding) = finish(handle).unwrap();

        assert!(commitment_proof.len() > G1_COMPRESSED_SIZE + FR_COMPRESSED_SIZE);
        assert_eq!(blinding.len(), FR_COMPRESSED_SIZE);

        // the whole buffer parses back as a commitment context
        assert!(BlindSignatureContext::from_bytes_compressed_form(&commitment_proof).is_ok());
    }
}
