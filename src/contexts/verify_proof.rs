//! Selective-disclosure proof verification.
//!
//! The verifier declares which positions are revealed and supplies the
//! claimed plaintext for each, in ascending index order. The challenge is
//! recomputed from the proof's randomized signature elements, the public
//! key and the nonce; the verdict distinguishes signature-level failures
//! from hidden- and revealed-message inconsistencies.

use bbs::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::contexts::messages::{encode_message, encode_nonce, MessageEncoding};
use crate::contexts::registry::registry;
use crate::contexts::{missing, Context, ContextKind, VerificationStatus};
use crate::errors::prelude::*;
use crate::keys::parse_public_key;

/// Accumulates the proof, revealed positions and claimed plaintexts.
#[derive(Debug, Default)]
pub struct VerifyProofContext {
    revealed_indices: BTreeSet<usize>,
    revealed_messages: Vec<SignatureMessage>,
    proof: Option<PoKOfSignatureProof>,
    public_key: Option<PublicKey>,
    nonce: Option<ProofNonce>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut VerifyProofContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::VerifyProof(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a verify proof context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::VerifyProof(VerifyProofContext::default()))
}

/// Declares that position `index` is revealed by the proof.
pub fn add_revealed_index(handle: u64, index: usize) -> BbsNativeResult<()> {
    with_context(handle, |ctx| {
        if !ctx.revealed_indices.insert(index) {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!("index {} was already declared revealed", index),
            ));
        }
        Ok(())
    })
}

/// Supplies the claimed plaintext for the next revealed position, in
/// ascending index order.
pub fn add_message(handle: u64, data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        ctx.revealed_messages.push(message);
        Ok(())
    })
}

pub fn set_proof(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let proof = PoKOfSignatureProof::from_bytes_compressed_form(data).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("malformed proof: {}", e),
        )
    })?;
    with_context(handle, |ctx| {
        ctx.proof = Some(proof);
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

/// Consumes the context and reports the verification verdict. All four
/// outcomes are legitimate results; only API misuse is an error.
pub fn finish(handle: u64) -> BbsNativeResult<VerificationStatus> {
    let ctx = expect_context!(
        registry().take(handle, ContextKind::VerifyProof)?,
        VerifyProof
    );
    let VerifyProofContext {
        revealed_indices,
        revealed_messages,
        proof,
        public_key,
        nonce,
    } = ctx;
    let proof = proof.ok_or_else(|| missing("proof"))?;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    let nonce = nonce.ok_or_else(|| missing("nonce"))?;
    if let Some(index) = revealed_indices.iter().rev().next() {
        if *index >= public_key.message_count() {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!(
                    "revealed index {} is out of range for a key with {} slots",
                    index,
                    public_key.message_count()
                ),
            ));
        }
    }
    if revealed_messages.len() != revealed_indices.len() {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!(
                "{} indices were declared revealed but {} messages were supplied",
                revealed_indices.len(),
                revealed_messages.len()
            ),
        ));
    }
    let revealed: BTreeMap<usize, SignatureMessage> = revealed_indices
        .iter()
        .copied()
        .zip(revealed_messages.into_iter())
        .collect();

    let mut challenge_bytes = proof.get_bytes_for_challenge(revealed_indices, &public_key);
    challenge_bytes.extend_from_slice(&nonce.to_bytes_uncompressed_form()[..]);
    let challenge = ProofChallenge::hash(&challenge_bytes);

    match proof.verify(&public_key, &revealed, &challenge) {
        Ok(status) => Ok(status.into()),
        Err(e) => {
            trace!("proof rejected before the pairing check: {}", e);
            Ok(VerificationStatus::BadSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_revealed_index_is_rejected() {
        let handle = init();
        add_revealed_index(handle, 1).unwrap();
        let err = add_revealed_index(handle, 1).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }

    #[test]
    fn garbage_proof_is_rejected_at_set_time() {
        let handle = init();
        let err = set_proof(handle, &[1u8, 2u8, 3u8]).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }

    #[test]
    fn index_and_message_counts_must_agree() {
        let (_, sk) = crate::keys::generate_bls_key(Some(b"vp-count".to_vec()));
        let pk = crate::keys::bbs_key_from_secret_key(&sk, 3).unwrap();

        // build a real proof so set_proof succeeds
        let sign_handle = crate::contexts::sign::init();
        crate::contexts::sign::set_secret_key(sign_handle, &sk).unwrap();
        crate::contexts::sign::set_public_key(sign_handle, &pk).unwrap();
        for m in &[&b"a"[..], &b"b"[..], &b"c"[..]] {
            crate::contexts::sign::add_message(sign_handle, m, MessageEncoding::Raw).unwrap();
        }
        let signature = crate::contexts::sign::finish(sign_handle).unwrap();

        let create_handle = crate::contexts::create_proof::init();
        crate::contexts::create_proof::set_signature(create_handle, &signature).unwrap();
        crate::contexts::create_proof::set_public_key(create_handle, &pk).unwrap();
        crate::contexts::create_proof::set_nonce(create_handle, b"n", MessageEncoding::Raw)
            .unwrap();
        for m in &[&b"a"[..], &b"b"[..], &b"c"[..]] {
            crate::contexts::create_proof::add_proof_message(
                create_handle,
                m,
                MessageEncoding::Raw,
                crate::contexts::messages::MessageClass::HiddenProofSpecific,
            )
            .unwrap();
        }
        let proof = crate::contexts::create_proof::finish(create_handle).unwrap();

        let handle = init();
        set_proof(handle, &proof).unwrap();
        set_public_key(handle, &pk).unwrap();
        set_nonce(handle, b"n", MessageEncoding::Raw).unwrap();
        add_revealed_index(handle, 0).unwrap();
        // no plaintext supplied for index 0
        let err = finish(handle).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
    }
}
