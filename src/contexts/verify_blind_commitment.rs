//! Signer-side verification of a holder's blind commitment.
//!
//! The signer declares which positions the commitment is supposed to
//! cover, supplies the commitment, challenge hash and proof the holder
//! produced, and checks that the holder actually knows the committed
//! exponents before agreeing to blind-sign.

use bbs::prelude::*;
use std::collections::BTreeSet;

use crate::contexts::messages::{encode_nonce, MessageEncoding};
use crate::contexts::registry::registry;
use crate::contexts::{
    missing, parse_challenge, parse_commitment, Context, ContextKind, VerificationStatus,
};
use crate::errors::prelude::*;
use crate::keys::parse_public_key;

/// Accumulates the pieces of a commitment proof for verification.
#[derive(Debug, Default)]
pub struct VerifyBlindCommitmentContext {
    blinded: BTreeSet<usize>,
    commitment: Option<Commitment>,
    challenge_hash: Option<ProofChallenge>,
    proof: Option<Vec<u8>>,
    public_key: Option<PublicKey>,
    nonce: Option<ProofNonce>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut VerifyBlindCommitmentContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::VerifyBlindCommitment(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a verify blind commitment context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::VerifyBlindCommitment(
        VerifyBlindCommitmentContext::default(),
    ))
}

/// Declares that position `index` is covered by the commitment.
pub fn add_blinded(handle: u64, index: usize) -> BbsNativeResult<()> {
    with_context(handle, |ctx| {
        if !ctx.blinded.insert(index) {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!("index {} was already declared blinded", index),
            ));
        }
        Ok(())
    })
}

pub fn set_commitment(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let commitment = parse_commitment(data)?;
    with_context(handle, |ctx| {
        ctx.commitment = Some(commitment);
        Ok(())
    })
}

pub fn set_challenge_hash(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let challenge = parse_challenge(data)?;
    with_context(handle, |ctx| {
        ctx.challenge_hash = Some(challenge);
        Ok(())
    })
}

/// Stores the proof-of-knowledge bytes: everything the holder's
/// commitment output carries after the commitment and challenge hash.
pub fn set_proof(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    if data.is_empty() {
        return Err(err_msg(
            BbsNativeErrorKind::InvalidArgument,
            "proof must not be empty",
        ));
    }
    let proof = data.to_vec();
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

/// Consumes the context and reports whether the holder proved knowledge
/// of the committed values. A rejected proof is `BadHiddenMessage`.
pub fn finish(handle: u64) -> BbsNativeResult<VerificationStatus> {
    let ctx = expect_context!(
        registry().take(handle, ContextKind::VerifyBlindCommitment)?,
        VerifyBlindCommitment
    );
    let VerifyBlindCommitmentContext {
        blinded,
        commitment,
        challenge_hash,
        proof,
        public_key,
        nonce,
    } = ctx;
    let commitment = commitment.ok_or_else(|| missing("commitment"))?;
    let challenge_hash = challenge_hash.ok_or_else(|| missing("challenge hash"))?;
    let proof = proof.ok_or_else(|| missing("proof"))?;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    let nonce = nonce.ok_or_else(|| missing("nonce"))?;
    if let Some(index) = blinded.iter().rev().next() {
        if *index >= public_key.message_count() {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!(
                    "blinded index {} is out of range for a key with {} slots",
                    index,
                    public_key.message_count()
                ),
            ));
        }
    }

    // Reassemble the wire form the holder produced and parse it whole.
    let mut bytes =
        Vec::with_capacity(G1_COMPRESSED_SIZE + FR_COMPRESSED_SIZE + proof.len());
    bytes.extend_from_slice(&commitment.to_bytes_compressed_form());
    bytes.extend_from_slice(&challenge_hash.to_bytes_compressed_form());
    bytes.extend_from_slice(&proof);
    let commitment_ctx = BlindSignatureContext::from_bytes_compressed_form(&bytes).map_err(|e| {
        err_msg(
            BbsNativeErrorKind::InvalidArgument,
            format!("malformed proof of hidden messages: {}", e),
        )
    })?;

    // The commitment covers every position not owned by the signer.
    let known: BTreeSet<usize> = (0..public_key.message_count())
        .filter(|i| !blinded.contains(i))
        .collect();
    match commitment_ctx.verify(&known, &public_key, &nonce) {
        Ok(true) => Ok(VerificationStatus::Success),
        Ok(false) => Ok(VerificationStatus::BadHiddenMessage),
        Err(e) => {
            trace!("blind commitment proof rejected: {}", e);
            Ok(VerificationStatus::BadHiddenMessage)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::blind_commitment;
    use crate::keys;

    fn commit(
        pk: &[u8],
        nonce: &[u8],
        indices: &[usize],
    ) -> (Vec<u8>, Vec<u8>) {
        let handle = blind_commitment::init();
        blind_commitment::set_public_key(handle, pk).unwrap();
        blind_commitment::set_nonce(handle, nonce, MessageEncoding::Raw).unwrap();
        for (i, index) in indices.iter().enumerate() {
            blind_commitment::add_message(
                handle,
                *index,
                format!("hidden_{}", i).as_bytes(),
                MessageEncoding::Raw,
            )
            .unwrap();
        }
        blind_commitment::finish(handle).unwrap()
    }

    fn load(handle: u64, commitment_proof: &[u8], pk: &[u8], indices: &[usize]) {
        let challenge_end = G1_COMPRESSED_SIZE + FR_COMPRESSED_SIZE;
        set_commitment(handle, &commitment_proof[..G1_COMPRESSED_SIZE]).unwrap();
        set_challenge_hash(handle, &commitment_proof[G1_COMPRESSED_SIZE..challenge_end]).unwrap();
        set_proof(handle, &commitment_proof[challenge_end..]).unwrap();
        set_public_key(handle, pk).unwrap();
        for index in indices {
            add_blinded(handle, *index).unwrap();
        }
    }

    #[test]
    fn accepts_honest_commitment() {
        let (_, sk) = keys::generate_bls_key(Some(b"vbc-accept".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 4).unwrap();
        let (commitment_proof, _) = commit(&pk, b"issuing nonce", &[0, 2]);

        let handle = init();
        load(handle, &commitment_proof, &pk, &[0, 2]);
        set_nonce(handle, b"issuing nonce", MessageEncoding::Raw).unwrap();
        assert_eq!(finish(handle).unwrap(), VerificationStatus::Success);
    }

    #[test]
    fn nonce_mismatch_is_rejected() {
        let (_, sk) = keys::generate_bls_key(Some(b"vbc-nonce".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 4).unwrap();
        let (commitment_proof, _) = commit(&pk, b"issuing nonce", &[0]);

        let handle = init();
        load(handle, &commitment_proof, &pk, &[0]);
        set_nonce(handle, b"a different nonce", MessageEncoding::Raw).unwrap();
        assert_eq!(
            finish(handle).unwrap(),
            VerificationStatus::BadHiddenMessage
        );
    }

    #[test]
    fn wrong_blinded_set_is_rejected() {
        let (_, sk) = keys::generate_bls_key(Some(b"vbc-set".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 4).unwrap();
        let (commitment_proof, _) = commit(&pk, b"issuing nonce", &[0]);

        // signer believes positions 0 and 1 were committed; only 0 was
        let handle = init();
        load(handle, &commitment_proof, &pk, &[0, 1]);
        set_nonce(handle, b"issuing nonce", MessageEncoding::Raw).unwrap();
        assert_eq!(
            finish(handle).unwrap(),
            VerificationStatus::BadHiddenMessage
        );
    }

    #[test]
    fn missing_fields_are_invalid_argument() {
        let handle = init();
        let err = finish(handle).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
    }
}
