//! Signer-side completion of a blind signature.
//!
//! The verified commitment stands in for the holder's hidden messages;
//! the signer contributes its own messages at the remaining positions and
//! runs the same signing equation as the plain path. Once the holder
//! unblinds the result with its blinding factor, the signature is
//! indistinguishable from one produced over the full plaintext vector.

use bbs::prelude::*;
use std::collections::BTreeMap;

use crate::contexts::messages::{encode_message, MessageEncoding};
use crate::contexts::registry::registry;
use crate::contexts::{missing, parse_commitment, Context, ContextKind};
use crate::errors::prelude::*;
use crate::keys::{parse_public_key, parse_secret_key};

/// Accumulates the signer's messages, keys and the accepted commitment.
#[derive(Debug, Default)]
pub struct BlindSignContext {
    messages: BTreeMap<usize, SignatureMessage>,
    commitment: Option<Commitment>,
    secret_key: Option<SecretKey>,
    public_key: Option<PublicKey>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut BlindSignContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::BlindSign(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a blind sign context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::BlindSign(BlindSignContext::default()))
}

/// Adds one of the signer's own messages at global position `index`.
pub fn add_message(
    handle: u64,
    index: usize,
    data: &[u8],
    encoding: MessageEncoding,
) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        if ctx.messages.contains_key(&index) {
            return Err(err_msg(
                BbsNativeErrorKind::InvalidArgument,
                format!("a message was already added at index {}", index),
            ));
        }
        ctx.messages.insert(index, message);
        Ok(())
    })
}

/// Stores the commitment accepted during commitment verification.
pub fn set_commitment(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let commitment = parse_commitment(data)?;
    with_context(handle, |ctx| {
        ctx.commitment = Some(commitment);
        Ok(())
    })
}

pub fn set_secret_key(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let secret_key = parse_secret_key(data)?;
    with_context(handle, |ctx| {
        ctx.secret_key = Some(secret_key);
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

/// Consumes the context and returns the blinded-signature bytes.
pub fn finish(handle: u64) -> BbsNativeResult<Vec<u8>> {
    let ctx = expect_context!(registry().take(handle, ContextKind::BlindSign)?, BlindSign);
    let BlindSignContext {
        messages,
        commitment,
        secret_key,
        public_key,
    } = ctx;
    let commitment = commitment.ok_or_else(|| missing("commitment"))?;
    let secret_key = secret_key.ok_or_else(|| missing("secret key"))?;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    if let Some(index) = messages.keys().rev().next() {
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
    let signature = BlindSignature::new(&commitment, &messages, &secret_key, &public_key)?;
    Ok(signature.to_bytes_compressed_form().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn finish_requires_commitment() {
        let (_, sk) = keys::generate_bls_key(Some(b"blind-sign-missing".to_vec()));
        let pk = keys::bbs_key_from_secret_key(&sk, 2).unwrap();

        let handle = init();
        set_secret_key(handle, &sk).unwrap();
        set_public_key(handle, &pk).unwrap();
        add_message(handle, 1, b"known", MessageEncoding::Raw).unwrap();
        let err = finish(handle).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let handle = init();
        add_message(handle, 1, b"known", MessageEncoding::Raw).unwrap();
        let err = add_message(handle, 1, b"known again", MessageEncoding::Raw).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }

    #[test]
    fn commitment_must_be_a_point() {
        let handle = init();
        let err = set_commitment(handle, &[0u8; 12]).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        registry().release(handle).unwrap();
    }
}
