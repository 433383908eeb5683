//! Verification of a BBS+ signature over a fully known message vector.

use bbs::prelude::*;

use crate::contexts::messages::{
    encode_message, ClassifiedMessage, MessageAccumulator, MessageEncoding,
};
use crate::contexts::registry::registry;
use crate::contexts::{missing, parse_signature, Context, ContextKind, VerificationStatus};
use crate::errors::prelude::*;
use crate::keys::parse_public_key;

/// Verification twin of [`crate::contexts::sign::SignContext`]; every
/// message is known to the verifier.
#[derive(Debug, Default)]
pub struct VerifyContext {
    messages: MessageAccumulator,
    public_key: Option<PublicKey>,
    signature: Option<Signature>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut VerifyContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::Verify(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a verify context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::Verify(VerifyContext::default()))
}

/// Appends a message at the next position; positions must mirror the
/// signing side exactly.
pub fn add_message(handle: u64, data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        ctx.messages.push(ClassifiedMessage::revealed(message));
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

pub fn set_signature(handle: u64, data: &[u8]) -> BbsNativeResult<()> {
    let signature = parse_signature(data)?;
    with_context(handle, |ctx| {
        ctx.signature = Some(signature);
        Ok(())
    })
}

/// Consumes the context and reports the verification outcome. A failed
/// pairing check is `BadSignature`, not an error.
pub fn finish(handle: u64) -> BbsNativeResult<VerificationStatus> {
    let ctx = expect_context!(registry().take(handle, ContextKind::Verify)?, Verify);
    let VerifyContext {
        messages,
        public_key,
        signature,
    } = ctx;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
    let signature = signature.ok_or_else(|| missing("signature"))?;
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
    let messages = messages.to_signature_messages();
    if signature.verify(messages.as_slice(), &public_key)? {
        Ok(VerificationStatus::Success)
    } else {
        Ok(VerificationStatus::BadSignature)
    }
}
