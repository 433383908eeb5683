//! Signing over an ordered vector of messages known to the signer.

use bbs::prelude::*;

use crate::contexts::messages::{
    encode_message, ClassifiedMessage, MessageAccumulator, MessageEncoding,
};
use crate::contexts::registry::registry;
use crate::contexts::{missing, Context, ContextKind};
use crate::errors::prelude::*;
use crate::keys::{parse_public_key, parse_secret_key};

/// Accumulates the message vector and keys for producing a BBS+ signature.
#[derive(Debug, Default)]
pub struct SignContext {
    messages: MessageAccumulator,
    secret_key: Option<SecretKey>,
    public_key: Option<PublicKey>,
}

fn with_context<T, F>(handle: u64, f: F) -> BbsNativeResult<T>
where
    F: FnOnce(&mut SignContext) -> BbsNativeResult<T>,
{
    registry().update(handle, |ctx| match ctx {
        Context::Sign(inner) => f(inner),
        other => Err(err_msg(
            BbsNativeErrorKind::KindMismatch,
            format!(
                "expected a sign context, handle refers to a {} context",
                other.kind().name()
            ),
        )),
    })
}

pub fn init() -> u64 {
    registry().insert(Context::Sign(SignContext::default()))
}

/// Appends a message; its position is the number of messages added before it.
pub fn add_message(handle: u64, data: &[u8], encoding: MessageEncoding) -> BbsNativeResult<()> {
    let message = encode_message(data, encoding)?;
    with_context(handle, |ctx| {
        ctx.messages.push(ClassifiedMessage::revealed(message));
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

/// Consumes the context and returns the signature bytes.
pub fn finish(handle: u64) -> BbsNativeResult<Vec<u8>> {
    let ctx = expect_context!(registry().take(handle, ContextKind::Sign)?, Sign);
    let SignContext {
        messages,
        secret_key,
        public_key,
    } = ctx;
    let secret_key = secret_key.ok_or_else(|| missing("secret key"))?;
    let public_key = public_key.ok_or_else(|| missing("public key"))?;
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
    let signature = Signature::new(messages.as_slice(), &secret_key, &public_key)?;
    Ok(signature.to_bytes_compressed_form().to_vec())
}
