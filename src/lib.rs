//! Handle-based protocol contexts for BBS+ signatures.
//!
//! A caller drives every protocol step through the same three-phase shape:
//! an `init` call allocates a context behind an opaque 64-bit handle, any
//! number of builder calls accumulate messages, keys, nonces and blinding
//! factors, and a `finish` call consumes the handle, runs the cryptographic
//! step and returns its output. Contexts exist for plain signing and
//! verification, holder-side blind commitments, signer-side commitment
//! verification and blind signing, and selective-disclosure proof creation
//! and verification.
//!
//! The curve and pairing arithmetic lives in the `bbs` crate; this crate
//! owns the state tracking between calls, the message-position bookkeeping
//! both sides of a proof must agree on, and the Fiat-Shamir transcript
//! assembly. The [`ffi`] module mirrors every operation as an `extern "C"`
//! function for consumers outside of Rust.

#[macro_use]
extern crate arrayref;
#[macro_use]
extern crate ffi_support;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod contexts;
pub mod errors;
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub mod ffi;
pub mod keys;

pub use contexts::{ContextKind, VerificationStatus};
