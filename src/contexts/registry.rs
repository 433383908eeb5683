//! Process-wide arena owning every live context.
//!
//! A handle packs a slot index in its low 32 bits and a per-slot
//! generation counter in its high 32 bits. The generation is bumped each
//! time a slot is vacated, so a handle that has been finished or released
//! never resolves again, even after the slot is reused.
//!
//! The table itself is the only shared lock; each occupied slot carries
//! its own mutex so builder calls on independent handles proceed in
//! parallel. A single handle is never driven from two call sites at once
//! by contract, so the per-slot mutex is uncontended in correct use.

use std::sync::{Mutex, RwLock};

use crate::contexts::{Context, ContextKind};
use crate::errors::prelude::*;

struct Slot {
    generation: u32,
    occupant: Option<Mutex<Context>>,
}

pub struct HandleRegistry {
    slots: RwLock<Vec<Slot>>,
}

fn pack(index: usize, generation: u32) -> u64 {
    (u64::from(generation) << 32) | index as u64
}

fn unpack(handle: u64) -> (usize, u32) {
    ((handle & 0xffff_ffff) as usize, (handle >> 32) as u32)
}

fn invalid_handle() -> BbsNativeError {
    BbsNativeError::from_kind(BbsNativeErrorKind::InvalidHandle)
}

impl HandleRegistry {
    pub fn new() -> HandleRegistry {
        HandleRegistry {
            slots: RwLock::new(Vec::new()),
        }
    }

    /// Stores `context` and returns the handle that addresses it.
    pub fn insert(&self, context: Context) -> u64 {
        let kind = context.kind();
        let mut slots = self.slots.write().unwrap();
        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.occupant.is_none() {
                slot.occupant = Some(Mutex::new(context));
                let handle = pack(index, slot.generation);
                trace!("registry: {} context -> handle {}", kind.name(), handle);
                return handle;
            }
        }
        slots.push(Slot {
            generation: 1,
            occupant: Some(Mutex::new(context)),
        });
        let handle = pack(slots.len() - 1, 1);
        trace!("registry: {} context -> handle {}", kind.name(), handle);
        handle
    }

    /// Runs `f` with mutable access to the context behind `handle`.
    ///
    /// The closure's error leaves the context in place; builder calls rely
    /// on this to keep accumulated state intact across rejected inputs.
    pub fn update<T, F>(&self, handle: u64, f: F) -> BbsNativeResult<T>
    where
        F: FnOnce(&mut Context) -> BbsNativeResult<T>,
    {
        let slots = self.slots.read().unwrap();
        let (index, generation) = unpack(handle);
        let slot = slots.get(index).ok_or_else(invalid_handle)?;
        if slot.generation != generation {
            return Err(invalid_handle());
        }
        let occupant = slot.occupant.as_ref().ok_or_else(invalid_handle)?;
        let mut context = occupant.lock().unwrap();
        f(&mut context)
    }

    /// Removes and returns the context behind `handle`.
    ///
    /// The kind is checked before the slot is vacated: a mismatch is an
    /// error and the context stays alive under its handle.
    pub fn take(&self, handle: u64, expected: ContextKind) -> BbsNativeResult<Context> {
        let mut slots = self.slots.write().unwrap();
        let (index, generation) = unpack(handle);
        let slot = slots.get_mut(index).ok_or_else(invalid_handle)?;
        if slot.generation != generation {
            return Err(invalid_handle());
        }
        let found = match slot.occupant.as_ref() {
            Some(occupant) => occupant.lock().unwrap().kind(),
            None => return Err(invalid_handle()),
        };
        if found != expected {
            return Err(err_msg(
                BbsNativeErrorKind::KindMismatch,
                format!(
                    "expected a {} context, handle refers to a {} context",
                    expected.name(),
                    found.name()
                ),
            ));
        }
        let occupant = slot.occupant.take().ok_or_else(invalid_handle)?;
        slot.generation = slot.generation.wrapping_add(1);
        trace!("registry: handle {} taken ({})", handle, found.name());
        Ok(occupant.into_inner().unwrap())
    }

    /// Drops the context behind `handle` without running its protocol
    /// step. This is the cancellation path; any context kind is accepted.
    pub fn release(&self, handle: u64) -> BbsNativeResult<()> {
        let mut slots = self.slots.write().unwrap();
        let (index, generation) = unpack(handle);
        let slot = slots.get_mut(index).ok_or_else(invalid_handle)?;
        if slot.generation != generation || slot.occupant.is_none() {
            return Err(invalid_handle());
        }
        slot.occupant = None;
        slot.generation = slot.generation.wrapping_add(1);
        trace!("registry: handle {} released", handle);
        Ok(())
    }

    /// Number of live contexts. Used by leak checks in tests.
    pub fn live_count(&self) -> usize {
        let slots = self.slots.read().unwrap();
        slots.iter().filter(|s| s.occupant.is_some()).count()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        HandleRegistry::new()
    }
}

lazy_static! {
    static ref REGISTRY: HandleRegistry = HandleRegistry::new();
}

/// The process-wide registry every context operation goes through.
pub fn registry() -> &'static HandleRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::sign::SignContext;
    use std::thread;

    fn sign_context() -> Context {
        Context::Sign(SignContext::default())
    }

    #[test]
    fn insert_take_lifecycle() {
        let reg = HandleRegistry::new();
        let handle = reg.insert(sign_context());
        assert_eq!(reg.live_count(), 1);

        let ctx = reg.take(handle, ContextKind::Sign).unwrap();
        assert_eq!(ctx.kind(), ContextKind::Sign);
        assert_eq!(reg.live_count(), 0);

        // the handle is dead after take
        let err = reg.take(handle, ContextKind::Sign).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidHandle);
    }

    #[test]
    fn stale_handle_after_slot_reuse() {
        let reg = HandleRegistry::new();
        let first = reg.insert(sign_context());
        reg.release(first).unwrap();

        // the vacated slot is reused with a new generation
        let second = reg.insert(sign_context());
        assert_ne!(first, second);
        assert_eq!(
            reg.update(first, |_| Ok(())).unwrap_err().kind(),
            BbsNativeErrorKind::InvalidHandle
        );
        assert!(reg.update(second, |_| Ok(())).is_ok());
    }

    #[test]
    fn kind_mismatch_leaves_context_alive() {
        let reg = HandleRegistry::new();
        let handle = reg.insert(sign_context());

        let err = reg.take(handle, ContextKind::Verify).unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::KindMismatch);
        assert_eq!(reg.live_count(), 1);

        // still usable with the right kind
        assert!(reg.take(handle, ContextKind::Sign).is_ok());
    }

    #[test]
    fn update_error_keeps_context() {
        let reg = HandleRegistry::new();
        let handle = reg.insert(sign_context());
        let err = reg
            .update(handle, |_| -> BbsNativeResult<()> {
                Err(BbsNativeError::from_kind(
                    BbsNativeErrorKind::InvalidArgument,
                ))
            })
            .unwrap_err();
        assert_eq!(err.kind(), BbsNativeErrorKind::InvalidArgument);
        assert_eq!(reg.live_count(), 1);
    }

    #[test]
    fn release_unknown_handle() {
        let reg = HandleRegistry::new();
        assert_eq!(
            reg.release(42).unwrap_err().kind(),
            BbsNativeErrorKind::InvalidHandle
        );
    }

    #[test]
    fn concurrent_independent_handles() {
        let reg = std::sync::Arc::new(HandleRegistry::new());
        let mut joins = Vec::new();
        for _ in 0..8 {
            let reg = reg.clone();
            joins.push(thread::spawn(move || {
                for _ in 0..100 {
                    let handle = reg.insert(Context::Sign(SignContext::default()));
                    reg.update(handle, |_| Ok(())).unwrap();
                    reg.take(handle, ContextKind::Sign).unwrap();
                }
            }));
        }
        for join in joins {
            join.join().unwrap();
        }
        assert_eq!(reg.live_count(), 0);
    }
}
