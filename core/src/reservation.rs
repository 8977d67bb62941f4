//! Exclusive reservation primitive.
//!
//! Per reservable actor: `Free -> Held(holder) -> Free`.
//!
//! RULES:
//!   - At most one holder per target at any instant.
//!   - Holders are weak: a slot never keeps an actor alive, and a token
//!     never keeps a slot alive.
//!   - A token releases its claim when dropped, whatever the exit path.
//!   - The per-step sweep frees claims whose holder is dead or gone, so
//!     an abandoned claim cannot starve the target forever.

use crate::types::ActorId;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Claim {
    holder: ActorId,
    serial: u64,
}

#[derive(Debug)]
struct ReservationSlot {
    claim: Mutex<Option<Claim>>,
}

impl ReservationSlot {
    fn lock(&self) -> MutexGuard<'_, Option<Claim>> {
        self.claim.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped claim on a reservable actor. Dropping it releases the claim
/// if it is still the current one.
#[derive(Debug)]
#[must_use = "dropping a reservation token releases the reservation"]
pub struct ReservationToken {
    slot:   Weak<ReservationSlot>,
    serial: u64,
    target: ActorId,
    holder: ActorId,
}

impl ReservationToken {
    pub fn target(&self) -> ActorId { self.target }
    pub fn holder(&self) -> ActorId { self.holder }

    /// False once the claim was swept, or the target left the world.
    pub fn is_valid(&self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let claim = *slot.lock();
        claim == Some(self.claim())
    }

    /// Explicit release. Returns whether this token still held the claim.
    pub fn release(self) -> bool {
        self.release_inner()
    }

    fn claim(&self) -> Claim {
        Claim { holder: self.holder, serial: self.serial }
    }

    fn release_inner(&self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let mut claim = slot.lock();
        if *claim == Some(self.claim()) {
            *claim = None;
            true
        } else {
            false
        }
    }
}

impl Drop for ReservationToken {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// All reservable slots in the world, keyed by target.
#[derive(Debug, Default)]
pub struct ReservationTable {
    slots:       BTreeMap<ActorId, Arc<ReservationSlot>>,
    next_serial: u64,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, target: ActorId) {
        self.slots.entry(target).or_insert_with(|| {
            Arc::new(ReservationSlot { claim: Mutex::new(None) })
        });
    }

    /// Drop the slot. Outstanding tokens for it become inert.
    pub(crate) fn unregister(&mut self, target: ActorId) {
        self.slots.remove(&target);
    }

    pub fn is_reservable(&self, target: ActorId) -> bool {
        self.slots.contains_key(&target)
    }

    /// Claim `target` for `requester`. Fails (None) when the target is not
    /// reservable or is held by a live holder. A claim held by a dead
    /// holder is overwritten.
    pub fn reserve(
        &mut self,
        target:    ActorId,
        requester: ActorId,
        is_live:   impl Fn(ActorId) -> bool,
    ) -> Option<ReservationToken> {
        let slot = self.slots.get(&target)?;
        let mut claim = slot.lock();
        if let Some(current) = *claim {
            if is_live(current.holder) {
                return None;
            }
            log::warn!("reservation on {target}: replacing stale holder {}", current.holder);
        }

        self.next_serial += 1;
        let serial = self.next_serial;
        *claim = Some(Claim { holder: requester, serial });
        drop(claim);

        Some(ReservationToken {
            slot: Arc::downgrade(slot),
            serial,
            target,
            holder: requester,
        })
    }

    pub fn is_reserved(&self, target: ActorId) -> bool {
        self.holder(target).is_some()
    }

    pub fn holder(&self, target: ActorId) -> Option<ActorId> {
        self.slots
            .get(&target)
            .and_then(|slot| {
                let claim = *slot.lock();
                claim.map(|c| c.holder)
            })
    }

    /// Free every claim whose holder is no longer live.
    /// Returns (target, holder) pairs in target order.
    pub fn sweep(&mut self, is_live: impl Fn(ActorId) -> bool) -> Vec<(ActorId, ActorId)> {
        let mut freed = Vec::new();
        for (target, slot) in &self.slots {
            let mut claim = slot.lock();
            if let Some(current) = *claim {
                if !is_live(current.holder) {
                    *claim = None;
                    freed.push((*target, current.holder));
                }
            }
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: ActorId = ActorId(1);
    const X: ActorId = ActorId(2);
    const Y: ActorId = ActorId(3);

    fn table() -> ReservationTable {
        let mut t = ReservationTable::new();
        t.register(TARGET);
        t
    }

    #[test]
    fn second_reserve_fails_while_first_holds() {
        let mut t = table();
        let token = t.reserve(TARGET, X, |_| true).expect("free target");
        assert!(t.reserve(TARGET, Y, |_| true).is_none());
        assert_eq!(t.holder(TARGET), Some(X));
        assert!(token.is_valid());
    }

    #[test]
    fn drop_releases() {
        let mut t = table();
        {
            let _token = t.reserve(TARGET, X, |_| true).expect("free target");
            assert!(t.is_reserved(TARGET));
        }
        assert!(!t.is_reserved(TARGET));
    }

    #[test]
    fn stale_token_does_not_release_newer_claim() {
        let mut t = table();
        let old = t.reserve(TARGET, X, |_| true).expect("free target");
        // X dies; Y takes over the stale claim.
        let new = t.reserve(TARGET, Y, |a| a != X).expect("stale holder");
        assert!(!old.is_valid());
        assert!(!old.release());
        assert_eq!(t.holder(TARGET), Some(Y));
        assert!(new.release());
        assert!(!t.is_reserved(TARGET));
    }

    #[test]
    fn sweep_frees_dead_holders_only() {
        let mut t = table();
        t.register(ActorId(10));
        let _a = t.reserve(TARGET, X, |_| true).expect("free");
        let _b = t.reserve(ActorId(10), Y, |_| true).expect("free");
        let freed = t.sweep(|a| a != X);
        assert_eq!(freed, vec![(TARGET, X)]);
        assert!(!t.is_reserved(TARGET));
        assert!(t.is_reserved(ActorId(10)));
    }

    #[test]
    fn unregistered_target_invalidates_tokens() {
        let mut t = table();
        let token = t.reserve(TARGET, X, |_| true).expect("free");
        t.unregister(TARGET);
        assert!(!token.is_valid());
        assert!(t.reserve(TARGET, Y, |_| true).is_none());
    }
}
