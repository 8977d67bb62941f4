//! Capability tags and the per-actor capability registry.
//!
//! RULE: A module declares its capabilities once, at construction.
//! The registry caches them as index buckets so the hot per-step paths
//! never ask a module what it can do.
//!
//! Bucket order is module construction order, which is the order the
//! actor type lists its modules. That order is part of the simulation's
//! determinism contract; never sort or dedupe a bucket.

use serde::{Deserialize, Serialize};

/// Every capability a module may expose.
/// Append only; the discriminant is the bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Capability {
    Periodic              = 0,
    ResolveOrder          = 1,
    NotifyDamaged         = 2,
    NotifyKilled          = 3,
    NotifyBuildComplete   = 4,
    NotifyInfiltrated     = 5,
    NotifyOwnerChanged    = 6,
    NotifyAddedToWorld    = 7,
    NotifyRemovedFromWorld = 8,
    DamageModifier        = 9,
    PowerModifier         = 10,
    RadarColor            = 11,
    TargetTypes           = 12,
    RenderModifier        = 13,
    Disableable           = 14,
    Reservable            = 15,
}

impl Capability {
    pub const COUNT: usize = 16;

    pub const ALL: [Capability; Capability::COUNT] = [
        Capability::Periodic,
        Capability::ResolveOrder,
        Capability::NotifyDamaged,
        Capability::NotifyKilled,
        Capability::NotifyBuildComplete,
        Capability::NotifyInfiltrated,
        Capability::NotifyOwnerChanged,
        Capability::NotifyAddedToWorld,
        Capability::NotifyRemovedFromWorld,
        Capability::DamageModifier,
        Capability::PowerModifier,
        Capability::RadarColor,
        Capability::TargetTypes,
        Capability::RenderModifier,
        Capability::Disableable,
        Capability::Reservable,
    ];

    pub const fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// A fixed set of capabilities, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    #[must_use]
    pub const fn with(self, cap: Capability) -> Self {
        CapabilitySet(self.0 | cap.bit())
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(CapabilitySet::EMPTY, CapabilitySet::with)
    }
}

/// Capability kind → ordered module indices, for one actor.
/// Built once when the actor is constructed; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    buckets: [Vec<usize>; Capability::COUNT],
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `index` to the bucket of every capability in `caps`.
    pub fn register(&mut self, index: usize, caps: CapabilitySet) {
        for cap in caps.iter() {
            self.buckets[cap as usize].push(index);
        }
    }

    /// Module indices exposing `cap`, in registration order.
    /// Empty when nothing implements it; never an error.
    pub fn query(&self, cap: Capability) -> &[usize] {
        &self.buckets[cap as usize]
    }

    pub fn count(&self, cap: Capability) -> usize {
        self.buckets[cap as usize].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_match_all_table() {
        for (i, cap) in Capability::ALL.iter().enumerate() {
            assert_eq!(*cap as usize, i, "{cap:?} out of place in Capability::ALL");
        }
    }

    #[test]
    fn set_membership() {
        let set = CapabilitySet::of(&[Capability::Periodic, Capability::Disableable]);
        assert!(set.contains(Capability::Periodic));
        assert!(set.contains(Capability::Disableable));
        assert!(!set.contains(Capability::RenderModifier));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Capability::Periodic, Capability::Disableable]
        );
        assert!(CapabilitySet::EMPTY.is_empty());
    }

    #[test]
    fn module_with_n_capabilities_lands_in_n_buckets() {
        let mut reg = CapabilityRegistry::new();
        reg.register(0, CapabilitySet::of(&[Capability::Periodic]));
        reg.register(1, CapabilitySet::EMPTY);
        reg.register(2, CapabilitySet::of(&[Capability::Periodic, Capability::NotifyKilled]));

        assert_eq!(reg.query(Capability::Periodic), &[0, 2]);
        assert_eq!(reg.query(Capability::NotifyKilled), &[2]);
        assert!(reg.query(Capability::DamageModifier).is_empty());
    }
}
