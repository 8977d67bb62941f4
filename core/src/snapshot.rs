//! Snapshot serialization: the observable world state as JSON.
//!
//! Two runs that agree on every snapshot agree on the simulation. The
//! sync hash is a cheap fingerprint of a snapshot for comparing runs
//! tick by tick without storing full snapshots.

use crate::{
    clock::SimClock,
    error::SimResult,
    health::DamageState,
    types::{ActorId, CPos, PlayerId, RunId, Tick},
    world::World,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id:           ActorId,
    pub actor_type:   String,
    pub owner:        PlayerId,
    pub location:     CPos,
    pub hp:           i32,
    pub damage_state: DamageState,
    pub disabled:     bool,
    pub reserved_by:  Option<ActorId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id:             PlayerId,
    pub cash:           i64,
    pub power_provided: i32,
    pub power_drained:  i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub run_id:    RunId,
    pub tick:      Tick,
    pub clock:     SimClock,
    pub rng_draws: u64,
    pub actors:    Vec<ActorSnapshot>,
    pub players:   Vec<PlayerSnapshot>,
}

impl WorldSnapshot {
    /// Only meaningful between steps.
    pub fn capture(run_id: &str, world: &World) -> Self {
        let actors = world
            .actors()
            .map(|a| ActorSnapshot {
                id:           a.id(),
                actor_type:   a.actor_type().to_string(),
                owner:        a.owner(),
                location:     a.location(),
                hp:           a.health().hp(),
                damage_state: a.health().damage_state(),
                disabled:     world.is_disabled(a.id()),
                reserved_by:  world.reservations().holder(a.id()),
            })
            .collect();
        let players = world
            .players()
            .iter()
            .map(|p| PlayerSnapshot {
                id:             p.id,
                cash:           p.cash(),
                power_provided: p.power_provided(),
                power_drained:  p.power_drained(),
            })
            .collect();

        Self {
            run_id: run_id.to_string(),
            tick: world.clock.current_tick,
            clock: world.clock.clone(),
            rng_draws: world.rng_draws(),
            actors,
            players,
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 64-bit FNV-1a over the snapshot's JSON. The run id is left out so
    /// runs with different ids but the same seed compare equal.
    pub fn sync_hash(&self) -> SimResult<u64> {
        let json = serde_json::to_string(&(&self.tick, &self.rng_draws, &self.actors, &self.players))?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in json.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(hash)
    }
}
