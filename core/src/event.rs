//! The step event log: everything observable that happened in a step.
//!
//! RULE: Modules never talk to each other through this log. It is an
//! output stream for tooling, replays and the determinism tests; the
//! in-simulation channel is the notification dispatcher (notify.rs).

use crate::types::{ActorId, CPos, PlayerId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are appended; never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: String,
        seed:   u64,
    },

    // ── Actor lifecycle ────────────────────────────
    ActorAdded {
        tick:       Tick,
        actor:      ActorId,
        actor_type: String,
        owner:      PlayerId,
        location:   CPos,
    },
    ActorRemoved {
        tick:  Tick,
        actor: ActorId,
    },
    Damaged {
        tick:     Tick,
        actor:    ActorId,
        attacker: Option<ActorId>,
        damage:   i32,
        hp:       i32,
    },
    Killed {
        tick:     Tick,
        actor:    ActorId,
        attacker: Option<ActorId>,
    },
    Healed {
        tick:   Tick,
        actor:  ActorId,
        amount: i32,
        hp:     i32,
    },
    BuildCompleted {
        tick:  Tick,
        actor: ActorId,
    },
    OrderResolved {
        tick:  Tick,
        actor: ActorId,
        order: String,
    },

    // ── Player economy ─────────────────────────────
    CashCredited {
        tick:   Tick,
        player: PlayerId,
        amount: i64,
        source: String,
    },
    CashTaken {
        tick:   Tick,
        player: PlayerId,
        amount: i64,
        source: String,
    },
    NotificationPlayed {
        tick:   Tick,
        player: PlayerId,
        cue:    String,
    },

    // ── Reservations ───────────────────────────────
    ReservationAcquired {
        tick:   Tick,
        target: ActorId,
        holder: ActorId,
    },
    ReservationReleased {
        tick:   Tick,
        target: ActorId,
        holder: ActorId,
    },
    ReservationExpired {
        tick:   Tick,
        target: ActorId,
        holder: ActorId,
    },

    // ── Module state changes ───────────────────────
    PowerToggled {
        tick:    Tick,
        actor:   ActorId,
        powered: bool,
    },
    CloakChanged {
        tick:    Tick,
        actor:   ActorId,
        cloaked: bool,
    },
    LevelGained {
        tick:  Tick,
        actor: ActorId,
        level: u32,
    },
    AmmoReloaded {
        tick:  Tick,
        actor: ActorId,
        ammo:  u32,
    },
    ServiceCompleted {
        tick:   Tick,
        actor:  ActorId,
        target: ActorId,
    },
}

impl SimEvent {
    /// Stable snake_case name of the variant, for log lines and filters.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::TickStarted { .. }         => "tick_started",
            SimEvent::TickCompleted { .. }       => "tick_completed",
            SimEvent::RunInitialized { .. }      => "run_initialized",
            SimEvent::ActorAdded { .. }          => "actor_added",
            SimEvent::ActorRemoved { .. }        => "actor_removed",
            SimEvent::Damaged { .. }             => "damaged",
            SimEvent::Killed { .. }              => "killed",
            SimEvent::Healed { .. }              => "healed",
            SimEvent::BuildCompleted { .. }      => "build_completed",
            SimEvent::OrderResolved { .. }       => "order_resolved",
            SimEvent::CashCredited { .. }        => "cash_credited",
            SimEvent::CashTaken { .. }           => "cash_taken",
            SimEvent::NotificationPlayed { .. }  => "notification_played",
            SimEvent::ReservationAcquired { .. } => "reservation_acquired",
            SimEvent::ReservationReleased { .. } => "reservation_released",
            SimEvent::ReservationExpired { .. }  => "reservation_expired",
            SimEvent::PowerToggled { .. }        => "power_toggled",
            SimEvent::CloakChanged { .. }        => "cloak_changed",
            SimEvent::LevelGained { .. }         => "level_gained",
            SimEvent::AmmoReloaded { .. }        => "ammo_reloaded",
            SimEvent::ServiceCompleted { .. }    => "service_completed",
        }
    }
}
