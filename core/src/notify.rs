//! Notification dispatcher: lifecycle and gameplay events fanned out to
//! the modules that subscribe to them.
//!
//! RULES:
//!   - Delivery is synchronous, in registry order, exactly once per module
//!     per occurrence.
//!   - Cross-actor events (damage, kills, infiltration) are delivered to
//!     the primary actor first, then to the secondary actor if it is live.
//!   - Notifications raised by a handler are queued and delivered after
//!     the fan-out that raised them, before control returns to the caller.

use crate::{
    capability::Capability,
    error::{SimError, SimResult},
    health::DamageState,
    module::{Module, ModuleContext},
    types::{ActorId, PlayerId},
    world::World,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Damaged,
    Killed,
    BuildComplete,
    Infiltrated,
    OwnerChanged,
    AddedToWorld,
    RemovedFromWorld,
}

impl EventKind {
    pub const fn capability(self) -> Capability {
        match self {
            EventKind::Damaged          => Capability::NotifyDamaged,
            EventKind::Killed           => Capability::NotifyKilled,
            EventKind::BuildComplete    => Capability::NotifyBuildComplete,
            EventKind::Infiltrated      => Capability::NotifyInfiltrated,
            EventKind::OwnerChanged     => Capability::NotifyOwnerChanged,
            EventKind::AddedToWorld     => Capability::NotifyAddedToWorld,
            EventKind::RemovedFromWorld => Capability::NotifyRemovedFromWorld,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackInfo {
    pub attacker:              Option<ActorId>,
    /// Damage after modifiers. Zero when fully absorbed.
    pub damage:                i32,
    pub damage_state:          DamageState,
    pub previous_damage_state: DamageState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActorEvent {
    Damaged(AttackInfo),
    Killed(AttackInfo),
    BuildComplete,
    Infiltrated { infiltrator: ActorId },
    OwnerChanged { old: PlayerId, new: PlayerId },
    AddedToWorld,
    RemovedFromWorld,
}

impl ActorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ActorEvent::Damaged(_)          => EventKind::Damaged,
            ActorEvent::Killed(_)           => EventKind::Killed,
            ActorEvent::BuildComplete       => EventKind::BuildComplete,
            ActorEvent::Infiltrated { .. }  => EventKind::Infiltrated,
            ActorEvent::OwnerChanged { .. } => EventKind::OwnerChanged,
            ActorEvent::AddedToWorld        => EventKind::AddedToWorld,
            ActorEvent::RemovedFromWorld    => EventKind::RemovedFromWorld,
        }
    }

    /// The other party of a cross-actor event.
    pub fn secondary_actor(&self) -> Option<ActorId> {
        match self {
            ActorEvent::Damaged(info) | ActorEvent::Killed(info) => info.attacker,
            ActorEvent::Infiltrated { infiltrator } => Some(*infiltrator),
            _ => None,
        }
    }
}

/// Which side of the event a handler is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    /// The actor the event happened to.
    Primary,
    /// The attacker or infiltrator of `primary`.
    Secondary { primary: ActorId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub target: ActorId,
    pub event:  ActorEvent,
}

impl World {
    /// Deliver `event` to `target` (and its secondary actor), then any
    /// notifications the handlers raise, until quiet.
    pub fn notify(&mut self, target: ActorId, event: ActorEvent) -> SimResult<()> {
        self.dispatch(vec![Notification { target, event }])
    }

    pub(crate) fn dispatch(&mut self, notifications: Vec<Notification>) -> SimResult<()> {
        let mut queue: VecDeque<Notification> = notifications.into();
        while let Some(n) = queue.pop_front() {
            let cap = n.event.kind().capability();
            let event = &n.event;
            let primary = n.target;
            let mut raised = self.fan_out(n.target, cap, |m, ctx| {
                m.notify(event, EventRole::Primary, ctx)
            })?;

            if let Some(secondary) = event.secondary_actor() {
                if secondary != n.target && self.is_live(secondary) {
                    raised.extend(self.fan_out(secondary, cap, |m, ctx| {
                        m.notify(event, EventRole::Secondary { primary }, ctx)
                    })?);
                }
            }
            queue.extend(raised);
        }
        Ok(())
    }

    /// Invoke `f` on every module of `actor` exposing `cap`, in registry
    /// order. Returns the notifications they raised. An actor no longer
    /// in the table has nothing to invoke.
    pub(crate) fn fan_out<F>(&mut self, actor: ActorId, cap: Capability, f: F) -> SimResult<Vec<Notification>>
    where
        F: Fn(&mut dyn Module, &mut ModuleContext<'_>) -> SimResult<()>,
    {
        let count = match self.actors.get(&actor) {
            None => return Ok(Vec::new()),
            Some(entry) => match &entry.modules {
                Some(modules) => modules.registry().count(cap),
                None => {
                    return Err(SimError::Invariant {
                        tick:   self.clock.current_tick,
                        detail: format!("reentrant dispatch into actor {actor}"),
                    })
                }
            },
        };

        let mut raised = Vec::new();
        for k in 0..count {
            let index = self
                .actors
                .get(&actor)
                .and_then(|e| e.modules.as_ref())
                .and_then(|m| m.registry().query(cap).get(k).copied());
            let Some(index) = index else { break };
            raised.extend(self.invoke_module(actor, index, &f)?);
        }
        Ok(raised)
    }
}
