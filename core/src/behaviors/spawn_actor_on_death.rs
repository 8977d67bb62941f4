use crate::{
    actor::ActorInit,
    capability::{Capability, CapabilitySet},
    deferred::DeferredAction,
    error::SimResult,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Leaves another actor (a husk, a crate) where this one died.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnActorOnDeathInfo {
    pub actor: String,
    #[serde(default = "default_probability")]
    pub probability: f64,
    /// Give the spawned actor to the first neutral player instead of the
    /// dead actor's owner.
    #[serde(default)]
    pub neutral_owner: bool,
}

fn default_probability() -> f64 { 1.0 }

pub struct SpawnActorOnDeath {
    info: Arc<SpawnActorOnDeathInfo>,
}

impl SpawnActorOnDeath {
    pub fn new(info: Arc<SpawnActorOnDeathInfo>) -> Self {
        Self { info }
    }
}

impl Module for SpawnActorOnDeath {
    fn name(&self) -> &'static str {
        "SpawnActorOnDeath"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::NotifyKilled])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if !matches!((event, role), (ActorEvent::Killed(_), EventRole::Primary)) {
            return Ok(());
        }
        if !ctx.rng().chance(self.info.probability) {
            return Ok(());
        }

        let me = ctx.self_state()?;
        let (mut owner, location) = (me.owner(), me.location());
        if self.info.neutral_owner {
            if let Some(neutral) = ctx.players().iter().find(|p| p.neutral) {
                owner = neutral.id;
            }
        }
        ctx.defer(DeferredAction::SpawnActor {
            actor_type: self.info.actor.clone(),
            init:       ActorInit::new(owner, location),
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
