use crate::{
    capability::{Capability, CapabilitySet},
    deferred::DeferredAction,
    error::SimResult,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Plays a cue for the owner when this actor is killed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnounceOnDeathInfo {
    pub notification: String,
}

pub struct AnnounceOnDeath {
    info: Arc<AnnounceOnDeathInfo>,
}

impl AnnounceOnDeath {
    pub fn new(info: Arc<AnnounceOnDeathInfo>) -> Self {
        Self { info }
    }
}

impl Module for AnnounceOnDeath {
    fn name(&self) -> &'static str {
        "AnnounceOnDeath"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::NotifyKilled])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if matches!((event, role), (ActorEvent::Killed(_), EventRole::Primary)) {
            let player = ctx.self_state()?.owner();
            ctx.defer(DeferredAction::PlayNotification { player, cue: self.info.notification.clone() });
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
