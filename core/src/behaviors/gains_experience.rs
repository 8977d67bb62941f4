//! Veterancy: kills of enemy actors grant experience equal to the victim's
//! cost; each level reached applies its own incoming-damage multiplier.

use crate::{
    capability::{Capability, CapabilitySet},
    error::SimResult,
    event::SimEvent,
    module::{ActorView, Module, ModuleContext},
    notify::{ActorEvent, EventRole},
    types::ActorId,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainsExperienceInfo {
    /// Experience needed for each level, ascending.
    pub thresholds: Vec<i64>,
    /// Incoming damage multiplier at each level, one per threshold.
    pub damage_modifiers: Vec<f64>,
}

pub struct GainsExperience {
    info:       Arc<GainsExperienceInfo>,
    experience: i64,
    level:      usize,
}

impl GainsExperience {
    pub fn new(info: Arc<GainsExperienceInfo>) -> Self {
        Self { info, experience: 0, level: 0 }
    }

    pub fn experience(&self) -> i64 {
        self.experience
    }

    pub fn level(&self) -> usize {
        self.level
    }
}

impl Module for GainsExperience {
    fn name(&self) -> &'static str {
        "GainsExperience"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::NotifyKilled, Capability::DamageModifier])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        let (ActorEvent::Killed(_), EventRole::Secondary { primary }) = (event, role) else {
            return Ok(());
        };
        let Some(victim) = ctx.actor(primary) else {
            return Ok(());
        };
        let (victim_owner, value) = (victim.owner(), victim.info().cost);
        if ctx.owner()?.is_allied_with(victim_owner) {
            return Ok(());
        }

        self.experience += value;
        while self
            .info
            .thresholds
            .get(self.level)
            .is_some_and(|&t| self.experience >= t)
        {
            self.level += 1;
            let actor = ctx.self_id();
            ctx.emit(SimEvent::LevelGained { tick: ctx.tick(), actor, level: self.level as u32 });
            log::debug!("{actor} reached level {}", self.level);
        }
        Ok(())
    }

    fn damage_modifier(&self, _view: &ActorView<'_>, _attacker: Option<ActorId>) -> f64 {
        match self.level {
            0 => 1.0,
            n => self.info.damage_modifiers.get(n - 1).copied().unwrap_or(1.0),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
