use crate::{
    capability::{Capability, CapabilitySet},
    command::Order,
    error::SimResult,
    event::SimEvent,
    module::{Module, ModuleContext},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Ammo pool refilled by `count` every `period` ticks while not full.
/// Each `Fire` order spends one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadsInfo {
    #[serde(default = "default_count")]
    pub count: u32,
    pub period: u32,
    pub max_ammo: u32,
    /// Restart the reload countdown whenever a round is fired.
    #[serde(default)]
    pub reset_on_fire: bool,
}

fn default_count() -> u32 { 1 }

pub struct Reloads {
    info:      Arc<ReloadsInfo>,
    ammo:      u32,
    remaining: u32,
}

impl Reloads {
    pub fn new(info: Arc<ReloadsInfo>) -> Self {
        Self { ammo: info.max_ammo, remaining: info.period, info }
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }
}

impl Module for Reloads {
    fn name(&self) -> &'static str {
        "Reloads"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Periodic, Capability::ResolveOrder])
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if self.ammo >= self.info.max_ammo {
            self.remaining = self.info.period;
            return Ok(());
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Ok(());
        }
        self.remaining = self.info.period;
        self.ammo = (self.ammo + self.info.count).min(self.info.max_ammo);

        let actor = ctx.self_id();
        ctx.emit(SimEvent::AmmoReloaded { tick: ctx.tick(), actor, ammo: self.ammo });
        Ok(())
    }

    fn resolve_order(&mut self, order: &Order, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if !order.is(Order::FIRE) {
            return Ok(());
        }
        if self.ammo == 0 {
            log::debug!("{} cannot fire: out of ammo", ctx.self_id());
            return Ok(());
        }
        self.ammo -= 1;
        if self.info.reset_on_fire {
            self.remaining = self.info.period;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
