use crate::{
    capability::{Capability, CapabilitySet},
    error::SimResult,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Heals `amount` hp every `step` ticks while health is below
/// `heal_if_below` of max. Taking damage pauses healing for
/// `damage_cooldown` ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfHealingInfo {
    #[serde(default = "default_step")]
    pub step: u32,
    #[serde(default = "default_amount")]
    pub amount: i32,
    #[serde(default = "default_heal_if_below")]
    pub heal_if_below: f64,
    #[serde(default)]
    pub damage_cooldown: u32,
}

fn default_step() -> u32 { 5 }
fn default_amount() -> i32 { 5 }
fn default_heal_if_below() -> f64 { 0.5 }

pub struct SelfHealing {
    info:         Arc<SelfHealingInfo>,
    ticks:        u32,
    damage_ticks: u32,
}

impl SelfHealing {
    pub fn new(info: Arc<SelfHealingInfo>) -> Self {
        Self { ticks: info.step, damage_ticks: 0, info }
    }
}

impl Module for SelfHealing {
    fn name(&self) -> &'static str {
        "SelfHealing"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Periodic, Capability::NotifyDamaged])
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if ctx.self_state()?.health().fraction() >= self.info.heal_if_below {
            return Ok(());
        }
        if self.damage_ticks > 0 {
            self.damage_ticks -= 1;
            return Ok(());
        }

        self.ticks = self.ticks.saturating_sub(1);
        if self.ticks > 0 {
            return Ok(());
        }
        self.ticks = self.info.step;
        ctx.heal(self.info.amount)?;
        Ok(())
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, _ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if let (ActorEvent::Damaged(attack), EventRole::Primary) = (event, role) {
            if attack.damage > 0 {
                self.damage_ticks = self.info.damage_cooldown;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
