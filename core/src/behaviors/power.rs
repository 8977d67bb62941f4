//! Power-related modules. An actor's contribution to its owner's power
//! balance is its type's base power times the folded power multiplier;
//! see `World::recompute_power`.

use crate::{
    capability::{Capability, CapabilitySet},
    command::Order,
    deferred::DeferredAction,
    error::SimResult,
    event::SimEvent,
    module::{ActorView, Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

// ── CanPowerDown ────────────────────────────────────

/// Lets the owner switch the actor off with a `PowerDown` order. While
/// down the actor is disabled and neither provides nor drains power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanPowerDownInfo {
    #[serde(default)]
    pub power_down_cue: Option<String>,
    #[serde(default)]
    pub power_up_cue: Option<String>,
}

pub struct CanPowerDown {
    info:     Arc<CanPowerDownInfo>,
    disabled: bool,
}

impl CanPowerDown {
    pub fn new(info: Arc<CanPowerDownInfo>) -> Self {
        Self { info, disabled: false }
    }

    pub fn is_powered_down(&self) -> bool {
        self.disabled
    }
}

impl Module for CanPowerDown {
    fn name(&self) -> &'static str {
        "CanPowerDown"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::ResolveOrder,
            Capability::NotifyOwnerChanged,
            Capability::PowerModifier,
            Capability::Disableable,
        ])
    }

    fn resolve_order(&mut self, order: &Order, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if !order.is(Order::POWER_DOWN) {
            return Ok(());
        }
        self.disabled = !self.disabled;

        let actor = ctx.self_id();
        ctx.emit(SimEvent::PowerToggled { tick: ctx.tick(), actor, powered: !self.disabled });
        let cue = if self.disabled { &self.info.power_down_cue } else { &self.info.power_up_cue };
        if let Some(cue) = cue {
            let player = ctx.self_state()?.owner();
            ctx.defer(DeferredAction::PlayNotification { player, cue: cue.clone() });
        }
        Ok(())
    }

    /// A captured building comes back powered.
    fn notify(&mut self, event: &ActorEvent, role: EventRole, _ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if matches!((event, role), (ActorEvent::OwnerChanged { .. }, EventRole::Primary)) {
            self.disabled = false;
        }
        Ok(())
    }

    fn power_modifier(&self, _view: &ActorView<'_>) -> f64 {
        if self.disabled { 0.0 } else { 1.0 }
    }

    fn is_disabled(&self, _view: &ActorView<'_>) -> bool {
        self.disabled
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── RequiresPower ───────────────────────────────────

/// Disabled while the owner drains more power than it provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiresPowerInfo {}

pub struct RequiresPower {
    _info: Arc<RequiresPowerInfo>,
}

impl RequiresPower {
    pub fn new(info: Arc<RequiresPowerInfo>) -> Self {
        Self { _info: info }
    }
}

impl Module for RequiresPower {
    fn name(&self) -> &'static str {
        "RequiresPower"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Disableable])
    }

    fn is_disabled(&self, view: &ActorView<'_>) -> bool {
        view.owner.power_balance() < 0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ── ScalePowerWithHealth ────────────────────────────

/// Power output falls off with damage: the multiplier is hp / max_hp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalePowerWithHealthInfo {}

pub struct ScalePowerWithHealth {
    _info: Arc<ScalePowerWithHealthInfo>,
}

impl ScalePowerWithHealth {
    pub fn new(info: Arc<ScalePowerWithHealthInfo>) -> Self {
        Self { _info: info }
    }
}

impl Module for ScalePowerWithHealth {
    fn name(&self) -> &'static str {
        "ScalePowerWithHealth"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::PowerModifier])
    }

    fn power_modifier(&self, view: &ActorView<'_>) -> f64 {
        view.state.health().fraction()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
