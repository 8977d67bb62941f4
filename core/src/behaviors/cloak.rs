//! Cloak: the actor turns invisible to other players after a quiet
//! period, and drops the cloak when it fires or (optionally) is hit.
//!
//! While cloaked, viewers other than the owner get nothing to draw and no
//! target types; the owner sees a translucent body. Radar keeps the owner
//! color at half alpha.

use crate::{
    capability::{Capability, CapabilitySet},
    command::Order,
    deferred::DeferredAction,
    error::SimResult,
    event::SimEvent,
    module::{ActorView, Module, ModuleContext},
    notify::{ActorEvent, EventRole},
    render::{RenderContext, Renderable},
    types::{Color, PlayerId},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloakInfo {
    /// Ticks after creation before the first cloak.
    #[serde(default = "default_delay")]
    pub initial_delay: u32,
    /// Ticks after uncloaking before cloaking again.
    #[serde(default = "default_delay")]
    pub cloak_delay: u32,
    #[serde(default = "default_true")]
    pub uncloak_on_damage: bool,
    #[serde(default = "default_alpha")]
    pub cloaked_alpha: f32,
    #[serde(default)]
    pub cloak_cue: Option<String>,
    #[serde(default)]
    pub uncloak_cue: Option<String>,
}

fn default_delay() -> u32 { 10 }
fn default_true() -> bool { true }
fn default_alpha() -> f32 { 0.55 }

pub struct Cloak {
    info:      Arc<CloakInfo>,
    remaining: u32,
    cloaked:   bool,
}

impl Cloak {
    pub fn new(info: Arc<CloakInfo>) -> Self {
        Self { remaining: info.initial_delay, cloaked: false, info }
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloaked
    }

    fn visible_to(&self, view: &ActorView<'_>, viewer: PlayerId) -> bool {
        !self.cloaked || view.owner.is_allied_with(viewer)
    }

    fn set_cloaked(&mut self, cloaked: bool, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        self.cloaked = cloaked;
        let actor = ctx.self_id();
        ctx.emit(SimEvent::CloakChanged { tick: ctx.tick(), actor, cloaked });
        let cue = if cloaked { &self.info.cloak_cue } else { &self.info.uncloak_cue };
        if let Some(cue) = cue {
            let player = ctx.self_state()?.owner();
            ctx.defer(DeferredAction::PlayNotification { player, cue: cue.clone() });
        }
        Ok(())
    }

    fn uncloak(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        self.remaining = self.remaining.max(self.info.cloak_delay);
        if self.cloaked {
            self.set_cloaked(false, ctx)?;
        }
        Ok(())
    }
}

impl Module for Cloak {
    fn name(&self) -> &'static str {
        "Cloak"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::Periodic,
            Capability::ResolveOrder,
            Capability::NotifyDamaged,
            Capability::RenderModifier,
            Capability::RadarColor,
            Capability::TargetTypes,
        ])
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if self.cloaked {
            return Ok(());
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.set_cloaked(true, ctx)?;
        }
        Ok(())
    }

    fn resolve_order(&mut self, order: &Order, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if order.is(Order::FIRE) {
            self.uncloak(ctx)?;
        }
        Ok(())
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if let (ActorEvent::Damaged(attack), EventRole::Primary) = (event, role) {
            if self.info.uncloak_on_damage && attack.damage > 0 {
                self.uncloak(ctx)?;
            }
        }
        Ok(())
    }

    fn modify_render(&self, ctx: &RenderContext<'_>, r: Vec<Renderable>) -> Vec<Renderable> {
        if !self.cloaked {
            return r;
        }
        match ctx.viewer {
            Some(viewer) if !self.visible_to(&ctx.view, viewer) => Vec::new(),
            _ => r
                .into_iter()
                .map(|mut x| {
                    x.alpha *= self.info.cloaked_alpha;
                    x
                })
                .collect(),
        }
    }

    fn radar_color(&self, view: &ActorView<'_>) -> Option<Color> {
        self.cloaked.then(|| view.owner.color.with_alpha(128))
    }

    fn target_types(&self, view: &ActorView<'_>, viewer: PlayerId) -> Option<Vec<String>> {
        (!self.visible_to(view, viewer)).then(Vec::new)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
