//! Construction animation. Counts down `length` ticks after the actor
//! enters the world, drawing the make sequence meanwhile, then raises
//! BuildComplete on its own actor.
//!
//! Actors spawned in bulk carry `skip_make_animation` in their init and
//! complete as soon as they are added.

use crate::{
    actor::ActorInit,
    capability::{Capability, CapabilitySet},
    error::SimResult,
    event::SimEvent,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
    render::{RenderContext, Renderable},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithMakeAnimationInfo {
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default = "default_sequence")]
    pub sequence: String,
}

fn default_length() -> u32 { 15 }
fn default_sequence() -> String { "make".to_string() }

pub struct WithMakeAnimation {
    info:      Arc<WithMakeAnimationInfo>,
    remaining: u32,
    complete:  bool,
}

impl WithMakeAnimation {
    pub fn new(info: Arc<WithMakeAnimationInfo>, init: &ActorInit) -> Self {
        let remaining = if init.skip_make_animation { 0 } else { info.length };
        Self { info, remaining, complete: false }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn complete(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.complete {
            return;
        }
        self.complete = true;
        let actor = ctx.self_id();
        ctx.emit(SimEvent::BuildCompleted { tick: ctx.tick(), actor });
        ctx.raise(actor, ActorEvent::BuildComplete);
    }
}

impl Module for WithMakeAnimation {
    fn name(&self) -> &'static str {
        "WithMakeAnimation"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::Periodic,
            Capability::NotifyAddedToWorld,
            Capability::RenderModifier,
        ])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if matches!((event, role), (ActorEvent::AddedToWorld, EventRole::Primary)) && self.remaining == 0 {
            self.complete(ctx);
        }
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if self.complete {
            return Ok(());
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.complete(ctx);
        }
        Ok(())
    }

    fn modify_render(&self, _ctx: &RenderContext<'_>, r: Vec<Renderable>) -> Vec<Renderable> {
        if self.complete {
            return r;
        }
        r.into_iter()
            .map(|mut x| {
                x.sequence = self.info.sequence.clone();
                x
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
