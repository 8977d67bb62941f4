//! Dock client: claims a free dock of the configured type owned by the
//! same player, holds it for `service_ticks`, then releases it.
//!
//! The claim is a reservation token owned by this module, so it is
//! released when the service completes, when the token turns out to be
//! stale, or when this actor leaves the world and the module is dropped.

use crate::{
    capability::{Capability, CapabilitySet},
    error::SimResult,
    event::SimEvent,
    module::{Module, ModuleContext},
    reservation::ReservationToken,
    types::ActorId,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockClientInfo {
    /// Actor type to dock at. Must be reservable.
    pub dock_type: String,
    #[serde(default = "default_service_ticks")]
    pub service_ticks: u32,
}

fn default_service_ticks() -> u32 { 10 }

pub struct DockClient {
    info:      Arc<DockClientInfo>,
    token:     Option<ReservationToken>,
    remaining: u32,
}

impl DockClient {
    pub fn new(info: Arc<DockClientInfo>) -> Self {
        Self { info, token: None, remaining: 0 }
    }

    /// The dock currently claimed, if any.
    pub fn servicing(&self) -> Option<ActorId> {
        self.token.as_ref().map(|t| t.target())
    }

    fn find_dock(&self, ctx: &ModuleContext<'_>) -> SimResult<Option<ActorId>> {
        let owner = ctx.self_state()?.owner();
        let dock = ctx
            .live_actors()
            .filter(|a| a.actor_type() == self.info.dock_type && a.owner() == owner)
            .map(|a| a.id())
            .find(|&id| ctx.is_reservable(id) && !ctx.is_reserved(id) && !ctx.is_disabled(id));
        Ok(dock)
    }
}

impl Module for DockClient {
    fn name(&self) -> &'static str {
        "DockClient"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Periodic])
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        if let Some(token) = self.token.take() {
            if !token.is_valid() || !ctx.is_live(token.target()) {
                log::debug!("{} lost its claim on {}", ctx.self_id(), token.target());
                return Ok(());
            }
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining > 0 {
                self.token = Some(token);
                return Ok(());
            }

            let (actor, target) = (ctx.self_id(), token.target());
            ctx.release(token);
            ctx.emit(SimEvent::ServiceCompleted { tick: ctx.tick(), actor, target });
            return Ok(());
        }

        if let Some(dock) = self.find_dock(ctx)? {
            if let Some(token) = ctx.reserve(dock) {
                self.token = Some(token);
                self.remaining = self.info.service_ticks;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
