use crate::{
    capability::{Capability, CapabilitySet},
    deferred::DeferredAction,
    error::SimResult,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// An infiltrated building loses `percentage` of its owner's cash; the
/// infiltrator's owner gains that amount, and never less than `minimum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfiltrateForCashInfo {
    #[serde(default = "default_percentage")]
    pub percentage: i64,
    #[serde(default)]
    pub minimum: i64,
    #[serde(default)]
    pub notification: Option<String>,
}

fn default_percentage() -> i64 { 50 }

pub struct InfiltrateForCash {
    info: Arc<InfiltrateForCashInfo>,
}

impl InfiltrateForCash {
    pub fn new(info: Arc<InfiltrateForCashInfo>) -> Self {
        Self { info }
    }
}

impl Module for InfiltrateForCash {
    fn name(&self) -> &'static str {
        "InfiltrateForCash"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::NotifyInfiltrated])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        let (ActorEvent::Infiltrated { infiltrator }, EventRole::Primary) = (event, role) else {
            return Ok(());
        };
        let Some(thief) = ctx.actor(*infiltrator).map(|a| a.owner()) else {
            return Ok(());
        };

        let victim = ctx.owner()?;
        let (victim_id, to_take) = (victim.id, victim.cash() * self.info.percentage / 100);
        let to_give = to_take.max(self.info.minimum);

        ctx.take_cash(victim_id, to_take)?;
        ctx.credit_cash(thief, to_give)?;
        if let Some(cue) = &self.info.notification {
            ctx.defer(DeferredAction::PlayNotification { player: thief, cue: cue.clone() });
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
