use crate::{
    capability::{Capability, CapabilitySet},
    error::SimResult,
    module::{Module, ModuleContext},
    notify::{ActorEvent, EventRole},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Pays the killer's owner a percentage of this actor's cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GivesBountyInfo {
    #[serde(default = "default_percentage")]
    pub percentage: i64,
}

fn default_percentage() -> i64 { 10 }

pub struct GivesBounty {
    info: Arc<GivesBountyInfo>,
}

impl GivesBounty {
    pub fn new(info: Arc<GivesBountyInfo>) -> Self {
        Self { info }
    }
}

impl Module for GivesBounty {
    fn name(&self) -> &'static str {
        "GivesBounty"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::NotifyKilled])
    }

    fn notify(&mut self, event: &ActorEvent, role: EventRole, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        let (ActorEvent::Killed(attack), EventRole::Primary) = (event, role) else {
            return Ok(());
        };
        let Some(killer) = attack.attacker.and_then(|a| ctx.actor(a)) else {
            return Ok(());
        };
        let killer_owner = killer.owner();

        let me = ctx.self_state()?;
        let bounty = me.info().cost * self.info.percentage / 100;
        if ctx.owner()?.is_allied_with(killer_owner) || bounty <= 0 {
            return Ok(());
        }
        ctx.credit_cash(killer_owner, bounty)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
