//! Periodically credits the owner with a fixed amount of cash.

use crate::{
    capability::{Capability, CapabilitySet},
    error::SimResult,
    module::{Module, ModuleContext},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashTricklerInfo {
    /// Ticks between payouts.
    #[serde(default = "default_period")]
    pub period: u32,
    #[serde(default = "default_amount")]
    pub amount: i64,
    /// Ticks before the first payout. Defaults to `period`.
    #[serde(default)]
    pub initial_delay: Option<u32>,
}

fn default_period() -> u32 { 50 }
fn default_amount() -> i64 { 15 }

pub struct CashTrickler {
    info:  Arc<CashTricklerInfo>,
    ticks: u32,
}

impl CashTrickler {
    pub fn new(info: Arc<CashTricklerInfo>) -> Self {
        let ticks = info.initial_delay.unwrap_or(info.period);
        Self { info, ticks }
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks
    }
}

impl Module for CashTrickler {
    fn name(&self) -> &'static str {
        "CashTrickler"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Periodic])
    }

    fn tick(&mut self, ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        // Decrement, compare, reset: the countdown never goes below zero,
        // so one period always yields exactly one payout.
        self.ticks = self.ticks.saturating_sub(1);
        if self.ticks > 0 {
            return Ok(());
        }
        self.ticks = self.info.period;

        let owner = ctx.self_state()?.owner();
        ctx.credit_cash(owner, self.info.amount)?;
        log::debug!("{} trickled {} to {owner}", ctx.self_id(), self.info.amount);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
