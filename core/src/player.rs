//! Player / ownership state.
//!
//! RULE: Modules read players freely but change them only through the
//! explicit methods here (credit, take, power totals). Nothing reaches
//! into the fields directly.

use crate::types::{Color, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id:      PlayerId,
    pub name:    String,
    pub color:   Color,
    /// Neutral players own crates, husks and other world clutter.
    #[serde(default)]
    pub neutral: bool,
    cash:           i64,
    power_provided: i32,
    power_drained:  i32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color, cash: i64) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            neutral: false,
            cash,
            power_provided: 0,
            power_drained: 0,
        }
    }

    pub fn neutral(id: PlayerId) -> Self {
        Self {
            neutral: true,
            ..Self::new(id, "Neutral", Color::WHITE, 0)
        }
    }

    pub fn cash(&self) -> i64 { self.cash }
    pub fn power_provided(&self) -> i32 { self.power_provided }
    pub fn power_drained(&self) -> i32 { self.power_drained }

    /// Provided minus drained. Negative means low power.
    pub fn power_balance(&self) -> i32 {
        self.power_provided - self.power_drained
    }

    pub fn credit_cash(&mut self, amount: i64) {
        self.cash = self.cash.saturating_add(amount.max(0));
    }

    /// Take up to `amount`; never drives cash negative.
    /// Returns what was actually taken.
    pub fn take_cash(&mut self, amount: i64) -> i64 {
        let taken = amount.clamp(0, self.cash.max(0));
        self.cash -= taken;
        taken
    }

    pub(crate) fn set_power(&mut self, provided: i32, drained: i32) {
        self.power_provided = provided;
        self.power_drained = drained;
    }

    pub fn is_allied_with(&self, other: PlayerId) -> bool {
        self.id == other
    }
}
