use crate::types::{ActorId, Tick};
use serde::{Deserialize, Serialize};

/// An order issued to an actor from outside the simulation (player
/// input, scripted AI). Orders are queued and resolved at the start of
/// the next step, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub name:   String,
    #[serde(default)]
    pub target: Option<ActorId>,
}

impl Order {
    pub const POWER_DOWN: &'static str = "PowerDown";
    pub const FIRE: &'static str = "Fire";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), target: None }
    }

    pub fn targeting(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A queued order with its submission tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedOrder {
    pub queued_at: Tick,
    pub subject:   ActorId,
    pub order:     Order,
}
