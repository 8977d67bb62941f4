use crate::{
    capability::{Capability, CapabilitySet},
    module::{ActorView, Module},
    types::ActorId,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Scales incoming damage by a constant factor (armor, veterancy crates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageMultiplierInfo {
    pub modifier: f64,
}

pub struct DamageMultiplier {
    info: Arc<DamageMultiplierInfo>,
}

impl DamageMultiplier {
    pub fn new(info: Arc<DamageMultiplierInfo>) -> Self {
        Self { info }
    }
}

impl Module for DamageMultiplier {
    fn name(&self) -> &'static str {
        "DamageMultiplier"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::DamageModifier])
    }

    fn damage_modifier(&self, _view: &ActorView<'_>, _attacker: Option<ActorId>) -> f64 {
        self.info.modifier
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
