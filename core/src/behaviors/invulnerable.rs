use crate::{
    capability::{Capability, CapabilitySet},
    module::{ActorView, Module},
    types::ActorId,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Takes no damage from any source that respects modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvulnerableInfo {}

pub struct Invulnerable {
    _info: Arc<InvulnerableInfo>,
}

impl Invulnerable {
    pub fn new(info: Arc<InvulnerableInfo>) -> Self {
        Self { _info: info }
    }
}

impl Module for Invulnerable {
    fn name(&self) -> &'static str {
        "Invulnerable"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::DamageModifier])
    }

    fn damage_modifier(&self, _view: &ActorView<'_>, _attacker: Option<ActorId>) -> f64 {
        0.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
