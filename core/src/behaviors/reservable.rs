use crate::{
    capability::{Capability, CapabilitySet},
    module::Module,
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Marks the actor as a reservation target. The world registers a slot
/// for every actor whose set exposes `Reservable`; the claim state lives
/// in the world's reservation table, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservableInfo {}

pub struct Reservable {
    _info: Arc<ReservableInfo>,
}

impl Reservable {
    pub fn new(info: Arc<ReservableInfo>) -> Self {
        Self { _info: info }
    }
}

impl Module for Reservable {
    fn name(&self) -> &'static str {
        "Reservable"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::Reservable])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
