//! Actor state and the init values an actor is built from.

use crate::{
    config::ActorType,
    health::Health,
    module::ModuleSet,
    types::{ActorId, CPos, PlayerId},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-instance values supplied to the actor factory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActorInit {
    pub owner:    PlayerId,
    pub location: CPos,
    /// Starting health as a percentage of max hp.
    #[serde(default)]
    pub health_percent: Option<i32>,
    /// Set by bulk spawning (map load) so buildings appear finished.
    #[serde(default)]
    pub skip_make_animation: bool,
}

impl ActorInit {
    pub fn new(owner: PlayerId, location: CPos) -> Self {
        Self { owner, location, ..Self::default() }
    }

    pub fn with_health(mut self, percent: i32) -> Self {
        self.health_percent = Some(percent);
        self
    }

    pub fn skipping_make_animation(mut self) -> Self {
        self.skip_make_animation = true;
        self
    }
}

/// Everything about an actor that is not a module.
#[derive(Debug, Clone)]
pub struct ActorState {
    id:       ActorId,
    info:     Arc<ActorType>,
    owner:    PlayerId,
    location: CPos,
    health:   Health,
    in_world: bool,
}

impl ActorState {
    pub(crate) fn new(id: ActorId, info: Arc<ActorType>, init: &ActorInit) -> Self {
        let health = Health::new(info.hp, init.health_percent);
        Self {
            id,
            info,
            owner: init.owner,
            location: init.location,
            health,
            in_world: true,
        }
    }

    pub fn id(&self) -> ActorId { self.id }
    pub fn info(&self) -> &ActorType { &self.info }
    pub fn actor_type(&self) -> &str { &self.info.name }
    pub fn owner(&self) -> PlayerId { self.owner }
    pub fn location(&self) -> CPos { self.location }
    pub fn health(&self) -> &Health { &self.health }
    pub fn is_in_world(&self) -> bool { self.in_world }
    pub fn is_dead(&self) -> bool { self.health.is_dead() }

    /// In the world and not dead. Dead actors stay in the table until the
    /// deferred flush removes them, but they are never live.
    pub fn is_live(&self) -> bool {
        self.in_world && !self.health.is_dead()
    }

    pub(crate) fn health_mut(&mut self) -> &mut Health { &mut self.health }
    pub(crate) fn set_owner(&mut self, owner: PlayerId) { self.owner = owner; }
    pub(crate) fn set_in_world(&mut self, in_world: bool) { self.in_world = in_world; }
}

/// One row of the world's actor table. `modules` is None while the set is
/// checked out to run one of its handlers.
pub(crate) struct ActorEntry {
    pub(crate) state:   ActorState,
    pub(crate) modules: Option<ModuleSet>,
}
