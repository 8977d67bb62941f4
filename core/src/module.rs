//! Module trait and per-actor module set.
//!
//! RULE: Every behavior attached to an actor implements Module.
//! A module is built once per actor from shared, immutable configuration
//! and owns only its private simulation state.
//!
//! RULE: A module never holds a reference to another actor or module.
//! Everything outside its own state is reached through the context the
//! engine passes in for the duration of one call.

use crate::{
    actor::{ActorEntry, ActorState},
    capability::{Capability, CapabilityRegistry, CapabilitySet},
    command::Order,
    deferred::DeferredAction,
    error::{SimError, SimResult},
    event::SimEvent,
    modifiers,
    notify::{ActorEvent, EventRole, Notification},
    player::Player,
    render::{RenderContext, Renderable},
    reservation::{ReservationTable, ReservationToken},
    rng::SimRng,
    types::{ActorId, Color, PlayerId, Tick},
};
use std::{any::Any, collections::{BTreeMap, VecDeque}};

/// The contract every module must fulfill.
///
/// Only the methods matching the capabilities returned by
/// [`Module::capabilities`] are ever called; the rest keep their
/// identity defaults.
pub trait Module: Send {
    /// Stable name, used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Queried exactly once, when the owning actor is constructed.
    fn capabilities(&self) -> CapabilitySet;

    /// `Periodic`: called once per step while the actor is live and enabled.
    fn tick(&mut self, _ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// `Notify*`: called for each event of a subscribed kind.
    fn notify(
        &mut self,
        _event: &ActorEvent,
        _role:  EventRole,
        _ctx:   &mut ModuleContext<'_>,
    ) -> SimResult<()> {
        Ok(())
    }

    /// `ResolveOrder`: called for each order issued to the actor.
    fn resolve_order(&mut self, _order: &Order, _ctx: &mut ModuleContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// `DamageModifier`: multiplier on incoming damage. 0.0 absorbs.
    fn damage_modifier(&self, _view: &ActorView<'_>, _attacker: Option<ActorId>) -> f64 {
        1.0
    }

    /// `PowerModifier`: multiplier on the actor's power output or drain.
    fn power_modifier(&self, _view: &ActorView<'_>) -> f64 {
        1.0
    }

    /// `RadarColor`: Some to override the owner's color.
    fn radar_color(&self, _view: &ActorView<'_>) -> Option<Color> {
        None
    }

    /// `TargetTypes`: Some to override the actor type's target types,
    /// as seen by `viewer`.
    fn target_types(&self, _view: &ActorView<'_>, _viewer: PlayerId) -> Option<Vec<String>> {
        None
    }

    /// `Disableable`: true while this module holds the actor disabled.
    fn is_disabled(&self, _view: &ActorView<'_>) -> bool {
        false
    }

    /// `RenderModifier`: receives the previous stage's output.
    fn modify_render(&self, _ctx: &RenderContext<'_>, r: Vec<Renderable>) -> Vec<Renderable> {
        r
    }

    /// For downcasting in tests and tooling only.
    /// Production sim code never uses this.
    fn as_any(&self) -> &dyn Any;
}

/// Read-only view of an actor and its owner.
#[derive(Clone, Copy)]
pub struct ActorView<'a> {
    pub state: &'a ActorState,
    pub owner: &'a Player,
    pub tick:  Tick,
}

/// The modules of one actor plus their capability index.
pub struct ModuleSet {
    modules:  Vec<Box<dyn Module>>,
    registry: CapabilityRegistry,
}

impl ModuleSet {
    pub fn new(modules: Vec<Box<dyn Module>>) -> Self {
        let mut registry = CapabilityRegistry::new();
        for (index, module) in modules.iter().enumerate() {
            registry.register(index, module.capabilities());
        }
        Self { modules, registry }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Modules exposing `cap`, in registry order. Restartable: clone the
    /// iterator to walk the same sequence again.
    pub fn with_capability(&self, cap: Capability) -> impl Iterator<Item = &dyn Module> + Clone + '_ {
        self.registry
            .query(cap)
            .iter()
            .filter_map(move |&i| self.modules.get(i).map(|m| m.as_ref()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// First module of concrete type `T`. Tests and tooling only.
    pub fn find<T: Module + 'static>(&self) -> Option<&T> {
        self.modules
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<T>())
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Module>> {
        self.modules.get_mut(index)
    }
}

/// Everything a module may touch during one handler call.
///
/// Effects split three ways:
///   - immediate: own actor's health, player cash, reservations, rng
///   - raised: notifications, delivered once the current fan-out returns
///   - deferred: spawn/remove/cue, applied at the end of the step
pub struct ModuleContext<'w> {
    pub(crate) self_id:      ActorId,
    pub(crate) tick:         Tick,
    pub(crate) source:       &'static str,
    pub(crate) actors:       &'w mut BTreeMap<ActorId, ActorEntry>,
    pub(crate) players:      &'w mut Vec<Player>,
    pub(crate) reservations: &'w mut ReservationTable,
    pub(crate) deferred:     &'w mut VecDeque<DeferredAction>,
    pub(crate) rng:          &'w mut SimRng,
    pub(crate) events:       &'w mut Vec<SimEvent>,
    pub(crate) raised:       &'w mut Vec<Notification>,
}

impl<'w> ModuleContext<'w> {
    pub fn self_id(&self) -> ActorId {
        self.self_id
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Any actor still in the table, live or not. Actors spawned this
    /// step are not visible until the deferred flush.
    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id).map(|e| &e.state)
    }

    pub fn self_state(&self) -> SimResult<&ActorState> {
        self.actor(self.self_id)
            .ok_or(SimError::ActorNotFound(self.self_id))
    }

    /// Live actors in creation order.
    pub fn live_actors(&self) -> impl Iterator<Item = &ActorState> + '_ {
        self.actors
            .values()
            .map(|e| &e.state)
            .filter(|s| s.is_live())
    }

    pub fn is_live(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|s| s.is_live())
    }

    pub fn player(&self, id: PlayerId) -> SimResult<&Player> {
        self.players
            .get(id.0 as usize)
            .ok_or(SimError::PlayerNotFound(id))
    }

    pub fn players(&self) -> &[Player] {
        &self.players[..]
    }

    pub fn owner(&self) -> SimResult<&Player> {
        let owner = self.self_state()?.owner();
        self.player(owner)
    }

    /// Whether another actor is disabled. The calling actor's own modules
    /// are checked out while it runs, so asking about self yields false.
    pub fn is_disabled(&self, id: ActorId) -> bool {
        let Some(entry) = self.actors.get(&id) else {
            return false;
        };
        let Some(modules) = entry.modules.as_ref() else {
            return false;
        };
        let Some(owner) = self.players.get(entry.state.owner().0 as usize) else {
            return false;
        };
        let view = ActorView { state: &entry.state, owner, tick: self.tick };
        modifiers::is_disabled(modules, &view)
    }

    /// Heal the calling actor. Returns the hp actually restored.
    pub fn heal(&mut self, amount: i32) -> SimResult<i32> {
        let id = self.self_id;
        let entry = self.actors.get_mut(&id).ok_or(SimError::ActorNotFound(id))?;
        let restored = -entry.state.health_mut().apply(-amount.max(0));
        let hp = entry.state.health().hp();
        if restored > 0 {
            self.events.push(SimEvent::Healed { tick: self.tick, actor: id, amount: restored, hp });
        }
        Ok(restored)
    }

    pub fn credit_cash(&mut self, player: PlayerId, amount: i64) -> SimResult<()> {
        let p = self
            .players
            .get_mut(player.0 as usize)
            .ok_or(SimError::PlayerNotFound(player))?;
        p.credit_cash(amount);
        self.events.push(SimEvent::CashCredited {
            tick: self.tick,
            player,
            amount,
            source: self.source.to_string(),
        });
        Ok(())
    }

    /// Take up to `amount` from `player`. Returns what was taken.
    pub fn take_cash(&mut self, player: PlayerId, amount: i64) -> SimResult<i64> {
        let p = self
            .players
            .get_mut(player.0 as usize)
            .ok_or(SimError::PlayerNotFound(player))?;
        let taken = p.take_cash(amount);
        self.events.push(SimEvent::CashTaken {
            tick: self.tick,
            player,
            amount: taken,
            source: self.source.to_string(),
        });
        Ok(taken)
    }

    /// Queue a side effect for the end of the step.
    pub fn defer(&mut self, action: DeferredAction) {
        self.deferred.push_back(action);
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Raise a notification on `target`.
    pub fn raise(&mut self, target: ActorId, event: ActorEvent) {
        self.raised.push(Notification { target, event });
    }

    pub fn rng(&mut self) -> &mut SimRng {
        &mut *self.rng
    }

    /// Claim `target` for the calling actor.
    pub fn reserve(&mut self, target: ActorId) -> Option<ReservationToken> {
        let actors = &*self.actors;
        let token = self.reservations.reserve(target, self.self_id, |id| {
            actors.get(&id).is_some_and(|e| e.state.is_live())
        })?;
        self.events.push(SimEvent::ReservationAcquired {
            tick:   self.tick,
            target,
            holder: self.self_id,
        });
        Some(token)
    }

    /// Release a claim explicitly. Emits an event only if the token still
    /// held the claim.
    pub fn release(&mut self, token: ReservationToken) {
        let (target, holder) = (token.target(), token.holder());
        if token.release() {
            self.events.push(SimEvent::ReservationReleased { tick: self.tick, target, holder });
        }
    }

    pub fn is_reserved(&self, target: ActorId) -> bool {
        self.reservations.is_reserved(target)
    }

    pub fn is_reservable(&self, target: ActorId) -> bool {
        self.reservations.is_reservable(target)
    }
}
