//! The world: actor table, players, reservation slots and the deferred
//! queue, plus the primitives the engine composes a step from.
//!
//! RULES:
//!   - Actors are created and removed only here: directly between steps,
//!     or through the deferred queue while a step runs.
//!   - A module's set is checked out of the table while one of its
//!     handlers runs, and checked back in on every exit path.
//!   - Every observable change is pushed to the pending event list.

use crate::{
    actor::{ActorEntry, ActorInit, ActorState},
    audio::{AudioSink, LogAudio},
    capability::Capability,
    clock::SimClock,
    config::Ruleset,
    deferred::DeferredAction,
    error::{RulesError, SimError, SimResult},
    event::SimEvent,
    health::DamageState,
    module::{Module, ModuleContext, ModuleSet},
    notify::{ActorEvent, AttackInfo, Notification},
    player::Player,
    reservation::ReservationTable,
    rng::SimRng,
    types::{ActorId, PlayerId},
};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};

pub struct World {
    pub clock:              SimClock,
    ruleset:                Arc<Ruleset>,
    pub(crate) actors:      BTreeMap<ActorId, ActorEntry>,
    pub(crate) players:     Vec<Player>,
    reservations:           ReservationTable,
    deferred:               VecDeque<DeferredAction>,
    rng:                    SimRng,
    events:                 Vec<SimEvent>,
    audio:                  Box<dyn AudioSink>,
    next_actor_id:          u32,
    flushing:               bool,
}

impl World {
    /// Player ids are list positions; `players[i].id` is rewritten to
    /// `PlayerId(i)` so the two can never disagree.
    pub fn new(ruleset: Arc<Ruleset>, mut players: Vec<Player>, seed: u64) -> Self {
        for (i, p) in players.iter_mut().enumerate() {
            p.id = PlayerId(i as u16);
        }
        Self {
            clock: SimClock::new(),
            ruleset,
            actors: BTreeMap::new(),
            players,
            reservations: ReservationTable::new(),
            deferred: VecDeque::new(),
            rng: SimRng::new(seed),
            events: Vec::new(),
            audio: Box::new(LogAudio),
            next_actor_id: 1,
            flushing: false,
        }
    }

    pub fn set_audio(&mut self, audio: Box<dyn AudioSink>) {
        self.audio = audio;
    }

    // ── Queries ─────────────────────────────────────

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id).map(|e| &e.state)
    }

    /// Every actor still in the table, in creation order.
    pub fn actors(&self) -> impl Iterator<Item = &ActorState> + '_ {
        self.actors.values().map(|e| &e.state)
    }

    pub fn is_live(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|s| s.is_live())
    }

    /// Live actors in creation order. The scheduler's visiting order.
    pub fn live_actor_ids(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|e| e.state.is_live())
            .map(|e| e.state.id())
            .collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0 as usize)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// None while the set is checked out, or for unknown actors.
    pub fn modules(&self, id: ActorId) -> Option<&ModuleSet> {
        self.actors.get(&id).and_then(|e| e.modules.as_ref())
    }

    pub fn find_module<T: Module + 'static>(&self, id: ActorId) -> Option<&T> {
        self.modules(id).and_then(|m| m.find::<T>())
    }

    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    pub(crate) fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    // ── Module invocation ───────────────────────────

    /// Run `f` against module `index` of `actor` with a context over the
    /// rest of the world. Returns the notifications the handler raised.
    pub(crate) fn invoke_module<F>(&mut self, actor: ActorId, index: usize, f: F) -> SimResult<Vec<Notification>>
    where
        F: FnOnce(&mut dyn Module, &mut ModuleContext<'_>) -> SimResult<()>,
    {
        let tick = self.clock.current_tick;
        let Some(entry) = self.actors.get_mut(&actor) else {
            return Ok(Vec::new());
        };
        let Some(mut modules) = entry.modules.take() else {
            return Err(SimError::Invariant {
                tick,
                detail: format!("module set of actor {actor} is already checked out"),
            });
        };

        let mut raised = Vec::new();
        let result = match modules.get_mut(index) {
            None => Err(SimError::Invariant {
                tick,
                detail: format!("actor {actor} has no module at index {index}"),
            }),
            Some(module) => {
                let name = module.name();
                let mut ctx = ModuleContext {
                    self_id:      actor,
                    tick,
                    source:       name,
                    actors:       &mut self.actors,
                    players:      &mut self.players,
                    reservations: &mut self.reservations,
                    deferred:     &mut self.deferred,
                    rng:          &mut self.rng,
                    events:       &mut self.events,
                    raised:       &mut raised,
                };
                f(module.as_mut(), &mut ctx).map_err(|e| SimError::ModuleFailed {
                    actor,
                    module: name,
                    source: Box::new(e),
                })
            }
        };

        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.modules = Some(modules);
        }
        result.map(|()| raised)
    }

    // ── Actor factory ───────────────────────────────

    pub fn create_actor(&mut self, actor_type: &str, init: ActorInit) -> SimResult<ActorId> {
        self.create_actor_with(actor_type, init, Vec::new())
    }

    /// Build an actor from its type template, appending `extra` modules
    /// after the configured ones. The registry is complete before the
    /// actor becomes visible.
    pub fn create_actor_with(
        &mut self,
        actor_type: &str,
        init:       ActorInit,
        extra:      Vec<Box<dyn Module>>,
    ) -> SimResult<ActorId> {
        let info = self
            .ruleset
            .get(actor_type)
            .cloned()
            .ok_or_else(|| RulesError::UnknownActorType { name: actor_type.to_string() })?;
        if self.player(init.owner).is_none() {
            return Err(SimError::PlayerNotFound(init.owner));
        }

        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;

        let mut modules: Vec<Box<dyn Module>> = info.modules.iter().map(|m| m.create(&init)).collect();
        modules.extend(extra);
        let modules = ModuleSet::new(modules);
        if modules.registry().count(Capability::Reservable) > 0 {
            self.reservations.register(id);
        }

        let state = ActorState::new(id, info, &init);
        self.events.push(SimEvent::ActorAdded {
            tick:       self.clock.current_tick,
            actor:      id,
            actor_type: state.actor_type().to_string(),
            owner:      state.owner(),
            location:   state.location(),
        });
        log::debug!("actor {id} ({actor_type}) added for {}", init.owner);
        self.actors.insert(id, ActorEntry { state, modules: Some(modules) });

        self.notify(id, ActorEvent::AddedToWorld)?;
        Ok(id)
    }

    /// Take an actor out of the world. Removing an actor that is already
    /// gone is a no-op, so two queued removals cannot fail a flush.
    pub fn remove_actor(&mut self, id: ActorId) -> SimResult<()> {
        let Some(entry) = self.actors.get_mut(&id) else {
            return Ok(());
        };
        entry.state.set_in_world(false);
        // A failing handler still leaves the actor removed.
        let notified = self.notify(id, ActorEvent::RemovedFromWorld);

        self.reservations.unregister(id);
        // Dropping the module set drops any reservation tokens it held.
        self.actors.remove(&id);
        self.events.push(SimEvent::ActorRemoved { tick: self.clock.current_tick, actor: id });
        log::debug!("actor {id} removed");
        notified
    }

    // ── Health pipeline ─────────────────────────────

    /// Damage pipeline: modifier fold, clamp, Damaged fan-out, then Killed
    /// fan-out and a deferred removal if the hit was lethal. Damage to an
    /// actor that is already dead has no effect.
    pub fn inflict_damage(
        &mut self,
        target:           ActorId,
        attacker:         Option<ActorId>,
        damage:           i32,
        ignore_modifiers: bool,
    ) -> SimResult<()> {
        let tick = self.clock.current_tick;
        // Repairs are never scaled.
        let multiplier = if ignore_modifiers || damage <= 0 {
            1.0
        } else {
            self.damage_multiplier(target, attacker)
        };

        let entry = self.actors.get_mut(&target).ok_or(SimError::ActorNotFound(target))?;
        if !entry.state.is_live() {
            return Ok(());
        }
        let damage = (damage as f64 * multiplier) as i32;
        let previous = entry.state.health().damage_state();
        entry.state.health_mut().apply(damage);
        let health = *entry.state.health();

        let info = AttackInfo {
            attacker,
            damage,
            damage_state: health.damage_state(),
            previous_damage_state: previous,
        };
        self.events.push(SimEvent::Damaged { tick, actor: target, attacker, damage, hp: health.hp() });
        self.notify(target, ActorEvent::Damaged(info))?;

        if info.damage_state == DamageState::Dead {
            self.events.push(SimEvent::Killed { tick, actor: target, attacker });
            log::debug!("actor {target} killed by {attacker:?}");
            self.notify(target, ActorEvent::Killed(info))?;
            self.deferred.push_back(DeferredAction::RemoveActor { actor: target });
        }
        Ok(())
    }

    pub fn change_owner(&mut self, id: ActorId, new_owner: PlayerId) -> SimResult<()> {
        if self.player(new_owner).is_none() {
            return Err(SimError::PlayerNotFound(new_owner));
        }
        let entry = self.actors.get_mut(&id).ok_or(SimError::ActorNotFound(id))?;
        let old = entry.state.owner();
        if old == new_owner {
            return Ok(());
        }
        entry.state.set_owner(new_owner);
        self.notify(id, ActorEvent::OwnerChanged { old, new: new_owner })
    }

    // ── End-of-step work ────────────────────────────

    /// Apply every queued deferred action in FIFO order. Actions queued by
    /// the actions themselves (a spawned actor's AddedToWorld handlers, a
    /// removal's handlers) join the back of the same flush.
    pub(crate) fn flush_deferred(&mut self) -> SimResult<()> {
        if self.flushing {
            return Err(SimError::Invariant {
                tick:   self.clock.current_tick,
                detail: "reentrant deferred-action flush".to_string(),
            });
        }
        self.flushing = true;
        let result = self.drain_deferred();
        self.flushing = false;
        result
    }

    fn drain_deferred(&mut self) -> SimResult<()> {
        while let Some(action) = self.deferred.pop_front() {
            match action {
                DeferredAction::SpawnActor { actor_type, init } => {
                    self.create_actor(&actor_type, init)?;
                }
                DeferredAction::RemoveActor { actor } => {
                    self.remove_actor(actor)?;
                }
                DeferredAction::PlayNotification { player, cue } => {
                    let p = self.players.get(player.0 as usize).ok_or(SimError::PlayerNotFound(player))?;
                    self.audio.play_notification(p, &cue);
                    self.events.push(SimEvent::NotificationPlayed {
                        tick: self.clock.current_tick,
                        player,
                        cue,
                    });
                }
            }
        }
        Ok(())
    }

    /// Drop everything still queued. Used when a step aborts.
    pub(crate) fn clear_deferred(&mut self) {
        if !self.deferred.is_empty() {
            log::warn!("discarding {} deferred actions", self.deferred.len());
        }
        self.deferred.clear();
    }

    /// Recompute every player's power totals from live actors: the actor
    /// type's base power scaled by its power multiplier, rounded.
    pub(crate) fn recompute_power(&mut self) {
        let mut totals = vec![(0i32, 0i32); self.players.len()];
        for (id, entry) in &self.actors {
            let base = entry.state.info().power;
            if base == 0 || !entry.state.is_live() {
                continue;
            }
            let value = (base as f64 * self.power_multiplier(*id)).round() as i32;
            let Some((provided, drained)) = totals.get_mut(entry.state.owner().0 as usize) else {
                continue;
            };
            if value > 0 {
                *provided += value;
            } else {
                *drained -= value;
            }
        }
        for (player, (provided, drained)) in self.players.iter_mut().zip(totals) {
            player.set_power(provided, drained);
        }
    }

    /// Free reservations whose holder is dead or gone.
    pub(crate) fn sweep_reservations(&mut self) {
        let actors = &self.actors;
        let freed = self
            .reservations
            .sweep(|id| actors.get(&id).is_some_and(|e| e.state.is_live()));
        for (target, holder) in freed {
            log::warn!("reservation on {target} expired: holder {holder} is gone");
            self.events.push(SimEvent::ReservationExpired {
                tick: self.clock.current_tick,
                target,
                holder,
            });
        }
    }
}
