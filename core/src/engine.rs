//! The simulation engine: the tick scheduler and the external API.
//!
//! STEP ORDER (fixed, documented, never reordered):
//!   1. Orders queued since the last step, in submission order
//!   2. Periodic modules of every live, enabled actor, in creation order
//!      (registry order within an actor)
//!   3. Deferred-action flush, FIFO
//!   4. Player power totals recomputed
//!   5. Reservation liveness sweep
//!
//! RULES:
//!   - Notifications raised while an actor runs are delivered before the
//!     next actor runs.
//!   - Actors spawned or removed during a step become visible only at the
//!     flush.
//!   - All randomness flows through the world's SimRng.
//!   - Any module error aborts the step: the deferred queue is dropped,
//!     the clock returns to Idle, and the error surfaces as StepAborted.
//!   - External mutations (damage, kills, infiltration, spawns) are only
//!     accepted between steps and are flushed immediately.

use crate::{
    actor::{ActorInit, ActorState},
    audio::AudioSink,
    capability::Capability,
    command::{Order, QueuedOrder},
    config::Ruleset,
    error::{SimError, SimResult},
    event::SimEvent,
    module::Module,
    notify::ActorEvent,
    player::Player,
    render::Renderable,
    snapshot::WorldSnapshot,
    types::{ActorId, PlayerId, RunId, Tick},
    world::World,
};
use std::{collections::VecDeque, sync::Arc};

pub struct SimEngine {
    pub run_id: RunId,
    seed:       u64,
    world:      World,
    orders:     VecDeque<QueuedOrder>,
    event_log:  Vec<SimEvent>,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, ruleset: Arc<Ruleset>, players: Vec<Player>) -> Self {
        let world = World::new(ruleset, players, seed);
        let event_log = vec![SimEvent::RunInitialized { run_id: run_id.clone(), seed }];
        Self { run_id, seed, world, orders: VecDeque::new(), event_log }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.world.set_audio(audio);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> Tick {
        self.world.clock.current_tick
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    // ── Stepping ────────────────────────────────────

    /// Advance one step. Returns the events it produced, in order.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        let tick = self.world.clock.begin_step()?;
        match self.step(tick) {
            Ok(()) => Ok(self.drain_events()),
            Err(source) => {
                log::warn!("step {tick} aborted: {source}");
                self.world.clear_deferred();
                self.world.clock.abort_step();
                self.drain_events();
                Err(SimError::StepAborted { tick, source: Box::new(source) })
            }
        }
    }

    fn step(&mut self, tick: Tick) -> SimResult<()> {
        self.world.emit(SimEvent::TickStarted { tick });

        while let Some(queued) = self.orders.pop_front() {
            self.resolve_order(tick, queued)?;
        }

        for actor in self.world.live_actor_ids() {
            if !self.world.is_live(actor) || self.world.is_disabled(actor) {
                continue;
            }
            let raised = self.world.fan_out(actor, Capability::Periodic, |m, ctx| m.tick(ctx))?;
            self.world.dispatch(raised)?;
        }

        self.world.clock.begin_flush()?;
        self.world.flush_deferred()?;
        self.world.recompute_power();
        self.world.sweep_reservations();
        self.world.clock.end_step()?;

        self.world.emit(SimEvent::TickCompleted { tick });
        Ok(())
    }

    fn resolve_order(&mut self, tick: Tick, queued: QueuedOrder) -> SimResult<()> {
        let QueuedOrder { subject, order, .. } = queued;
        if !self.world.is_live(subject) {
            log::debug!("dropping order {} for {subject}: not live", order.name);
            return Ok(());
        }
        let raised = self
            .world
            .fan_out(subject, Capability::ResolveOrder, |m, ctx| m.resolve_order(&order, ctx))?;
        self.world.emit(SimEvent::OrderResolved { tick, actor: subject, order: order.name.clone() });
        self.world.dispatch(raised)
    }

    /// Run n steps. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    /// Queue an order for the next step.
    pub fn issue_order(&mut self, subject: ActorId, order: Order) {
        self.orders.push_back(QueuedOrder {
            queued_at: self.world.clock.current_tick,
            subject,
            order,
        });
    }

    pub fn pause(&mut self) {
        self.world.clock.pause();
    }

    pub fn resume(&mut self) {
        self.world.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.world.clock.paused
    }

    // ── External mutations ──────────────────────────

    pub fn spawn(&mut self, actor_type: &str, init: ActorInit) -> SimResult<ActorId> {
        self.spawn_custom(actor_type, init, Vec::new())
    }

    /// Spawn with extra modules appended after the type's own. Lets tools
    /// and tests attach extra modules without a ruleset entry.
    pub fn spawn_custom(
        &mut self,
        actor_type: &str,
        init:       ActorInit,
        extra:      Vec<Box<dyn Module>>,
    ) -> SimResult<ActorId> {
        let mut id = None;
        self.external(|w| {
            id = Some(w.create_actor_with(actor_type, init, extra)?);
            Ok(())
        })?;
        id.ok_or(SimError::Invariant {
            tick:   self.current_tick(),
            detail: format!("spawning {actor_type} produced no actor"),
        })
    }

    /// Map-load style spawning: every actor is created already built.
    pub fn spawn_bulk(&mut self, actors: Vec<(String, ActorInit)>) -> SimResult<Vec<ActorId>> {
        let mut ids = Vec::with_capacity(actors.len());
        self.external(|w| {
            for (actor_type, init) in actors {
                ids.push(w.create_actor(&actor_type, init.skipping_make_animation())?);
            }
            Ok(())
        })?;
        Ok(ids)
    }

    pub fn inflict_damage(
        &mut self,
        target:   ActorId,
        attacker: Option<ActorId>,
        damage:   i32,
    ) -> SimResult<Vec<SimEvent>> {
        self.external(|w| w.inflict_damage(target, attacker, damage, false))
    }

    /// Lethal damage that ignores modifiers.
    pub fn kill(&mut self, target: ActorId, attacker: Option<ActorId>) -> SimResult<Vec<SimEvent>> {
        self.external(|w| {
            let max_hp = w.actor(target).ok_or(SimError::ActorNotFound(target))?.health().max_hp();
            w.inflict_damage(target, attacker, max_hp, true)
        })
    }

    pub fn infiltrate(&mut self, target: ActorId, infiltrator: ActorId) -> SimResult<Vec<SimEvent>> {
        self.external(|w| {
            if !w.is_live(target) {
                return Err(SimError::ActorNotFound(target));
            }
            w.notify(target, ActorEvent::Infiltrated { infiltrator })
        })
    }

    pub fn change_owner(&mut self, actor: ActorId, owner: PlayerId) -> SimResult<Vec<SimEvent>> {
        self.external(|w| w.change_owner(actor, owner))
    }

    /// Remove an actor without killing it (sold, despawned by script).
    pub fn remove(&mut self, actor: ActorId) -> SimResult<Vec<SimEvent>> {
        self.external(|w| w.remove_actor(actor))
    }

    fn external(&mut self, op: impl FnOnce(&mut World) -> SimResult<()>) -> SimResult<Vec<SimEvent>> {
        if !self.world.clock.is_idle() {
            return Err(SimError::Invariant {
                tick:   self.current_tick(),
                detail: "external mutation while a step is running".to_string(),
            });
        }
        let result = op(&mut self.world).and_then(|()| self.world.flush_deferred());
        if result.is_err() {
            self.world.clear_deferred();
        }
        self.world.recompute_power();
        let events = self.drain_events();
        result.map(|()| events)
    }

    fn drain_events(&mut self) -> Vec<SimEvent> {
        let events = self.world.take_events();
        self.event_log.extend(events.iter().cloned());
        events
    }

    // ── Queries ─────────────────────────────────────

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.world.actor(id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.world.player(id)
    }

    pub fn find_module<T: Module + 'static>(&self, id: ActorId) -> Option<&T> {
        self.world.find_module::<T>(id)
    }

    /// Renderables for `actor` as drawn for `viewer`.
    pub fn render(&self, actor: ActorId, viewer: Option<PlayerId>) -> Vec<Renderable> {
        self.world.render(actor, viewer)
    }

    /// Every event since the engine was built.
    pub fn event_log(&self) -> &[SimEvent] {
        &self.event_log
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.run_id, &self.world)
    }
}
