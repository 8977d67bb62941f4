//! Behavior modules end to end: timers, economy, ammo, cloak, death
//! side effects and power toggling.

use actorsim_core::{
    actor::ActorInit,
    audio::RecordingAudio,
    behaviors::{CashTrickler, Cloak, Reloads, WithMakeAnimation},
    command::Order,
    config::Ruleset,
    engine::SimEngine,
    event::SimEvent,
    player::Player,
    types::{ActorId, CPos, Color, PlayerId},
};
use std::sync::Arc;

const NEUTRAL: PlayerId = PlayerId(0);
const BLUE: PlayerId = PlayerId(1);
const RED: PlayerId = PlayerId(2);

fn build_engine() -> (SimEngine, RecordingAudio) {
    let players = vec![
        Player::neutral(NEUTRAL),
        Player::new(BLUE, "Blue", Color::rgb(0, 0, 255), 1000),
        Player::new(RED, "Red", Color::rgb(255, 0, 0), 1000),
    ];
    let audio = RecordingAudio::new();
    let engine = SimEngine::new("module-test".into(), 3, Arc::new(Ruleset::default_test()), players)
        .with_audio(Box::new(audio.clone()));
    (engine, audio)
}

fn hp(engine: &SimEngine, id: ActorId) -> i32 {
    engine.actor(id).expect("actor").health().hp()
}

// ── SelfHealing ─────────────────────────────────────

#[test]
fn self_healing_stops_at_the_threshold() {
    let (mut engine, _) = build_engine();
    let medic = engine
        .spawn("medic", ActorInit::new(BLUE, CPos::new(0, 0)).with_health(40))
        .expect("spawn");
    assert_eq!(hp(&engine, medic), 40);

    engine.run_ticks(4).expect("run");
    assert_eq!(hp(&engine, medic), 40);
    let events = engine.tick().expect("tick 5");
    assert_eq!(hp(&engine, medic), 45);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::Healed { tick: 5, amount: 5, hp: 45, .. })));

    engine.run_ticks(5).expect("run");
    assert_eq!(hp(&engine, medic), 50);
    engine.run_ticks(20).expect("run");
    assert_eq!(hp(&engine, medic), 50, "at 50% the medic no longer heals");
}

#[test]
fn healthy_actors_do_not_heal() {
    let (mut engine, _) = build_engine();
    let medic = engine.spawn("medic", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    engine.run_ticks(10).expect("run");
    assert_eq!(hp(&engine, medic), 100);
}

// ── CashTrickler ────────────────────────────────────

#[test]
fn refinery_trickles_cash_every_period() {
    let (mut engine, _) = build_engine();
    let ids = engine
        .spawn_bulk(vec![
            ("powerplant".into(), ActorInit::new(BLUE, CPos::new(0, 0))),
            ("refinery".into(), ActorInit::new(BLUE, CPos::new(3, 0))),
        ])
        .expect("spawn");

    engine.run_ticks(49).expect("run");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 1000);
    assert_eq!(engine.find_module::<CashTrickler>(ids[1]).unwrap().ticks_remaining(), 1);

    let events = engine.tick().expect("tick 50");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 1015);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::CashCredited { tick: 50, amount: 15, .. })));

    engine.run_ticks(50).expect("run");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 1030);
}

#[test]
fn unpowered_refinery_does_not_trickle() {
    let (mut engine, _) = build_engine();
    engine
        .spawn_bulk(vec![("refinery".into(), ActorInit::new(BLUE, CPos::new(3, 0)))])
        .expect("spawn");
    engine.run_ticks(100).expect("run");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 1000);
}

// ── Reloads ─────────────────────────────────────────

#[test]
fn fired_rounds_reload_one_per_period() {
    let (mut engine, _) = build_engine();
    let tank = engine.spawn("tank", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    for _ in 0..3 {
        engine.issue_order(tank, Order::new(Order::FIRE));
    }
    engine.tick().expect("tick 1");
    assert_eq!(engine.find_module::<Reloads>(tank).unwrap().ammo(), 2);

    engine.run_ticks(13).expect("run");
    assert_eq!(engine.find_module::<Reloads>(tank).unwrap().ammo(), 2);

    let events = engine.tick().expect("tick 15");
    assert_eq!(engine.find_module::<Reloads>(tank).unwrap().ammo(), 3);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::AmmoReloaded { ammo: 3, .. })));
}

#[test]
fn empty_magazine_ignores_fire() {
    let (mut engine, _) = build_engine();
    let stealth = engine.spawn("stealth", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    for _ in 0..4 {
        engine.issue_order(stealth, Order::new(Order::FIRE));
    }
    engine.tick().expect("tick");
    assert_eq!(engine.find_module::<Reloads>(stealth).unwrap().ammo(), 0);
}

// ── Cloak ───────────────────────────────────────────

#[test]
fn firing_breaks_cloak_until_the_delay_passes() {
    let (mut engine, _) = build_engine();
    let stealth = engine.spawn("stealth", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    let cloaked = |e: &SimEngine| e.find_module::<Cloak>(stealth).unwrap().is_cloaked();

    engine.run_ticks(9).expect("run");
    assert!(!cloaked(&engine));
    engine.tick().expect("tick 10");
    assert!(cloaked(&engine));

    engine.issue_order(stealth, Order::new(Order::FIRE));
    let events = engine.tick().expect("tick 11");
    assert!(!cloaked(&engine));
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::CloakChanged { cloaked: false, .. })));

    engine.run_ticks(8).expect("run");
    assert!(!cloaked(&engine));
    engine.tick().expect("tick 20");
    assert!(cloaked(&engine));
}

#[test]
fn damage_breaks_cloak() {
    let (mut engine, _) = build_engine();
    let stealth = engine.spawn("stealth", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    engine.run_ticks(10).expect("cloak");
    engine.inflict_damage(stealth, None, 10).expect("damage");
    assert!(!engine.find_module::<Cloak>(stealth).unwrap().is_cloaked());
    assert!(!engine.render(stealth, Some(RED)).is_empty());
}

// ── Death side effects ──────────────────────────────

#[test]
fn refinery_leaves_a_neutral_crate() {
    let (mut engine, audio) = build_engine();
    let refinery = engine
        .spawn("refinery", ActorInit::new(BLUE, CPos::new(6, 2)))
        .expect("spawn");
    let events = engine.kill(refinery, None).expect("kill");

    let crate_actor = engine
        .world()
        .actors()
        .find(|a| a.actor_type() == "crate")
        .expect("crate spawned");
    assert_eq!(crate_actor.owner(), NEUTRAL);
    assert_eq!(crate_actor.location(), CPos::new(6, 2));
    assert!(audio.played().is_empty(), "refineries announce nothing");

    let kinds: Vec<_> = events.iter().map(|e| e.type_name()).collect();
    let killed = kinds.iter().position(|k| *k == "killed").expect("killed");
    let added = kinds.iter().rposition(|k| *k == "actor_added").expect("added");
    assert!(killed < added, "the crate appears after the death");
}

#[test]
fn bounty_needs_an_enemy_killer() {
    let (mut engine, _) = build_engine();
    let spy = engine.spawn("spy", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    engine.kill(spy, None).expect("kill");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 1000);
    assert_eq!(engine.player(RED).unwrap().cash(), 1000);

    let spy = engine.spawn("spy", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    let tank = engine.spawn("tank", ActorInit::new(RED, CPos::new(1, 0))).expect("spawn");
    engine.kill(spy, Some(tank)).expect("kill");
    assert_eq!(engine.player(RED).unwrap().cash(), 1050);
}

#[test]
fn infiltration_pays_at_least_the_minimum() {
    let (mut engine, _) = build_engine();
    let refinery = engine.spawn("refinery", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    let spy = engine.spawn("spy", ActorInit::new(RED, CPos::new(1, 0))).expect("spawn");

    engine.infiltrate(refinery, spy).expect("first");
    engine.infiltrate(refinery, spy).expect("second");
    assert_eq!(engine.player(BLUE).unwrap().cash(), 250);
    assert_eq!(engine.player(RED).unwrap().cash(), 2000);
}

// ── Power and construction ──────────────────────────

#[test]
fn power_toggle_plays_cues_for_the_owner() {
    let (mut engine, audio) = build_engine();
    let plant = engine
        .spawn("powerplant", ActorInit::new(BLUE, CPos::new(0, 0)).skipping_make_animation())
        .expect("spawn");

    engine.issue_order(plant, Order::new(Order::POWER_DOWN));
    let events = engine.tick().expect("down");
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::PowerToggled { powered: false, .. })));

    engine.issue_order(plant, Order::new(Order::POWER_DOWN));
    engine.tick().expect("up");
    assert_eq!(
        audio.played(),
        vec![(BLUE, "PowerDown".to_string()), (BLUE, "PowerUp".to_string())]
    );
    assert_eq!(engine.player(BLUE).unwrap().power_provided(), 100);
}

#[test]
fn make_animation_runs_unless_bulk_spawned() {
    let (mut engine, _) = build_engine();
    let built = engine.spawn("powerplant", ActorInit::new(BLUE, CPos::new(0, 0))).expect("spawn");
    let placed = engine
        .spawn_bulk(vec![("powerplant".into(), ActorInit::new(BLUE, CPos::new(4, 0)))])
        .expect("bulk")[0];

    let complete = |e: &SimEngine, id| e.find_module::<WithMakeAnimation>(id).unwrap().is_complete();
    assert!(complete(&engine, placed));
    assert!(!complete(&engine, built));

    engine.run_ticks(14).expect("run");
    assert!(!complete(&engine, built));
    engine.tick().expect("tick 15");
    assert!(complete(&engine, built));
}
