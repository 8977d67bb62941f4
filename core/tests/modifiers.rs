//! Modifier aggregation: identities, the absorbing zero, overrides and
//! the render pipeline.

use actorsim_core::{
    actor::ActorInit,
    capability::{Capability, CapabilitySet},
    command::Order,
    config::Ruleset,
    engine::SimEngine,
    event::SimEvent,
    modifiers::{fold_multiplicative, MultiplierKind},
    module::{ActorView, Module},
    player::Player,
    types::{ActorId, CPos, Color, PlayerId},
};
use std::{any::Any, sync::Arc};

const BLUE: PlayerId = PlayerId(1);
const RED: PlayerId = PlayerId(2);
const BLUE_COLOR: Color = Color::rgb(0, 0, 255);

fn build_engine() -> SimEngine {
    let players = vec![
        Player::neutral(PlayerId(0)),
        Player::new(BLUE, "Blue", BLUE_COLOR, 1000),
        Player::new(RED, "Red", Color::rgb(255, 0, 0), 1000),
    ];
    SimEngine::new("modifier-test".into(), 11, Arc::new(Ruleset::default_test()), players)
}

fn blue_at(x: i32) -> ActorInit {
    ActorInit::new(BLUE, CPos::new(x, 0))
}

/// Constant damage and power factor.
struct Factor(f64);

impl Module for Factor {
    fn name(&self) -> &'static str { "Factor" }
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::DamageModifier, Capability::PowerModifier])
    }
    fn damage_modifier(&self, _view: &ActorView<'_>, _attacker: Option<ActorId>) -> f64 { self.0 }
    fn power_modifier(&self, _view: &ActorView<'_>) -> f64 { self.0 }
    fn as_any(&self) -> &dyn Any { self }
}

/// Overrides radar color.
struct Paint(Color);

impl Module for Paint {
    fn name(&self) -> &'static str { "Paint" }
    fn capabilities(&self) -> CapabilitySet { CapabilitySet::of(&[Capability::RadarColor]) }
    fn radar_color(&self, _view: &ActorView<'_>) -> Option<Color> { Some(self.0) }
    fn as_any(&self) -> &dyn Any { self }
}

#[test]
fn no_contributing_modules_yields_identities() {
    let mut engine = build_engine();
    let husk = engine.spawn("husk", blue_at(0)).expect("spawn husk");
    let world = engine.world();

    assert_eq!(world.damage_multiplier(husk, None), 1.0);
    assert_eq!(world.multiplier(husk, MultiplierKind::Power), 1.0);
    assert_eq!(world.radar_color(husk), Some(BLUE_COLOR), "falls back to the owner color");
    assert_eq!(world.target_types(husk, RED), vec!["Ground".to_string(), "Husk".to_string()]);
    assert!(!world.is_disabled(husk));
}

#[test]
fn unknown_actor_yields_identities() {
    let engine = build_engine();
    let world = engine.world();
    assert_eq!(world.damage_multiplier(ActorId(77), None), 1.0);
    assert_eq!(world.power_multiplier(ActorId(77)), 1.0);
    assert!(world.render(ActorId(77), None).is_empty());
}

#[test]
fn single_zero_absorbs_every_other_factor() {
    let mut engine = build_engine();
    let husk = engine
        .spawn_custom(
            "husk",
            blue_at(0),
            vec![
                Box::new(Factor(3.0)),
                Box::new(Factor(0.0)),
                Box::new(Factor(f64::INFINITY)),
                Box::new(Factor(0.25)),
            ],
        )
        .expect("spawn");
    assert_eq!(engine.world().damage_multiplier(husk, None), 0.0);
    assert_eq!(engine.world().power_multiplier(husk), 0.0);

    let events = engine.inflict_damage(husk, None, 90).expect("damage");
    assert_eq!(engine.actor(husk).unwrap().health().hp(), 100);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::Damaged { damage: 0, hp: 100, .. })));
}

#[test]
fn absorbing_zero_holds_for_any_mix() {
    let others = [0.1, 0.5, 1.0, 2.0, 9.0, f64::MAX, f64::INFINITY];
    for n in 0..others.len() {
        for zero_at in 0..=n {
            let mut values: Vec<f64> = others[..n].to_vec();
            values.insert(zero_at, 0.0);
            assert_eq!(fold_multiplicative(values.clone()), 0.0, "values={values:?}");
        }
    }
}

#[test]
fn multiplicative_factors_scale_damage() {
    let mut engine = build_engine();
    let bunker = engine.spawn("bunker", blue_at(0)).expect("spawn bunker");
    engine.inflict_damage(bunker, None, 100).expect("damage");
    assert_eq!(engine.actor(bunker).unwrap().health().hp(), 950, "bunker takes half damage");

    let husk = engine
        .spawn_custom("husk", blue_at(1), vec![Box::new(Factor(0.5)), Box::new(Factor(0.5))])
        .expect("spawn");
    engine.inflict_damage(husk, None, 40).expect("damage");
    assert_eq!(engine.actor(husk).unwrap().health().hp(), 90);
}

#[test]
fn repairs_are_not_scaled_by_damage_modifiers() {
    let mut engine = build_engine();
    let bunker = engine
        .spawn("bunker", blue_at(0).with_health(50))
        .expect("spawn bunker");
    let events = engine.inflict_damage(bunker, None, -200).expect("repair");
    assert_eq!(engine.actor(bunker).unwrap().health().hp(), 700, "full repair despite the 0.5 modifier");
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::Damaged { damage: -200, hp: 700, .. })));

    // A zero factor absorbs hits but must not block repairs.
    let husk = engine
        .spawn_custom("husk", blue_at(1).with_health(50), vec![Box::new(Factor(0.0))])
        .expect("spawn");
    engine.inflict_damage(husk, None, 30).expect("hit");
    assert_eq!(engine.actor(husk).unwrap().health().hp(), 50);
    engine.inflict_damage(husk, None, -30).expect("repair");
    assert_eq!(engine.actor(husk).unwrap().health().hp(), 80);
}

#[test]
fn invulnerable_ignores_damage_but_not_kill() {
    let mut engine = build_engine();
    let crate_id = engine.spawn("crate", blue_at(0)).expect("spawn crate");
    engine.inflict_damage(crate_id, None, 1000).expect("damage");
    assert!(engine.actor(crate_id).is_some_and(|a| a.is_live()));

    engine.kill(crate_id, None).expect("kill");
    assert!(engine.actor(crate_id).is_none());
}

#[test]
fn power_output_folds_health_and_power_down() {
    let mut engine = build_engine();
    let ids = engine
        .spawn_bulk(vec![
            ("powerplant".into(), blue_at(0)),
            ("refinery".into(), blue_at(3)),
        ])
        .expect("spawn base");
    let (plant, refinery) = (ids[0], ids[1]);

    let blue = engine.player(BLUE).unwrap();
    assert_eq!((blue.power_provided(), blue.power_drained()), (100, 30));

    engine.inflict_damage(plant, None, 200).expect("damage plant");
    assert_eq!(engine.player(BLUE).unwrap().power_provided(), 50, "scaled by health");

    engine.issue_order(plant, Order::new(Order::POWER_DOWN));
    engine.tick().expect("tick");
    let blue = engine.player(BLUE).unwrap();
    assert_eq!(blue.power_provided(), 0, "power-down factor absorbs");
    assert_eq!(blue.power_balance(), -30);
    assert!(engine.world().is_disabled(refinery), "low power disables the refinery");
}

#[test]
fn first_override_in_registry_order_wins() {
    let mut engine = build_engine();
    let red = Color::rgb(200, 0, 0);
    let green = Color::rgb(0, 200, 0);
    let husk = engine
        .spawn_custom("husk", blue_at(0), vec![Box::new(Paint(red)), Box::new(Paint(green))])
        .expect("spawn");
    assert_eq!(engine.world().radar_color(husk), Some(red));
}

#[test]
fn cloak_overrides_radar_and_target_types() {
    let mut engine = build_engine();
    let stealth = engine.spawn("stealth", blue_at(0)).expect("spawn stealth");
    assert_eq!(engine.world().radar_color(stealth), Some(BLUE_COLOR));

    engine.run_ticks(10).expect("cloak");
    let world = engine.world();
    assert_eq!(world.radar_color(stealth), Some(BLUE_COLOR.with_alpha(128)), "owner color at half alpha");
    assert!(world.target_types(stealth, RED).is_empty(), "enemies cannot target it");
    assert_eq!(world.target_types(stealth, BLUE), vec!["Ground".to_string()]);
}

#[test]
fn render_pipeline_runs_in_registry_order() {
    let mut engine = build_engine();
    let built = engine.spawn("powerplant", blue_at(0)).expect("spawn");
    let placed = engine
        .spawn_bulk(vec![("powerplant".into(), blue_at(4))])
        .expect("bulk")[0];

    let r = engine.render(built, Some(BLUE));
    assert_eq!(r.len(), 1);
    assert_eq!(r[0].sequence, "make");
    assert_eq!(engine.render(placed, Some(BLUE))[0].sequence, "idle");

    engine.issue_order(placed, Order::new(Order::POWER_DOWN));
    engine.tick().expect("tick");
    let r = engine.render(placed, None);
    assert_eq!(r.len(), 2, "disabled overlay added");
    assert_eq!(r[1].sequence, "disabled");
    assert_eq!(r[1].z_offset, r[0].z_offset + 1);
}

#[test]
fn cloaked_render_depends_on_viewer() {
    let mut engine = build_engine();
    let stealth = engine.spawn("stealth", blue_at(0)).expect("spawn");
    engine.run_ticks(10).expect("cloak");

    assert!(engine.render(stealth, Some(RED)).is_empty());
    let own = engine.render(stealth, Some(BLUE));
    assert_eq!(own.len(), 1);
    assert!((own[0].alpha - 0.5).abs() < f32::EPSILON);
    assert_eq!(engine.render(stealth, None).len(), 1, "observers see it");

    // Render queries never touch simulation state.
    let before = engine.snapshot().sync_hash().unwrap();
    for _ in 0..5 {
        engine.render(stealth, Some(RED));
    }
    assert_eq!(engine.snapshot().sync_hash().unwrap(), before);
}
