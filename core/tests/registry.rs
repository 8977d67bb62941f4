//! Capability registry: bucket membership and ordering.

use actorsim_core::{
    actor::ActorInit,
    capability::{Capability, CapabilitySet},
    config::Ruleset,
    engine::SimEngine,
    module::{Module, ModuleSet},
    player::Player,
    types::{CPos, Color, PlayerId},
};
use std::{any::Any, sync::Arc};

struct Tagged {
    label: &'static str,
    caps:  CapabilitySet,
}

impl Module for Tagged {
    fn name(&self) -> &'static str { self.label }
    fn capabilities(&self) -> CapabilitySet { self.caps }
    fn as_any(&self) -> &dyn Any { self }
}

fn tagged(label: &'static str, caps: &[Capability]) -> Box<dyn Module> {
    Box::new(Tagged { label, caps: CapabilitySet::of(caps) })
}

fn build_engine() -> SimEngine {
    let players = vec![
        Player::neutral(PlayerId(0)),
        Player::new(PlayerId(1), "Blue", Color::rgb(0, 0, 255), 1000),
    ];
    SimEngine::new("registry-test".into(), 1, Arc::new(Ruleset::default_test()), players)
}

#[test]
fn module_with_n_capabilities_appears_in_n_buckets() {
    let set = ModuleSet::new(vec![
        tagged("a", &[Capability::Periodic, Capability::NotifyKilled, Capability::RenderModifier]),
        tagged("b", &[Capability::Periodic]),
    ]);
    let registry = set.registry();
    assert_eq!(registry.query(Capability::Periodic), &[0, 1]);
    assert_eq!(registry.query(Capability::NotifyKilled), &[0]);
    assert_eq!(registry.query(Capability::RenderModifier), &[0]);

    let total: usize = Capability::ALL.iter().map(|&c| registry.count(c)).sum();
    assert_eq!(total, 4, "three buckets for a, one for b");
}

#[test]
fn bucket_order_is_construction_order() {
    let set = ModuleSet::new(vec![
        tagged("third", &[Capability::DamageModifier]),
        tagged("first", &[Capability::DamageModifier]),
        tagged("second", &[Capability::DamageModifier]),
    ]);
    let names: Vec<_> = set
        .with_capability(Capability::DamageModifier)
        .map(|m| m.name())
        .collect();
    assert_eq!(names, vec!["third", "first", "second"]);
}

#[test]
fn absent_capability_is_an_empty_sequence() {
    let set = ModuleSet::new(vec![tagged("only", &[Capability::Periodic])]);
    assert!(set.registry().query(Capability::Reservable).is_empty());
    assert_eq!(set.with_capability(Capability::Reservable).count(), 0);

    let empty = ModuleSet::new(Vec::new());
    assert!(empty.is_empty());
    assert_eq!(empty.with_capability(Capability::Periodic).count(), 0);
}

#[test]
fn capability_query_is_restartable() {
    let set = ModuleSet::new(vec![
        tagged("a", &[Capability::TargetTypes]),
        tagged("b", &[Capability::TargetTypes]),
    ]);
    let iter = set.with_capability(Capability::TargetTypes);
    let first: Vec<_> = iter.clone().map(|m| m.name()).collect();
    let second: Vec<_> = iter.map(|m| m.name()).collect();
    assert_eq!(first, second);
}

#[test]
fn actor_registry_follows_rules_module_order() {
    let mut engine = build_engine();
    let refinery = engine
        .spawn("refinery", ActorInit::new(PlayerId(1), CPos::new(1, 1)))
        .expect("spawn refinery");

    let modules = engine.world().modules(refinery).expect("module set checked in");
    assert_eq!(
        modules.names(),
        vec![
            "WithMakeAnimation",
            "CashTrickler",
            "Reservable",
            "RequiresPower",
            "InfiltrateForCash",
            "SpawnActorOnDeath",
            "GivesBounty",
        ]
    );
    let periodic: Vec<_> = modules
        .with_capability(Capability::Periodic)
        .map(|m| m.name())
        .collect();
    assert_eq!(periodic, vec!["WithMakeAnimation", "CashTrickler"]);
    assert_eq!(modules.registry().count(Capability::NotifyKilled), 2);
    assert!(engine.world().reservations().is_reservable(refinery));
}

#[test]
fn extra_modules_register_after_configured_ones() {
    let mut engine = build_engine();
    let husk = engine
        .spawn_custom(
            "husk",
            ActorInit::new(PlayerId(1), CPos::new(0, 0)),
            vec![tagged("marker", &[Capability::Periodic])],
        )
        .expect("spawn husk");
    let modules = engine.world().modules(husk).expect("module set");
    assert_eq!(modules.names(), vec!["marker"]);
    assert_eq!(modules.registry().query(Capability::Periodic), &[0]);
}
