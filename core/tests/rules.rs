//! Ruleset composition: the shipped rules file, and the errors raised
//! before any actor exists.

use actorsim_core::{
    actor::ActorInit,
    config::Ruleset,
    engine::SimEngine,
    error::{RulesError, SimError},
    player::Player,
    types::{CPos, PlayerId},
};
use std::sync::Arc;

const RULES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/rules.json");

fn compose(actors: &str) -> Result<Ruleset, SimError> {
    Ruleset::from_json(&format!(r#"{{ "actors": [{actors}] }}"#))
}

fn rules_error(actors: &str) -> RulesError {
    match compose(actors) {
        Err(SimError::Rules(e)) => e,
        other => panic!("expected a rules error, got {other:?}"),
    }
}

#[test]
fn shipped_rules_match_the_builtin_ruleset() {
    let loaded = Ruleset::load(RULES_PATH).expect("data/rules.json");
    let builtin = Ruleset::default_test();

    assert_eq!(loaded.names().collect::<Vec<_>>(), builtin.names().collect::<Vec<_>>());
    for name in builtin.names() {
        assert_eq!(loaded.get(name), builtin.get(name), "type {name}");
    }
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let err = Ruleset::load("/nonexistent/rules.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/rules.json"));
}

#[test]
fn defaults_fill_omitted_fields() {
    let rules = compose(r#"{ "name": "rock", "hp": 10 }"#).expect("compose");
    let rock = rules.get("rock").expect("rock");
    assert_eq!((rock.cost, rock.power), (0, 0));
    assert_eq!(rock.target_types, vec!["Ground".to_string()]);
    assert!(rock.modules.is_empty());
}

#[test]
fn overlay_without_a_disable_source_is_rejected() {
    let err = rules_error(r#"{ "name": "wall", "hp": 10, "modules": [{ "type": "WithDisabledOverlay" }] }"#);
    assert!(matches!(err, RulesError::MissingPrerequisite { module: "WithDisabledOverlay", .. }));

    compose(
        r#"{ "name": "wall", "hp": 10,
             "modules": [{ "type": "RequiresPower" }, { "type": "WithDisabledOverlay" }] }"#,
    )
    .expect("either disable source satisfies the overlay");
}

#[test]
fn references_to_unknown_types_are_rejected() {
    let err = rules_error(
        r#"{ "name": "tank", "hp": 10, "modules": [{ "type": "SpawnActorOnDeath", "actor": "husk" }] }"#,
    );
    assert_eq!(
        err,
        RulesError::UnknownReference {
            actor:  "tank".into(),
            module: "SpawnActorOnDeath",
            name:   "husk".into(),
        }
    );
}

#[test]
fn dock_targets_must_be_reservable() {
    let err = rules_error(
        r#"{ "name": "pad", "hp": 10 },
           { "name": "heli", "hp": 10, "modules": [{ "type": "DockClient", "dock_type": "pad" }] }"#,
    );
    assert!(matches!(err, RulesError::InvalidValue { module: "DockClient", field: "dock_type", .. }));
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        (r#"{ "type": "CashTrickler", "period": 0 }"#, "period"),
        (r#"{ "type": "SelfHealing", "heal_if_below": 1.5 }"#, "heal_if_below"),
        (r#"{ "type": "DamageMultiplier", "modifier": -1.0 }"#, "modifier"),
        (r#"{ "type": "Reloads", "period": 0, "max_ammo": 1 }"#, "period"),
        (r#"{ "type": "SpawnActorOnDeath", "actor": "x", "probability": 2.0 }"#, "probability"),
        (
            r#"{ "type": "GainsExperience", "thresholds": [10, 5], "damage_modifiers": [1.0, 1.0] }"#,
            "thresholds",
        ),
    ];
    for (module, expected) in cases {
        let err = rules_error(&format!(r#"{{ "name": "x", "hp": 10, "modules": [{module}] }}"#));
        match err {
            RulesError::InvalidValue { field, .. } => assert_eq!(field, expected, "{module}"),
            other => panic!("{module}: unexpected {other:?}"),
        }
    }
}

#[test]
fn duplicate_and_lifeless_types_are_rejected() {
    let err = rules_error(r#"{ "name": "a", "hp": 1 }, { "name": "a", "hp": 2 }"#);
    assert_eq!(err, RulesError::Duplicate { name: "a".into() });

    let err = rules_error(r#"{ "name": "ghost", "hp": 0 }"#);
    assert!(matches!(err, RulesError::InvalidValue { field: "hp", .. }));
}

#[test]
fn unknown_module_type_fails_to_parse() {
    let result = compose(r#"{ "name": "x", "hp": 1, "modules": [{ "type": "Teleports" }] }"#);
    assert!(matches!(result, Err(SimError::Serialization(_))));
}

#[test]
fn spawning_an_unknown_type_fails() {
    let mut engine = SimEngine::new(
        "rules-test".into(),
        1,
        Arc::new(Ruleset::default_test()),
        vec![Player::neutral(PlayerId(0))],
    );
    let err = engine.spawn("mammoth", ActorInit::new(PlayerId(0), CPos::new(0, 0))).unwrap_err();
    assert!(matches!(
        err,
        SimError::Rules(RulesError::UnknownActorType { ref name }) if name == "mammoth"
    ));
    assert_eq!(engine.world().actors().count(), 0);
}
