//! Ruleset: the immutable actor-type templates every actor is built from.
//!
//! RULE: Everything here is validated once, when the ruleset is composed.
//! The actor factory trusts a composed ruleset and never re-checks it.

use crate::{
    behaviors::{
        AnnounceOnDeathInfo, CanPowerDownInfo, CashTricklerInfo, CloakInfo, DamageMultiplierInfo,
        DockClientInfo, GainsExperienceInfo, GivesBountyInfo, InfiltrateForCashInfo, InvulnerableInfo,
        ModuleInfo, ReloadsInfo, RequiresPowerInfo, ReservableInfo, ScalePowerWithHealthInfo,
        SelfHealingInfo, SpawnActorOnDeathInfo, WithDisabledOverlayInfo, WithMakeAnimationInfo,
    },
    error::{RulesError, SimResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorType {
    pub name: String,
    pub hp:   i32,
    /// Build cost. Bounties and experience are derived from it.
    #[serde(default)]
    pub cost: i64,
    /// Positive provides power, negative drains it.
    #[serde(default)]
    pub power: i32,
    #[serde(default = "default_target_types")]
    pub target_types: Vec<String>,
    /// In registry order.
    #[serde(default)]
    pub modules: Vec<ModuleInfo>,
}

fn default_target_types() -> Vec<String> {
    vec!["Ground".to_string()]
}

impl ActorType {
    pub fn has_module(&self, kind: &str) -> bool {
        self.modules.iter().any(|m| m.kind_name() == kind)
    }

    /// Composition-time checks for one type against the rest of the
    /// ruleset: value ranges, prerequisites, cross-type references.
    fn validate(&self, actors: &BTreeMap<String, Arc<ActorType>>) -> Result<(), RulesError> {
        if self.hp <= 0 {
            return Err(RulesError::InvalidValue {
                actor:  self.name.clone(),
                module: "ActorType",
                field:  "hp",
                reason: "must be positive".to_string(),
            });
        }

        for module in &self.modules {
            module.validate(&self.name)?;

            let requires = module.requires_any();
            if !requires.is_empty() && !requires.iter().any(|r| self.has_module(r)) {
                return Err(RulesError::MissingPrerequisite {
                    actor:    self.name.clone(),
                    module:   module.kind_name(),
                    requires: requires.join(", "),
                });
            }

            let Some(reference) = module.referenced_actor() else {
                continue;
            };
            let Some(target) = actors.get(reference) else {
                return Err(RulesError::UnknownReference {
                    actor:  self.name.clone(),
                    module: module.kind_name(),
                    name:   reference.to_string(),
                });
            };
            if matches!(module, ModuleInfo::DockClient(_)) && !target.has_module("Reservable") {
                return Err(RulesError::InvalidValue {
                    actor:  self.name.clone(),
                    module: module.kind_name(),
                    field:  "dock_type",
                    reason: format!("'{reference}' is not reservable"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RulesetFile {
    actors: Vec<ActorType>,
}

#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    actors: BTreeMap<String, Arc<ActorType>>,
}

impl Ruleset {
    /// Load and compose a ruleset file.
    /// In tests, use Ruleset::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let ruleset = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Invalid ruleset {path}: {e}"))?;
        log::info!("Loaded {} actor types from {path}", ruleset.len());
        Ok(ruleset)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let file: RulesetFile = serde_json::from_str(json)?;
        Ok(Self::from_types(file.actors)?)
    }

    /// Compose a ruleset from actor types. Fails on the first type that
    /// does not validate; no partially composed ruleset is returned.
    pub fn from_types(types: Vec<ActorType>) -> Result<Self, RulesError> {
        let mut actors = BTreeMap::new();
        for t in types {
            if actors.contains_key(&t.name) {
                return Err(RulesError::Duplicate { name: t.name });
            }
            actors.insert(t.name.clone(), Arc::new(t));
        }
        for t in actors.values() {
            t.validate(&actors)?;
        }
        Ok(Self { actors })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ActorType>> {
        self.actors.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.actors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Ruleset with hardcoded types, used by tests and as the runner's
    /// fallback when no rules file is given.
    pub fn default_test() -> Self {
        let structure = || vec!["Ground".to_string(), "Structure".to_string()];
        let make = || ModuleInfo::WithMakeAnimation(Arc::new(WithMakeAnimationInfo {
            length:   15,
            sequence: "make".into(),
        }));
        let bounty = || ModuleInfo::GivesBounty(Arc::new(GivesBountyInfo { percentage: 10 }));

        let types = vec![
            ActorType {
                name: "powerplant".into(),
                hp: 400,
                cost: 300,
                power: 100,
                target_types: structure(),
                modules: vec![
                    make(),
                    ModuleInfo::ScalePowerWithHealth(Arc::new(ScalePowerWithHealthInfo {})),
                    ModuleInfo::CanPowerDown(Arc::new(CanPowerDownInfo {
                        power_down_cue: Some("PowerDown".into()),
                        power_up_cue:   Some("PowerUp".into()),
                    })),
                    ModuleInfo::WithDisabledOverlay(Arc::new(WithDisabledOverlayInfo {
                        sequence: "disabled".into(),
                        palette:  "disabled".into(),
                    })),
                    ModuleInfo::AnnounceOnDeath(Arc::new(AnnounceOnDeathInfo {
                        notification: "BuildingLost".into(),
                    })),
                    bounty(),
                ],
            },
            ActorType {
                name: "refinery".into(),
                hp: 900,
                cost: 1400,
                power: -30,
                target_types: structure(),
                modules: vec![
                    make(),
                    ModuleInfo::CashTrickler(Arc::new(CashTricklerInfo {
                        period: 50,
                        amount: 15,
                        initial_delay: None,
                    })),
                    ModuleInfo::Reservable(Arc::new(ReservableInfo {})),
                    ModuleInfo::RequiresPower(Arc::new(RequiresPowerInfo {})),
                    ModuleInfo::InfiltrateForCash(Arc::new(InfiltrateForCashInfo {
                        percentage:   50,
                        minimum:      500,
                        notification: Some("CreditsStolen".into()),
                    })),
                    ModuleInfo::SpawnActorOnDeath(Arc::new(SpawnActorOnDeathInfo {
                        actor:         "crate".into(),
                        probability:   1.0,
                        neutral_owner: true,
                    })),
                    bounty(),
                ],
            },
            ActorType {
                name: "bunker".into(),
                hp: 1000,
                cost: 600,
                power: -20,
                target_types: structure(),
                modules: vec![
                    ModuleInfo::DamageMultiplier(Arc::new(DamageMultiplierInfo { modifier: 0.5 })),
                    ModuleInfo::RequiresPower(Arc::new(RequiresPowerInfo {})),
                    ModuleInfo::WithDisabledOverlay(Arc::new(WithDisabledOverlayInfo {
                        sequence: "disabled".into(),
                        palette:  "disabled".into(),
                    })),
                ],
            },
            ActorType {
                name: "harvester".into(),
                hp: 600,
                cost: 1100,
                power: 0,
                target_types: default_target_types(),
                modules: vec![
                    ModuleInfo::DockClient(Arc::new(DockClientInfo {
                        dock_type:     "refinery".into(),
                        service_ticks: 10,
                    })),
                    bounty(),
                ],
            },
            ActorType {
                name: "tank".into(),
                hp: 400,
                cost: 800,
                power: 0,
                target_types: default_target_types(),
                modules: vec![
                    ModuleInfo::Reloads(Arc::new(ReloadsInfo {
                        count:         1,
                        period:        15,
                        max_ammo:      5,
                        reset_on_fire: false,
                    })),
                    ModuleInfo::GainsExperience(Arc::new(GainsExperienceInfo {
                        thresholds:       vec![800, 1600, 3200],
                        damage_modifiers: vec![0.9, 0.8, 0.7],
                    })),
                    ModuleInfo::SpawnActorOnDeath(Arc::new(SpawnActorOnDeathInfo {
                        actor:         "husk".into(),
                        probability:   1.0,
                        neutral_owner: false,
                    })),
                    ModuleInfo::AnnounceOnDeath(Arc::new(AnnounceOnDeathInfo {
                        notification: "UnitLost".into(),
                    })),
                    bounty(),
                ],
            },
            ActorType {
                name: "stealth".into(),
                hp: 300,
                cost: 1000,
                power: 0,
                target_types: default_target_types(),
                modules: vec![
                    ModuleInfo::Cloak(Arc::new(CloakInfo {
                        initial_delay:     10,
                        cloak_delay:       10,
                        uncloak_on_damage: true,
                        cloaked_alpha:     0.5,
                        cloak_cue:         None,
                        uncloak_cue:       None,
                    })),
                    ModuleInfo::Reloads(Arc::new(ReloadsInfo {
                        count:         1,
                        period:        20,
                        max_ammo:      2,
                        reset_on_fire: true,
                    })),
                    bounty(),
                ],
            },
            ActorType {
                name: "medic".into(),
                hp: 100,
                cost: 200,
                power: 0,
                target_types: default_target_types(),
                modules: vec![ModuleInfo::SelfHealing(Arc::new(SelfHealingInfo {
                    step:            5,
                    amount:          5,
                    heal_if_below:   0.5,
                    damage_cooldown: 0,
                }))],
            },
            ActorType {
                name: "spy".into(),
                hp: 25,
                cost: 500,
                power: 0,
                target_types: default_target_types(),
                modules: vec![bounty()],
            },
            ActorType {
                name: "husk".into(),
                hp: 100,
                cost: 0,
                power: 0,
                target_types: vec!["Ground".into(), "Husk".into()],
                modules: Vec::new(),
            },
            ActorType {
                name: "crate".into(),
                hp: 1,
                cost: 0,
                power: 0,
                target_types: Vec::new(),
                modules: vec![ModuleInfo::Invulnerable(Arc::new(InvulnerableInfo {}))],
            },
        ];

        Self {
            actors: types.into_iter().map(|t| (t.name.clone(), Arc::new(t))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_pass_validation() {
        let builtin = Ruleset::default_test();
        for t in builtin.actors.values() {
            assert_eq!(t.validate(&builtin.actors), Ok(()), "type {}", t.name);
        }
    }
}
