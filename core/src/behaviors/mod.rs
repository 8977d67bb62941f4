//! Concrete behavior modules.
//!
//! Each module has an immutable `*Info` (deserialized from the ruleset,
//! shared through `Arc` by every actor of the type) and a runtime struct
//! holding that Info plus the module's private state.
//!
//! Adding a module:
//!   1. Write `behaviors/<name>.rs` with the Info and the Module impl.
//!   2. Add a variant to ModuleInfo and arms to `create`, `kind_name`
//!      and (if it has prerequisites or ranges) `validate`.

pub mod announce_on_death;
pub mod cash_trickler;
pub mod cloak;
pub mod damage_multiplier;
pub mod dock_client;
pub mod gains_experience;
pub mod gives_bounty;
pub mod infiltrate_for_cash;
pub mod invulnerable;
pub mod power;
pub mod reloads;
pub mod reservable;
pub mod self_healing;
pub mod spawn_actor_on_death;
pub mod with_disabled_overlay;
pub mod with_make_animation;

use crate::{actor::ActorInit, error::RulesError, module::Module};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use announce_on_death::{AnnounceOnDeath, AnnounceOnDeathInfo};
pub use cash_trickler::{CashTrickler, CashTricklerInfo};
pub use cloak::{Cloak, CloakInfo};
pub use damage_multiplier::{DamageMultiplier, DamageMultiplierInfo};
pub use dock_client::{DockClient, DockClientInfo};
pub use gains_experience::{GainsExperience, GainsExperienceInfo};
pub use gives_bounty::{GivesBounty, GivesBountyInfo};
pub use infiltrate_for_cash::{InfiltrateForCash, InfiltrateForCashInfo};
pub use invulnerable::{Invulnerable, InvulnerableInfo};
pub use power::{
    CanPowerDown, CanPowerDownInfo, RequiresPower, RequiresPowerInfo, ScalePowerWithHealth,
    ScalePowerWithHealthInfo,
};
pub use reloads::{Reloads, ReloadsInfo};
pub use reservable::{Reservable, ReservableInfo};
pub use self_healing::{SelfHealing, SelfHealingInfo};
pub use spawn_actor_on_death::{SpawnActorOnDeath, SpawnActorOnDeathInfo};
pub use with_disabled_overlay::{WithDisabledOverlay, WithDisabledOverlayInfo};
pub use with_make_animation::{WithMakeAnimation, WithMakeAnimationInfo};

/// One configured module of an actor type, tagged by `"type"` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleInfo {
    CashTrickler(Arc<CashTricklerInfo>),
    SelfHealing(Arc<SelfHealingInfo>),
    Invulnerable(Arc<InvulnerableInfo>),
    DamageMultiplier(Arc<DamageMultiplierInfo>),
    GainsExperience(Arc<GainsExperienceInfo>),
    CanPowerDown(Arc<CanPowerDownInfo>),
    RequiresPower(Arc<RequiresPowerInfo>),
    ScalePowerWithHealth(Arc<ScalePowerWithHealthInfo>),
    Cloak(Arc<CloakInfo>),
    Reloads(Arc<ReloadsInfo>),
    GivesBounty(Arc<GivesBountyInfo>),
    SpawnActorOnDeath(Arc<SpawnActorOnDeathInfo>),
    AnnounceOnDeath(Arc<AnnounceOnDeathInfo>),
    InfiltrateForCash(Arc<InfiltrateForCashInfo>),
    Reservable(Arc<ReservableInfo>),
    DockClient(Arc<DockClientInfo>),
    WithMakeAnimation(Arc<WithMakeAnimationInfo>),
    WithDisabledOverlay(Arc<WithDisabledOverlayInfo>),
}

impl ModuleInfo {
    /// Build the runtime module for one actor. The Info is shared, not
    /// copied.
    pub fn create(&self, init: &ActorInit) -> Box<dyn Module> {
        match self {
            ModuleInfo::CashTrickler(i)         => Box::new(CashTrickler::new(Arc::clone(i))),
            ModuleInfo::SelfHealing(i)          => Box::new(SelfHealing::new(Arc::clone(i))),
            ModuleInfo::Invulnerable(i)         => Box::new(Invulnerable::new(Arc::clone(i))),
            ModuleInfo::DamageMultiplier(i)     => Box::new(DamageMultiplier::new(Arc::clone(i))),
            ModuleInfo::GainsExperience(i)      => Box::new(GainsExperience::new(Arc::clone(i))),
            ModuleInfo::CanPowerDown(i)         => Box::new(CanPowerDown::new(Arc::clone(i))),
            ModuleInfo::RequiresPower(i)        => Box::new(RequiresPower::new(Arc::clone(i))),
            ModuleInfo::ScalePowerWithHealth(i) => Box::new(ScalePowerWithHealth::new(Arc::clone(i))),
            ModuleInfo::Cloak(i)                => Box::new(Cloak::new(Arc::clone(i))),
            ModuleInfo::Reloads(i)              => Box::new(Reloads::new(Arc::clone(i))),
            ModuleInfo::GivesBounty(i)          => Box::new(GivesBounty::new(Arc::clone(i))),
            ModuleInfo::SpawnActorOnDeath(i)    => Box::new(SpawnActorOnDeath::new(Arc::clone(i))),
            ModuleInfo::AnnounceOnDeath(i)      => Box::new(AnnounceOnDeath::new(Arc::clone(i))),
            ModuleInfo::InfiltrateForCash(i)    => Box::new(InfiltrateForCash::new(Arc::clone(i))),
            ModuleInfo::Reservable(i)           => Box::new(Reservable::new(Arc::clone(i))),
            ModuleInfo::DockClient(i)           => Box::new(DockClient::new(Arc::clone(i))),
            ModuleInfo::WithMakeAnimation(i)    => Box::new(WithMakeAnimation::new(Arc::clone(i), init)),
            ModuleInfo::WithDisabledOverlay(i)  => Box::new(WithDisabledOverlay::new(Arc::clone(i))),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ModuleInfo::CashTrickler(_)         => "CashTrickler",
            ModuleInfo::SelfHealing(_)          => "SelfHealing",
            ModuleInfo::Invulnerable(_)         => "Invulnerable",
            ModuleInfo::DamageMultiplier(_)     => "DamageMultiplier",
            ModuleInfo::GainsExperience(_)      => "GainsExperience",
            ModuleInfo::CanPowerDown(_)         => "CanPowerDown",
            ModuleInfo::RequiresPower(_)        => "RequiresPower",
            ModuleInfo::ScalePowerWithHealth(_) => "ScalePowerWithHealth",
            ModuleInfo::Cloak(_)                => "Cloak",
            ModuleInfo::Reloads(_)              => "Reloads",
            ModuleInfo::GivesBounty(_)          => "GivesBounty",
            ModuleInfo::SpawnActorOnDeath(_)    => "SpawnActorOnDeath",
            ModuleInfo::AnnounceOnDeath(_)      => "AnnounceOnDeath",
            ModuleInfo::InfiltrateForCash(_)    => "InfiltrateForCash",
            ModuleInfo::Reservable(_)           => "Reservable",
            ModuleInfo::DockClient(_)           => "DockClient",
            ModuleInfo::WithMakeAnimation(_)    => "WithMakeAnimation",
            ModuleInfo::WithDisabledOverlay(_)  => "WithDisabledOverlay",
        }
    }

    /// Module kinds this one needs at least one of on the same actor type.
    pub fn requires_any(&self) -> &'static [&'static str] {
        match self {
            ModuleInfo::WithDisabledOverlay(_) => &["CanPowerDown", "RequiresPower"],
            _ => &[],
        }
    }

    /// Value checks local to this module's Info. Cross-type references
    /// and prerequisites are checked by the ruleset.
    pub fn validate(&self, actor: &str) -> Result<(), RulesError> {
        let module = self.kind_name();
        let invalid = |field: &'static str, reason: &str| RulesError::InvalidValue {
            actor: actor.to_string(),
            module,
            field,
            reason: reason.to_string(),
        };
        match self {
            ModuleInfo::CashTrickler(i) => {
                if i.period == 0 {
                    return Err(invalid("period", "must be positive"));
                }
            }
            ModuleInfo::SelfHealing(i) => {
                if i.step == 0 {
                    return Err(invalid("step", "must be positive"));
                }
                if !(0.0..=1.0).contains(&i.heal_if_below) {
                    return Err(invalid("heal_if_below", "must be within [0, 1]"));
                }
                if i.amount <= 0 {
                    return Err(invalid("amount", "must be positive"));
                }
            }
            ModuleInfo::DamageMultiplier(i) => {
                if !i.modifier.is_finite() || i.modifier < 0.0 {
                    return Err(invalid("modifier", "must be finite and non-negative"));
                }
            }
            ModuleInfo::GainsExperience(i) => {
                if i.thresholds.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(invalid("thresholds", "must be strictly ascending"));
                }
                if i.damage_modifiers.len() != i.thresholds.len() {
                    return Err(invalid("damage_modifiers", "must have one entry per threshold"));
                }
            }
            ModuleInfo::Cloak(i) => {
                if !(0.0..=1.0).contains(&i.cloaked_alpha) {
                    return Err(invalid("cloaked_alpha", "must be within [0, 1]"));
                }
            }
            ModuleInfo::Reloads(i) => {
                if i.period == 0 {
                    return Err(invalid("period", "must be positive"));
                }
                if i.count == 0 {
                    return Err(invalid("count", "must be positive"));
                }
            }
            ModuleInfo::GivesBounty(i) => {
                if i.percentage < 0 {
                    return Err(invalid("percentage", "must be non-negative"));
                }
            }
            ModuleInfo::SpawnActorOnDeath(i) => {
                if !(0.0..=1.0).contains(&i.probability) {
                    return Err(invalid("probability", "must be within [0, 1]"));
                }
            }
            ModuleInfo::InfiltrateForCash(i) => {
                if !(0..=100).contains(&i.percentage) {
                    return Err(invalid("percentage", "must be within [0, 100]"));
                }
            }
            ModuleInfo::DockClient(i) => {
                if i.service_ticks == 0 {
                    return Err(invalid("service_ticks", "must be positive"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Actor type this module names, if any. Must exist in the ruleset.
    pub fn referenced_actor(&self) -> Option<&str> {
        match self {
            ModuleInfo::SpawnActorOnDeath(i) => Some(&i.actor),
            ModuleInfo::DockClient(i) => Some(&i.dock_type),
            _ => None,
        }
    }
}
