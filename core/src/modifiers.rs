//! Modifier aggregator: folds every module exposing one modifier
//! capability into a single effective value.
//!
//! Combination rules per kind:
//!   - multiplicative (damage, power): product from 1.0; 0.0 absorbs
//!   - override (radar color, target types): first Some in registry order
//!     wins, else a default derived from the actor/owner
//!   - pipeline (render): each stage transforms the previous output
//!
//! No contributing module is never an error: each rule has an identity.

use crate::{
    capability::Capability,
    module::{ActorView, ModuleSet},
    render::{RenderContext, Renderable},
    types::{ActorId, Color, PlayerId},
    world::World,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierKind {
    Damage,
    Power,
}

/// Product of `values`, starting from 1.0. Any exact zero short-circuits
/// to 0.0 so no other factor (even inf/NaN) can revive it.
pub fn fold_multiplicative(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut product = 1.0;
    for v in values {
        if v == 0.0 {
            return 0.0;
        }
        product *= v;
    }
    product
}

pub fn damage_multiplier(modules: &ModuleSet, view: &ActorView<'_>, attacker: Option<ActorId>) -> f64 {
    fold_multiplicative(
        modules
            .with_capability(Capability::DamageModifier)
            .map(|m| m.damage_modifier(view, attacker)),
    )
}

pub fn power_multiplier(modules: &ModuleSet, view: &ActorView<'_>) -> f64 {
    fold_multiplicative(
        modules
            .with_capability(Capability::PowerModifier)
            .map(|m| m.power_modifier(view)),
    )
}

pub fn radar_color(modules: &ModuleSet, view: &ActorView<'_>) -> Color {
    modules
        .with_capability(Capability::RadarColor)
        .find_map(|m| m.radar_color(view))
        .unwrap_or(view.owner.color)
}

pub fn target_types(modules: &ModuleSet, view: &ActorView<'_>, viewer: PlayerId) -> Vec<String> {
    modules
        .with_capability(Capability::TargetTypes)
        .find_map(|m| m.target_types(view, viewer))
        .unwrap_or_else(|| view.state.info().target_types.clone())
}

pub fn is_disabled(modules: &ModuleSet, view: &ActorView<'_>) -> bool {
    modules
        .with_capability(Capability::Disableable)
        .any(|m| m.is_disabled(view))
}

pub fn render(modules: &ModuleSet, ctx: &RenderContext<'_>) -> Vec<Renderable> {
    modules
        .with_capability(Capability::RenderModifier)
        .fold(vec![Renderable::body(&ctx.view)], |r, m| m.modify_render(ctx, r))
}

impl World {
    fn with_view<R>(&self, id: ActorId, f: impl FnOnce(&ModuleSet, &ActorView<'_>) -> R) -> Option<R> {
        let entry = self.actors.get(&id)?;
        let modules = entry.modules.as_ref()?;
        let owner = self.players.get(entry.state.owner().0 as usize)?;
        let view = ActorView { state: &entry.state, owner, tick: self.clock.current_tick };
        Some(f(modules, &view))
    }

    /// Effective multiplier of `kind` for `id`. 1.0 for unknown actors.
    pub fn multiplier(&self, id: ActorId, kind: MultiplierKind) -> f64 {
        match kind {
            MultiplierKind::Damage => self.damage_multiplier(id, None),
            MultiplierKind::Power  => self.power_multiplier(id),
        }
    }

    pub fn damage_multiplier(&self, id: ActorId, attacker: Option<ActorId>) -> f64 {
        self.with_view(id, |m, v| damage_multiplier(m, v, attacker))
            .unwrap_or(1.0)
    }

    pub fn power_multiplier(&self, id: ActorId) -> f64 {
        self.with_view(id, power_multiplier).unwrap_or(1.0)
    }

    pub fn radar_color(&self, id: ActorId) -> Option<Color> {
        self.with_view(id, radar_color)
    }

    pub fn target_types(&self, id: ActorId, viewer: PlayerId) -> Vec<String> {
        self.with_view(id, |m, v| target_types(m, v, viewer))
            .unwrap_or_default()
    }

    pub fn is_disabled(&self, id: ActorId) -> bool {
        self.with_view(id, is_disabled).unwrap_or(false)
    }

    /// Renderables for `id` as seen by `viewer`. Safe to call between
    /// steps at any cadence; it never mutates the world.
    pub fn render(&self, id: ActorId, viewer: Option<PlayerId>) -> Vec<Renderable> {
        self.with_view(id, |m, v| {
            let ctx = RenderContext {
                view: *v,
                viewer,
                disabled: is_disabled(m, v),
            };
            render(m, &ctx)
        })
        .unwrap_or_default()
    }
}
