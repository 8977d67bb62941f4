//! Hit points and damage states.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageState {
    Undamaged,
    Light,
    Medium,
    Heavy,
    Critical,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    hp:     i32,
    max_hp: i32,
}

impl Health {
    /// `percent` follows the actor-init convention: anything below 1 is
    /// treated as 1 so a freshly spawned actor is never born dead.
    pub fn new(max_hp: i32, percent: Option<i32>) -> Self {
        let max_hp = max_hp.max(1);
        let hp = match percent {
            Some(p) => {
                let p = p.max(1) as i64;
                ((p * max_hp as i64) / 100).clamp(1, max_hp as i64) as i32
            }
            None => max_hp,
        };
        Self { hp, max_hp }
    }

    pub fn hp(&self) -> i32 { self.hp }
    pub fn max_hp(&self) -> i32 { self.max_hp }
    pub fn is_dead(&self) -> bool { self.hp <= 0 }

    /// hp / max_hp in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        self.hp as f64 / self.max_hp as f64
    }

    pub fn damage_state(&self) -> DamageState {
        let hp = self.hp as i64;
        let max = self.max_hp as i64;
        if hp == max {
            DamageState::Undamaged
        } else if hp <= 0 {
            DamageState::Dead
        } else if hp * 100 < max * 25 {
            DamageState::Critical
        } else if hp * 100 < max * 50 {
            DamageState::Heavy
        } else if hp * 100 < max * 75 {
            DamageState::Medium
        } else {
            DamageState::Light
        }
    }

    /// Apply a signed change (positive damages, negative heals), clamped to
    /// [0, max_hp]. Returns the change actually applied to hp.
    pub(crate) fn apply(&mut self, damage: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp as i64 - damage as i64).clamp(0, self.max_hp as i64) as i32;
        before - self.hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_percent_scales_and_floors_at_one() {
        assert_eq!(Health::new(200, Some(40)).hp(), 80);
        assert_eq!(Health::new(200, Some(0)).hp(), 2);
        assert_eq!(Health::new(200, Some(-5)).hp(), 2);
        assert_eq!(Health::new(200, None).hp(), 200);
    }

    #[test]
    fn damage_state_thresholds() {
        let mut h = Health::new(100, None);
        assert_eq!(h.damage_state(), DamageState::Undamaged);
        h.apply(20);
        assert_eq!(h.damage_state(), DamageState::Light);
        h.apply(10);
        assert_eq!(h.damage_state(), DamageState::Medium);
        h.apply(30);
        assert_eq!(h.damage_state(), DamageState::Heavy);
        h.apply(20);
        assert_eq!(h.damage_state(), DamageState::Critical);
        h.apply(500);
        assert_eq!(h.damage_state(), DamageState::Dead);
        assert_eq!(h.hp(), 0);
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut h = Health::new(100, Some(95));
        assert_eq!(h.apply(-20), -5);
        assert_eq!(h.hp(), 100);
    }
}
