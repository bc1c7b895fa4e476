//! Weapon modifiers - the combined effect of permanent and timed upgrades.
//!
//! [`WeaponModifiers`] is a plain value. It is recomputed from scratch whenever
//! the active upgrade set changes and read by the weapon system on every shot.

use serde::{Deserialize, Serialize};

use crate::config::WeaponTuning;
use crate::types::UpgradeKind;

/// Steer toward the nearest target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomingParams {
    /// Search radius for targets
    pub range: f32,
    /// Fraction of the turn completed per second (clamped to 1 per tick)
    pub turn_rate: f32,
}

/// Pass through targets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PiercingParams {
    /// Targets hit before the projectile is spent
    pub max_pierce: u32,
}

/// Area damage around each hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplosionParams {
    pub radius: f32,
    /// Splash damage as a fraction of the projectile's damage
    pub damage_fraction: f32,
}

/// Arc from the struck target to nearby ones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainLightningParams {
    pub jumps: u32,
    pub range: f32,
    pub damage_fraction: f32,
}

/// Bounce off a struck target toward the next one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RicochetParams {
    pub bounces: u32,
    pub search_range: f32,
}

/// One effect granted by an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Multiplies the fire rate (divides the interval)
    FireRate(f32),
    Damage(f32),
    ProjectileSpeed(f32),
    ProjectileSize(f32),
    SpreadShot,
    Homing(HomingParams),
    Piercing(PiercingParams),
    Explosion(ExplosionParams),
    ChainLightning(ChainLightningParams),
    Ricochet(RicochetParams),
    /// Extra smart-bomb charges
    SmartBombs(u32),
}

/// A named upgrade that lasts for the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermanentUpgrade {
    pub name: String,
    pub effects: Vec<UpgradeEffect>,
}

impl PermanentUpgrade {
    pub fn new(name: impl Into<String>, effects: impl IntoIterator<Item = UpgradeEffect>) -> Self {
        Self {
            name: name.into(),
            effects: effects.into_iter().collect(),
        }
    }
}

/// Combined multipliers and behavior toggles.
///
/// Combination rules, used both when folding effects and in [`WeaponModifiers::combine`]:
/// multipliers multiply, counts add, ranges and fractions take the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponModifiers {
    pub fire_rate_multiplier: f32,
    pub damage_multiplier: f32,
    pub projectile_speed_multiplier: f32,
    pub projectile_size_multiplier: f32,
    /// Force the pattern to at least Triple
    pub spread_shot: bool,
    pub homing: Option<HomingParams>,
    pub piercing: Option<PiercingParams>,
    pub explosion: Option<ExplosionParams>,
    pub chain_lightning: Option<ChainLightningParams>,
    pub ricochet: Option<RicochetParams>,
    pub bonus_smart_bombs: u32,
}

impl Default for WeaponModifiers {
    fn default() -> Self {
        Self {
            fire_rate_multiplier: 1.0,
            damage_multiplier: 1.0,
            projectile_speed_multiplier: 1.0,
            projectile_size_multiplier: 1.0,
            spread_shot: false,
            homing: None,
            piercing: None,
            explosion: None,
            chain_lightning: None,
            ricochet: None,
            bonus_smart_bombs: 0,
        }
    }
}

impl WeaponModifiers {
    /// Fold a set of effects into one modifier value.
    pub fn from_effects<'a>(effects: impl IntoIterator<Item = &'a UpgradeEffect>) -> Self {
        let mut modifiers = Self::default();
        for effect in effects {
            modifiers.apply(effect);
        }
        modifiers
    }

    /// Modifiers granted by the timed upgrades currently active.
    ///
    /// RapidFire is deliberately absent: the weapon applies it as its own
    /// interval multiplier.
    pub fn from_timed_upgrades(
        active: impl IntoIterator<Item = UpgradeKind>,
        tuning: &WeaponTuning,
    ) -> Self {
        let mut modifiers = Self::default();
        for kind in active {
            match kind {
                UpgradeKind::SpreadShot => modifiers.apply(&UpgradeEffect::SpreadShot),
                UpgradeKind::Piercing => modifiers.apply(&UpgradeEffect::Piercing(PiercingParams {
                    max_pierce: tuning.projectile.max_pierce,
                })),
                UpgradeKind::Homing => modifiers.apply(&UpgradeEffect::Homing(HomingParams {
                    range: tuning.projectile.homing_range,
                    turn_rate: tuning.projectile.homing_turn_rate,
                })),
                UpgradeKind::RapidFire => {}
            }
        }
        modifiers
    }

    /// Combine permanent and temporary modifiers.
    pub fn combine(permanent: &Self, temporary: &Self) -> Self {
        Self {
            fire_rate_multiplier: permanent.fire_rate_multiplier * temporary.fire_rate_multiplier,
            damage_multiplier: permanent.damage_multiplier * temporary.damage_multiplier,
            projectile_speed_multiplier: permanent.projectile_speed_multiplier
                * temporary.projectile_speed_multiplier,
            projectile_size_multiplier: permanent.projectile_size_multiplier
                * temporary.projectile_size_multiplier,
            spread_shot: permanent.spread_shot || temporary.spread_shot,
            homing: merge(permanent.homing, temporary.homing, merge_homing),
            piercing: merge(permanent.piercing, temporary.piercing, merge_piercing),
            explosion: merge(permanent.explosion, temporary.explosion, merge_explosion),
            chain_lightning: merge(permanent.chain_lightning, temporary.chain_lightning, merge_chain),
            ricochet: merge(permanent.ricochet, temporary.ricochet, merge_ricochet),
            bonus_smart_bombs: permanent.bonus_smart_bombs + temporary.bonus_smart_bombs,
        }
    }

    fn apply(&mut self, effect: &UpgradeEffect) {
        match *effect {
            UpgradeEffect::FireRate(m) => self.fire_rate_multiplier *= m,
            UpgradeEffect::Damage(m) => self.damage_multiplier *= m,
            UpgradeEffect::ProjectileSpeed(m) => self.projectile_speed_multiplier *= m,
            UpgradeEffect::ProjectileSize(m) => self.projectile_size_multiplier *= m,
            UpgradeEffect::SpreadShot => self.spread_shot = true,
            UpgradeEffect::Homing(p) => self.homing = merge(self.homing, Some(p), merge_homing),
            UpgradeEffect::Piercing(p) => self.piercing = merge(self.piercing, Some(p), merge_piercing),
            UpgradeEffect::Explosion(p) => {
                self.explosion = merge(self.explosion, Some(p), merge_explosion)
            }
            UpgradeEffect::ChainLightning(p) => {
                self.chain_lightning = merge(self.chain_lightning, Some(p), merge_chain)
            }
            UpgradeEffect::Ricochet(p) => self.ricochet = merge(self.ricochet, Some(p), merge_ricochet),
            UpgradeEffect::SmartBombs(n) => self.bonus_smart_bombs += n,
        }
    }

    /// Whether shots need the behavior-composed projectile.
    pub fn needs_enhanced_projectile(&self) -> bool {
        self.explosion.is_some() || self.chain_lightning.is_some() || self.ricochet.is_some()
    }
}

fn merge<T: Copy>(a: Option<T>, b: Option<T>, both: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(both(a, b)),
        (a, b) => a.or(b),
    }
}

fn merge_homing(a: HomingParams, b: HomingParams) -> HomingParams {
    HomingParams {
        range: a.range.max(b.range),
        turn_rate: a.turn_rate.max(b.turn_rate),
    }
}

fn merge_piercing(a: PiercingParams, b: PiercingParams) -> PiercingParams {
    PiercingParams {
        max_pierce: a.max_pierce + b.max_pierce,
    }
}

fn merge_explosion(a: ExplosionParams, b: ExplosionParams) -> ExplosionParams {
    ExplosionParams {
        radius: a.radius.max(b.radius),
        damage_fraction: a.damage_fraction.max(b.damage_fraction),
    }
}

fn merge_chain(a: ChainLightningParams, b: ChainLightningParams) -> ChainLightningParams {
    ChainLightningParams {
        jumps: a.jumps + b.jumps,
        range: a.range.max(b.range),
        damage_fraction: a.damage_fraction.max(b.damage_fraction),
    }
}

fn merge_ricochet(a: RicochetParams, b: RicochetParams) -> RicochetParams {
    RicochetParams {
        bounces: a.bounces + b.bounces,
        search_range: a.search_range.max(b.search_range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let m = WeaponModifiers::default();
        assert_eq!(m.damage_multiplier, 1.0);
        assert!(!m.needs_enhanced_projectile());
        assert_eq!(WeaponModifiers::combine(&m, &m), m);
    }

    #[test]
    fn test_combine_multiplies_and_adds() {
        let permanent = WeaponModifiers::from_effects(&[
            UpgradeEffect::Damage(1.5),
            UpgradeEffect::Piercing(PiercingParams { max_pierce: 2 }),
            UpgradeEffect::SmartBombs(1),
        ]);
        let temporary = WeaponModifiers::from_effects(&[
            UpgradeEffect::Damage(2.0),
            UpgradeEffect::Piercing(PiercingParams { max_pierce: 3 }),
            UpgradeEffect::SmartBombs(2),
        ]);

        let combined = WeaponModifiers::combine(&permanent, &temporary);
        assert_eq!(combined.damage_multiplier, 3.0);
        assert_eq!(combined.piercing, Some(PiercingParams { max_pierce: 5 }));
        assert_eq!(combined.bonus_smart_bombs, 3);
    }

    #[test]
    fn test_ranges_take_maximum() {
        let a = WeaponModifiers::from_effects(&[UpgradeEffect::Explosion(ExplosionParams {
            radius: 2.0,
            damage_fraction: 0.5,
        })]);
        let b = WeaponModifiers::from_effects(&[UpgradeEffect::Explosion(ExplosionParams {
            radius: 3.0,
            damage_fraction: 0.25,
        })]);
        let combined = WeaponModifiers::combine(&a, &b);
        let explosion = combined.explosion.unwrap();
        assert_eq!(explosion.radius, 3.0);
        assert_eq!(explosion.damage_fraction, 0.5);
        assert!(combined.needs_enhanced_projectile());
    }

    #[test]
    fn test_timed_upgrades_map_to_toggles() {
        let tuning = WeaponTuning::default();
        let m = WeaponModifiers::from_timed_upgrades(
            [UpgradeKind::SpreadShot, UpgradeKind::Homing, UpgradeKind::RapidFire],
            &tuning,
        );
        assert!(m.spread_shot);
        assert_eq!(m.homing.unwrap().range, tuning.projectile.homing_range);
        assert!(m.piercing.is_none());
        assert_eq!(m.fire_rate_multiplier, 1.0);
    }
}
