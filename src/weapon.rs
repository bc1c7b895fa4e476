//! Weapon system - the top-level firing controller.
//!
//! Turns held fire input into [`ShotRequest`]s. Owns power level, heat, fire
//! timers for the forward and rear mounts, and the short internal boosts
//! granted by pickups. It never spawns anything itself; the simulation turns
//! requests into pooled projectiles.

use bevy::prelude::*;

use crate::config::WeaponTuning;
use crate::events::{EventBus, WeaponEvent, WeaponMount};
use crate::heat::{HeatState, HeatTransition};
use crate::modifiers::WeaponModifiers;
use crate::patterns::{select_pattern, spread_directions, spread_step};
use crate::projectile::ProjectileParams;
use crate::types::FirePattern;

/// Player input sampled once per tick.
///
/// Input polling is the host's job; it only has to fill this in.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct FireInput {
    /// Primary fire held
    pub fire_held: bool,
    /// Beam trigger held
    pub beam_held: bool,
    /// Smart bomb requested this tick
    pub smart_bomb: bool,
    /// Muzzle position
    pub origin: Vec2,
    /// Aim direction, need not be normalized
    pub aim: Vec2,
}

impl Default for FireInput {
    fn default() -> Self {
        Self {
            fire_held: false,
            beam_held: false,
            smart_bomb: false,
            origin: Vec2::ZERO,
            aim: Vec2::Y,
        }
    }
}

/// One projectile the weapon wants spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotRequest {
    pub mount: WeaponMount,
    /// Spawn position, already pushed out by the spawn offset
    pub position: Vec2,
    /// Normalized flight direction
    pub direction: Vec2,
    pub params: ProjectileParams,
}

fn positive_or_one(multiplier: f32) -> f32 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct WeaponSystem {
    power_level: u32,
    heat: HeatState,
    /// Seconds until the forward mount may fire again
    fire_timer: f32,
    rear_timer: f32,
    rapid_fire_remaining: f32,
    damage_boost_remaining: f32,
    directions: Vec<Vec2>,
}

impl WeaponSystem {
    pub fn power_level(&self) -> u32 {
        self.power_level
    }

    pub fn heat(&self) -> &HeatState {
        &self.heat
    }

    pub fn is_rapid_fire_active(&self) -> bool {
        self.rapid_fire_remaining > 0.0
    }

    pub fn is_damage_boost_active(&self) -> bool {
        self.damage_boost_remaining > 0.0
    }

    /// Set the power level, clamped to the configured maximum.
    pub fn set_power_level(&mut self, level: u32, tuning: &WeaponTuning, events: &mut EventBus) {
        let level = level.min(tuning.firing.max_power_level);
        if level == self.power_level {
            return;
        }
        self.power_level = level;
        info!("weapon power level {level}");
        events.publish(WeaponEvent::PowerLevelChanged { level });
    }

    pub fn raise_power_level(&mut self, tuning: &WeaponTuning, events: &mut EventBus) {
        self.set_power_level(self.power_level.saturating_add(1), tuning, events);
    }

    /// Start or refresh the internal rapid-fire boost.
    pub fn activate_rapid_fire(&mut self, tuning: &WeaponTuning) {
        self.rapid_fire_remaining = self.rapid_fire_remaining.max(tuning.boosts.rapid_fire_duration);
    }

    /// Start or refresh the internal damage boost.
    pub fn activate_damage_boost(&mut self, tuning: &WeaponTuning) {
        self.damage_boost_remaining = self
            .damage_boost_remaining
            .max(tuning.boosts.damage_boost_duration);
    }

    /// Multiplier from the internal damage boost, 1 when inactive.
    pub fn damage_boost_multiplier(&self, tuning: &WeaponTuning) -> f32 {
        if self.is_damage_boost_active() {
            tuning.boosts.damage_boost_multiplier
        } else {
            1.0
        }
    }

    /// Damage of one forward projectile.
    ///
    /// `round(base * (1 + level * per_level) * boost * modifiers.damage_multiplier)`
    pub fn damage(&self, tuning: &WeaponTuning, modifiers: &WeaponModifiers) -> i32 {
        let firing = &tuning.firing;
        let boost = self.damage_boost_multiplier(tuning);
        let raw = firing.base_damage
            * (1.0 + self.power_level as f32 * firing.damage_per_level)
            * boost
            * modifiers.damage_multiplier.max(0.0);
        raw.round() as i32
    }

    /// Seconds between forward volleys.
    ///
    /// The level-adjusted interval is floored first, then divided by every
    /// active rapid-fire source. The internal boost and the timed upgrade
    /// compound.
    ///
    /// # Arguments
    /// * `tuning` - Resolved tuning
    /// * `modifiers` - Combined upgrade modifiers
    /// * `upgrade_rapid_fire` - Multiplier from the timed RapidFire upgrade (1 when inactive)
    pub fn fire_interval(
        &self,
        tuning: &WeaponTuning,
        modifiers: &WeaponModifiers,
        upgrade_rapid_fire: f32,
    ) -> f32 {
        let firing = &tuning.firing;
        let leveled = (firing.base_fire_interval
            - self.power_level as f32 * firing.fire_interval_per_level)
            .max(firing.min_fire_interval);

        let internal = if self.is_rapid_fire_active() {
            positive_or_one(tuning.boosts.rapid_fire_multiplier)
        } else {
            1.0
        };

        leveled
            / internal
            / positive_or_one(upgrade_rapid_fire)
            / positive_or_one(modifiers.fire_rate_multiplier)
    }

    /// Pattern the next forward volley uses.
    pub fn current_pattern(&self, tuning: &WeaponTuning, modifiers: &WeaponModifiers) -> FirePattern {
        let pattern = select_pattern(self.power_level, &tuning.firing, &tuning.patterns);
        if modifiers.spread_shot {
            pattern.max(FirePattern::Triple)
        } else {
            pattern
        }
    }

    /// Heat added by one volley of `count` projectiles.
    pub fn volley_heat(tuning: &WeaponTuning, count: u32) -> f32 {
        let base = tuning.heat.heat_per_shot;
        base + base * tuning.heat.multi_shot_heat_multiplier * count.saturating_sub(1) as f32
    }

    fn projectile_params(&self, damage: i32, tuning: &WeaponTuning, modifiers: &WeaponModifiers) -> ProjectileParams {
        let projectile = &tuning.projectile;
        ProjectileParams {
            damage,
            speed: projectile.speed * modifiers.projectile_speed_multiplier.max(0.0),
            lifetime: projectile.lifetime,
            power_level: self.power_level,
            radius: projectile.radius_for_level(self.power_level)
                * modifiers.projectile_size_multiplier.max(0.0),
            piercing: modifiers.piercing.is_some(),
            max_pierce: modifiers
                .piercing
                .map_or(projectile.max_pierce, |p| p.max_pierce.max(1)),
            homing: modifiers.homing.is_some(),
            homing_range: modifiers.homing.map_or(projectile.homing_range, |h| h.range),
            homing_turn_rate: modifiers
                .homing
                .map_or(projectile.homing_turn_rate, |h| h.turn_rate),
        }
    }

    /// Advance timers and fire if allowed.
    ///
    /// # Arguments
    /// * `dt` - Tick length in seconds
    /// * `input` - This tick's input
    /// * `tuning` - Resolved tuning
    /// * `modifiers` - Combined upgrade modifiers
    /// * `upgrade_rapid_fire` - Multiplier from the timed RapidFire upgrade
    /// * `events` - Event sink
    /// * `out` - Receives the shots to spawn (not cleared)
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        input: &FireInput,
        tuning: &WeaponTuning,
        modifiers: &WeaponModifiers,
        upgrade_rapid_fire: f32,
        events: &mut EventBus,
        out: &mut Vec<ShotRequest>,
    ) {
        self.rapid_fire_remaining = (self.rapid_fire_remaining - dt).max(0.0);
        self.damage_boost_remaining = (self.damage_boost_remaining - dt).max(0.0);

        if let Some(HeatTransition::Cooled) = self.heat.tick(dt, input.fire_held, &tuning.heat) {
            info!("weapon cooled down");
            events.publish(WeaponEvent::WeaponCooled {
                heat: self.heat.heat(),
            });
        }

        // At most one tick of overshoot is carried into the next interval
        self.fire_timer = (self.fire_timer - dt).max(-dt);
        let rear_independent = tuning.rear.enabled && !tuning.rear.synchronized;
        if rear_independent {
            self.rear_timer = (self.rear_timer - dt).max(-dt);
        }

        // Firing input is dropped, not queued, while overheated
        if !input.fire_held || !self.heat.can_fire() {
            return;
        }

        if self.fire_timer <= 0.0 {
            self.fire_forward(input, tuning, modifiers, events, out);
            // The forward volley may have tripped the overheat
            if tuning.rear.enabled && tuning.rear.synchronized && self.heat.can_fire() {
                self.fire_rear(input, tuning, modifiers, events, out);
            }
            self.fire_timer += self.fire_interval(tuning, modifiers, upgrade_rapid_fire);
        }

        if rear_independent && self.heat.can_fire() && self.rear_timer <= 0.0 {
            self.fire_rear(input, tuning, modifiers, events, out);
            self.rear_timer += tuning.rear.fire_interval;
        }
    }

    fn fire_forward(
        &mut self,
        input: &FireInput,
        tuning: &WeaponTuning,
        modifiers: &WeaponModifiers,
        events: &mut EventBus,
        out: &mut Vec<ShotRequest>,
    ) {
        let pattern = self.current_pattern(tuning, modifiers);
        let count = pattern.projectile_count();
        let damage = self.damage(tuning, modifiers);
        let params = self.projectile_params(damage, tuning, modifiers);

        let mut directions = std::mem::take(&mut self.directions);
        spread_directions(input.aim, count, spread_step(pattern, &tuning.patterns), &mut directions);
        for &direction in &directions {
            out.push(ShotRequest {
                mount: WeaponMount::Forward,
                position: input.origin + direction * tuning.projectile.spawn_offset,
                direction,
                params,
            });
        }
        self.directions = directions;

        events.publish(WeaponEvent::ProjectileFired {
            mount: WeaponMount::Forward,
            pattern,
            count,
            damage,
            origin: input.origin,
            direction: input.aim.try_normalize().unwrap_or(Vec2::Y),
        });
        self.add_heat(Self::volley_heat(tuning, count), tuning, events);
    }

    fn fire_rear(
        &mut self,
        input: &FireInput,
        tuning: &WeaponTuning,
        modifiers: &WeaponModifiers,
        events: &mut EventBus,
        out: &mut Vec<ShotRequest>,
    ) {
        let rear = &tuning.rear;
        let direction = -input.aim.try_normalize().unwrap_or(Vec2::Y);
        let damage = (self.damage(tuning, modifiers) as f32 * rear.damage_fraction).round() as i32;

        out.push(ShotRequest {
            mount: WeaponMount::Rear,
            position: input.origin + direction * tuning.projectile.spawn_offset,
            direction,
            params: self.projectile_params(damage, tuning, modifiers),
        });
        events.publish(WeaponEvent::ProjectileFired {
            mount: WeaponMount::Rear,
            pattern: FirePattern::Single,
            count: 1,
            damage,
            origin: input.origin,
            direction,
        });
        self.add_heat(tuning.heat.heat_per_shot * rear.heat_fraction, tuning, events);
    }

    fn add_heat(&mut self, amount: f32, tuning: &WeaponTuning, events: &mut EventBus) {
        if let Some(HeatTransition::Overheated) = self.heat.add_heat(amount, &tuning.heat) {
            info!("weapon overheated");
            events.publish(WeaponEvent::WeaponOverheated {
                heat: self.heat.heat(),
            });
        }
    }

    /// Back to a fresh run: level 0, cold, no boosts.
    pub fn reset(&mut self, events: &mut EventBus) {
        if self.power_level != 0 {
            events.publish(WeaponEvent::PowerLevelChanged { level: 0 });
        }
        let directions = std::mem::take(&mut self.directions);
        *self = Self {
            directions,
            ..Default::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::{HomingParams, PiercingParams};

    fn held(aim: Vec2) -> FireInput {
        FireInput {
            fire_held: true,
            aim,
            ..Default::default()
        }
    }

    fn fire_once(
        weapon: &mut WeaponSystem,
        tuning: &WeaponTuning,
        modifiers: &WeaponModifiers,
    ) -> Vec<ShotRequest> {
        let mut events = EventBus::default();
        let mut out = Vec::new();
        weapon.update(0.0, &held(Vec2::Y), tuning, modifiers, 1.0, &mut events, &mut out);
        out
    }

    #[test]
    fn test_damage_scales_with_power_level() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers::default();
        let mut events = EventBus::default();
        let mut weapon = WeaponSystem::default();

        assert_eq!(weapon.damage(&tuning, &modifiers), 12);
        weapon.set_power_level(10, &tuning, &mut events);
        assert_eq!(weapon.damage(&tuning, &modifiers), 24);
    }

    #[test]
    fn test_damage_boost_and_modifier_multiply() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers {
            damage_multiplier: 1.5,
            ..Default::default()
        };
        let mut weapon = WeaponSystem::default();
        weapon.activate_damage_boost(&tuning);
        assert_eq!(weapon.damage(&tuning, &modifiers), 36);
    }

    #[test]
    fn test_power_level_is_clamped() {
        let tuning = WeaponTuning::default();
        let mut events = EventBus::default();
        let mut weapon = WeaponSystem::default();
        weapon.set_power_level(1_000, &tuning, &mut events);
        assert_eq!(weapon.power_level(), tuning.firing.max_power_level);

        events.clear();
        weapon.raise_power_level(&tuning, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fire_interval_floor_and_compounding() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers::default();
        let mut events = EventBus::default();
        let mut weapon = WeaponSystem::default();

        assert!((weapon.fire_interval(&tuning, &modifiers, 1.0) - 0.2).abs() < 1e-6);

        weapon.set_power_level(20, &tuning, &mut events);
        let floored = weapon.fire_interval(&tuning, &modifiers, 1.0);
        assert!((floored - tuning.firing.min_fire_interval).abs() < 1e-6);

        weapon.activate_rapid_fire(&tuning);
        let both = weapon.fire_interval(&tuning, &modifiers, 1.5);
        let expected = tuning.firing.min_fire_interval / tuning.boosts.rapid_fire_multiplier / 1.5;
        assert!((both - expected).abs() < 1e-6);
    }

    #[test]
    fn test_double_pattern_angles() {
        let mut tuning = WeaponTuning::default();
        tuning.firing.pattern = FirePattern::Double;
        let shots = fire_once(&mut WeaponSystem::default(), &tuning, &WeaponModifiers::default());

        let mut angles: Vec<f32> = shots
            .iter()
            .map(|s| s.direction.y.atan2(s.direction.x).to_degrees())
            .collect();
        angles.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(angles.len(), 2);
        assert!((angles[0] - 82.5).abs() < 1e-3);
        assert!((angles[1] - 97.5).abs() < 1e-3);
    }

    #[test]
    fn test_spread_shot_forces_at_least_triple() {
        let mut tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers {
            spread_shot: true,
            ..Default::default()
        };
        let weapon = WeaponSystem::default();
        assert_eq!(weapon.current_pattern(&tuning, &modifiers), FirePattern::Triple);

        tuning.firing.pattern = FirePattern::X5;
        assert_eq!(weapon.current_pattern(&tuning, &modifiers), FirePattern::X5);
    }

    #[test]
    fn test_multi_shot_heat_surcharge() {
        let tuning = WeaponTuning::default();
        let base = tuning.heat.heat_per_shot;
        let multi = tuning.heat.multi_shot_heat_multiplier;

        assert_eq!(WeaponSystem::volley_heat(&tuning, 1), base);
        assert!((WeaponSystem::volley_heat(&tuning, 5) - (base + base * multi * 4.0)).abs() < 1e-6);

        let mut quad = tuning.clone();
        quad.firing.pattern = FirePattern::Quad;
        let mut weapon = WeaponSystem::default();
        fire_once(&mut weapon, &quad, &WeaponModifiers::default());
        assert!((weapon.heat().heat() - WeaponSystem::volley_heat(&quad, 4)).abs() < 1e-5);
    }

    #[test]
    fn test_overheats_after_125_single_volleys() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers::default();
        let mut weapon = WeaponSystem::default();
        let mut events = EventBus::default();
        let mut out = Vec::new();
        let input = held(Vec2::Y);

        let mut volleys = 0;
        while !weapon.heat().is_overheated() {
            out.clear();
            weapon.update(0.0, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
            // Zero-length ticks never let the timer run down, so force it
            weapon.fire_timer = 0.0;
            volleys += out.len();
            assert!(volleys <= 200);
        }
        assert_eq!(volleys, 125);
        assert!(events
            .pending()
            .iter()
            .any(|e| matches!(e, WeaponEvent::WeaponOverheated { .. })));

        // Input is ignored while locked out
        out.clear();
        weapon.update(0.01, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fire_rate_follows_interval() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers::default();
        let mut weapon = WeaponSystem::default();
        let mut events = EventBus::default();
        let mut out = Vec::new();
        let input = held(Vec2::Y);

        // One second at 100 Hz with a 0.2 s interval
        for _ in 0..100 {
            weapon.update(0.01, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
        }
        assert!((5..=6).contains(&out.len()), "fired {}", out.len());
    }

    #[test]
    fn test_rear_weapon_synchronized() {
        let mut tuning = WeaponTuning::default();
        tuning.rear.enabled = true;
        let shots = fire_once(&mut WeaponSystem::default(), &tuning, &WeaponModifiers::default());

        let rear: Vec<_> = shots.iter().filter(|s| s.mount == WeaponMount::Rear).collect();
        assert_eq!(rear.len(), 1);
        assert!((rear[0].direction - Vec2::NEG_Y).length() < 1e-6);
        assert_eq!(rear[0].params.damage, 6);
    }

    #[test]
    fn test_rear_weapon_independent_timer() {
        let mut tuning = WeaponTuning::default();
        tuning.rear.enabled = true;
        tuning.rear.synchronized = false;
        tuning.rear.fire_interval = 0.5;
        let modifiers = WeaponModifiers::default();
        let mut weapon = WeaponSystem::default();
        let mut events = EventBus::default();
        let mut out = Vec::new();
        let input = held(Vec2::X);

        for _ in 0..100 {
            weapon.update(0.01, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
        }
        let rear = out.iter().filter(|s| s.mount == WeaponMount::Rear).count();
        let forward = out.iter().filter(|s| s.mount == WeaponMount::Forward).count();
        assert!((2..=3).contains(&rear), "rear fired {rear}");
        assert!(forward > rear);
    }

    #[test]
    fn test_synchronized_rear_adds_its_heat_fraction() {
        let mut tuning = WeaponTuning::default();
        tuning.rear.enabled = true;
        let mut weapon = WeaponSystem::default();
        let shots = fire_once(&mut weapon, &tuning, &WeaponModifiers::default());

        assert_eq!(shots.len(), 2);
        let expected = WeaponSystem::volley_heat(&tuning, 1)
            + tuning.heat.heat_per_shot * tuning.rear.heat_fraction;
        assert!((weapon.heat().heat() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_independent_rear_shot_adds_only_rear_heat() {
        let mut tuning = WeaponTuning::default();
        tuning.rear.enabled = true;
        tuning.rear.synchronized = false;
        tuning.rear.fire_interval = 0.1;
        let modifiers = WeaponModifiers::default();
        let mut weapon = WeaponSystem::default();
        let mut events = EventBus::default();
        let mut out = Vec::new();
        let input = held(Vec2::Y);

        // Both mounts start ready
        weapon.update(0.0, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
        assert_eq!(out.len(), 2);
        let before = weapon.heat().heat();

        // Rear timer runs out, forward interval (0.2 s) has not
        out.clear();
        weapon.update(0.1, &input, &tuning, &modifiers, 1.0, &mut events, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mount, WeaponMount::Rear);

        let added = weapon.heat().heat() - before;
        let expected = tuning.heat.heat_per_shot * tuning.rear.heat_fraction;
        assert!((added - expected).abs() < 1e-5, "added {added}");
    }

    #[test]
    fn test_synchronized_rear_skipped_once_forward_overheats() {
        let mut tuning = WeaponTuning::default();
        tuning.rear.enabled = true;
        let mut weapon = WeaponSystem::default();
        weapon.heat.add_heat(tuning.heat.max_heat - 0.5, &tuning.heat);
        assert!(weapon.heat().can_fire());

        let shots = fire_once(&mut weapon, &tuning, &WeaponModifiers::default());

        assert!(weapon.heat().is_overheated());
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].mount, WeaponMount::Forward);
    }

    #[test]
    fn test_damage_boost_multiplier_only_while_active() {
        let tuning = WeaponTuning::default();
        let mut weapon = WeaponSystem::default();
        assert_eq!(weapon.damage_boost_multiplier(&tuning), 1.0);

        weapon.activate_damage_boost(&tuning);
        assert_eq!(
            weapon.damage_boost_multiplier(&tuning),
            tuning.boosts.damage_boost_multiplier
        );
    }

    #[test]
    fn test_modifiers_flow_into_projectile_params() {
        let tuning = WeaponTuning::default();
        let modifiers = WeaponModifiers {
            projectile_speed_multiplier: 2.0,
            homing: Some(HomingParams {
                range: 3.0,
                turn_rate: 1.0,
            }),
            piercing: Some(PiercingParams { max_pierce: 4 }),
            ..Default::default()
        };
        let shots = fire_once(&mut WeaponSystem::default(), &tuning, &modifiers);
        let params = shots[0].params;

        assert_eq!(params.speed, tuning.projectile.speed * 2.0);
        assert!(params.homing && params.piercing);
        assert_eq!(params.max_pierce, 4);
        assert_eq!(params.homing_range, 3.0);
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let tuning = WeaponTuning::default();
        let mut events = EventBus::default();
        let mut weapon = WeaponSystem::default();
        weapon.set_power_level(5, &tuning, &mut events);
        weapon.activate_rapid_fire(&tuning);
        fire_once(&mut weapon, &tuning, &WeaponModifiers::default());

        weapon.reset(&mut events);
        assert_eq!(weapon.power_level(), 0);
        assert_eq!(weapon.heat().heat(), 0.0);
        assert!(!weapon.is_rapid_fire_active());
    }
}
