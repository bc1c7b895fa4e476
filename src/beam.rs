//! Continuous-damage beam weapon.
//!
//! Each tick runs two independent queries:
//!
//! 1. A ray against obstacles decides where the beam visually ends.
//! 2. An oriented box spanning the beam width enumerates every target the beam
//!    damages, not just the first one.
//!
//! Damage is accrued per target as a fractional amount and only whole units
//! are ever applied; the remainder carries over to the next tick.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::BeamTuning;
use crate::events::{EventBus, WeaponEvent};
use crate::types::{CombatWorld, TargetId};

#[derive(Debug, Default)]
pub struct BeamWeapon {
    active: bool,
    origin: Vec2,
    direction: Vec2,
    damage_multiplier: f32,
    /// Distance to the visual terminus, from the last tick's ray cast
    length: f32,
    accumulator: HashMap<TargetId, f32>,
    overlap: Vec<TargetId>,
}

impl BeamWeapon {
    pub fn new() -> Self {
        Self {
            direction: Vec2::Y,
            damage_multiplier: 1.0,
            ..Default::default()
        }
    }

    /// Switch the beam on, or re-aim it if it is already firing.
    ///
    /// # Arguments
    /// * `origin` - Muzzle position
    /// * `direction` - Beam direction (normalized here; zero keeps the previous one)
    /// * `damage_multiplier` - Scales the configured damage per second
    /// * `events` - Receives `BeamStarted` on the off → on transition
    pub fn fire(&mut self, origin: Vec2, direction: Vec2, damage_multiplier: f32, events: &mut EventBus) {
        self.update_aim(origin, direction);
        self.damage_multiplier = damage_multiplier.max(0.0);

        if !self.active {
            self.active = true;
            debug!("beam started at {:?} facing {:?}", self.origin, self.direction);
            events.publish(WeaponEvent::BeamStarted {
                origin: self.origin,
                direction: self.direction,
            });
        }
    }

    /// Switch the beam off and forget all partial damage.
    pub fn stop(&mut self, events: &mut EventBus) {
        if !self.active {
            return;
        }
        self.active = false;
        self.length = 0.0;
        self.accumulator.clear();
        self.overlap.clear();
        events.publish(WeaponEvent::BeamStopped);
    }

    /// Move an active beam without restarting it.
    pub fn update_aim(&mut self, origin: Vec2, direction: Vec2) {
        self.origin = origin;
        if let Some(direction) = direction.try_normalize() {
            self.direction = direction;
        }
    }

    /// Advance the beam by `dt` seconds.
    ///
    /// # Returns
    /// Total whole damage applied this tick
    pub fn tick(
        &mut self,
        dt: f32,
        tuning: &BeamTuning,
        world: &mut dyn CombatWorld,
        events: &mut EventBus,
    ) -> i32 {
        if !self.active {
            return 0;
        }

        // Query 1: visual terminus
        self.length = world
            .cast_ray(self.origin, self.direction, tuning.max_range)
            .map_or(tuning.max_range, |hit| hit.distance.min(tuning.max_range));

        // Query 2: everything inside the beam
        let damage_length = if tuning.damage_through_obstacles {
            tuning.max_range
        } else {
            self.length
        };
        self.overlap.clear();
        if damage_length > 0.0 {
            let center = self.origin + self.direction * damage_length * 0.5;
            let half_extents = Vec2::new(damage_length * 0.5, tuning.width * 0.5);
            world.overlap_box(
                center,
                half_extents,
                self.direction.to_angle(),
                tuning.max_targets,
                &mut self.overlap,
            );
        }

        let rate = tuning.damage_per_second * self.damage_multiplier;
        let mut applied = 0;
        for &target in &self.overlap {
            if !world.is_alive(target) {
                continue;
            }
            let accrued = self.accumulator.entry(target).or_insert(0.0);
            *accrued += rate * dt;
            if *accrued >= 1.0 {
                let whole = accrued.floor();
                *accrued -= whole;
                let amount = whole as i32;
                world.take_damage(target, amount, self.origin);
                events.publish(WeaponEvent::TargetDamaged {
                    target,
                    amount,
                    source: self.origin,
                });
                applied += amount;
            }
        }

        self.accumulator.retain(|&target, _| world.is_alive(target));
        applied
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Where the beam visually ends.
    pub fn end_point(&self) -> Vec2 {
        self.origin + self.direction * self.length
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Fractional damage banked against `target`, if any.
    pub fn accumulated(&self, target: TargetId) -> Option<f32> {
        self.accumulator.get(&target).copied()
    }

    pub fn tracked_targets(&self) -> usize {
        self.accumulator.len()
    }
}
