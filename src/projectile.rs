//! Plain projectile - straight flight, optional homing and piercing.
//!
//! Direction and speed are fixed at spawn. Homing is the only thing allowed to
//! re-steer a projectile, and it only changes the direction.

use bevy::prelude::*;
use rand::rngs::StdRng;

use crate::events::{EventBus, WeaponEvent};
use crate::pool::Poolable;
use crate::types::{nearest_alive_target, CombatWorld, TargetId};

/// Everything a projectile may touch while it updates or hits.
pub struct CombatContext<'a> {
    pub world: &'a mut dyn CombatWorld,
    pub events: &'a mut EventBus,
    pub rng: &'a mut StdRng,
    /// Reused buffer for spatial query results
    pub scratch: &'a mut Vec<TargetId>,
    pub max_query_results: usize,
}

/// Per-shot parameters computed by the weapon system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileParams {
    pub damage: i32,
    pub speed: f32,
    pub lifetime: f32,
    pub power_level: u32,
    /// Collision radius
    pub radius: f32,
    pub piercing: bool,
    pub max_pierce: u32,
    pub homing: bool,
    pub homing_range: f32,
    pub homing_turn_rate: f32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            damage: 1,
            speed: 1.0,
            lifetime: 1.0,
            power_level: 0,
            radius: 0.1,
            piercing: false,
            max_pierce: 1,
            homing: false,
            homing_range: 0.0,
            homing_turn_rate: 0.0,
        }
    }
}

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileStatus {
    Active,
    /// Lifetime ran out during this tick
    Expired,
    /// Was already inactive
    Inactive,
}

/// Result of reporting a contact to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Dead target, repeat contact or inactive projectile
    Ignored,
    /// Damage applied, projectile keeps flying
    PassedThrough,
    /// Damage applied, projectile is spent
    Consumed,
}

/// Common surface of the pooled projectile flavors, used by the simulation to
/// drive both pools with one loop.
pub trait PooledProjectile: Poolable {
    fn tick(&mut self, dt: f32, ctx: &mut CombatContext) -> ProjectileStatus;
    fn on_collision(&mut self, target: TargetId, ctx: &mut CombatContext) -> HitOutcome;
    fn is_active(&self) -> bool;
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// Slew `direction` toward `to_target` by `turn_rate * dt` (at most all the way).
///
/// Pure directional interpolation; distance to the target plays no part.
pub fn steer_towards(direction: Vec2, to_target: Vec2, turn_rate: f32, dt: f32) -> Vec2 {
    let Some(desired) = to_target.try_normalize() else {
        return direction;
    };
    let t = (turn_rate * dt).clamp(0.0, 1.0);
    direction.lerp(desired, t).try_normalize().unwrap_or(direction)
}

/// One in-flight shot.
#[derive(Clone, Debug, Default)]
pub struct Projectile {
    pub position: Vec2,
    direction: Vec2,
    speed: f32,
    damage: i32,
    power_level: u32,
    radius: f32,
    lifetime_remaining: f32,
    active: bool,
    piercing: bool,
    homing: bool,
    pierce_count: u32,
    max_pierce: u32,
    homing_range: f32,
    homing_turn_rate: f32,
    /// Targets already struck; a contact pair counts once
    contacts: Vec<TargetId>,
}

impl Poolable for Projectile {
    fn activate(&mut self, position: Vec2, direction: Vec2) {
        self.position = position;
        self.direction = direction.try_normalize().unwrap_or(Vec2::Y);
        self.active = true;
    }

    fn reset(&mut self) {
        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.clear();
        *self = Self {
            contacts,
            ..Default::default()
        };
    }
}

impl Projectile {
    /// Arm a freshly checked-out projectile.
    ///
    /// Position and direction come from the pool checkout; everything else is
    /// taken from `params`. Previous contacts and pierce count are forgotten.
    pub fn initialize(&mut self, params: &ProjectileParams) {
        self.speed = params.speed;
        self.damage = params.damage;
        self.power_level = params.power_level;
        self.radius = params.radius;
        self.lifetime_remaining = params.lifetime;
        self.piercing = params.piercing;
        self.max_pierce = params.max_pierce.max(1);
        self.homing = params.homing;
        self.homing_range = params.homing_range;
        self.homing_turn_rate = params.homing_turn_rate;
        self.pierce_count = 0;
        self.contacts.clear();
        self.active = true;
    }

    /// Steer, move and age the projectile.
    ///
    /// # Arguments
    /// * `dt` - Tick length in seconds
    /// * `ctx` - World access for the homing target search
    ///
    /// # Returns
    /// [`ProjectileStatus::Expired`] on the tick the lifetime runs out
    pub fn tick(&mut self, dt: f32, ctx: &mut CombatContext) -> ProjectileStatus {
        if !self.active {
            return ProjectileStatus::Inactive;
        }

        if self.homing {
            if let Some((_, target_pos)) = nearest_alive_target(
                &*ctx.world,
                self.position,
                self.homing_range,
                ctx.max_query_results,
                &self.contacts,
                &mut *ctx.scratch,
            ) {
                self.direction = steer_towards(
                    self.direction,
                    target_pos - self.position,
                    self.homing_turn_rate,
                    dt,
                );
            }
        }

        self.position += self.direction * self.speed * dt;

        self.lifetime_remaining -= dt;
        if self.lifetime_remaining <= 0.0 {
            self.deactivate();
            return ProjectileStatus::Expired;
        }
        ProjectileStatus::Active
    }

    /// Report a contact with `target`.
    ///
    /// Damage is applied once per contact pair. Piercing projectiles keep
    /// flying until they have struck `max_pierce` targets.
    pub fn on_collision(&mut self, target: TargetId, ctx: &mut CombatContext) -> HitOutcome {
        if !self.active || self.contacts.contains(&target) || !ctx.world.is_alive(target) {
            return HitOutcome::Ignored;
        }

        self.contacts.push(target);
        ctx.world.take_damage(target, self.damage, self.position);
        ctx.events.publish(WeaponEvent::TargetDamaged {
            target,
            amount: self.damage,
            source: self.position,
        });

        if self.piercing {
            self.pierce_count += 1;
            if self.pierce_count < self.max_pierce {
                return HitOutcome::PassedThrough;
            }
        }
        self.deactivate();
        HitOutcome::Consumed
    }

    /// Take the projectile out of play.
    ///
    /// Returns `false` if it was already inactive.
    pub fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn power_level(&self) -> u32 {
        self.power_level
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn lifetime_remaining(&self) -> f32 {
        self.lifetime_remaining
    }

    pub fn pierce_count(&self) -> u32 {
        self.pierce_count
    }

    pub fn is_piercing(&self) -> bool {
        self.piercing
    }

    pub fn is_homing(&self) -> bool {
        self.homing
    }
}

impl PooledProjectile for Projectile {
    fn tick(&mut self, dt: f32, ctx: &mut CombatContext) -> ProjectileStatus {
        Projectile::tick(self, dt, ctx)
    }

    fn on_collision(&mut self, target: TargetId, ctx: &mut CombatContext) -> HitOutcome {
        Projectile::on_collision(self, target, ctx)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::types::TargetRegistry;
    use rand::SeedableRng;

    struct Harness {
        arena: Arena,
        events: EventBus,
        rng: StdRng,
        scratch: Vec<TargetId>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                arena: Arena::default(),
                events: EventBus::default(),
                rng: StdRng::seed_from_u64(1),
                scratch: Vec::new(),
            }
        }

        fn ctx(&mut self) -> CombatContext<'_> {
            CombatContext {
                world: &mut self.arena,
                events: &mut self.events,
                rng: &mut self.rng,
                scratch: &mut self.scratch,
                max_query_results: 32,
            }
        }
    }

    fn spawn(params: ProjectileParams, direction: Vec2) -> Projectile {
        let mut projectile = Projectile::default();
        projectile.activate(Vec2::ZERO, direction);
        projectile.initialize(&params);
        projectile
    }

    #[test]
    fn test_lifetime_strictly_decreases_until_expiry() {
        let mut h = Harness::new();
        let mut projectile = spawn(
            ProjectileParams {
                lifetime: 0.5,
                ..Default::default()
            },
            Vec2::X,
        );

        let mut last = projectile.lifetime_remaining();
        let mut expired_ticks = 0;
        for _ in 0..20 {
            match projectile.tick(0.1, &mut h.ctx()) {
                ProjectileStatus::Active => {
                    assert!(projectile.lifetime_remaining() < last);
                    last = projectile.lifetime_remaining();
                }
                ProjectileStatus::Expired => expired_ticks += 1,
                ProjectileStatus::Inactive => {}
            }
        }
        assert_eq!(expired_ticks, 1);
        assert!(!projectile.is_active());
        assert!(projectile.lifetime_remaining() <= 0.0);
    }

    #[test]
    fn test_moves_along_fixed_direction() {
        let mut h = Harness::new();
        let mut projectile = spawn(
            ProjectileParams {
                speed: 10.0,
                lifetime: 5.0,
                ..Default::default()
            },
            Vec2::new(0.0, 2.0),
        );
        projectile.tick(0.5, &mut h.ctx());
        assert!((projectile.position - Vec2::new(0.0, 5.0)).length() < 1e-5);
        assert_eq!(projectile.direction(), Vec2::Y);
    }

    #[test]
    fn test_non_piercing_hit_consumes() {
        let mut h = Harness::new();
        let target = h.arena.spawn_target(Vec2::new(1.0, 0.0), 0.5, 100);
        let mut projectile = spawn(
            ProjectileParams {
                damage: 12,
                ..Default::default()
            },
            Vec2::X,
        );

        assert_eq!(projectile.on_collision(target, &mut h.ctx()), HitOutcome::Consumed);
        assert_eq!(h.arena.health(target), Some(88));
        assert!(!projectile.is_active());
        assert_eq!(projectile.on_collision(target, &mut h.ctx()), HitOutcome::Ignored);
    }

    #[test]
    fn test_piercing_hits_exactly_max_pierce_targets() {
        let mut h = Harness::new();
        let targets: Vec<_> = (0..5)
            .map(|i| h.arena.spawn_target(Vec2::new(i as f32, 0.0), 0.5, 100))
            .collect();
        let mut projectile = spawn(
            ProjectileParams {
                damage: 5,
                piercing: true,
                max_pierce: 3,
                ..Default::default()
            },
            Vec2::X,
        );

        let hits = targets
            .iter()
            .filter(|&&t| projectile.on_collision(t, &mut h.ctx()) != HitOutcome::Ignored)
            .count();
        assert_eq!(hits, 3);
        assert!(!projectile.is_active());
    }

    #[test]
    fn test_piercing_with_fewer_targets_stays_active() {
        let mut h = Harness::new();
        let a = h.arena.spawn_target(Vec2::new(1.0, 0.0), 0.5, 100);
        let mut projectile = spawn(
            ProjectileParams {
                piercing: true,
                max_pierce: 3,
                ..Default::default()
            },
            Vec2::X,
        );

        assert_eq!(projectile.on_collision(a, &mut h.ctx()), HitOutcome::PassedThrough);
        // Same contact pair again does not count
        assert_eq!(projectile.on_collision(a, &mut h.ctx()), HitOutcome::Ignored);
        assert_eq!(projectile.pierce_count(), 1);
        assert!(projectile.is_active());
    }

    #[test]
    fn test_dead_target_is_skipped() {
        let mut h = Harness::new();
        let target = h.arena.spawn_target(Vec2::new(1.0, 0.0), 0.5, 10);
        h.arena.kill(target);
        let mut projectile = spawn(ProjectileParams::default(), Vec2::X);

        assert_eq!(projectile.on_collision(target, &mut h.ctx()), HitOutcome::Ignored);
        assert!(projectile.is_active());
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let mut h = Harness::new();
        h.arena.spawn_target(Vec2::new(0.0, 5.0), 0.5, 100);
        let mut projectile = spawn(
            ProjectileParams {
                speed: 1.0,
                lifetime: 10.0,
                homing: true,
                homing_range: 10.0,
                homing_turn_rate: 2.0,
                ..Default::default()
            },
            Vec2::X,
        );

        projectile.tick(0.1, &mut h.ctx());
        let dir = projectile.direction();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y > 0.0 && dir.x > 0.0);
    }

    #[test]
    fn test_steer_is_clamped_to_full_turn() {
        let dir = steer_towards(Vec2::X, Vec2::new(0.0, 3.0), 100.0, 1.0);
        assert!((dir - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_reset_forgets_previous_shot() {
        let mut h = Harness::new();
        let target = h.arena.spawn_target(Vec2::X, 0.5, 100);
        let mut projectile = spawn(ProjectileParams::default(), Vec2::X);
        projectile.on_collision(target, &mut h.ctx());

        projectile.reset();
        projectile.activate(Vec2::ZERO, Vec2::X);
        projectile.initialize(&ProjectileParams::default());
        assert_eq!(projectile.on_collision(target, &mut h.ctx()), HitOutcome::Consumed);
    }
}
