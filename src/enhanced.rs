//! Behavior-composed projectile.

use bevy::prelude::*;

use crate::behaviors::{BehaviorKind, ProjectileBehavior, ProjectileBody};
use crate::events::WeaponEvent;
use crate::modifiers::WeaponModifiers;
use crate::pool::Poolable;
use crate::projectile::{
    CombatContext, HitOutcome, PooledProjectile, ProjectileParams, ProjectileStatus,
};
use crate::types::TargetId;

/// A projectile whose hit and flight logic comes from its behaviors.
///
/// Same lifecycle as [`crate::projectile::Projectile`]. The behavior list is
/// rebuilt from scratch on every [`EnhancedProjectile::initialize`], so nothing
/// from a previous occupant of the pool slot survives.
#[derive(Clone, Debug, Default)]
pub struct EnhancedProjectile {
    body: ProjectileBody,
    lifetime_remaining: f32,
    active: bool,
    behaviors: Vec<ProjectileBehavior>,
    contacts: Vec<TargetId>,
}

impl Poolable for EnhancedProjectile {
    fn activate(&mut self, position: Vec2, direction: Vec2) {
        self.body.position = position;
        self.body.direction = direction.try_normalize().unwrap_or(Vec2::Y);
        self.active = true;
    }

    fn reset(&mut self) {
        self.deactivate();
        self.body = ProjectileBody::default();
        self.lifetime_remaining = 0.0;
        self.behaviors.clear();
        self.contacts.clear();
    }
}

impl EnhancedProjectile {
    /// Arm the projectile and rebuild its behaviors from `modifiers`.
    pub fn initialize(&mut self, params: &ProjectileParams, modifiers: &WeaponModifiers) {
        self.body.speed = params.speed;
        self.body.damage = params.damage;
        self.body.radius = params.radius;
        self.lifetime_remaining = params.lifetime;
        self.contacts.clear();
        self.active = true;

        ProjectileBehavior::build_set(modifiers, &mut self.behaviors);
        for behavior in &mut self.behaviors {
            behavior.initialize();
        }
    }

    pub fn tick(&mut self, dt: f32, ctx: &mut CombatContext) -> ProjectileStatus {
        if !self.active {
            return ProjectileStatus::Inactive;
        }

        for behavior in &mut self.behaviors {
            behavior.update(dt, &mut self.body, &self.contacts, ctx);
        }

        self.body.position += self.body.direction * self.body.speed * dt;

        self.lifetime_remaining -= dt;
        if self.lifetime_remaining <= 0.0 {
            self.deactivate();
            return ProjectileStatus::Expired;
        }
        ProjectileStatus::Active
    }

    /// Report a contact with `target`.
    ///
    /// Every behavior is consulted, even after one already voted to keep the
    /// projectile alive, so side effects (explosions, bounces) always happen.
    pub fn on_collision(&mut self, target: TargetId, ctx: &mut CombatContext) -> HitOutcome {
        if !self.active || self.contacts.contains(&target) || !ctx.world.is_alive(target) {
            return HitOutcome::Ignored;
        }

        self.contacts.push(target);
        ctx.world.take_damage(target, self.body.damage, self.body.position);
        ctx.events.publish(WeaponEvent::TargetDamaged {
            target,
            amount: self.body.damage,
            source: self.body.position,
        });

        let mut destroy = true;
        for behavior in &mut self.behaviors {
            let vote = behavior.on_hit_enemy(target, &mut self.body, ctx);
            destroy = destroy && vote;
        }

        if destroy {
            self.deactivate();
            HitOutcome::Consumed
        } else {
            HitOutcome::PassedThrough
        }
    }

    /// Take the projectile out of play. Returns `false` if already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        for behavior in &mut self.behaviors {
            behavior.on_deactivate();
        }
        true
    }

    pub fn has_behavior(&self, kind: BehaviorKind) -> bool {
        self.behaviors.iter().any(|b| b.kind() == kind)
    }

    pub fn behaviors(&self) -> &[ProjectileBehavior] {
        &self.behaviors
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn direction(&self) -> Vec2 {
        self.body.direction
    }

    pub fn damage(&self) -> i32 {
        self.body.damage
    }

    pub fn radius(&self) -> f32 {
        self.body.radius
    }

    pub fn lifetime_remaining(&self) -> f32 {
        self.lifetime_remaining
    }
}

impl PooledProjectile for EnhancedProjectile {
    fn tick(&mut self, dt: f32, ctx: &mut CombatContext) -> ProjectileStatus {
        EnhancedProjectile::tick(self, dt, ctx)
    }

    fn on_collision(&mut self, target: TargetId, ctx: &mut CombatContext) -> HitOutcome {
        EnhancedProjectile::on_collision(self, target, ctx)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn radius(&self) -> f32 {
        self.body.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::events::EventBus;
    use crate::modifiers::{ExplosionParams, PiercingParams, RicochetParams};
    use rand::rngs::StdRng;
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
                rng: StdRng::seed_from_u64(9),
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

    fn armed(modifiers: &WeaponModifiers) -> EnhancedProjectile {
        let mut projectile = EnhancedProjectile::default();
        projectile.activate(Vec2::ZERO, Vec2::X);
        projectile.initialize(
            &ProjectileParams {
                damage: 10,
                speed: 5.0,
                lifetime: 2.0,
                ..Default::default()
            },
            modifiers,
        );
        projectile
    }

    #[test]
    fn test_no_behaviors_destroys_on_first_hit() {
        let mut h = Harness::new();
        let target = h.arena.spawn_target(Vec2::X, 0.5, 50);
        let mut projectile = armed(&WeaponModifiers::default());

        assert_eq!(projectile.on_collision(target, &mut h.ctx()), HitOutcome::Consumed);
        assert_eq!(h.arena.health(target), Some(40));
    }

    #[test]
    fn test_piercing_vetoes_explosion_until_exhausted() {
        let mut h = Harness::new();
        let targets: Vec<_> = (0..4)
            .map(|i| h.arena.spawn_target(Vec2::new(i as f32 * 10.0, 0.0), 0.5, 50))
            .collect();
        let modifiers = WeaponModifiers {
            piercing: Some(PiercingParams { max_pierce: 2 }),
            explosion: Some(ExplosionParams {
                radius: 1.0,
                damage_fraction: 0.5,
            }),
            ..Default::default()
        };
        let mut projectile = armed(&modifiers);

        assert_eq!(projectile.on_collision(targets[0], &mut h.ctx()), HitOutcome::PassedThrough);
        assert_eq!(projectile.on_collision(targets[1], &mut h.ctx()), HitOutcome::Consumed);
        assert_eq!(projectile.on_collision(targets[2], &mut h.ctx()), HitOutcome::Ignored);

        // Explosion still fired on the vetoed hit
        let explosions = h
            .events
            .pending()
            .iter()
            .filter(|e| matches!(e, WeaponEvent::ExplosionTriggered { .. }))
            .count();
        assert_eq!(explosions, 2);
    }

    #[test]
    fn test_reinitialize_drops_stale_behaviors() {
        let modifiers = WeaponModifiers {
            ricochet: Some(RicochetParams {
                bounces: 2,
                search_range: 4.0,
            }),
            ..Default::default()
        };
        let mut projectile = armed(&modifiers);
        assert!(projectile.has_behavior(BehaviorKind::Ricochet));

        projectile.reset();
        projectile.activate(Vec2::ZERO, Vec2::X);
        projectile.initialize(&ProjectileParams::default(), &WeaponModifiers::default());
        assert!(projectile.behaviors().is_empty());
    }

    #[test]
    fn test_expires_after_lifetime() {
        let mut h = Harness::new();
        let mut projectile = armed(&WeaponModifiers::default());
        let mut statuses = Vec::new();
        for _ in 0..5 {
            statuses.push(projectile.tick(0.5, &mut h.ctx()));
        }
        assert_eq!(
            statuses,
            vec![
                ProjectileStatus::Active,
                ProjectileStatus::Active,
                ProjectileStatus::Active,
                ProjectileStatus::Expired,
                ProjectileStatus::Inactive,
            ]
        );
        assert!(!projectile.deactivate());
    }
}
