//! Composable projectile behaviors.
//!
//! An [`crate::enhanced::EnhancedProjectile`] carries an ordered list of
//! [`ProjectileBehavior`]s built from the current [`WeaponModifiers`]. Each
//! behavior gets four hooks:
//!
//! - `initialize` when the projectile is armed
//! - `update` every tick before the projectile moves
//! - `on_hit_enemy` after the hit damage was applied; returns a destroy vote
//! - `on_deactivate` when the projectile leaves play
//!
//! The projectile is destroyed on a hit only when every behavior votes to
//! destroy it, so any single behavior can keep it alive.

use bevy::prelude::*;
use rand_distr::{Distribution, Normal};

use crate::events::WeaponEvent;
use crate::modifiers::WeaponModifiers;
use crate::projectile::{steer_towards, CombatContext};
use crate::types::{nearest_alive_target, TargetId};

/// Standard deviation of the reflection jitter in radians.
const RICOCHET_JITTER_STD_DEV: f64 = 0.15;

/// Mutable flight state shared with behaviors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectileBody {
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub radius: f32,
}

/// Capability tag, for "does this projectile pierce" style checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Homing,
    Piercing,
    Explosion,
    ChainLightning,
    Ricochet,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectileBehavior {
    Homing {
        range: f32,
        turn_rate: f32,
    },
    Piercing {
        max_pierce: u32,
        hits: u32,
    },
    Explosion {
        radius: f32,
        damage_fraction: f32,
    },
    ChainLightning {
        jumps: u32,
        range: f32,
        damage_fraction: f32,
    },
    Ricochet {
        bounces: u32,
        bounces_left: u32,
        search_range: f32,
    },
}

impl ProjectileBehavior {
    /// Build the behavior list for one shot into `out` (cleared first).
    pub fn build_set(modifiers: &WeaponModifiers, out: &mut Vec<ProjectileBehavior>) {
        out.clear();
        if let Some(p) = modifiers.homing {
            out.push(Self::Homing {
                range: p.range,
                turn_rate: p.turn_rate,
            });
        }
        if let Some(p) = modifiers.piercing {
            out.push(Self::Piercing {
                max_pierce: p.max_pierce.max(1),
                hits: 0,
            });
        }
        if let Some(p) = modifiers.explosion {
            out.push(Self::Explosion {
                radius: p.radius,
                damage_fraction: p.damage_fraction,
            });
        }
        if let Some(p) = modifiers.chain_lightning {
            out.push(Self::ChainLightning {
                jumps: p.jumps,
                range: p.range,
                damage_fraction: p.damage_fraction,
            });
        }
        if let Some(p) = modifiers.ricochet {
            out.push(Self::Ricochet {
                bounces: p.bounces,
                bounces_left: p.bounces,
                search_range: p.search_range,
            });
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Homing { .. } => BehaviorKind::Homing,
            Self::Piercing { .. } => BehaviorKind::Piercing,
            Self::Explosion { .. } => BehaviorKind::Explosion,
            Self::ChainLightning { .. } => BehaviorKind::ChainLightning,
            Self::Ricochet { .. } => BehaviorKind::Ricochet,
        }
    }

    pub fn initialize(&mut self) {
        match self {
            Self::Piercing { hits, .. } => *hits = 0,
            Self::Ricochet {
                bounces,
                bounces_left,
                ..
            } => *bounces_left = *bounces,
            _ => {}
        }
    }

    /// Per-tick hook, runs before the projectile integrates its position.
    ///
    /// # Arguments
    /// * `dt` - Tick length in seconds
    /// * `body` - Flight state of the owning projectile
    /// * `contacts` - Targets this projectile already struck
    /// * `ctx` - World access
    pub fn update(
        &mut self,
        dt: f32,
        body: &mut ProjectileBody,
        contacts: &[TargetId],
        ctx: &mut CombatContext,
    ) {
        if let Self::Homing { range, turn_rate } = *self {
            if let Some((_, target_pos)) = nearest_alive_target(
                &*ctx.world,
                body.position,
                range,
                ctx.max_query_results,
                contacts,
                &mut *ctx.scratch,
            ) {
                body.direction = steer_towards(body.direction, target_pos - body.position, turn_rate, dt);
            }
        }
    }

    /// Hit hook. The hit damage has already been applied to `target`.
    ///
    /// # Returns
    /// `true` if this behavior is fine with the projectile being destroyed
    pub fn on_hit_enemy(
        &mut self,
        target: TargetId,
        body: &mut ProjectileBody,
        ctx: &mut CombatContext,
    ) -> bool {
        match self {
            Self::Homing { .. } => true,
            Self::Piercing { max_pierce, hits } => {
                *hits += 1;
                *hits >= *max_pierce
            }
            Self::Explosion {
                radius,
                damage_fraction,
            } => {
                explode(target, body, *radius, *damage_fraction, ctx);
                true
            }
            Self::ChainLightning {
                jumps,
                range,
                damage_fraction,
            } => {
                chain(target, body, *jumps, *range, *damage_fraction, ctx);
                true
            }
            Self::Ricochet {
                bounces_left,
                search_range,
                ..
            } => {
                if *bounces_left == 0 {
                    return true;
                }
                *bounces_left -= 1;
                ricochet(target, body, *search_range, *bounces_left, ctx);
                false
            }
        }
    }

    pub fn on_deactivate(&mut self) {
        match self {
            Self::Piercing { hits, .. } => *hits = 0,
            Self::Ricochet { bounces_left, .. } => *bounces_left = 0,
            _ => {}
        }
    }
}

fn scaled_damage(damage: i32, fraction: f32) -> i32 {
    (damage as f32 * fraction).round() as i32
}

fn explode(
    struck: TargetId,
    body: &ProjectileBody,
    radius: f32,
    damage_fraction: f32,
    ctx: &mut CombatContext,
) {
    let damage = scaled_damage(body.damage, damage_fraction);

    ctx.scratch.clear();
    ctx.world
        .overlap_circle(body.position, radius, ctx.max_query_results, &mut *ctx.scratch);

    let mut targets_hit = 0;
    if damage > 0 {
        for &id in ctx.scratch.iter() {
            if id == struck || !ctx.world.is_alive(id) {
                continue;
            }
            ctx.world.take_damage(id, damage, body.position);
            ctx.events.publish(WeaponEvent::TargetDamaged {
                target: id,
                amount: damage,
                source: body.position,
            });
            targets_hit += 1;
        }
    }

    ctx.events.publish(WeaponEvent::ExplosionTriggered {
        center: body.position,
        radius,
        damage,
        targets_hit,
    });
}

fn chain(
    struck: TargetId,
    body: &ProjectileBody,
    jumps: u32,
    range: f32,
    damage_fraction: f32,
    ctx: &mut CombatContext,
) {
    let damage = scaled_damage(body.damage, damage_fraction);
    if damage <= 0 {
        return;
    }

    let mut visited = vec![struck];
    let mut from = ctx.world.position(struck).unwrap_or(body.position);

    for _ in 0..jumps {
        let Some((next, next_pos)) = nearest_alive_target(
            &*ctx.world,
            from,
            range,
            ctx.max_query_results,
            &visited,
            &mut *ctx.scratch,
        ) else {
            break;
        };

        ctx.world.take_damage(next, damage, from);
        ctx.events.publish(WeaponEvent::TargetDamaged {
            target: next,
            amount: damage,
            source: from,
        });
        ctx.events.publish(WeaponEvent::ChainLightningArc {
            from,
            to: next_pos,
            target: next,
            damage,
        });
        visited.push(next);
        from = next_pos;
    }
}

fn ricochet(
    struck: TargetId,
    body: &mut ProjectileBody,
    search_range: f32,
    bounces_left: u32,
    ctx: &mut CombatContext,
) {
    let toward_next = nearest_alive_target(
        &*ctx.world,
        body.position,
        search_range,
        ctx.max_query_results,
        &[struck],
        &mut *ctx.scratch,
    )
    .and_then(|(_, pos)| (pos - body.position).try_normalize());

    body.direction = match toward_next {
        Some(dir) => dir,
        None => {
            // Nothing to bounce toward: reflect back with a little jitter
            let jitter = Normal::new(0.0, RICOCHET_JITTER_STD_DEV)
                .map(|normal| normal.sample(&mut *ctx.rng) as f32)
                .unwrap_or(0.0);
            Vec2::from_angle(jitter).rotate(-body.direction)
        }
    };

    ctx.events.publish(WeaponEvent::ProjectileRicocheted {
        position: body.position,
        new_direction: body.direction,
        bounces_left,
    });
}
