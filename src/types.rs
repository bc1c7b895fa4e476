//! Common types and collaborator traits for the weapons core.
//!
//! The core never owns enemies or colliders. It talks to them through two
//! seams: [`TargetRegistry`] (is the thing alive, where is it, hurt it) and
//! [`SpatialQueryExt`] (ray and overlap queries). Anything implementing both is
//! a [`CombatWorld`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Opaque identity of a damageable target.
///
/// Hosts map this to whatever they use internally (ECS entity bits, array index, ...).
///
/// # Example
/// ```
/// use neural_break_weapons::types::TargetId;
///
/// let id = TargetId(42);
/// assert_eq!(id.0, 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct TargetId(pub u64);

/// Result of a ray cast against obstacles.
///
/// # Fields
/// * `point` - World-space hit point
/// * `normal` - Surface normal at the hit point
/// * `distance` - Distance from the ray origin to the hit point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    /// World-space hit point
    pub point: Vec2,
    /// Surface normal
    pub normal: Vec2,
    /// Distance from ray origin
    pub distance: f32,
}

/// Spatial query abstraction consumed by the weapons core.
///
/// Broad-phase collision is not implemented here; hosts back this trait with
/// their physics engine. [`crate::arena::Arena`] is a self-contained reference
/// implementation.
///
/// Overlap queries write into a caller-owned buffer and stop after
/// `max_results` entries so a single tick never does unbounded work.
pub trait SpatialQueryExt {
    /// Cast a ray against obstacles (walls, cover) and return the first hit.
    ///
    /// # Arguments
    /// * `origin` - Starting point of the ray in world space
    /// * `direction` - Normalized direction vector of the ray
    /// * `max_dist` - Maximum distance to cast the ray
    ///
    /// # Returns
    /// The nearest hit, or `None` if nothing is within `max_dist`
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_dist: f32) -> Option<HitResult>;

    /// Collect targets overlapping an oriented box.
    ///
    /// # Arguments
    /// * `center` - Box center in world space
    /// * `half_extents` - Half width (local x) and half height (local y)
    /// * `rotation` - Box rotation in radians (local x axis angle)
    /// * `max_results` - Upper bound on the number of ids written
    /// * `out` - Buffer the ids are appended to
    fn overlap_box(
        &self,
        center: Vec2,
        half_extents: Vec2,
        rotation: f32,
        max_results: usize,
        out: &mut Vec<TargetId>,
    );

    /// Collect targets overlapping a circle.
    fn overlap_circle(&self, center: Vec2, radius: f32, max_results: usize, out: &mut Vec<TargetId>);
}

/// Damageable targets, addressed polymorphically by id.
///
/// Every method must tolerate ids that no longer exist: `is_alive` returns
/// `false`, `position` returns `None`, and the mutators do nothing.
pub trait TargetRegistry {
    /// Whether the target exists and can still be hurt.
    fn is_alive(&self, id: TargetId) -> bool;

    /// Current world position, if the target still exists.
    fn position(&self, id: TargetId) -> Option<Vec2>;

    /// Apply instantaneous damage coming from `source`.
    fn take_damage(&mut self, id: TargetId, amount: i32, source: Vec2);

    /// Kill the target outright.
    fn kill(&mut self, id: TargetId);
}

/// Everything the weapons core needs from the host world.
pub trait CombatWorld: SpatialQueryExt + TargetRegistry {}

impl<T: SpatialQueryExt + TargetRegistry> CombatWorld for T {}

/// Find the nearest alive target within `range` of `origin`.
///
/// `exclude` lets callers skip targets they already touched (ricochet, chain
/// lightning). Ties resolve to the lowest id so results are deterministic.
pub fn nearest_alive_target(
    world: &dyn CombatWorld,
    origin: Vec2,
    range: f32,
    max_results: usize,
    exclude: &[TargetId],
    scratch: &mut Vec<TargetId>,
) -> Option<(TargetId, Vec2)> {
    scratch.clear();
    world.overlap_circle(origin, range, max_results, scratch);

    let mut best: Option<(TargetId, Vec2, f32)> = None;
    for &id in scratch.iter() {
        if exclude.contains(&id) || !world.is_alive(id) {
            continue;
        }
        let Some(pos) = world.position(id) else {
            continue;
        };
        let dist_sq = pos.distance_squared(origin);
        let better = match best {
            None => true,
            Some((best_id, _, best_dist)) => {
                dist_sq < best_dist || (dist_sq == best_dist && id < best_id)
            }
        };
        if better {
            best = Some((id, pos, dist_sq));
        }
    }
    best.map(|(id, pos, _)| (id, pos))
}

/// Firing pattern: projectile count and symmetric spread around the aim.
///
/// Ordered from narrowest to widest so patterns can be compared with `max`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Reflect, Serialize, Deserialize,
)]
pub enum FirePattern {
    /// One projectile on the aim line
    #[default]
    Single,
    /// Two projectiles, no center ray
    Double,
    /// Three projectiles including the center ray
    Triple,
    /// Four projectiles, no center ray
    Quad,
    /// Five projectiles including the center ray
    X5,
}

impl FirePattern {
    /// Number of projectiles fired per activation.
    pub fn projectile_count(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quad => 4,
            Self::X5 => 5,
        }
    }
}

/// Time-limited weapon upgrades handled by the upgrade manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Widens the firing pattern to at least Triple
    SpreadShot,
    /// Projectiles pass through targets
    Piercing,
    /// Shorter fire interval
    RapidFire,
    /// Projectiles steer toward nearby targets
    Homing,
}

impl UpgradeKind {
    /// All kinds, in a stable order.
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::SpreadShot,
        UpgradeKind::Piercing,
        UpgradeKind::RapidFire,
        UpgradeKind::Homing,
    ];
}

/// Which projectile flavor a spawned shot lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Plain projectile with built-in homing/piercing flags
    Standard,
    /// Projectile composed from behaviors
    Enhanced,
}

/// Handle to a projectile living in one of the simulation's pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileRef {
    pub kind: ProjectileKind,
    pub handle: crate::pool::PoolHandle,
}
