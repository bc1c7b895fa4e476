//! Self-contained combat world: circular targets and axis-aligned walls.
//!
//! The arena implements the spatial queries explicitly instead of delegating to
//! a physics engine. It backs the plugin's default world, the benchmarks and
//! most tests; games with their own physics implement the collaborator traits
//! on their own types.

use bevy::prelude::*;

use crate::types::{HitResult, SpatialQueryExt, TargetId, TargetRegistry};

/// A damageable circle.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct ArenaTarget {
    pub id: TargetId,
    pub position: Vec2,
    pub radius: f32,
    pub health: i32,
    pub alive: bool,
}

/// Axis-aligned obstacle. Blocks rays, never takes damage.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Wall {
    pub center: Vec2,
    pub half_extents: Vec2,
}

#[derive(Resource, Clone, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct Arena {
    targets: Vec<ArenaTarget>,
    walls: Vec<Wall>,
    next_id: u64,
}

impl Arena {
    /// Add a live target and return its id.
    pub fn spawn_target(&mut self, position: Vec2, radius: f32, health: i32) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.push(ArenaTarget {
            id,
            position,
            radius: radius.max(0.0),
            health,
            alive: health > 0,
        });
        id
    }

    pub fn add_wall(&mut self, center: Vec2, half_extents: Vec2) {
        self.walls.push(Wall {
            center,
            half_extents: half_extents.abs(),
        });
    }

    pub fn target(&self, id: TargetId) -> Option<&ArenaTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    fn target_mut(&mut self, id: TargetId) -> Option<&mut ArenaTarget> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn health(&self, id: TargetId) -> Option<i32> {
        self.target(id).map(|t| t.health)
    }

    /// Move a target. Unknown ids are ignored.
    pub fn set_position(&mut self, id: TargetId, position: Vec2) {
        if let Some(target) = self.target_mut(id) {
            target.position = position;
        }
    }

    /// Forget a target entirely, as if it was despawned.
    pub fn remove_target(&mut self, id: TargetId) {
        self.targets.retain(|t| t.id != id);
    }

    /// Drop every dead target.
    pub fn clear_dead(&mut self) -> usize {
        let before = self.targets.len();
        self.targets.retain(|t| t.alive);
        before - self.targets.len()
    }

    pub fn targets(&self) -> &[ArenaTarget] {
        &self.targets
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn alive_count(&self) -> usize {
        self.targets.iter().filter(|t| t.alive).count()
    }
}

/// Slab test of a ray against an AABB.
///
/// Returns the entry distance and the entry face normal. Rays starting inside
/// the box do not hit it.
fn ray_aabb(origin: Vec2, direction: Vec2, wall: &Wall) -> Option<(f32, Vec2)> {
    let min = wall.center - wall.half_extents;
    let max = wall.center + wall.half_extents;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

        if near > t_enter {
            t_enter = near;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_enter < 0.0 {
        return None;
    }
    Some((t_enter, normal))
}

impl SpatialQueryExt for Arena {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_dist: f32) -> Option<HitResult> {
        let direction = direction.try_normalize()?;
        self.walls
            .iter()
            .filter_map(|wall| ray_aabb(origin, direction, wall))
            .filter(|(distance, _)| *distance <= max_dist)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, normal)| HitResult {
                point: origin + direction * distance,
                normal,
                distance,
            })
    }

    fn overlap_box(
        &self,
        center: Vec2,
        half_extents: Vec2,
        rotation: f32,
        max_results: usize,
        out: &mut Vec<TargetId>,
    ) {
        // Work in the box's local frame
        let to_local = Vec2::from_angle(-rotation);
        let half_extents = half_extents.abs();

        let hits = self.targets.iter().filter(|t| t.alive).filter(|t| {
            let local = to_local.rotate(t.position - center);
            let closest = local.clamp(-half_extents, half_extents);
            local.distance_squared(closest) <= t.radius * t.radius
        });
        out.extend(hits.map(|t| t.id).take(max_results));
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, max_results: usize, out: &mut Vec<TargetId>) {
        let hits = self.targets.iter().filter(|t| t.alive).filter(|t| {
            let reach = radius + t.radius;
            t.position.distance_squared(center) <= reach * reach
        });
        out.extend(hits.map(|t| t.id).take(max_results));
    }
}

impl TargetRegistry for Arena {
    fn is_alive(&self, id: TargetId) -> bool {
        self.target(id).is_some_and(|t| t.alive)
    }

    fn position(&self, id: TargetId) -> Option<Vec2> {
        self.target(id).map(|t| t.position)
    }

    fn take_damage(&mut self, id: TargetId, amount: i32, _source: Vec2) {
        let Some(target) = self.target_mut(id) else {
            return;
        };
        if !target.alive || amount <= 0 {
            return;
        }
        target.health -= amount;
        if target.health <= 0 {
            target.health = 0;
            target.alive = false;
        }
    }

    fn kill(&mut self, id: TargetId) {
        if let Some(target) = self.target_mut(id) {
            target.health = 0;
            target.alive = false;
        }
    }
}
