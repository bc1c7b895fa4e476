//! Firing pattern selection and spread geometry.

use bevy::prelude::*;

use crate::config::{FiringTuning, PatternTuning};
use crate::types::FirePattern;

/// Pick the pattern for a power level.
///
/// With auto-upgrade off the configured pattern is used regardless of level.
pub fn select_pattern(power_level: u32, firing: &FiringTuning, patterns: &PatternTuning) -> FirePattern {
    if !firing.auto_upgrade_pattern {
        return firing.pattern;
    }
    if power_level >= patterns.x5_level {
        FirePattern::X5
    } else if power_level >= patterns.quad_level {
        FirePattern::Quad
    } else if power_level >= patterns.triple_level {
        FirePattern::Triple
    } else if power_level >= patterns.double_level {
        FirePattern::Double
    } else {
        FirePattern::Single
    }
}

/// Angle between adjacent projectiles for a pattern, in radians.
pub fn spread_step(pattern: FirePattern, patterns: &PatternTuning) -> f32 {
    match pattern {
        FirePattern::Single => 0.0,
        FirePattern::Double => patterns.double_spread,
        FirePattern::Triple => patterns.triple_spread,
        FirePattern::Quad => patterns.quad_spread,
        FirePattern::X5 => patterns.x5_spread,
    }
}

/// Directions of every projectile in a volley.
///
/// Projectiles are laid out symmetrically around `aim`, `step` radians apart.
/// Odd counts include the aim line itself; even counts straddle it.
///
/// # Arguments
/// * `aim` - Aim direction (need not be normalized; zero falls back to +Y)
/// * `count` - Number of projectiles
/// * `step` - Angle between adjacent projectiles in radians
/// * `out` - Buffer receiving normalized directions (cleared first)
pub fn spread_directions(aim: Vec2, count: u32, step: f32, out: &mut Vec<Vec2>) {
    out.clear();
    let aim = aim.try_normalize().unwrap_or(Vec2::Y);
    let center = (count.max(1) - 1) as f32 * 0.5;

    for i in 0..count.max(1) {
        let offset = (i as f32 - center) * step;
        out.push(Vec2::from_angle(offset).rotate(aim).normalize());
    }
}
