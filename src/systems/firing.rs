//! Fixed-step systems that advance the weapons simulation.

use bevy::prelude::*;

use crate::config::WeaponConfig;
use crate::simulation::WeaponsSimulation;
use crate::types::CombatWorld;
use crate::weapon::FireInput;

/// Push configuration edits into the simulation.
///
/// Runs every fixed step but only does work when the [`WeaponConfig`]
/// resource changed since the last run.
pub fn sync_weapon_config(config: Res<WeaponConfig>, mut sim: ResMut<WeaponsSimulation>) {
    if !config.is_changed() || sim.config() == &*config {
        return;
    }
    info!("weapon config changed, re-resolving tuning");
    sim.set_config((*config).clone());
}

/// Advance the simulation by one fixed step against world `W`.
///
/// # Arguments
/// * `time` - Bevy FixedTime resource to get delta time
/// * `input` - Input sampled by the host; the smart bomb request is consumed
/// * `sim` - The weapons simulation
/// * `world` - Targets and obstacles
pub fn tick_weapons<W: Resource + CombatWorld>(
    time: Res<Time<Fixed>>,
    mut input: ResMut<FireInput>,
    mut sim: ResMut<WeaponsSimulation>,
    mut world: ResMut<W>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    sim.tick(dt, &input, &mut *world);

    // One-shot request
    if input.smart_bomb {
        input.smart_bomb = false;
    }
}
