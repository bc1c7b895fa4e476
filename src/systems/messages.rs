//! Message plumbing: game signals in, weapon events out.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::events::{GameSignal, WeaponEvent};
use crate::simulation::WeaponsSimulation;

/// Apply every [`GameSignal`] written since the last run, in order.
pub fn apply_game_signals(
    mut signals: MessageReader<GameSignal>,
    mut sim: ResMut<WeaponsSimulation>,
) {
    for &signal in signals.read() {
        sim.handle_signal(signal);
    }
}

/// Forward the simulation's queued events as Bevy messages.
///
/// # Arguments
/// * `sim` - The weapons simulation whose queue is drained
/// * `weapon_events` - Message writer for weapon events
pub fn publish_weapon_events(
    mut sim: ResMut<WeaponsSimulation>,
    mut weapon_events: MessageWriter<WeaponEvent>,
) {
    if sim.pending_events().is_empty() {
        return;
    }
    for event in sim.drain_events() {
        weapon_events.write(event);
    }
}
