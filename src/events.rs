//! Events for the weapons core.
//!
//! The core publishes [`WeaponEvent`] records into an [`EventBus`] owned by the
//! simulation; the host drains it once per tick. Inbound signals from the rest
//! of the game arrive as [`GameSignal`].
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`,
//! so both record types derive `Message` and are forwarded by the plugin.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::types::{FirePattern, TargetId, UpgradeKind};

/// Which barrel a shot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponMount {
    /// Forward-facing main weapon
    Forward,
    /// Rear-facing auxiliary weapon
    Rear,
}

/// State transitions and combat outcomes published by the core.
///
/// Fire-and-forget: nothing in the core waits on a subscriber.
///
/// # Example
/// ```
/// use neural_break_weapons::events::{EventBus, WeaponEvent};
///
/// let mut bus = EventBus::default();
/// bus.publish(WeaponEvent::WeaponOverheated { heat: 100.0 });
/// assert_eq!(bus.drain().count(), 1);
/// ```
#[derive(Message, Clone, Debug, PartialEq)]
pub enum WeaponEvent {
    /// A volley left the weapon
    ProjectileFired {
        mount: WeaponMount,
        pattern: FirePattern,
        count: u32,
        damage: i32,
        origin: Vec2,
        direction: Vec2,
    },
    /// Heat reached the maximum; firing is locked out
    WeaponOverheated { heat: f32 },
    /// Overheat lockout ended
    WeaponCooled { heat: f32 },
    /// Power level changed
    PowerLevelChanged { level: u32 },
    /// A timed upgrade was inserted or extended
    UpgradeActivated { kind: UpgradeKind, remaining: f32 },
    /// A timed upgrade ran out or was cleared
    UpgradeExpired { kind: UpgradeKind },
    /// A projectile or beam damaged a target
    TargetDamaged {
        target: TargetId,
        amount: i32,
        source: Vec2,
    },
    /// A projectile left play without being consumed by a hit
    ProjectileExpired { position: Vec2 },
    /// Explosion behavior detonated
    ExplosionTriggered {
        center: Vec2,
        radius: f32,
        damage: i32,
        targets_hit: u32,
    },
    /// One arc of a chain-lightning hop
    ChainLightningArc {
        from: Vec2,
        to: Vec2,
        target: TargetId,
        damage: i32,
    },
    /// Ricochet behavior redirected a projectile
    ProjectileRicocheted {
        position: Vec2,
        new_direction: Vec2,
        bounces_left: u32,
    },
    /// Beam switched on
    BeamStarted { origin: Vec2, direction: Vec2 },
    /// Beam switched off
    BeamStopped,
    /// Smart bomb went off
    SmartBombDetonated {
        center: Vec2,
        radius: f32,
        killed: u32,
        charges_left: u32,
    },
}

/// Pickups the weapons core reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    /// Timed weapon upgrade
    Upgrade(UpgradeKind),
    /// +1 power level
    PowerUp,
    /// Short internal rapid-fire boost
    RapidFireBoost,
    /// Short internal damage boost
    DamageBoost,
    /// One extra smart-bomb charge
    SmartBomb,
}

/// External signals the core subscribes to.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameSignal {
    /// A fresh run started
    GameStarted,
    /// The run restarted; transient weapon state is wiped
    GameRestarted,
    /// The player collected a pickup
    PickupCollected(PickupKind),
}

/// Queue of published weapon events.
///
/// Single-writer, drained by the host. Draining hands events out in publish
/// order.
#[derive(Default, Debug)]
pub struct EventBus {
    pending: Vec<WeaponEvent>,
}

impl EventBus {
    /// Publish an event.
    pub fn publish(&mut self, event: WeaponEvent) {
        self.pending.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = WeaponEvent> + '_ {
        self.pending.drain(..)
    }

    /// Peek at pending events without consuming them.
    pub fn pending(&self) -> &[WeaponEvent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_publish_order() {
        let mut bus = EventBus::default();
        bus.publish(WeaponEvent::WeaponOverheated { heat: 100.0 });
        bus.publish(WeaponEvent::WeaponCooled { heat: 40.0 });

        let drained: Vec<_> = bus.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], WeaponEvent::WeaponOverheated { .. }));
        assert!(matches!(drained[1], WeaponEvent::WeaponCooled { .. }));
        assert!(bus.is_empty());
    }
}
