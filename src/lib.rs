//! # Neural Break Weapons
//!
//! Player weapon simulation for a 2D top-down arcade shooter, with a Bevy 0.18
//! plugin to host it.
//!
//! ## Features
//! - Fire-rate timing, power levels and multi-shot spread patterns
//! - Heat accumulation with overheat lockout and cooldown
//! - Pooled projectiles, plain and behavior-composed (homing, piercing,
//!   explosions, chain lightning, ricochet)
//! - Continuous beam with fractional per-target damage accumulation
//! - Timed upgrades, permanent upgrades and smart bombs
//! - Engine-neutral core: bring your own targets and spatial queries
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use neural_break_weapons::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(WeaponsPlugin::<Arena>::default())
//!         .run();
//! }
//! ```
//!
//! Without Bevy's scheduler, drive a [`simulation::WeaponsSimulation`] directly:
//! ```
//! use bevy::prelude::*;
//! use neural_break_weapons::prelude::*;
//!
//! let mut sim = WeaponsSimulation::default();
//! let mut arena = Arena::default();
//! arena.spawn_target(Vec2::new(0.0, 3.0), 0.5, 100);
//!
//! let input = FireInput { fire_held: true, ..Default::default() };
//! sim.tick(1.0 / 60.0, &input, &mut arena);
//! assert_eq!(sim.active_projectile_count(), 1);
//! ```

pub mod arena;
pub mod beam;
pub mod behaviors;
pub mod config;
pub mod enhanced;
pub mod error;
pub mod events;
pub mod heat;
pub mod modifiers;
pub mod patterns;
pub mod pool;
pub mod projectile;
pub mod simulation;
pub mod smart_bomb;
pub mod systems;
pub mod types;
pub mod upgrades;
pub mod weapon;

pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::config::{WeaponConfig, WeaponTuning};
    pub use crate::error::ConfigError;
    pub use crate::events::*;
    pub use crate::modifiers::{PermanentUpgrade, UpgradeEffect, WeaponModifiers};
    pub use crate::projectile::HitOutcome;
    pub use crate::simulation::{ProjectileSnapshot, WeaponsSimulation};
    pub use crate::types::*;
    pub use crate::weapon::FireInput;
    pub use crate::WeaponsPlugin;
}

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::arena::Arena;
use crate::config::WeaponConfig;
use crate::events::{GameSignal, WeaponEvent};
use crate::simulation::WeaponsSimulation;
use crate::types::CombatWorld;
use crate::weapon::FireInput;

/// Weapons plugin, generic over the resource that provides targets and
/// spatial queries.
///
/// The built-in [`Arena`] works out of the box. Games with their own physics
/// implement [`types::SpatialQueryExt`] and [`types::TargetRegistry`] on a
/// resource and plug that in instead.
///
/// A [`WeaponConfig`] already present in the app wins over the one carried by
/// the plugin.
///
/// # Systems
/// - `sync_weapon_config` - Re-resolves tuning when the config resource changes
/// - `apply_game_signals` - Feeds [`GameSignal`] messages to the simulation
/// - `tick_weapons` - Advances the simulation by one fixed step
/// - `publish_weapon_events` - Forwards queued events as [`WeaponEvent`] messages
pub struct WeaponsPlugin<W = Arena> {
    pub config: WeaponConfig,
    _world: PhantomData<fn() -> W>,
}

impl<W> WeaponsPlugin<W> {
    pub fn new(config: WeaponConfig) -> Self {
        Self {
            config,
            _world: PhantomData,
        }
    }
}

impl<W> Default for WeaponsPlugin<W> {
    fn default() -> Self {
        Self::new(WeaponConfig::default())
    }
}

impl<W> Plugin for WeaponsPlugin<W>
where
    W: Resource + CombatWorld + Default,
{
    /// Registers resources and messages, builds the simulation and schedules
    /// the fixed-step systems.
    ///
    /// # Arguments
    /// * `app` - Mutable reference to the Bevy App
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<WeaponConfig>()
            .cloned()
            .unwrap_or_else(|| self.config.clone());

        let mut sim = WeaponsSimulation::new(config.clone());
        sim.init();

        app.register_type::<Arena>()
            .register_type::<FireInput>()
            .insert_resource(config)
            .insert_resource(sim)
            .init_resource::<W>()
            .init_resource::<FireInput>()
            .add_message::<WeaponEvent>()
            .add_message::<GameSignal>()
            .add_systems(
                FixedUpdate,
                (
                    systems::firing::sync_weapon_config,
                    systems::messages::apply_game_signals,
                    systems::firing::tick_weapons::<W>,
                    systems::messages::publish_weapon_events,
                )
                    .chain(),
            );
    }
}
