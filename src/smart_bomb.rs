//! Smart bombs: limited charges that wipe every target around the player.

use bevy::prelude::*;

use crate::config::SmartBombTuning;
use crate::events::{EventBus, WeaponEvent};
use crate::types::{CombatWorld, TargetId};

#[derive(Clone, Debug, Default)]
pub struct SmartBombLauncher {
    charges: u32,
    /// Charges granted by upgrades on top of the configured base
    bonus: u32,
    hits: Vec<TargetId>,
}

impl SmartBombLauncher {
    pub fn new(tuning: &SmartBombTuning) -> Self {
        let mut launcher = Self::default();
        launcher.refill(tuning);
        launcher
    }

    pub fn charges(&self) -> u32 {
        self.charges
    }

    pub fn capacity(&self, tuning: &SmartBombTuning) -> u32 {
        (tuning.base_charges + self.bonus).min(tuning.max_charges)
    }

    /// Change the upgrade bonus. A larger bonus tops up charges immediately.
    pub fn set_bonus(&mut self, bonus: u32, tuning: &SmartBombTuning) {
        let gained = bonus.saturating_sub(self.bonus);
        self.bonus = bonus;
        self.charges = (self.charges + gained).min(self.capacity(tuning));
    }

    /// Add one charge, e.g. from a pickup. Capped at the configured maximum.
    pub fn add_charge(&mut self, tuning: &SmartBombTuning) -> bool {
        if self.charges >= tuning.max_charges {
            return false;
        }
        self.charges += 1;
        true
    }

    /// Back to full capacity, used when a run (re)starts.
    pub fn refill(&mut self, tuning: &SmartBombTuning) {
        self.charges = self.capacity(tuning);
    }

    /// Kill every living target within the configured radius of `center`.
    ///
    /// # Returns
    /// Number of targets killed, or `None` when no charge was available
    pub fn detonate(
        &mut self,
        center: Vec2,
        tuning: &SmartBombTuning,
        max_results: usize,
        world: &mut dyn CombatWorld,
        events: &mut EventBus,
    ) -> Option<u32> {
        if self.charges == 0 {
            debug!("smart bomb requested without charges");
            return None;
        }
        self.charges -= 1;

        self.hits.clear();
        world.overlap_circle(center, tuning.radius, max_results, &mut self.hits);

        let mut killed = 0;
        for &id in &self.hits {
            if world.is_alive(id) {
                world.kill(id);
                killed += 1;
            }
        }

        info!("smart bomb killed {killed} targets, {} charges left", self.charges);
        events.publish(WeaponEvent::SmartBombDetonated {
            center,
            radius: tuning.radius,
            killed,
            charges_left: self.charges,
        });
        Some(killed)
    }
}
