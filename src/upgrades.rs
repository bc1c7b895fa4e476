//! Time-limited weapon upgrades.
//!
//! Tracks remaining time per [`UpgradeKind`]. Re-collecting an active upgrade
//! refreshes it to the longer of the two durations; time never stacks.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::config::{BoostTuning, UpgradeDurations};
use crate::events::{EventBus, WeaponEvent};
use crate::types::UpgradeKind;

#[derive(Clone, Debug, Default)]
pub struct WeaponUpgradeManager {
    active: BTreeMap<UpgradeKind, f32>,
    /// Set whenever the active set gains or loses a kind
    changed: bool,
}

impl WeaponUpgradeManager {
    /// Insert or extend a timed upgrade.
    ///
    /// # Arguments
    /// * `kind` - Upgrade to activate
    /// * `duration` - Seconds to run; `None` uses the configured default for `kind`
    /// * `defaults` - Configured default durations
    /// * `events` - Receives `UpgradeActivated`
    ///
    /// # Returns
    /// Remaining time after the call
    pub fn activate_upgrade(
        &mut self,
        kind: UpgradeKind,
        duration: Option<f32>,
        defaults: &UpgradeDurations,
        events: &mut EventBus,
    ) -> f32 {
        let duration = duration.unwrap_or_else(|| defaults.for_kind(kind));
        if !duration.is_finite() || duration <= 0.0 {
            debug!("ignoring {kind:?} upgrade with duration {duration}");
            return self.remaining(kind).unwrap_or(0.0);
        }

        let remaining = match self.active.get_mut(&kind) {
            Some(existing) => {
                *existing = existing.max(duration);
                *existing
            }
            None => {
                self.active.insert(kind, duration);
                self.changed = true;
                duration
            }
        };

        info!("upgrade {kind:?} active for {remaining:.1}s");
        events.publish(WeaponEvent::UpgradeActivated { kind, remaining });
        remaining
    }

    /// Count every upgrade down and drop the ones that ran out.
    pub fn tick(&mut self, dt: f32, events: &mut EventBus) {
        for remaining in self.active.values_mut() {
            *remaining -= dt;
        }

        let before = self.active.len();
        self.active.retain(|&kind, remaining| {
            if *remaining > 0.0 {
                return true;
            }
            info!("upgrade {kind:?} expired");
            events.publish(WeaponEvent::UpgradeExpired { kind });
            false
        });
        if self.active.len() != before {
            self.changed = true;
        }
    }

    /// Remove everything, reporting an expiry for each entry.
    pub fn clear_all_upgrades(&mut self, events: &mut EventBus) {
        if self.active.is_empty() {
            return;
        }
        for kind in std::mem::take(&mut self.active).into_keys() {
            events.publish(WeaponEvent::UpgradeExpired { kind });
        }
        self.changed = true;
    }

    pub fn is_active(&self, kind: UpgradeKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn remaining(&self, kind: UpgradeKind) -> Option<f32> {
        self.active.get(&kind).copied()
    }

    /// Active kinds in a stable order.
    pub fn active_kinds(&self) -> impl Iterator<Item = UpgradeKind> + '_ {
        self.active.keys().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Interval divisor contributed by the RapidFire upgrade.
    pub fn rapid_fire_multiplier(&self, boosts: &BoostTuning) -> f32 {
        if self.is_active(UpgradeKind::RapidFire) {
            boosts.upgrade_rapid_fire_multiplier
        } else {
            1.0
        }
    }

    /// Whether the active set changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}
