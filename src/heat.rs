//! Weapon heat and the overheat lockout.
//!
//! ```text
//!   Cool ──(heat reaches max)──> Overheated ──(cooldown elapsed, heat below max)──> Cool
//! ```
//!
//! Heat only rises from shots, is clamped to `[0, max_heat]`, decays at the base
//! rate while the trigger is released and at the overheat rate while locked out.
//! It never decays while the weapon is actively firing.

use crate::config::HeatTuning;

/// Slack for float accumulation: 125 shots of 0.8 must count as 100.
const HEAT_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeatPhase {
    #[default]
    Cool,
    Overheated,
}

/// Reported when a heat update crosses a phase boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatTransition {
    Overheated,
    Cooled,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeatState {
    heat: f32,
    phase: HeatPhase,
    cooldown_remaining: f32,
}

impl HeatState {
    pub fn heat(&self) -> f32 {
        self.heat
    }

    pub fn phase(&self) -> HeatPhase {
        self.phase
    }

    pub fn is_overheated(&self) -> bool {
        self.phase == HeatPhase::Overheated
    }

    pub fn can_fire(&self) -> bool {
        self.phase == HeatPhase::Cool
    }

    /// Remaining forced lockout, zero when cool.
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Heat as a fraction of the maximum, for HUD bars.
    pub fn normalized(&self, tuning: &HeatTuning) -> f32 {
        (self.heat / tuning.max_heat).clamp(0.0, 1.0)
    }

    /// Add heat from a shot.
    ///
    /// Ignored while overheated. Reaching the maximum switches to
    /// [`HeatPhase::Overheated`] and starts the cooldown timer.
    pub fn add_heat(&mut self, amount: f32, tuning: &HeatTuning) -> Option<HeatTransition> {
        if self.phase == HeatPhase::Overheated || amount <= 0.0 {
            return None;
        }

        self.heat = (self.heat + amount).min(tuning.max_heat);
        if self.heat >= tuning.max_heat - HEAT_EPSILON {
            self.heat = tuning.max_heat;
            self.phase = HeatPhase::Overheated;
            self.cooldown_remaining = tuning.overheat_cooldown;
            return Some(HeatTransition::Overheated);
        }
        None
    }

    /// Advance decay and the overheat timer.
    ///
    /// # Arguments
    /// * `dt` - Tick length in seconds
    /// * `firing` - Whether the weapon fired or tried to fire this tick
    /// * `tuning` - Resolved heat tuning
    pub fn tick(&mut self, dt: f32, firing: bool, tuning: &HeatTuning) -> Option<HeatTransition> {
        match self.phase {
            HeatPhase::Cool => {
                if !firing {
                    self.heat = (self.heat - tuning.decay_rate * dt).max(0.0);
                }
                None
            }
            HeatPhase::Overheated => {
                self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
                self.heat = (self.heat - tuning.overheat_decay_rate * dt).max(0.0);

                let heat_reduced =
                    self.heat < tuning.max_heat - HEAT_EPSILON || tuning.overheat_decay_rate <= 0.0;
                if self.cooldown_remaining <= 0.0 && heat_reduced {
                    self.phase = HeatPhase::Cool;
                    Some(HeatTransition::Cooled)
                } else {
                    None
                }
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
