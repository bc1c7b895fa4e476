//! Weapons simulation - one owner for every piece of weapon state.
//!
//! The host drives it with three entry points:
//!
//! - [`WeaponsSimulation::tick`] once per fixed step
//! - [`WeaponsSimulation::on_collision`] for contacts the host detects itself
//! - [`WeaponsSimulation::handle_signal`] for game start/restart and pickups
//!
//! and drains [`WeaponEvent`]s afterwards. Nothing in here is global; several
//! simulations can run side by side (e.g. for replays).

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::beam::BeamWeapon;
use crate::config::{WeaponConfig, WeaponTuning};
use crate::enhanced::EnhancedProjectile;
use crate::events::{EventBus, GameSignal, PickupKind, WeaponEvent};
use crate::modifiers::{PermanentUpgrade, WeaponModifiers};
use crate::pool::{ObjectPool, PoolHandle};
use crate::projectile::{CombatContext, HitOutcome, PooledProjectile, Projectile, ProjectileStatus};
use crate::smart_bomb::SmartBombLauncher;
use crate::types::{CombatWorld, ProjectileKind, ProjectileRef, TargetId, UpgradeKind};
use crate::upgrades::WeaponUpgradeManager;
use crate::weapon::{FireInput, ShotRequest, WeaponSystem};

/// Position and size of a live projectile, for hosts doing their own collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    pub projectile: ProjectileRef,
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Resource)]
pub struct WeaponsSimulation {
    config: WeaponConfig,
    tuning: WeaponTuning,
    weapon: WeaponSystem,
    upgrades: WeaponUpgradeManager,
    permanent: Vec<PermanentUpgrade>,
    permanent_modifiers: WeaponModifiers,
    modifiers: WeaponModifiers,
    beam: BeamWeapon,
    smart_bombs: SmartBombLauncher,
    projectiles: ObjectPool<Projectile>,
    enhanced: ObjectPool<EnhancedProjectile>,
    events: EventBus,
    rng: StdRng,
    // Per-tick scratch buffers
    shots: Vec<ShotRequest>,
    handles: Vec<PoolHandle>,
    scratch: Vec<TargetId>,
    contacts: Vec<TargetId>,
}

impl Default for WeaponsSimulation {
    fn default() -> Self {
        Self::new(WeaponConfig::default())
    }
}

impl WeaponsSimulation {
    pub fn new(config: WeaponConfig) -> Self {
        let tuning = config.resolve();
        let prewarm = tuning.simulation.pool_prewarm;
        Self {
            weapon: WeaponSystem::default(),
            upgrades: WeaponUpgradeManager::default(),
            permanent: Vec::new(),
            permanent_modifiers: WeaponModifiers::default(),
            modifiers: WeaponModifiers::default(),
            beam: BeamWeapon::new(),
            smart_bombs: SmartBombLauncher::new(&tuning.smart_bomb),
            projectiles: ObjectPool::new(prewarm),
            enhanced: ObjectPool::new(prewarm / 4),
            events: EventBus::default(),
            rng: StdRng::seed_from_u64(tuning.simulation.rng_seed),
            shots: Vec::new(),
            handles: Vec::new(),
            scratch: Vec::with_capacity(tuning.simulation.max_query_results),
            contacts: Vec::with_capacity(tuning.simulation.max_query_results),
            config,
            tuning,
        }
    }

    /// Prepare for the first tick.
    pub fn init(&mut self) {
        self.recompute_modifiers();
        self.smart_bombs.refill(&self.tuning.smart_bomb);
        info!(
            "weapons simulation ready: {} + {} pooled projectiles",
            self.projectiles.capacity(),
            self.enhanced.capacity()
        );
    }

    /// Swap in a new configuration. Live projectiles keep their spawn values.
    pub fn set_config(&mut self, config: WeaponConfig) {
        self.tuning = config.resolve();
        self.config = config;
        self.recompute_modifiers();
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    pub fn tuning(&self) -> &WeaponTuning {
        &self.tuning
    }

    pub fn weapon(&self) -> &WeaponSystem {
        &self.weapon
    }

    pub fn upgrades(&self) -> &WeaponUpgradeManager {
        &self.upgrades
    }

    pub fn modifiers(&self) -> &WeaponModifiers {
        &self.modifiers
    }

    pub fn beam(&self) -> &BeamWeapon {
        &self.beam
    }

    pub fn smart_bombs(&self) -> &SmartBombLauncher {
        &self.smart_bombs
    }

    pub fn projectile_pool(&self) -> &ObjectPool<Projectile> {
        &self.projectiles
    }

    pub fn enhanced_pool(&self) -> &ObjectPool<EnhancedProjectile> {
        &self.enhanced
    }

    pub fn active_projectile_count(&self) -> usize {
        self.projectiles.active_count() + self.enhanced.active_count()
    }

    /// Every live projectile of both flavors, written into `out` (cleared first).
    pub fn projectile_snapshots(&self, out: &mut Vec<ProjectileSnapshot>) {
        out.clear();
        let mut handles = Vec::new();

        self.projectiles.active_handles(&mut handles);
        out.extend(handles.iter().filter_map(|&handle| {
            self.projectiles.get_ref(handle).map(|p| ProjectileSnapshot {
                projectile: ProjectileRef {
                    kind: ProjectileKind::Standard,
                    handle,
                },
                position: p.position,
                radius: p.radius(),
            })
        }));

        self.enhanced.active_handles(&mut handles);
        out.extend(handles.iter().filter_map(|&handle| {
            self.enhanced.get_ref(handle).map(|p| ProjectileSnapshot {
                projectile: ProjectileRef {
                    kind: ProjectileKind::Enhanced,
                    handle,
                },
                position: p.position(),
                radius: p.radius(),
            })
        }));
    }

    /// Events published since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = WeaponEvent> + '_ {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[WeaponEvent] {
        self.events.pending()
    }

    /// Grant an upgrade for the rest of the run.
    pub fn add_permanent_upgrade(&mut self, upgrade: PermanentUpgrade) {
        info!("permanent upgrade {}", upgrade.name);
        self.permanent.push(upgrade);
        self.permanent_modifiers =
            WeaponModifiers::from_effects(self.permanent.iter().flat_map(|u| u.effects.iter()));
        self.recompute_modifiers();
    }

    pub fn permanent_upgrades(&self) -> &[PermanentUpgrade] {
        &self.permanent
    }

    /// Start or extend a timed upgrade. `None` uses the configured duration.
    pub fn activate_upgrade(&mut self, kind: UpgradeKind, duration: Option<f32>) -> f32 {
        let remaining =
            self.upgrades
                .activate_upgrade(kind, duration, &self.tuning.upgrades, &mut self.events);
        if self.upgrades.take_changed() {
            self.recompute_modifiers();
        }
        remaining
    }

    fn recompute_modifiers(&mut self) {
        let temporary = WeaponModifiers::from_timed_upgrades(self.upgrades.active_kinds(), &self.tuning);
        self.modifiers = WeaponModifiers::combine(&self.permanent_modifiers, &temporary);
        self.smart_bombs
            .set_bonus(self.modifiers.bonus_smart_bombs, &self.tuning.smart_bomb);
        debug!("weapon modifiers now {:?}", self.modifiers);
    }

    /// React to a game-wide signal.
    pub fn handle_signal(&mut self, signal: GameSignal) {
        match signal {
            GameSignal::GameStarted => {
                info!("game started");
                self.restart();
            }
            GameSignal::GameRestarted => {
                info!("game restarted");
                self.restart();
            }
            GameSignal::PickupCollected(pickup) => self.collect_pickup(pickup),
        }
    }

    fn collect_pickup(&mut self, pickup: PickupKind) {
        debug!("pickup collected: {pickup:?}");
        match pickup {
            PickupKind::Upgrade(kind) => {
                self.activate_upgrade(kind, None);
            }
            PickupKind::PowerUp => self.weapon.raise_power_level(&self.tuning, &mut self.events),
            PickupKind::RapidFireBoost => self.weapon.activate_rapid_fire(&self.tuning),
            PickupKind::DamageBoost => self.weapon.activate_damage_boost(&self.tuning),
            PickupKind::SmartBomb => {
                self.smart_bombs.add_charge(&self.tuning.smart_bomb);
            }
        }
    }

    /// Wipe transient state: upgrades, heat, power level, live projectiles, beam.
    ///
    /// Permanent upgrades survive.
    pub fn restart(&mut self) {
        self.upgrades.clear_all_upgrades(&mut self.events);
        self.upgrades.take_changed();
        self.weapon.reset(&mut self.events);
        let returned = self.projectiles.return_all() + self.enhanced.return_all();
        self.beam.stop(&mut self.events);
        self.recompute_modifiers();
        self.smart_bombs.refill(&self.tuning.smart_bomb);
        debug!("restart returned {returned} live projectiles");
    }

    /// Fire a smart bomb at `center` if a charge is available.
    pub fn detonate_smart_bomb(&mut self, center: Vec2, world: &mut dyn CombatWorld) -> Option<u32> {
        self.smart_bombs.detonate(
            center,
            &self.tuning.smart_bomb,
            self.tuning.simulation.max_query_results,
            world,
            &mut self.events,
        )
    }

    /// Advance everything by one step.
    ///
    /// Order: timed upgrades, modifier refresh, weapon firing, spawning,
    /// projectile flight and contacts, returns to the pools, beam, smart bomb.
    ///
    /// # Arguments
    /// * `dt` - Step length in seconds
    /// * `input` - Input sampled for this step
    /// * `world` - Targets and obstacles
    pub fn tick(&mut self, dt: f32, input: &FireInput, world: &mut dyn CombatWorld) {
        self.upgrades.tick(dt, &mut self.events);
        if self.upgrades.take_changed() {
            self.recompute_modifiers();
        }

        let upgrade_rapid_fire = self.upgrades.rapid_fire_multiplier(&self.tuning.boosts);
        self.shots.clear();
        self.weapon.update(
            dt,
            input,
            &self.tuning,
            &self.modifiers,
            upgrade_rapid_fire,
            &mut self.events,
            &mut self.shots,
        );
        self.spawn_shots();

        self.tick_projectiles(dt, world);

        if input.beam_held {
            let damage_multiplier = self.modifiers.damage_multiplier
                * self.weapon.damage_boost_multiplier(&self.tuning);
            self.beam.fire(input.origin, input.aim, damage_multiplier, &mut self.events);
        } else {
            self.beam.stop(&mut self.events);
        }
        self.beam.tick(dt, &self.tuning.beam, world, &mut self.events);

        if input.smart_bomb {
            self.detonate_smart_bomb(input.origin, world);
        }
    }

    fn spawn_shots(&mut self) {
        let enhanced = self.modifiers.needs_enhanced_projectile();
        for shot in &self.shots {
            if enhanced {
                let handle = self.enhanced.get(shot.position, shot.direction);
                if let Some(projectile) = self.enhanced.get_mut(handle) {
                    projectile.initialize(&shot.params, &self.modifiers);
                }
            } else {
                let handle = self.projectiles.get(shot.position, shot.direction);
                if let Some(projectile) = self.projectiles.get_mut(handle) {
                    projectile.initialize(&shot.params);
                }
            }
        }
    }

    fn tick_projectiles(&mut self, dt: f32, world: &mut dyn CombatWorld) {
        let auto_collide = self.tuning.simulation.auto_collide;
        let mut ctx = CombatContext {
            world,
            events: &mut self.events,
            rng: &mut self.rng,
            scratch: &mut self.scratch,
            max_query_results: self.tuning.simulation.max_query_results,
        };

        tick_pool(
            &mut self.projectiles,
            dt,
            auto_collide,
            &mut self.handles,
            &mut self.contacts,
            &mut ctx,
        );
        tick_pool(
            &mut self.enhanced,
            dt,
            auto_collide,
            &mut self.handles,
            &mut self.contacts,
            &mut ctx,
        );
    }

    /// Report a contact the host detected between a projectile and a target.
    ///
    /// Stale projectile handles are ignored. A projectile spent by the hit goes
    /// straight back to its pool.
    pub fn on_collision(
        &mut self,
        projectile: ProjectileRef,
        target: TargetId,
        world: &mut dyn CombatWorld,
    ) -> HitOutcome {
        let mut ctx = CombatContext {
            world,
            events: &mut self.events,
            rng: &mut self.rng,
            scratch: &mut self.scratch,
            max_query_results: self.tuning.simulation.max_query_results,
        };
        match projectile.kind {
            ProjectileKind::Standard => {
                collide_pooled(&mut self.projectiles, projectile.handle, target, &mut ctx)
            }
            ProjectileKind::Enhanced => {
                collide_pooled(&mut self.enhanced, projectile.handle, target, &mut ctx)
            }
        }
    }
}

fn collide_pooled<T: PooledProjectile>(
    pool: &mut ObjectPool<T>,
    handle: PoolHandle,
    target: TargetId,
    ctx: &mut CombatContext,
) -> HitOutcome {
    let Some(projectile) = pool.get_mut(handle) else {
        return HitOutcome::Ignored;
    };
    let outcome = projectile.on_collision(target, ctx);
    if !projectile.is_active() {
        pool.return_instance(handle);
    }
    outcome
}

/// Fly every live projectile in `pool` and return the ones that finished.
fn tick_pool<T: PooledProjectile>(
    pool: &mut ObjectPool<T>,
    dt: f32,
    auto_collide: bool,
    handles: &mut Vec<PoolHandle>,
    contacts: &mut Vec<TargetId>,
    ctx: &mut CombatContext,
) {
    pool.active_handles(handles);
    for &handle in handles.iter() {
        let Some(projectile) = pool.get_mut(handle) else {
            continue;
        };

        match projectile.tick(dt, ctx) {
            ProjectileStatus::Expired => {
                ctx.events.publish(WeaponEvent::ProjectileExpired {
                    position: projectile.position(),
                });
            }
            ProjectileStatus::Active if auto_collide => {
                contacts.clear();
                ctx.world.overlap_circle(
                    projectile.position(),
                    projectile.radius(),
                    ctx.max_query_results,
                    contacts,
                );
                for &target in contacts.iter() {
                    if projectile.on_collision(target, ctx) == HitOutcome::Consumed {
                        break;
                    }
                }
            }
            _ => {}
        }

        if !projectile.is_active() {
            pool.return_instance(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::config::{FiringConfig, SimulationConfig};
    use crate::modifiers::{ExplosionParams, UpgradeEffect};
    use crate::types::TargetRegistry;

    fn firing(aim: Vec2) -> FireInput {
        FireInput {
            fire_held: true,
            aim,
            ..Default::default()
        }
    }

    #[test]
    fn test_fired_projectiles_hit_and_return_to_pool() {
        let mut sim = WeaponsSimulation::default();
        sim.init();
        let mut arena = Arena::default();
        let target = arena.spawn_target(Vec2::new(0.0, 3.0), 0.5, 100);

        sim.tick(1.0 / 60.0, &firing(Vec2::Y), &mut arena);
        assert_eq!(sim.active_projectile_count(), 1);

        let idle = FireInput::default();
        for _ in 0..60 {
            sim.tick(1.0 / 60.0, &idle, &mut arena);
        }

        assert_eq!(arena.health(target), Some(88));
        assert_eq!(sim.active_projectile_count(), 0);
        let stats = sim.projectile_pool().stats();
        assert_eq!(stats.gets, stats.returns);
    }

    #[test]
    fn test_missed_projectiles_expire_exactly_once() {
        let mut sim = WeaponsSimulation::default();
        let mut arena = Arena::default();

        sim.tick(0.1, &firing(Vec2::X), &mut arena);
        let idle = FireInput::default();
        for _ in 0..50 {
            sim.tick(0.1, &idle, &mut arena);
        }

        let expired = sim
            .drain_events()
            .filter(|e| matches!(e, WeaponEvent::ProjectileExpired { .. }))
            .count();
        assert_eq!(expired, 1);
        assert_eq!(sim.projectile_pool().stats().returns, 1);
    }

    #[test]
    fn test_host_driven_collision() {
        let config = WeaponConfig {
            simulation: Some(SimulationConfig {
                auto_collide: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut sim = WeaponsSimulation::new(config);
        let mut arena = Arena::default();
        let far = arena.spawn_target(Vec2::new(50.0, 50.0), 0.5, 100);

        sim.tick(0.01, &firing(Vec2::Y), &mut arena);
        let mut live = Vec::new();
        sim.projectile_snapshots(&mut live);
        assert_eq!(live.len(), 1);

        let shot = live[0].projectile;
        assert_eq!(sim.on_collision(shot, far, &mut arena), HitOutcome::Consumed);
        assert_eq!(sim.on_collision(shot, far, &mut arena), HitOutcome::Ignored);
        assert_eq!(sim.active_projectile_count(), 0);
        assert_eq!(arena.health(far), Some(88));
    }

    #[test]
    fn test_explosion_upgrade_uses_enhanced_pool() {
        let mut sim = WeaponsSimulation::default();
        sim.add_permanent_upgrade(PermanentUpgrade::new(
            "Blast Rounds",
            [UpgradeEffect::Explosion(ExplosionParams {
                radius: 2.0,
                damage_fraction: 0.5,
            })],
        ));
        let mut arena = Arena::default();
        let first = arena.spawn_target(Vec2::new(0.0, 3.0), 0.5, 100);
        let neighbor = arena.spawn_target(Vec2::new(1.0, 3.5), 0.3, 100);

        sim.tick(1.0 / 60.0, &firing(Vec2::Y), &mut arena);
        assert_eq!(sim.enhanced_pool().active_count(), 1);

        let idle = FireInput::default();
        for _ in 0..30 {
            sim.tick(1.0 / 60.0, &idle, &mut arena);
        }
        assert_eq!(arena.health(first), Some(88));
        assert_eq!(arena.health(neighbor), Some(94));
        assert_eq!(sim.enhanced_pool().active_count(), 0);
    }

    #[test]
    fn test_upgrade_pickup_changes_pattern_until_expiry() {
        let mut sim = WeaponsSimulation::default();
        let mut arena = Arena::default();
        sim.handle_signal(GameSignal::PickupCollected(PickupKind::Upgrade(
            UpgradeKind::SpreadShot,
        )));
        assert!(sim.modifiers().spread_shot);

        sim.tick(0.01, &firing(Vec2::Y), &mut arena);
        assert_eq!(sim.active_projectile_count(), 3);

        let duration = sim.tuning().upgrades.spread_shot;
        sim.tick(duration + 0.1, &FireInput::default(), &mut arena);
        assert!(!sim.modifiers().spread_shot);
        assert!(sim
            .drain_events()
            .any(|e| e == WeaponEvent::UpgradeExpired { kind: UpgradeKind::SpreadShot }));
    }

    #[test]
    fn test_restart_wipes_transient_state() {
        let config = WeaponConfig {
            firing: Some(FiringConfig {
                auto_upgrade_pattern: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut sim = WeaponsSimulation::new(config);
        let mut arena = Arena::default();
        for _ in 0..4 {
            sim.handle_signal(GameSignal::PickupCollected(PickupKind::PowerUp));
        }
        sim.activate_upgrade(UpgradeKind::Homing, None);
        let beam_input = FireInput {
            fire_held: true,
            beam_held: true,
            ..Default::default()
        };
        sim.tick(0.01, &beam_input, &mut arena);
        assert!(sim.active_projectile_count() > 1);
        assert!(sim.beam().is_active());

        sim.handle_signal(GameSignal::GameRestarted);
        assert_eq!(sim.weapon().power_level(), 0);
        assert_eq!(sim.weapon().heat().heat(), 0.0);
        assert_eq!(sim.upgrades().active_count(), 0);
        assert_eq!(sim.active_projectile_count(), 0);
        assert!(!sim.beam().is_active());
    }

    #[test]
    fn test_damage_boost_scales_beam() {
        let mut sim = WeaponsSimulation::default();
        sim.init();
        let mut arena = Arena::default();
        let target = arena.spawn_target(Vec2::new(0.0, 3.0), 0.5, 1_000);
        sim.handle_signal(GameSignal::PickupCollected(PickupKind::DamageBoost));

        let beam = FireInput {
            beam_held: true,
            ..Default::default()
        };
        for _ in 0..60 {
            sim.tick(1.0 / 60.0, &beam, &mut arena);
        }

        // 30 dps doubled for one second
        let dealt = 1_000 - arena.health(target).unwrap_or(1_000);
        assert!((59..=60).contains(&dealt), "dealt {dealt}");
    }

    #[test]
    fn test_smart_bomb_from_input() {
        let mut sim = WeaponsSimulation::default();
        sim.init();
        let mut arena = Arena::default();
        let target = arena.spawn_target(Vec2::new(3.0, 0.0), 0.5, 100);

        let bomb = FireInput {
            smart_bomb: true,
            ..Default::default()
        };
        sim.tick(0.01, &bomb, &mut arena);
        assert!(!arena.is_alive(target));
        assert_eq!(sim.smart_bombs().charges(), 0);
    }
}
