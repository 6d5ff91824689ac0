use bevy::prelude::*;
use rand::rngs::StdRng;

use super::config::BossConfig;
use super::cores::{CoreGroupTracker, CoreId, CoreTransition};
use super::effect::BossEffect;
use super::eye::{EyePosition, EyeRig};
use super::pattern::{AttackPattern, AttackPatternSelector};
use super::projectile::{ProjectileId, ProjectileSet};
use super::sequence::{Sequence, SequenceId, SequenceRunner};
use super::signal::Signal;
use super::skills::SkillIo;
use super::state_machine::{State, StateKey, StateMachine};
use super::states::{
    AttackSelectState, CoreExplosionState, DefenceState, EmpState, EyeLaserState, GroggyState,
    IdleState,
};

/// Attack-select hands over to an attack, which may bail straight to
/// Defence. Anything longer than this is a loop between states.
const MAX_CHAINED_TRANSITIONS: usize = 8;

/// Where the boss's parts sit when the encounter starts.
#[derive(Debug, Clone)]
pub struct BossLayout {
    /// Center of the boss, used for the search range.
    pub position: Vec3,
    /// Resting (lowered) spot of the eye.
    pub eye_rest: Vec3,
    /// Where lasers leave the boss. None disables the laser.
    pub fire_point: Option<Vec3>,
    pub cores: Vec<CoreId>,
}

/// Everything the states work with, minus the state machine itself.
///
/// The machine lives next to this in [`BossController`]. The mutating
/// helpers are `pub(super)`: only the states and the controller write boss
/// invincibility and core vulnerability.
pub struct BossContext {
    config: BossConfig,
    tracker: CoreGroupTracker,
    selector: AttackPatternSelector,
    eye: EyeRig,
    projectiles: ProjectileSet,
    sequences: SequenceRunner,
    effects: Vec<BossEffect>,
    boss_invincible: bool,
    position: Vec3,
    fire_point: Option<Vec3>,
    target: Option<Vec3>,
    pending: Option<StateKey>,
    on_laser_started: Signal<()>,
    on_laser_ended: Signal<()>,
}

impl BossContext {
    pub fn config(&self) -> &BossConfig {
        &self.config
    }

    /// Ask for a transition once the current hook returns.
    ///
    /// A later request in the same hook replaces an earlier one.
    pub fn request<S: 'static>(&mut self) {
        self.pending = Some(StateKey::of::<S>());
    }

    pub fn all_cores_eliminated(&self) -> bool {
        self.tracker.all_eliminated()
    }

    pub fn live_core_ids(&self) -> Vec<CoreId> {
        self.tracker.live_ids()
    }

    pub fn is_target_in_range(&self) -> bool {
        self.target
            .is_some_and(|target| target.distance(self.position) <= self.config.search_range)
    }

    pub fn eye_position(&self) -> EyePosition {
        self.eye.position()
    }

    pub fn is_sequence_running(&self, id: SequenceId) -> bool {
        self.sequences.is_running(id)
    }

    pub(super) fn select_attack(&mut self) -> AttackPattern {
        self.selector.select_next(self.tracker.all_eliminated())
    }

    pub(super) fn start_sequence(&mut self, sequence: impl Sequence) -> SequenceId {
        self.sequences.start(sequence)
    }

    pub(super) fn stop_sequence(&mut self, id: SequenceId) -> bool {
        self.sequences.stop(id)
    }

    pub(super) fn stop_all_sequences(&mut self) {
        self.sequences.stop_all();
    }

    pub(super) fn emit(&mut self, effect: BossEffect) {
        self.effects.push(effect);
    }

    pub(super) fn set_cores_vulnerable(&mut self, vulnerable: bool) {
        self.tracker.set_all_vulnerable(vulnerable);
        for core in self.tracker.live_ids() {
            self.effects
                .push(BossEffect::CoreVulnerable { core, vulnerable });
        }
    }

    /// Only emits when the flag actually changes.
    pub(super) fn set_boss_invincible(&mut self, invincible: bool) {
        if self.boss_invincible == invincible {
            return;
        }
        self.boss_invincible = invincible;
        self.effects.push(BossEffect::BossInvincible(invincible));
    }

    pub(super) fn raise_eye(&mut self) {
        if let Some(active) = self.eye.request(EyePosition::Raised) {
            self.effects.push(BossEffect::EyeActive(active));
        }
    }

    pub(super) fn lower_eye(&mut self) {
        if let Some(active) = self.eye.request(EyePosition::Lowered) {
            self.effects.push(BossEffect::EyeActive(active));
        }
    }

    pub(super) fn notify_laser_started(&mut self) {
        self.on_laser_started.emit(&());
    }

    pub(super) fn notify_laser_ended(&mut self) {
        self.on_laser_ended.emit(&());
    }

    /// React to the core set flipping between "some alive" and "all gone".
    fn apply_core_transition(&mut self, transition: CoreTransition) {
        match transition {
            CoreTransition::AllDestroyed => {
                self.set_boss_invincible(false);
                self.effects.push(BossEffect::ShieldActive(false));
                info!("boss shield down, eye exposed");
                self.raise_eye();
            }
            CoreTransition::Recovered => {
                self.set_boss_invincible(true);
                self.effects.push(BossEffect::ShieldActive(true));
                info!("boss shield back up, eye hidden");
                self.lower_eye();
            }
            CoreTransition::Unchanged => {}
        }
    }

    fn step_eye(&mut self, delta: f32) {
        if let Some(active) = self.eye.step(delta) {
            self.effects.push(BossEffect::EyeActive(active));
        }
        self.eye.face(self.target);
    }

    fn resume_sequences(&mut self, delta: f32) {
        let mut io = SkillIo {
            tracker: &self.tracker,
            projectiles: &mut self.projectiles,
            effects: &mut self.effects,
            target: self.target,
            fire_point: self.fire_point,
        };
        self.sequences.resume_all(delta, &mut io);
    }
}

/// The space boss: core group, attack bag, eye, lasers and the state machine
/// that strings them together.
///
/// Engine independent. The host calls [`BossController::update`] once per
/// frame, forwards what happened in the world (core destroyed, eye hit, boss
/// killed, target moved) and applies whatever [`BossController::drain_effects`]
/// returns.
pub struct BossController {
    machine: StateMachine<BossContext>,
    cx: BossContext,
    defeated: bool,
}

impl BossController {
    pub fn new(config: BossConfig, layout: BossLayout, rng: StdRng) -> Self {
        if layout.fire_point.is_none() {
            error!("boss has no laser fire point, eye laser will not fire");
        }
        if layout.cores.is_empty() {
            warn!("boss spawned without cores, it starts exposed");
        }

        let tracker = CoreGroupTracker::new(layout.cores);
        let boss_invincible = !tracker.all_eliminated();

        let mut machine = StateMachine::default();
        machine.add_state(IdleState);
        machine.add_state(DefenceState::new(&config));
        machine.add_state(AttackSelectState);
        machine.add_state(CoreExplosionState::default());
        machine.add_state(EyeLaserState::default());
        machine.add_state(EmpState::new(&config));
        machine.add_state(GroggyState::new(&config));

        let mut cx = BossContext {
            eye: EyeRig::new(layout.eye_rest, config.eye_raise_height, config.eye_move_speed),
            config,
            tracker,
            selector: AttackPatternSelector::new(rng),
            projectiles: ProjectileSet::default(),
            sequences: SequenceRunner::default(),
            effects: vec![
                BossEffect::BossInvincible(boss_invincible),
                BossEffect::ShieldActive(boss_invincible),
            ],
            boss_invincible,
            position: layout.position,
            fire_point: layout.fire_point,
            target: None,
            pending: None,
            on_laser_started: Signal::default(),
            on_laser_ended: Signal::default(),
        };
        for core in cx.tracker.live_ids() {
            if let Some(vulnerable) = cx.tracker.is_vulnerable(core) {
                cx.effects.push(BossEffect::CoreVulnerable { core, vulnerable });
            }
        }
        if cx.tracker.all_eliminated() {
            cx.raise_eye();
        }

        let mut controller = Self {
            machine,
            cx,
            defeated: false,
        };
        controller.change_state::<IdleState>();
        controller
    }

    /// Advance the fight by one tick.
    ///
    /// Order within a tick: eye motion, projectile flight, skill sequences,
    /// then the active state's update, then any transition it asked for.
    pub fn update(&mut self, delta: f32) {
        if self.defeated {
            return;
        }

        self.cx.step_eye(delta);
        self.cx.projectiles.advance(delta);
        self.cx.resume_sequences(delta);
        self.machine.update(&mut self.cx, delta);
        self.apply_pending_transitions();
    }

    /// Start the fight from Idle. Ignored in any other state.
    pub fn engage(&mut self) {
        if self.defeated || !self.machine.is_in::<IdleState>() {
            debug!("engage ignored, boss is not idle");
            return;
        }
        self.change_state::<DefenceState>();
    }

    pub fn on_core_destroyed(&mut self, core: CoreId) {
        let transition = self.cx.tracker.remove(core);
        self.cx.apply_core_transition(transition);
    }

    pub fn recover_core(&mut self, core: CoreId) {
        if self.cx.tracker.contains(core) {
            warn!("core {:?} is already live", core);
            return;
        }
        let transition = self.cx.tracker.add(core);
        if let Some(vulnerable) = self.cx.tracker.is_vulnerable(core) {
            self.cx.emit(BossEffect::CoreVulnerable { core, vulnerable });
        }
        self.cx.apply_core_transition(transition);
    }

    /// A hit on the eye knocks the boss into Groggy, whatever it was doing.
    /// Another hit while groggy does not restart the timer.
    pub fn on_eye_damaged(&mut self) {
        if self.defeated {
            return;
        }
        info!("eye hit, boss is groggy");
        self.change_state::<GroggyState>();
    }

    /// The boss died. Outstanding skills are cancelled and the controller
    /// stops ticking; the host handles the scene transition.
    pub fn on_boss_destroyed(&mut self) {
        if self.defeated {
            return;
        }
        info!("space boss destroyed");
        self.defeated = true;
        self.stop_all_sequences();
        self.cx.emit(BossEffect::Defeated);
    }

    /// Cancel every running skill. Nothing a cancelled skill was waiting to
    /// do will happen.
    pub fn stop_all_sequences(&mut self) {
        self.cx.sequences.stop_all();
    }

    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.cx.target = target;
    }

    pub fn despawn_projectile(&mut self, id: ProjectileId) -> bool {
        self.cx.projectiles.despawn(id)
    }

    /// Take every effect produced since the last drain.
    pub fn drain_effects(&mut self) -> Vec<BossEffect> {
        std::mem::take(&mut self.cx.effects)
    }

    // ── Notifications ───────────────────────────────────────────────────────

    pub fn on_all_cores_destroyed(&mut self) -> &mut Signal<()> {
        &mut self.cx.tracker.on_all_destroyed
    }

    pub fn on_core_recovered(&mut self) -> &mut Signal<CoreId> {
        &mut self.cx.tracker.on_recovered
    }

    pub fn on_laser_started(&mut self) -> &mut Signal<()> {
        &mut self.cx.on_laser_started
    }

    pub fn on_laser_ended(&mut self) -> &mut Signal<()> {
        &mut self.cx.on_laser_ended
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn eye(&self) -> &EyeRig {
        &self.cx.eye
    }

    pub fn projectiles(&self) -> &ProjectileSet {
        &self.cx.projectiles
    }

    fn change_state<S: State<BossContext>>(&mut self) {
        self.machine.change_state::<S>(&mut self.cx);
        self.apply_pending_transitions();
    }

    fn apply_pending_transitions(&mut self) {
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            let Some(key) = self.cx.pending.take() else {
                return;
            };
            self.machine.change_to(key, &mut self.cx);
        }

        if let Some(key) = self.cx.pending.take() {
            error!(
                "more than {} chained transitions, dropping request for {}",
                MAX_CHAINED_TRANSITIONS,
                key.name()
            );
        }
    }
}

#[cfg(test)]
impl BossController {
    pub fn is_in<S: 'static>(&self) -> bool {
        self.machine.is_in::<S>()
    }

    pub fn current_state_name(&self) -> Option<&'static str> {
        self.machine.current_name()
    }

    pub fn boss_invincible(&self) -> bool {
        self.cx.boss_invincible
    }

    pub fn all_cores_eliminated(&self) -> bool {
        self.cx.tracker.all_eliminated()
    }

    pub fn live_cores(&self) -> Vec<CoreId> {
        self.cx.tracker.live_ids()
    }

    pub fn core_vulnerable(&self, core: CoreId) -> Option<bool> {
        self.cx.tracker.is_vulnerable(core)
    }

    pub fn active_sequences(&self) -> usize {
        self.cx.sequences.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use rand::SeedableRng;

    use super::*;

    const DT: f32 = 0.25;

    fn config() -> BossConfig {
        BossConfig {
            defence_duration: 1.0,
            emp_attack_duration: 1.0,
            emp_charge_delay: 0.5,
            groggy_duration: 1.0,
            explosion_delay: 1.0,
            laser_charge_duration: 0.5,
            tracking_duration: 0.5,
            laser_cooldown: 0.5,
            ..BossConfig::default()
        }
    }

    fn boss_with(cores: &[u32]) -> BossController {
        let mut boss = BossController::new(
            config(),
            BossLayout {
                position: Vec3::ZERO,
                eye_rest: Vec3::new(0.0, 2.0, 0.0),
                fire_point: Some(Vec3::new(0.0, 2.0, -1.0)),
                cores: cores.iter().copied().map(CoreId).collect(),
            },
            StdRng::seed_from_u64(7),
        );
        boss.drain_effects();
        boss
    }

    fn boss() -> BossController {
        boss_with(&[1, 2, 3])
    }

    /// Put the machine straight into `S`, the way an attack draw would.
    fn force<S: State<BossContext>>(boss: &mut BossController) {
        boss.change_state::<S>();
    }

    fn tick(boss: &mut BossController, ticks: usize) {
        for _ in 0..ticks {
            boss.update(DT);
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(&()) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move |_: &()| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn count(effects: &[BossEffect], wanted: &BossEffect) -> usize {
        effects.iter().filter(|effect| *effect == wanted).count()
    }

    #[test]
    fn starts_idle_and_invincible() {
        let mut boss = BossController::new(
            config(),
            BossLayout {
                position: Vec3::ZERO,
                eye_rest: Vec3::ZERO,
                fire_point: None,
                cores: vec![CoreId(1)],
            },
            StdRng::seed_from_u64(1),
        );

        assert!(boss.is_in::<IdleState>());
        assert!(boss.boss_invincible());
        assert_eq!(
            boss.drain_effects(),
            vec![
                BossEffect::BossInvincible(true),
                BossEffect::ShieldActive(true),
                BossEffect::CoreVulnerable {
                    core: CoreId(1),
                    vulnerable: true
                },
            ]
        );

        // No target, so Idle stays Idle.
        tick(&mut boss, 10);
        assert!(boss.is_in::<IdleState>());
    }

    #[test]
    fn destroying_every_core_then_recovering_one() {
        let mut boss = boss();
        let (destroyed, on_destroyed) = counter();
        boss.on_all_cores_destroyed().subscribe(on_destroyed);
        let recovered = Arc::new(AtomicUsize::new(0));
        let handle = recovered.clone();
        boss.on_core_recovered().subscribe(move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        });

        for id in [1, 2, 3] {
            boss.on_core_destroyed(CoreId(id));
        }
        // A late duplicate notification must not fire anything again.
        boss.on_core_destroyed(CoreId(3));

        let effects = boss.drain_effects();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(count(&effects, &BossEffect::BossInvincible(false)), 1);
        assert_eq!(count(&effects, &BossEffect::EyeActive(true)), 1);
        assert!(!boss.boss_invincible());
        assert_eq!(boss.eye().position(), EyePosition::Raised);

        boss.recover_core(CoreId(2));
        let effects = boss.drain_effects();
        assert_eq!(recovered.load(Ordering::SeqCst), 1);
        assert_eq!(count(&effects, &BossEffect::BossInvincible(true)), 1);
        assert!(boss.boss_invincible());
        assert_eq!(boss.eye().position(), EyePosition::Lowered);

        // The eye switches off once it has finished sliding down.
        tick(&mut boss, 200);
        assert!(!boss.eye().is_active());
        assert_eq!(count(&boss.drain_effects(), &BossEffect::EyeActive(false)), 1);
    }

    #[test]
    fn recovering_a_live_core_is_ignored() {
        let mut boss = boss();
        boss.recover_core(CoreId(1));

        assert_eq!(boss.live_cores().len(), 3);
        assert!(boss.drain_effects().is_empty());
    }

    #[test]
    fn defence_locks_cores_then_hands_over_to_an_attack() {
        let mut boss = boss();
        boss.engage();

        assert!(boss.is_in::<DefenceState>());
        assert!(boss.boss_invincible());
        for core in boss.live_cores() {
            assert_eq!(boss.core_vulnerable(core), Some(false));
        }

        // 1.0s of defence at 0.25s per tick.
        tick(&mut boss, 3);
        assert!(boss.is_in::<DefenceState>());
        tick(&mut boss, 1);

        assert!(!boss.is_in::<DefenceState>());
        assert!(!boss.is_in::<AttackSelectState>());
        assert!(
            boss.is_in::<CoreExplosionState>()
                || boss.is_in::<EyeLaserState>()
                || boss.is_in::<EmpState>()
        );
        for core in boss.live_cores() {
            assert_eq!(boss.core_vulnerable(core), Some(true));
        }
        // Cores are alive, so the boss itself stays invincible.
        assert!(boss.boss_invincible());
    }

    #[test]
    fn defence_shields_an_exposed_boss_only_while_it_lasts() {
        let mut boss = boss();
        for id in [1, 2, 3] {
            boss.on_core_destroyed(CoreId(id));
        }
        assert!(!boss.boss_invincible());

        boss.engage();
        assert!(boss.boss_invincible());

        tick(&mut boss, 4);
        assert!(!boss.is_in::<DefenceState>());
        assert!(!boss.boss_invincible());
    }

    #[test]
    fn losing_the_last_core_during_defence_exposes_the_boss_at_once() {
        let mut boss = boss();
        boss.engage();
        assert!(boss.boss_invincible());

        for id in [1, 2, 3] {
            boss.on_core_destroyed(CoreId(id));
        }

        // The core edge wins over Defence: no waiting for the timer.
        assert!(boss.is_in::<DefenceState>());
        assert!(!boss.boss_invincible());

        tick(&mut boss, 4);
        assert!(!boss.is_in::<DefenceState>());
        assert!(!boss.boss_invincible());
    }

    #[test]
    fn engage_outside_idle_is_ignored() {
        let mut boss = boss();
        boss.engage();
        tick(&mut boss, 2);
        boss.engage();

        // Still the same Defence activation: two more ticks finish it.
        tick(&mut boss, 2);
        assert!(!boss.is_in::<DefenceState>());
    }

    #[test]
    fn target_in_range_wakes_the_boss() {
        let mut boss = boss();
        boss.set_target(Some(Vec3::new(100.0, 0.0, 0.0)));
        tick(&mut boss, 1);
        assert!(boss.is_in::<IdleState>());

        boss.set_target(Some(Vec3::new(5.0, 0.0, 0.0)));
        tick(&mut boss, 1);
        assert!(boss.is_in::<DefenceState>());
    }

    #[test]
    fn eye_hit_while_groggy_does_not_restart_the_timer() {
        let mut boss = boss();
        boss.engage();

        boss.on_eye_damaged();
        assert!(boss.is_in::<GroggyState>());
        tick(&mut boss, 2);

        boss.on_eye_damaged();
        tick(&mut boss, 1);
        assert!(boss.is_in::<GroggyState>());
        tick(&mut boss, 1);
        assert!(boss.is_in::<DefenceState>());

        let effects = boss.drain_effects();
        assert_eq!(count(&effects, &BossEffect::Groggy(true)), 1);
        assert_eq!(count(&effects, &BossEffect::Groggy(false)), 1);
    }

    #[test]
    fn groggy_cancels_a_charging_emp() {
        let mut boss = boss();
        force::<EmpState>(&mut boss);
        tick(&mut boss, 1);
        assert_eq!(boss.active_sequences(), 1);

        boss.on_eye_damaged();
        assert_eq!(boss.active_sequences(), 0);
        tick(&mut boss, 6);

        let effects = boss.drain_effects();
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, BossEffect::EmpPulse { .. })));
    }

    #[test]
    fn emp_pulses_then_returns_to_defence() {
        let mut boss = boss();
        force::<EmpState>(&mut boss);

        tick(&mut boss, 3);
        assert!(boss.is_in::<EmpState>());
        tick(&mut boss, 1);
        assert!(boss.is_in::<DefenceState>());

        let effects = boss.drain_effects();
        assert_eq!(count(&effects, &BossEffect::EmpCharging), 1);
        assert_eq!(
            count(
                &effects,
                &BossEffect::EmpPulse {
                    radius: 15.0,
                    damage: 100.0
                }
            ),
            1
        );
    }

    #[test]
    fn core_explosion_skips_destroyed_cores() {
        let mut boss = boss();
        force::<CoreExplosionState>(&mut boss);
        assert_eq!(boss.active_sequences(), 3);

        tick(&mut boss, 2);
        boss.on_core_destroyed(CoreId(1));
        boss.drain_effects();
        tick(&mut boss, 2);

        // Fuses ran out this tick and the state left in the same tick.
        assert!(boss.is_in::<DefenceState>());
        let detonated: Vec<CoreId> = boss
            .drain_effects()
            .iter()
            .filter_map(|effect| match effect {
                BossEffect::CoreDetonated { core, .. } => Some(*core),
                _ => None,
            })
            .collect();
        assert_eq!(detonated, vec![CoreId(2), CoreId(3)]);
    }

    #[test]
    fn core_explosion_with_no_cores_goes_straight_back_to_defence() {
        let mut boss = boss_with(&[]);
        force::<CoreExplosionState>(&mut boss);

        assert!(boss.is_in::<DefenceState>());
        assert_eq!(boss.active_sequences(), 0);
    }

    #[test]
    fn eye_laser_runs_its_volley_and_lowers_the_eye() {
        let mut boss = boss();
        boss.set_target(Some(Vec3::new(0.0, 0.0, -30.0)));
        let (started, on_started) = counter();
        boss.on_laser_started().subscribe(on_started);
        let (ended, on_ended) = counter();
        boss.on_laser_ended().subscribe(on_ended);

        force::<EyeLaserState>(&mut boss);
        assert_eq!(boss.eye().position(), EyePosition::Raised);
        assert_eq!(started.load(Ordering::SeqCst), 1);

        // charge 0.5 + tracking 0.5 + cooldown 0.5
        tick(&mut boss, 5);
        assert!(boss.is_in::<EyeLaserState>());
        assert_eq!(boss.projectiles().len(), 1);
        tick(&mut boss, 1);

        assert!(boss.is_in::<DefenceState>());
        assert_eq!(ended.load(Ordering::SeqCst), 1);
        assert_eq!(boss.eye().position(), EyePosition::Lowered);

        let effects = boss.drain_effects();
        assert_eq!(count(&effects, &BossEffect::EyeActive(true)), 1);
        assert_eq!(count(&effects, &BossEffect::LaserCharging(true)), 1);
        assert_eq!(
            effects
                .iter()
                .filter(|effect| matches!(effect, BossEffect::ProjectileSpawned { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn laser_flies_straight_until_despawned() {
        let mut boss = boss();
        boss.set_target(Some(Vec3::new(0.0, 1.0, -30.0)));
        force::<EyeLaserState>(&mut boss);
        tick(&mut boss, 4);

        let laser = *boss.projectiles().iter().next().unwrap();
        boss.set_target(Some(Vec3::new(50.0, 0.0, 0.0)));
        tick(&mut boss, 1);

        let moved = boss.projectiles().get(laser.id).unwrap();
        assert_eq!(moved.direction, laser.direction);
        assert!(moved.position.distance(laser.position) > 0.0);

        assert!(boss.despawn_projectile(laser.id));
        assert!(boss.projectiles().is_empty());
    }

    #[test]
    fn death_cancels_everything_and_freezes_the_boss() {
        let mut boss = boss();
        force::<CoreExplosionState>(&mut boss);
        tick(&mut boss, 1);

        boss.on_boss_destroyed();
        assert_eq!(boss.active_sequences(), 0);
        tick(&mut boss, 20);

        let effects = boss.drain_effects();
        assert_eq!(count(&effects, &BossEffect::Defeated), 1);
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, BossEffect::CoreDetonated { .. })));
        assert!(boss.is_in::<CoreExplosionState>());

        boss.on_boss_destroyed();
        assert!(boss.drain_effects().is_empty());
    }

    #[test]
    fn full_cycle_keeps_returning_to_defence() {
        let mut boss = boss();
        boss.set_target(Some(Vec3::new(0.0, 0.0, -8.0)));
        boss.engage();

        let mut defence_entries = 0;
        let mut was_in_defence = true;
        for _ in 0..400 {
            boss.update(DT);
            let in_defence = boss.is_in::<DefenceState>();
            if in_defence && !was_in_defence {
                defence_entries += 1;
            }
            was_in_defence = in_defence;
            boss.drain_effects();
        }

        assert!(defence_entries >= 10, "only {defence_entries} cycles");
    }
}
