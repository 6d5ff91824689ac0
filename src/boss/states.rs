//! The seven states of the space boss.
//!
//! States never switch the machine themselves. They call
//! `cx.request::<Next>()` and the controller performs the transition right
//! after the hook returns.

use bevy::prelude::*;

use super::config::BossConfig;
use super::controller::BossContext;
use super::effect::BossEffect;
use super::eye::EyePosition;
use super::pattern::AttackPattern;
use super::sequence::SequenceId;
use super::skills::{Detonation, EmpPulse, LaserVolley};
use super::state_machine::State;
use super::timer::PhaseTimer;

/// Waiting for the fight to start.
pub struct IdleState;

impl State<BossContext> for IdleState {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn update(&mut self, cx: &mut BossContext, _delta: f32) {
        if cx.is_target_in_range() {
            info!("target in range, boss engages");
            cx.request::<DefenceState>();
        }
    }
}

/// Cores locked, boss invincible, waiting out the timer before attacking.
pub struct DefenceState {
    timer: PhaseTimer,
}

impl DefenceState {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            timer: PhaseTimer::new(config.defence_duration),
        }
    }
}

impl State<BossContext> for DefenceState {
    fn name(&self) -> &'static str {
        "Defence"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        self.timer.reset();
        cx.set_cores_vulnerable(false);
        cx.set_boss_invincible(true);
    }

    fn update(&mut self, cx: &mut BossContext, delta: f32) {
        if self.timer.tick(delta) {
            cx.request::<AttackSelectState>();
        }
    }

    fn on_exit(&mut self, cx: &mut BossContext) {
        cx.set_cores_vulnerable(true);
        // Outside Defence the cores decide: invincible while any is alive.
        let invincible = !cx.all_cores_eliminated();
        cx.set_boss_invincible(invincible);
    }
}

/// Draws the next attack from the bag and hands over to it immediately.
pub struct AttackSelectState;

impl State<BossContext> for AttackSelectState {
    fn name(&self) -> &'static str {
        "AttackSelect"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        let pattern = cx.select_attack();
        info!("boss picks {:?}", pattern);

        match pattern {
            AttackPattern::CoreExplosion => cx.request::<CoreExplosionState>(),
            AttackPattern::EyeLaser => cx.request::<EyeLaserState>(),
            AttackPattern::Emp => cx.request::<EmpState>(),
        }
    }
}

/// Every live core gets a fuse; back to Defence once all fuses are spent.
#[derive(Default)]
pub struct CoreExplosionState {
    detonations: Vec<SequenceId>,
}

impl State<BossContext> for CoreExplosionState {
    fn name(&self) -> &'static str {
        "CoreExplosion"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        let config = cx.config().clone();
        self.detonations = cx
            .live_core_ids()
            .into_iter()
            .map(|core| cx.start_sequence(Detonation::new(core, &config)))
            .collect();

        // Can happen when the bag still held a CoreExplosion drawn before
        // the last core died.
        if self.detonations.is_empty() {
            info!("no cores left to detonate");
            cx.request::<DefenceState>();
        }
    }

    fn update(&mut self, cx: &mut BossContext, _delta: f32) {
        self.detonations.retain(|id| cx.is_sequence_running(*id));
        if self.detonations.is_empty() {
            cx.request::<DefenceState>();
        }
    }

    fn on_exit(&mut self, cx: &mut BossContext) {
        for id in self.detonations.drain(..) {
            cx.stop_sequence(id);
        }
    }
}

/// Raise the eye and run one laser volley.
#[derive(Default)]
pub struct EyeLaserState {
    volley: Option<SequenceId>,
}

impl State<BossContext> for EyeLaserState {
    fn name(&self) -> &'static str {
        "EyeLaser"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        if cx.eye_position() != EyePosition::Raised {
            cx.raise_eye();
        }
        cx.notify_laser_started();

        let volley = LaserVolley::new(cx.config());
        self.volley = Some(cx.start_sequence(volley));
    }

    fn update(&mut self, cx: &mut BossContext, _delta: f32) {
        let done = match self.volley {
            Some(id) => !cx.is_sequence_running(id),
            None => true,
        };
        if done {
            cx.request::<DefenceState>();
        }
    }

    fn on_exit(&mut self, cx: &mut BossContext) {
        if let Some(id) = self.volley.take() {
            cx.stop_sequence(id);
        }
        cx.notify_laser_ended();

        // The eye only stays up for good once every core is gone.
        if !cx.all_cores_eliminated() && cx.eye_position() == EyePosition::Raised {
            cx.lower_eye();
        }
    }
}

/// Charge and release a radial pulse, then hold until the attack time is up.
pub struct EmpState {
    timer: PhaseTimer,
    pulse: Option<SequenceId>,
}

impl EmpState {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            timer: PhaseTimer::new(config.emp_attack_duration),
            pulse: None,
        }
    }
}

impl State<BossContext> for EmpState {
    fn name(&self) -> &'static str {
        "Emp"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        self.timer.reset();
        let pulse = EmpPulse::new(cx.config());
        self.pulse = Some(cx.start_sequence(pulse));
    }

    fn update(&mut self, cx: &mut BossContext, delta: f32) {
        if self.timer.tick(delta) {
            cx.request::<DefenceState>();
        }
    }

    fn on_exit(&mut self, cx: &mut BossContext) {
        if let Some(id) = self.pulse.take() {
            cx.stop_sequence(id);
        }
    }
}

/// Stunned after a hit to the eye. All attacks are dropped.
pub struct GroggyState {
    timer: PhaseTimer,
}

impl GroggyState {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            timer: PhaseTimer::new(config.groggy_duration),
        }
    }
}

impl State<BossContext> for GroggyState {
    fn name(&self) -> &'static str {
        "Groggy"
    }

    fn on_enter(&mut self, cx: &mut BossContext) {
        self.timer.reset();
        cx.stop_all_sequences();
        cx.emit(BossEffect::Groggy(true));
    }

    fn update(&mut self, cx: &mut BossContext, delta: f32) {
        if self.timer.tick(delta) {
            cx.request::<DefenceState>();
        }
    }

    fn on_exit(&mut self, cx: &mut BossContext) {
        cx.emit(BossEffect::Groggy(false));
    }
}
