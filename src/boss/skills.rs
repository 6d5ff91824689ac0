use bevy::prelude::*;

use super::config::BossConfig;
use super::cores::{CoreGroupTracker, CoreId};
use super::effect::BossEffect;
use super::projectile::ProjectileSet;
use super::sequence::{Sequence, SequenceStatus};
use super::timer::PhaseTimer;

/// The slice of boss state a skill sequence is allowed to touch.
///
/// Built fresh each tick from disjoint borrows of the controller's context,
/// so sequences can read the core set and push effects while the runner
/// that owns them is itself borrowed mutably.
pub struct SkillIo<'a> {
    pub tracker: &'a CoreGroupTracker,
    pub projectiles: &'a mut ProjectileSet,
    pub effects: &'a mut Vec<BossEffect>,
    pub target: Option<Vec3>,
    pub fire_point: Option<Vec3>,
}

// ── Core explosion ──────────────────────────────────────────────────────────

/// One core's fuse. When it burns down the core explodes, unless the core was
/// destroyed in the meantime.
pub struct Detonation {
    core: CoreId,
    fuse: PhaseTimer,
    radius: f32,
    damage: f32,
}

impl Detonation {
    pub fn new(core: CoreId, config: &BossConfig) -> Self {
        Self {
            core,
            fuse: PhaseTimer::new(config.explosion_delay),
            radius: config.explosion_radius,
            damage: config.explosion_damage,
        }
    }
}

impl Sequence for Detonation {
    fn label(&self) -> &'static str {
        "detonation"
    }

    fn resume(&mut self, delta: f32, io: &mut SkillIo<'_>) -> SequenceStatus {
        if !self.fuse.tick(delta) {
            return SequenceStatus::Running;
        }

        if io.tracker.contains(self.core) {
            io.effects.push(BossEffect::CoreDetonated {
                core: self.core,
                radius: self.radius,
                damage: self.damage,
            });
        } else {
            debug!("core {:?} was destroyed before its fuse ran out", self.core);
        }
        SequenceStatus::Finished
    }
}

// ── Eye laser ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LaserPhase {
    Charging,
    Tracking,
    Cooldown,
}

/// charge → track → fire → cooldown.
///
/// The eye follows the target during tracking (the controller turns it every
/// tick while it's raised); the shot goes wherever the target is at the end
/// of tracking.
pub struct LaserVolley {
    phase: LaserPhase,
    timer: PhaseTimer,
    charge_announced: bool,
    tracking_duration: f32,
    cooldown: f32,
    speed: f32,
    damage: f32,
}

impl LaserVolley {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            phase: LaserPhase::Charging,
            timer: PhaseTimer::new(config.laser_charge_duration),
            charge_announced: false,
            tracking_duration: config.tracking_duration,
            cooldown: config.laser_cooldown,
            speed: config.laser_speed,
            damage: config.laser_damage,
        }
    }

    fn fire(&self, io: &mut SkillIo<'_>) {
        let (Some(origin), Some(target)) = (io.fire_point, io.target) else {
            warn!("laser has no fire point or target, skipping the shot");
            return;
        };

        if let Some(laser) = io.projectiles.spawn_laser(origin, target, self.speed, self.damage) {
            io.effects.push(BossEffect::ProjectileSpawned {
                id: laser.id,
                origin: laser.position,
                rotation: laser.rotation,
                damage: laser.damage,
            });
        }
    }
}

impl Sequence for LaserVolley {
    fn label(&self) -> &'static str {
        "laser volley"
    }

    fn resume(&mut self, delta: f32, io: &mut SkillIo<'_>) -> SequenceStatus {
        match self.phase {
            LaserPhase::Charging => {
                if !self.charge_announced {
                    self.charge_announced = true;
                    io.effects.push(BossEffect::LaserCharging(true));
                }
                if self.timer.tick(delta) {
                    io.effects.push(BossEffect::LaserCharging(false));
                    self.phase = LaserPhase::Tracking;
                    self.timer = PhaseTimer::new(self.tracking_duration);
                }
                SequenceStatus::Running
            }
            LaserPhase::Tracking => {
                if self.timer.tick(delta) {
                    self.fire(io);
                    self.phase = LaserPhase::Cooldown;
                    self.timer = PhaseTimer::new(self.cooldown);
                }
                SequenceStatus::Running
            }
            LaserPhase::Cooldown => {
                if self.timer.tick(delta) {
                    SequenceStatus::Finished
                } else {
                    SequenceStatus::Running
                }
            }
        }
    }
}

// ── EMP ─────────────────────────────────────────────────────────────────────

/// Announce the charge, wait, then release one radial pulse.
pub struct EmpPulse {
    charge: PhaseTimer,
    announced: bool,
    radius: f32,
    damage: f32,
}

impl EmpPulse {
    pub fn new(config: &BossConfig) -> Self {
        Self {
            charge: PhaseTimer::new(config.emp_charge_delay),
            announced: false,
            radius: config.emp_attack_radius,
            damage: config.emp_attack_damage,
        }
    }
}

impl Sequence for EmpPulse {
    fn label(&self) -> &'static str {
        "emp pulse"
    }

    fn resume(&mut self, delta: f32, io: &mut SkillIo<'_>) -> SequenceStatus {
        if !self.announced {
            self.announced = true;
            io.effects.push(BossEffect::EmpCharging);
        }
        if self.charge.tick(delta) {
            io.effects.push(BossEffect::EmpPulse {
                radius: self.radius,
                damage: self.damage,
            });
            return SequenceStatus::Finished;
        }
        SequenceStatus::Running
    }
}
