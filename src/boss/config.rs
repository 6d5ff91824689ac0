use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Every tuning value of the space boss encounter.
///
/// Loaded once at startup (see `crate::config`) and handed to the
/// controller by value. Nothing mutates it while the fight is running,
/// so states copy the durations they need when they are constructed.
///
/// #[serde(default)] on the struct means an `encounter.ron` that only lists
/// `defence_duration` still parses; every missing field takes the value
/// from the Default impl below.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BossConfig {
    // ── State durations (seconds) ───────────────────────────────────────────
    pub defence_duration: f32,
    pub emp_attack_duration: f32,
    pub groggy_duration: f32,

    // ── Core explosion ──────────────────────────────────────────────────────
    /// Fuse length between entering the state and each core going off.
    pub explosion_delay: f32,
    pub explosion_radius: f32,
    pub explosion_damage: f32,

    // ── EMP ─────────────────────────────────────────────────────────────────
    /// Wind-up before the pulse. Must be shorter than `emp_attack_duration`
    /// or the pulse is cancelled when the state ends.
    pub emp_charge_delay: f32,
    pub emp_attack_radius: f32,
    pub emp_attack_damage: f32,

    // ── Eye laser ───────────────────────────────────────────────────────────
    pub laser_charge_duration: f32,
    pub tracking_duration: f32,
    pub laser_cooldown: f32,
    pub laser_damage: f32,
    /// Units per second.
    pub laser_speed: f32,

    // ── Eye ─────────────────────────────────────────────────────────────────
    /// How far above its resting spot the eye sits when raised.
    pub eye_raise_height: f32,
    pub eye_move_speed: f32,

    /// Idle engages on its own once the target is this close.
    pub search_range: f32,

    // ── Hit points handed to the Health components at spawn ────────────────
    pub boss_health: f32,
    pub core_health: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            defence_duration: 5.0,
            emp_attack_duration: 5.0,
            groggy_duration: 10.0,

            explosion_delay: 5.0,
            explosion_radius: 5.0,
            explosion_damage: 50.0,

            emp_charge_delay: 1.5,
            emp_attack_radius: 15.0,
            emp_attack_damage: 100.0,

            laser_charge_duration: 3.0,
            tracking_duration: 3.0,
            laser_cooldown: 5.0,
            laser_damage: 50.0,
            laser_speed: 20.0,

            eye_raise_height: 2.5,
            eye_move_speed: 5.0,

            search_range: 15.0,

            boss_health: 1000.0,
            core_health: 100.0,
        }
    }
}
