// boss/mod.rs - The space boss encounter
//
// Everything except plugin.rs is plain Rust with no ECS in it: the boss is a
// BossController advanced by update(delta). plugin.rs is the Bevy side that
// owns the controller in a component, calls it every frame and turns its
// BossEffects into changes in the world.

mod config;
mod controller;
mod cores;
mod effect;
mod eye;
mod pattern;
mod plugin;
mod projectile;
mod sequence;
mod signal;
mod skills;
mod state_machine;
mod states;
mod timer;

pub use config::BossConfig;
pub use plugin::{
    spawn_space_boss, AllCoresDestroyed, BossCue, BossLaserVisuals, CoreRecovered,
    EncounterFinished, LaserStateChanged, SpaceBossPlugin,
};
