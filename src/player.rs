use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::{RunningToggled, StealthToggled};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerMode>()
            .add_observer(on_stealth_toggled)
            .add_observer(on_running_toggled);
    }
}

/// Marker for the player entity. The boss targets whatever has this.
#[derive(Component)]
pub struct Player;

/// Player tuning shared with the weapons. Inserted by the config loader.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerStats {
    pub max_health: f32,
    /// Seconds before an unspent bullet goes back to the pool.
    pub bullet_lifetime: f32,
    pub bullet_damage: f32,
    pub bullet_speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            bullet_lifetime: 5.0,
            bullet_damage: 10.0,
            bullet_speed: 30.0,
        }
    }
}

/// Movement modes the input toggles flip. Enemy perception reads `stealth`.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMode {
    pub stealth: bool,
    pub running: bool,
}

fn on_stealth_toggled(_trigger: On<StealthToggled>, mut mode: ResMut<PlayerMode>) {
    mode.stealth = !mode.stealth;
    info!("stealth {}", if mode.stealth { "on" } else { "off" });
}

fn on_running_toggled(_trigger: On<RunningToggled>, mut mode: ResMut<PlayerMode>) {
    mode.running = !mode.running;
    info!("running {}", if mode.running { "on" } else { "off" });
}
