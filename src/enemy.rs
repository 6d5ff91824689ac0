use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::health::Destroyed;
use crate::player::{Player, PlayerMode};

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, enemy_perception_system);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatrolType {
    #[default]
    None,
    /// Wander inside `circle_patrol_range` of the spawn point.
    Circle,
    /// Walk the edges of a `rectangle_patrol_range` box.
    Rectangle,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChaseType {
    #[default]
    Chase,
    /// Holds position and only turns to face the target.
    Stationary,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Dead,
}

/// Tuning for the regular enemies on the ship. The resource is the template;
/// every spawned enemy carries its own copy as a component.
#[derive(Resource, Component, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyData {
    pub health: f32,
    pub move_speed: f32,
    pub attack_damage: f32,

    pub patrol_type: PatrolType,
    pub patrol_speed: f32,
    pub circle_patrol_range: f32,
    /// Width and depth.
    pub rectangle_patrol_range: [f32; 2],
    /// Never drop back to idle between patrol legs.
    pub infinite_patrol: bool,

    pub run_perception_range: f32,
    pub stealth_perception_range: f32,

    pub chase_type: ChaseType,
    /// Stop closing in once this near.
    pub dead_zone: f32,

    pub attack_interval: f32,
    pub chase_interval: f32,

    #[serde(skip)]
    state: EnemyState,
}

impl Default for EnemyData {
    fn default() -> Self {
        Self {
            health: 40.0,
            move_speed: 3.0,
            attack_damage: 10.0,

            patrol_type: PatrolType::None,
            patrol_speed: 1.0,
            circle_patrol_range: 10.0,
            rectangle_patrol_range: [5.0, 10.0],
            infinite_patrol: false,

            run_perception_range: 15.0,
            stealth_perception_range: 3.0,

            chase_type: ChaseType::Chase,
            dead_zone: 1.5,

            attack_interval: 1.5,
            chase_interval: 1.5,

            state: EnemyState::Idle,
        }
    }
}

impl EnemyData {
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Returns false if the enemy was already in `state`.
    pub fn set_state(&mut self, state: EnemyState) -> bool {
        if state == self.state {
            return false;
        }
        debug!("enemy {:?} -> {:?}", self.state, state);
        self.state = state;
        true
    }

    /// How far away the enemy notices the player.
    pub fn perception_range(&self, player_stealthy: bool) -> f32 {
        if player_stealthy {
            self.stealth_perception_range
        } else {
            self.run_perception_range
        }
    }

    pub fn can_perceive(&self, distance: f32, player_stealthy: bool) -> bool {
        distance <= self.perception_range(player_stealthy)
    }
}

/// Moves each enemy between idle/patrol, chase, attack and dead depending on
/// whether it can see the player. Stealth shrinks how far it sees.
pub fn enemy_perception_system(
    mode: Option<Res<PlayerMode>>,
    players: Query<&Transform, With<Player>>,
    mut enemies: Query<(&Transform, &mut EnemyData, Has<Destroyed>), Without<Player>>,
) {
    let stealthy = mode.is_some_and(|mode| mode.stealth);
    let player = players.iter().next().map(|transform| transform.translation);

    for (transform, mut enemy, destroyed) in enemies.iter_mut() {
        let distance = player.map(|p| transform.translation.distance(p));
        let seen = distance.is_some_and(|d| enemy.can_perceive(d, stealthy));

        let next = match enemy.state() {
            EnemyState::Dead => continue,
            _ if destroyed => EnemyState::Dead,
            _ if !seen && enemy.patrol_type != PatrolType::None => EnemyState::Patrol,
            _ if !seen => EnemyState::Idle,
            _ if distance.is_some_and(|d| d <= enemy.dead_zone) => EnemyState::Attack,
            _ => EnemyState::Chase,
        };
        if next != enemy.state() {
            enemy.set_state(next);
        }
    }
}
