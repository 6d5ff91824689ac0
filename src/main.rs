use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::boss::{
    AllCoresDestroyed, BossConfig, BossCue, BossLaserVisuals, CoreRecovered, EncounterFinished,
    LaserStateChanged, SpaceBossPlugin,
};
use crate::bullet::{BulletPlugin, ColliderTag};
use crate::config::ConfigPlugin;
use crate::enemy::{EnemyData, EnemyPlugin};
use crate::health::{Health, HealthPlugin};
use crate::input::PlayerInputPlugin;
use crate::player::{Player, PlayerPlugin, PlayerStats};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            ConfigPlugin,
            HealthPlugin,
            PlayerPlugin,
            PlayerInputPlugin,
            BulletPlugin,
            EnemyPlugin,
            SpaceBossPlugin,
        ))
        .add_systems(Startup, spawn_encounter)
        .add_observer(on_boss_cue)
        .add_observer(on_laser_state_changed)
        .add_observer(on_all_cores_destroyed)
        .add_observer(on_core_recovered)
        .add_observer(on_encounter_finished)
        .run();
}

fn spawn_encounter(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    boss_config: Res<BossConfig>,
    player_stats: Res<PlayerStats>,
    enemy_data: Res<EnemyData>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 12.0, 24.0).looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Player starts outside search range, facing the boss
    commands.spawn((
        Name::new("Player"),
        Player,
        ColliderTag::Player,
        Health::new(player_stats.max_health),
        Mesh3d(meshes.add(Capsule3d::new(0.4, 1.2))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.6, 0.9))),
        Transform::from_xyz(0.0, 0.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let enemy_mesh = meshes.add(Capsule3d::new(0.4, 1.0));
    let enemy_material = materials.add(Color::srgb(0.7, 0.3, 0.7));
    for position in [Vec3::new(-10.0, 0.0, 10.0), Vec3::new(10.0, 0.0, 10.0)] {
        commands.spawn((
            Name::new("Enemy"),
            enemy_data.clone(),
            Health::new(enemy_data.health),
            Mesh3d(enemy_mesh.clone()),
            MeshMaterial3d(enemy_material.clone()),
            Transform::from_translation(position),
        ));
    }

    let core_offsets = [
        Vec3::new(-3.0, 0.5, 2.0),
        Vec3::new(3.0, 0.5, 2.0),
        Vec3::new(0.0, 0.5, -3.5),
    ];
    let spawned = boss::spawn_space_boss(
        &mut commands,
        &boss_config,
        Vec3::ZERO,
        &core_offsets,
        StdRng::from_entropy(),
    );

    commands.entity(spawned.boss).insert((
        Mesh3d(meshes.add(Cuboid::new(4.0, 2.0, 4.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.4, 0.4, 0.45))),
    ));
    commands.entity(spawned.eye).insert((
        Mesh3d(meshes.add(Sphere::new(0.6))),
        MeshMaterial3d(materials.add(Color::srgb(0.9, 0.2, 0.2))),
    ));
    commands.entity(spawned.shield).insert((
        Mesh3d(meshes.add(Sphere::new(4.5))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.3, 0.7, 1.0, 0.2),
            alpha_mode: AlphaMode::Blend,
            ..default()
        })),
    ));
    let core_mesh = meshes.add(Sphere::new(0.5));
    let core_material = materials.add(Color::srgb(1.0, 0.8, 0.2));
    for core in spawned.cores {
        commands.entity(core).insert((
            Mesh3d(core_mesh.clone()),
            MeshMaterial3d(core_material.clone()),
        ));
    }

    commands.insert_resource(BossLaserVisuals {
        mesh: meshes.add(Cuboid::new(0.1, 0.1, 1.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.1, 0.1),
            emissive: LinearRgba::rgb(8.0, 0.5, 0.5),
            ..default()
        }),
    });
}

fn on_boss_cue(trigger: On<BossCue>) {
    debug!("boss {:?}: {:?}", trigger.boss, trigger.effect);
}

fn on_laser_state_changed(trigger: On<LaserStateChanged>) {
    let verb = if trigger.active { "opens" } else { "closes" };
    info!("boss {:?} {} fire with the eye laser", trigger.boss, verb);
}

fn on_all_cores_destroyed(trigger: On<AllCoresDestroyed>) {
    info!("every core of boss {:?} is down", trigger.boss);
}

fn on_core_recovered(trigger: On<CoreRecovered>) {
    info!("boss {:?} recovered core {:?}", trigger.boss, trigger.core);
}

fn on_encounter_finished(trigger: On<EncounterFinished>) {
    info!("encounter finished, boss {:?} is down", trigger.boss);
}

mod boss;
mod bullet;
mod config;
mod enemy;
mod health;
mod input;
mod player;
