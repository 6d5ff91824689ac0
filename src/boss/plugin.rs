// boss/plugin.rs - Bevy side of the space boss
//
// The controller lives inside the SpaceBoss component. Each frame:
//   track_target_system      -> tells it where the player is
//   tick_boss_system         -> BossController::update(delta)
//   apply_boss_effects_system -> drains BossEffects into Health, Visibility,
//                               laser entities and triggered events, then
//                               forwards queued controller notifications
//   sync_eye_system          -> copies the eye rig onto the eye's Transform
//   laser_flight_system      -> moves lasers, expires them, hits the player
//
// Going the other way, observers forward DestroyedEvent/DamagedEvent on boss
// parts back into the controller.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use rand::rngs::StdRng;

use super::config::BossConfig;
use super::controller::{BossController, BossLayout};
use super::cores::CoreId;
use super::effect::BossEffect;
use super::projectile::ProjectileId;
use super::signal::SubscriptionId;
use crate::health::{deal_damage, DamagedEvent, Destroyed, DestroyedEvent, Health};
use crate::player::Player;

/// Seconds a laser may fly before it is cleaned up.
pub const LASER_LIFETIME: f32 = 5.0;
/// How close a laser has to pass to count as a hit.
pub const LASER_HIT_RADIUS: f32 = 0.75;

pub struct SpaceBossPlugin;

impl Plugin for SpaceBossPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                track_target_system,
                tick_boss_system,
                apply_boss_effects_system,
                sync_eye_system,
                laser_flight_system,
            )
                .chain(),
        )
        .add_observer(on_boss_part_destroyed)
        .add_observer(on_boss_part_damaged)
        .add_observer(on_recover_core);
    }
}

// ── Components ──────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct SpaceBoss {
    pub controller: BossController,
    notices: NoticeQueue,
    /// Dropped once the boss is defeated.
    subscriptions: Option<NoticeSubscriptions>,
}

/// Controller notifications waiting to be re-triggered as ECS events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BossNotice {
    AllCoresDestroyed,
    CoreRecovered(CoreId),
    LaserStarted,
    LaserEnded,
}

/// Filled by the controller's signal callbacks, emptied by
/// `apply_boss_effects_system`.
#[derive(Clone, Default)]
struct NoticeQueue(Arc<Mutex<Vec<BossNotice>>>);

impl NoticeQueue {
    fn push(&self, notice: BossNotice) {
        match self.0.lock() {
            Ok(mut queue) => queue.push(notice),
            Err(_) => warn!("boss notice queue poisoned, dropping {:?}", notice),
        }
    }

    fn drain(&self) -> Vec<BossNotice> {
        match self.0.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

struct NoticeSubscriptions {
    all_destroyed: SubscriptionId,
    recovered: SubscriptionId,
    laser_started: SubscriptionId,
    laser_ended: SubscriptionId,
}

impl NoticeSubscriptions {
    fn forward(controller: &mut BossController, queue: &NoticeQueue) -> Self {
        let q = queue.clone();
        let all_destroyed = controller
            .on_all_cores_destroyed()
            .subscribe(move |_| q.push(BossNotice::AllCoresDestroyed));
        let q = queue.clone();
        let recovered = controller
            .on_core_recovered()
            .subscribe(move |core| q.push(BossNotice::CoreRecovered(*core)));
        let q = queue.clone();
        let laser_started = controller
            .on_laser_started()
            .subscribe(move |_| q.push(BossNotice::LaserStarted));
        let q = queue.clone();
        let laser_ended = controller
            .on_laser_ended()
            .subscribe(move |_| q.push(BossNotice::LaserEnded));

        Self {
            all_destroyed,
            recovered,
            laser_started,
            laser_ended,
        }
    }

    fn cancel(self, controller: &mut BossController) {
        controller.on_all_cores_destroyed().unsubscribe(self.all_destroyed);
        controller.on_core_recovered().unsubscribe(self.recovered);
        controller.on_laser_started().unsubscribe(self.laser_started);
        controller.on_laser_ended().unsubscribe(self.laser_ended);
    }
}

#[derive(Component, Clone, Copy, Debug)]
pub struct BossCore {
    pub boss: Entity,
    pub id: CoreId,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct BossEye {
    pub boss: Entity,
}

#[derive(Component, Clone, Copy, Debug)]
pub struct BossShield {
    pub boss: Entity,
}

#[derive(Component, Debug)]
pub struct BossLaser {
    pub boss: Entity,
    pub id: ProjectileId,
    pub damage: f32,
    pub lifetime: Timer,
}

/// Meshes for laser bolts. Lasers spawn without visuals when this is absent.
#[derive(Resource, Clone)]
pub struct BossLaserVisuals {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

// ── Events ──────────────────────────────────────────────────────────────────

/// Every effect the boss produces, re-triggered after it has been applied.
/// Audio and particles hang off this.
#[derive(Event, Clone, Debug)]
pub struct BossCue {
    pub boss: Entity,
    pub effect: BossEffect,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct EncounterFinished {
    pub boss: Entity,
}

/// The eye laser attack began (`active`) or ended.
#[derive(Event, Clone, Copy, Debug)]
pub struct LaserStateChanged {
    pub boss: Entity,
    pub active: bool,
}

/// The last live core went down.
#[derive(Event, Clone, Copy, Debug)]
pub struct AllCoresDestroyed {
    pub boss: Entity,
}

/// A core came back while every core was down.
#[derive(Event, Clone, Copy, Debug)]
pub struct CoreRecovered {
    pub boss: Entity,
    pub core: Entity,
}

/// Bring a destroyed core back: full health, visible, live again.
#[derive(Event, Clone, Copy, Debug)]
pub struct RecoverCoreEvent {
    pub core: Entity,
}

/// Entities created by [`spawn_space_boss`], so the caller can dress them.
#[derive(Debug, Clone)]
pub struct SpawnedBoss {
    pub boss: Entity,
    pub eye: Entity,
    pub shield: Entity,
    pub cores: Vec<Entity>,
}

/// Spawn the boss, its eye, its shield and one core per offset.
///
/// Parts are top level entities with world transforms and point back at the
/// boss through their component. No meshes are attached here.
pub fn spawn_space_boss(
    commands: &mut Commands,
    config: &BossConfig,
    position: Vec3,
    core_offsets: &[Vec3],
    rng: StdRng,
) -> SpawnedBoss {
    let eye_rest = position + Vec3::Y * 1.0;
    let core_ids: Vec<CoreId> = (0..core_offsets.len() as u32).map(CoreId).collect();
    let layout = BossLayout {
        position,
        eye_rest,
        fire_point: Some(eye_rest + Vec3::Y * config.eye_raise_height),
        cores: core_ids.clone(),
    };
    let mut controller = BossController::new(config.clone(), layout, rng);
    let notices = NoticeQueue::default();
    let subscriptions = NoticeSubscriptions::forward(&mut controller, &notices);

    let boss = commands
        .spawn((
            Name::new("Space Boss"),
            SpaceBoss {
                controller,
                notices,
                subscriptions: Some(subscriptions),
            },
            Health::invincible(config.boss_health),
            Transform::from_translation(position),
            Visibility::Visible,
        ))
        .id();

    let eye = commands
        .spawn((
            Name::new("Boss Eye"),
            BossEye { boss },
            // Never dies. Any hit that lands just makes the boss groggy.
            Health::invincible(f32::INFINITY),
            Transform::from_translation(eye_rest),
            Visibility::Hidden,
        ))
        .id();

    let shield = commands
        .spawn((
            Name::new("Boss Shield"),
            BossShield { boss },
            Transform::from_translation(position),
            Visibility::Visible,
        ))
        .id();

    let cores = core_ids
        .iter()
        .zip(core_offsets)
        .map(|(&id, &offset)| {
            commands
                .spawn((
                    Name::new(format!("Boss Core {}", id.0)),
                    BossCore { boss, id },
                    // Vulnerability comes from the controller's first effects.
                    Health::new(config.core_health),
                    Transform::from_translation(position + offset),
                    Visibility::Visible,
                ))
                .id()
        })
        .collect();

    info!("spawned space boss with {} cores", core_offsets.len());

    SpawnedBoss {
        boss,
        eye,
        shield,
        cores,
    }
}

// ── Systems ─────────────────────────────────────────────────────────────────

pub fn track_target_system(
    players: Query<&Transform, With<Player>>,
    mut bosses: Query<&mut SpaceBoss>,
) {
    let target = players.iter().next().map(|transform| transform.translation);
    for mut boss in bosses.iter_mut() {
        boss.controller.set_target(target);
    }
}

pub fn tick_boss_system(time: Res<Time>, mut bosses: Query<&mut SpaceBoss>) {
    let delta = time.delta_secs();
    for mut boss in bosses.iter_mut() {
        boss.controller.update(delta);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn apply_boss_effects_system(
    mut commands: Commands,
    mut bosses: Query<(Entity, &mut SpaceBoss, &Transform)>,
    mut parts: Query<&mut Health, Without<Player>>,
    mut players: Query<(Entity, &Transform, &mut Health), With<Player>>,
    mut visibility: Query<&mut Visibility>,
    cores: Query<(Entity, &BossCore, &Transform)>,
    eyes: Query<(Entity, &BossEye)>,
    shields: Query<(Entity, &BossShield)>,
    visuals: Option<Res<BossLaserVisuals>>,
) {
    for (boss_entity, mut boss, boss_transform) in bosses.iter_mut() {
        let effects = boss.controller.drain_effects();
        let notices = boss.notices.drain();
        if effects.is_empty() && notices.is_empty() {
            continue;
        }

        let core_entity = |core: CoreId| {
            cores
                .iter()
                .find(|(_, c, _)| c.boss == boss_entity && c.id == core)
                .map(|(entity, _, transform)| (entity, transform.translation))
        };
        let eye_entity = eyes
            .iter()
            .find(|(_, eye)| eye.boss == boss_entity)
            .map(|(entity, _)| entity);
        let shield_entity = shields
            .iter()
            .find(|(_, shield)| shield.boss == boss_entity)
            .map(|(entity, _)| entity);

        for effect in effects {
            match &effect {
                BossEffect::BossInvincible(invincible) => {
                    if let Ok(mut health) = parts.get_mut(boss_entity) {
                        health.invincible = *invincible;
                    }
                }
                BossEffect::CoreVulnerable { core, vulnerable } => {
                    match core_entity(*core).and_then(|(e, _)| parts.get_mut(e).ok()) {
                        Some(mut health) => health.invincible = !*vulnerable,
                        None => warn!("no entity for core {:?}", core),
                    }
                }
                BossEffect::ShieldActive(active) => {
                    if let Some(mut vis) = shield_entity.and_then(|e| visibility.get_mut(e).ok()) {
                        *vis = if *active {
                            Visibility::Visible
                        } else {
                            Visibility::Hidden
                        };
                    }
                }
                BossEffect::EyeActive(active) => {
                    if let Some(eye) = eye_entity {
                        if let Ok(mut vis) = visibility.get_mut(eye) {
                            *vis = if *active {
                                Visibility::Visible
                            } else {
                                Visibility::Hidden
                            };
                        }
                        if let Ok(mut health) = parts.get_mut(eye) {
                            health.invincible = !*active;
                        }
                    }
                }
                BossEffect::ProjectileSpawned {
                    id,
                    origin,
                    rotation,
                    damage,
                } => {
                    let mut laser = commands.spawn((
                        Name::new("Boss Laser"),
                        BossLaser {
                            boss: boss_entity,
                            id: *id,
                            damage: *damage,
                            lifetime: Timer::from_seconds(LASER_LIFETIME, TimerMode::Once),
                        },
                        Transform::from_translation(*origin).with_rotation(*rotation),
                        Visibility::Visible,
                    ));
                    if let Some(visuals) = visuals.as_deref() {
                        laser.insert((
                            Mesh3d(visuals.mesh.clone()),
                            MeshMaterial3d(visuals.material.clone()),
                        ));
                    }
                }
                BossEffect::CoreDetonated {
                    core,
                    radius,
                    damage,
                } => {
                    if let Some((_, center)) = core_entity(*core) {
                        damage_players_in_radius(&mut commands, &mut players, center, *radius, *damage);
                    }
                }
                BossEffect::EmpPulse { radius, damage } => {
                    let center = boss_transform.translation;
                    damage_players_in_radius(&mut commands, &mut players, center, *radius, *damage);
                }
                BossEffect::Defeated => {
                    if let Some(subscriptions) = boss.subscriptions.take() {
                        subscriptions.cancel(&mut boss.controller);
                    }
                    commands.trigger(EncounterFinished { boss: boss_entity });
                }
                BossEffect::LaserCharging(_) | BossEffect::EmpCharging | BossEffect::Groggy(_) => {}
            }

            commands.trigger(BossCue {
                boss: boss_entity,
                effect,
            });
        }

        for notice in notices {
            match notice {
                BossNotice::AllCoresDestroyed => {
                    commands.trigger(AllCoresDestroyed { boss: boss_entity });
                }
                BossNotice::CoreRecovered(core) => match core_entity(core) {
                    Some((core, _)) => commands.trigger(CoreRecovered {
                        boss: boss_entity,
                        core,
                    }),
                    None => warn!("no entity for recovered core {:?}", core),
                },
                BossNotice::LaserStarted => commands.trigger(LaserStateChanged {
                    boss: boss_entity,
                    active: true,
                }),
                BossNotice::LaserEnded => commands.trigger(LaserStateChanged {
                    boss: boss_entity,
                    active: false,
                }),
            }
        }
    }
}

fn damage_players_in_radius(
    commands: &mut Commands,
    players: &mut Query<(Entity, &Transform, &mut Health), With<Player>>,
    center: Vec3,
    radius: f32,
    damage: f32,
) {
    for (entity, transform, mut health) in players.iter_mut() {
        if transform.translation.distance(center) <= radius {
            deal_damage(commands, entity, &mut health, damage);
        }
    }
}

pub fn sync_eye_system(bosses: Query<&SpaceBoss>, mut eyes: Query<(&BossEye, &mut Transform)>) {
    for (eye, mut transform) in eyes.iter_mut() {
        if let Ok(boss) = bosses.get(eye.boss) {
            let rig = boss.controller.eye();
            transform.translation = rig.translation();
            transform.rotation = rig.rotation();
        }
    }
}

pub fn laser_flight_system(
    mut commands: Commands,
    time: Res<Time>,
    mut bosses: Query<&mut SpaceBoss>,
    mut lasers: Query<(Entity, &mut BossLaser, &mut Transform)>,
    mut players: Query<(Entity, &Transform, &mut Health), (With<Player>, Without<BossLaser>)>,
) {
    for (laser_entity, mut laser, mut transform) in lasers.iter_mut() {
        let Ok(mut boss) = bosses.get_mut(laser.boss) else {
            commands.entity(laser_entity).despawn();
            continue;
        };

        let Some(projectile) = boss.controller.projectiles().get(laser.id).copied() else {
            commands.entity(laser_entity).despawn();
            continue;
        };
        transform.translation = projectile.position;
        transform.rotation = projectile.rotation;

        laser.lifetime.tick(time.delta());
        let mut spent = laser.lifetime.is_finished() || boss.controller.is_defeated();

        if !spent {
            for (player, player_transform, mut health) in players.iter_mut() {
                let center_mass = player_transform.translation + Vec3::Y;
                if center_mass.distance(projectile.position) <= LASER_HIT_RADIUS {
                    deal_damage(&mut commands, player, &mut health, laser.damage);
                    spent = true;
                    break;
                }
            }
        }

        if spent {
            boss.controller.despawn_projectile(laser.id);
            commands.entity(laser_entity).despawn();
        }
    }
}

// ── Observers ───────────────────────────────────────────────────────────────

pub fn on_boss_part_destroyed(
    trigger: On<DestroyedEvent>,
    mut bosses: Query<&mut SpaceBoss>,
    cores: Query<&BossCore>,
    mut visibility: Query<&mut Visibility>,
) {
    let entity = trigger.entity;

    if let Ok(core) = cores.get(entity) {
        if let Ok(mut boss) = bosses.get_mut(core.boss) {
            info!("core {:?} destroyed", core.id);
            boss.controller.on_core_destroyed(core.id);
        }
        if let Ok(mut vis) = visibility.get_mut(entity) {
            *vis = Visibility::Hidden;
        }
        return;
    }

    if let Ok(mut boss) = bosses.get_mut(entity) {
        boss.controller.on_boss_destroyed();
    }
}

/// A hit on the eye stuns the boss. A hit on a core wakes an idle boss up.
pub fn on_boss_part_damaged(
    trigger: On<DamagedEvent>,
    mut bosses: Query<&mut SpaceBoss>,
    eyes: Query<&BossEye>,
    cores: Query<&BossCore>,
) {
    if let Ok(eye) = eyes.get(trigger.entity) {
        if let Ok(mut boss) = bosses.get_mut(eye.boss) {
            boss.controller.on_eye_damaged();
        }
        return;
    }

    if let Ok(core) = cores.get(trigger.entity) {
        if let Ok(mut boss) = bosses.get_mut(core.boss) {
            boss.controller.engage();
        }
    }
}

pub fn on_recover_core(
    trigger: On<RecoverCoreEvent>,
    mut commands: Commands,
    mut bosses: Query<&mut SpaceBoss>,
    mut cores: Query<(&BossCore, &mut Health, &mut Visibility)>,
) {
    let entity = trigger.core;
    let Ok((core, mut health, mut vis)) = cores.get_mut(entity) else {
        warn!("recover requested for {:?}, which is not a boss core", entity);
        return;
    };

    health.restore();
    *vis = Visibility::Visible;
    commands.entity(entity).remove::<Destroyed>();

    if let Ok(mut boss) = bosses.get_mut(core.boss) {
        boss.controller.recover_core(core.id);
    }
}
