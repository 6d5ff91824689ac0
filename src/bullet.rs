use bevy::prelude::*;

use crate::health::{deal_damage, Health};
use crate::input::FireRequested;
use crate::player::{Player, PlayerStats};

/// Distance from a bullet to a target's origin that counts as a hit.
pub const BULLET_HIT_RADIUS: f32 = 0.5;

pub struct BulletPlugin;

impl Plugin for BulletPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BulletPool>()
            .add_systems(Update, bullet_flight_system)
            .add_observer(on_fire_requested);
    }
}

/// Colliders bullets pass straight through.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderTag {
    Weapon,
    Player,
    Blade,
}

#[derive(Component, Debug)]
pub struct Bullet {
    pub velocity: Vec3,
    pub damage: f32,
    pub lifetime: Timer,
    released: bool,
}

impl Bullet {
    pub fn new(velocity: Vec3, stats: &PlayerStats) -> Self {
        Self {
            velocity,
            damage: stats.bullet_damage,
            lifetime: Timer::from_seconds(stats.bullet_lifetime.max(0.0), TimerMode::Once),
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Flip to released. False if it already was, so the pool never gets the
    /// same entity twice for one activation.
    fn mark_released(&mut self) -> bool {
        !std::mem::replace(&mut self.released, true)
    }
}

/// Parked bullet entities, hidden, waiting to be fired again.
#[derive(Resource, Default, Debug)]
pub struct BulletPool {
    free: Vec<Entity>,
}

/// Fire a bullet from `origin` along `direction`, reusing a pooled entity
/// when there is one.
pub fn fire_bullet(
    commands: &mut Commands,
    pool: &mut BulletPool,
    stats: &PlayerStats,
    origin: Vec3,
    direction: Vec3,
) -> Entity {
    let velocity = direction.normalize_or_zero() * stats.bullet_speed;
    let bundle = (
        Bullet::new(velocity, stats),
        Transform::from_translation(origin),
        Visibility::Visible,
    );

    match pool.free.pop() {
        Some(entity) => {
            commands.entity(entity).insert(bundle);
            entity
        }
        None => commands.spawn((Name::new("Bullet"), bundle)).id(),
    }
}

/// Hand a bullet back to the pool. Ignored if it is already back.
pub fn release_bullet(
    pool: &mut BulletPool,
    entity: Entity,
    bullet: &mut Bullet,
    visibility: &mut Visibility,
) -> bool {
    if !bullet.mark_released() {
        return false;
    }
    *visibility = Visibility::Hidden;
    pool.free.push(entity);
    true
}

pub fn bullet_flight_system(
    mut commands: Commands,
    time: Res<Time>,
    mut pool: ResMut<BulletPool>,
    mut bullets: Query<(Entity, &mut Bullet, &mut Transform, &mut Visibility)>,
    mut targets: Query<
        (Entity, &Transform, &mut Health, Option<&ColliderTag>),
        (Without<Bullet>, Without<Player>),
    >,
) {
    let delta = time.delta_secs();

    for (entity, mut bullet, mut transform, mut visibility) in bullets.iter_mut() {
        if bullet.is_released() {
            continue;
        }

        transform.translation += bullet.velocity * delta;

        let hit = targets
            .iter_mut()
            .filter(|(_, _, _, tag)| tag.is_none())
            .find(|(_, target, _, _)| {
                target.translation.distance(transform.translation) <= BULLET_HIT_RADIUS
            });
        if let Some((target, _, mut health, _)) = hit {
            deal_damage(&mut commands, target, &mut health, bullet.damage);
            release_bullet(&mut pool, entity, &mut bullet, &mut visibility);
            continue;
        }

        bullet.lifetime.tick(time.delta());
        if bullet.lifetime.is_finished() {
            release_bullet(&mut pool, entity, &mut bullet, &mut visibility);
        }
    }
}

fn on_fire_requested(
    _trigger: On<FireRequested>,
    mut commands: Commands,
    mut pool: ResMut<BulletPool>,
    stats: Res<PlayerStats>,
    players: Query<&Transform, With<Player>>,
) {
    let Some(player) = players.iter().next() else {
        warn!("fire requested with no player to fire from");
        return;
    };
    let origin = player.translation + Vec3::Y;
    fire_bullet(&mut commands, &mut pool, &stats, origin, *player.forward());
}

#[cfg(test)]
impl BulletPool {
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn release_only_counts_once() {
        let mut pool = BulletPool::default();
        let mut bullet = Bullet::new(Vec3::X, &PlayerStats::default());
        let mut visibility = Visibility::Visible;
        let entity = Entity::PLACEHOLDER;

        assert!(release_bullet(&mut pool, entity, &mut bullet, &mut visibility));
        assert!(!release_bullet(&mut pool, entity, &mut bullet, &mut visibility));
        assert_eq!(pool.available(), 1);
        assert_eq!(visibility, Visibility::Hidden);
    }

    fn bullet_app() -> App {
        let mut app = App::new();
        app.add_plugins(BulletPlugin)
            .init_resource::<Time>()
            .insert_resource(PlayerStats::default());
        app
    }

    fn fire(app: &mut App, origin: Vec3, direction: Vec3) -> Entity {
        let world = app.world_mut();
        let stats = world.resource::<PlayerStats>().clone();
        let entity = world.resource_scope(|world, mut pool: Mut<BulletPool>| {
            let mut commands = world.commands();
            fire_bullet(&mut commands, &mut pool, &stats, origin, direction)
        });
        world.flush();
        entity
    }

    fn step(app: &mut App, seconds: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(seconds));
        app.update();
    }

    #[test]
    fn bullet_hits_damageable_but_passes_tagged_colliders() {
        let mut app = bullet_app();
        let tagged = app
            .world_mut()
            .spawn((
                ColliderTag::Blade,
                Health::new(50.0),
                Transform::from_xyz(0.0, 0.0, 0.0),
            ))
            .id();
        let target = app
            .world_mut()
            .spawn((Health::new(50.0), Transform::from_xyz(0.0, 0.0, 0.0)))
            .id();

        let bullet = fire(&mut app, Vec3::ZERO, Vec3::X);
        step(&mut app, 0.0);

        assert_eq!(app.world().get::<Health>(tagged).unwrap().current, 50.0);
        assert_eq!(app.world().get::<Health>(target).unwrap().current, 40.0);
        assert!(app.world().get::<Bullet>(bullet).unwrap().is_released());
        assert_eq!(app.world().resource::<BulletPool>().available(), 1);
    }

    #[test]
    fn expired_bullet_returns_to_pool_and_is_reused() {
        let mut app = bullet_app();
        let first = fire(&mut app, Vec3::ZERO, Vec3::X);

        step(&mut app, 6.0);
        assert!(app.world().get::<Bullet>(first).unwrap().is_released());
        assert_eq!(app.world().resource::<BulletPool>().available(), 1);

        let second = fire(&mut app, Vec3::ZERO, Vec3::Z);
        assert_eq!(first, second);
        assert!(!app.world().get::<Bullet>(second).unwrap().is_released());
        assert_eq!(app.world().resource::<BulletPool>().available(), 0);
    }
}
