use bevy::prelude::*;

pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, set_destroyed_system);
    }
}

/// Hit points for anything that can be shot: player, boss, cores, the eye.
///
/// `invincible` is the switch the boss flips on itself and its cores. While
/// it's set, damage is simply dropped, and no DamagedEvent goes out.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub invincible: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Health {
            current: max,
            max,
            invincible: false,
        }
    }

    pub fn invincible(max: f32) -> Self {
        Health {
            invincible: true,
            ..Health::new(max)
        }
    }

    /// Returns true if the damage actually landed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.invincible || self.is_depleted() {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        true
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Marker: this entity ran out of health and DestroyedEvent went out for it.
/// Stops the event from firing again every frame.
#[derive(Component, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Destroyed;

#[derive(Event, Clone, Copy, Debug)]
pub struct DamagedEvent {
    pub entity: Entity,
    pub amount: f32,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct DestroyedEvent {
    pub entity: Entity,
}

/// Apply damage and announce it if it landed.
pub fn deal_damage(commands: &mut Commands, entity: Entity, health: &mut Health, amount: f32) {
    if health.take_damage(amount) {
        commands.trigger(DamagedEvent { entity, amount });
    }
}

pub fn set_destroyed_system(
    mut commands: Commands,
    query: Query<(Entity, &Health), (Without<Destroyed>, Changed<Health>)>,
) {
    for (entity, health) in query.iter() {
        if health.is_depleted() {
            commands.entity(entity).insert(Destroyed);
            commands.trigger(DestroyedEvent { entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct DestroyedCount(usize);

    #[test]
    fn invincible_health_ignores_damage() {
        let mut health = Health::invincible(50.0);
        assert!(!health.take_damage(10.0));
        assert_eq!(health.current, 50.0);

        health.invincible = false;
        assert!(health.take_damage(80.0));
        assert_eq!(health.current, 0.0);
        assert!(health.is_depleted());
        assert!(!health.take_damage(1.0));
    }

    #[test]
    fn destroyed_event_fires_once() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, HealthPlugin))
            .init_resource::<DestroyedCount>()
            .add_observer(|_: On<DestroyedEvent>, mut count: ResMut<DestroyedCount>| {
                count.0 += 1;
            });

        let entity = app.world_mut().spawn(Health::new(10.0)).id();
        app.update();
        assert_eq!(app.world().resource::<DestroyedCount>().0, 0);

        app.world_mut()
            .get_mut::<Health>(entity)
            .unwrap()
            .take_damage(10.0);
        app.update();
        app.update();

        assert_eq!(app.world().resource::<DestroyedCount>().0, 1);
        assert!(app.world().get::<Destroyed>(entity).is_some());
    }
}
