use bevy::prelude::*;

/// Lasers aim this far above the target's origin, roughly at center mass.
pub const CENTER_MASS_OFFSET: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileId(pub u64);

/// A laser bolt in flight.
///
/// Direction and rotation are fixed when it spawns: the laser doesn't home.
/// Whoever owns collision and lifetime calls [`ProjectileSet::despawn`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub position: Vec3,
    pub direction: Vec3,
    pub rotation: Quat,
    pub speed: f32,
    pub damage: f32,
}

#[derive(Debug, Default)]
pub struct ProjectileSet {
    next_id: u64,
    live: Vec<Projectile>,
}

impl ProjectileSet {
    /// Launch a laser from `origin` toward `target` (plus the center-mass offset).
    ///
    /// Returns None when the aim point coincides with the origin and there is
    /// no direction to fly in.
    pub fn spawn_laser(
        &mut self,
        origin: Vec3,
        target: Vec3,
        speed: f32,
        damage: f32,
    ) -> Option<Projectile> {
        let aim = target + Vec3::Y * CENTER_MASS_OFFSET;
        let direction = (aim - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            warn!("laser target sits on the fire point, not firing");
            return None;
        }

        let projectile = Projectile {
            id: ProjectileId(self.next_id),
            position: origin,
            direction,
            rotation: Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation,
            speed,
            damage,
        };
        self.next_id += 1;
        self.live.push(projectile);
        Some(projectile)
    }

    /// Move every projectile forward by one tick.
    pub fn advance(&mut self, delta: f32) {
        for projectile in self.live.iter_mut() {
            projectile.position += projectile.direction * projectile.speed * delta;
        }
    }

    pub fn despawn(&mut self, id: ProjectileId) -> bool {
        let before = self.live.len();
        self.live.retain(|projectile| projectile.id != id);
        self.live.len() != before
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.iter().find(|projectile| projectile.id == id)
    }
}

#[cfg(test)]
impl ProjectileSet {
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
