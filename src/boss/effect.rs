use bevy::prelude::*;

use super::cores::CoreId;
use super::projectile::ProjectileId;

/// Something the boss wants the outside world to do.
///
/// The controller only records these. The Bevy plugin drains them after each
/// tick and turns them into component changes, spawned entities or
/// triggered events. Nothing is acknowledged back.
#[derive(Clone, Debug, PartialEq)]
pub enum BossEffect {
    BossInvincible(bool),
    CoreVulnerable { core: CoreId, vulnerable: bool },
    ShieldActive(bool),
    EyeActive(bool),
    LaserCharging(bool),
    ProjectileSpawned {
        id: ProjectileId,
        origin: Vec3,
        rotation: Quat,
        damage: f32,
    },
    CoreDetonated { core: CoreId, radius: f32, damage: f32 },
    EmpCharging,
    EmpPulse { radius: f32, damage: f32 },
    Groggy(bool),
    /// The boss died. Scene transition is somebody else's job.
    Defeated,
}
