use bevy::prelude::*;

/// Within this distance the eye stops easing and snaps onto its target.
pub const EYE_SNAP_DISTANCE: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyePosition {
    /// Resting spot, hidden inside the hull.
    Lowered,
    /// Exposed above the hull, where it can be shot.
    Raised,
}

/// The boss's eye: where it sits, where it's heading, and where it looks.
///
/// Movement is an exponential ease: every tick the eye covers
/// `delta * move_speed` of the remaining distance, then snaps exactly onto
/// the target once it's within [`EYE_SNAP_DISTANCE`]. The eye switches on at
/// the start of a raise and off at the end of a lower.
#[derive(Debug, Clone)]
pub struct EyeRig {
    lowered: Vec3,
    raised: Vec3,
    translation: Vec3,
    rotation: Quat,
    position: EyePosition,
    moving: bool,
    active: bool,
    move_speed: f32,
}

impl EyeRig {
    /// Starts lowered and inactive at `rest`.
    pub fn new(rest: Vec3, raise_height: f32, move_speed: f32) -> Self {
        Self {
            lowered: rest,
            raised: rest + Vec3::Y * raise_height,
            translation: rest,
            rotation: Quat::IDENTITY,
            position: EyePosition::Lowered,
            moving: false,
            active: false,
            move_speed,
        }
    }

    /// Start moving toward `position`.
    ///
    /// Returns `Some(active)` when the eye's activation flag changed (raising
    /// switches it on immediately). Asking for the position the eye already
    /// has, or is already heading to, is ignored and leaves any motion in
    /// progress alone.
    pub fn request(&mut self, position: EyePosition) -> Option<bool> {
        if self.position == position {
            warn!("eye is already {:?}, ignoring request", position);
            return None;
        }

        self.position = position;
        self.moving = true;

        if position == EyePosition::Raised && !self.active {
            self.active = true;
            return Some(true);
        }
        None
    }

    /// Advance the motion by one tick.
    ///
    /// Returns `Some(false)` on the tick a lowering finishes and the eye
    /// switches off.
    pub fn step(&mut self, delta: f32) -> Option<bool> {
        if !self.moving {
            return None;
        }

        let target = self.target();
        if self.translation.distance(target) <= EYE_SNAP_DISTANCE {
            self.translation = target;
            self.moving = false;
            debug!("eye finished moving ({:?})", self.position);

            if self.position == EyePosition::Lowered && self.active {
                self.active = false;
                return Some(false);
            }
            return None;
        }

        let t = (delta * self.move_speed).clamp(0.0, 1.0);
        self.translation = self.translation.lerp(target, t);
        None
    }

    /// Face `target` while raised; otherwise look straight ahead.
    pub fn face(&mut self, target: Option<Vec3>) {
        self.rotation = match (self.position, target) {
            (EyePosition::Raised, Some(target)) => {
                Transform::from_translation(self.translation)
                    .looking_at(target, Vec3::Y)
                    .rotation
            }
            _ => Quat::IDENTITY,
        };
    }

    pub fn target(&self) -> Vec3 {
        match self.position {
            EyePosition::Lowered => self.lowered,
            EyePosition::Raised => self.raised,
        }
    }

    pub fn position(&self) -> EyePosition {
        self.position
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }
}

#[cfg(test)]
impl EyeRig {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }
}
