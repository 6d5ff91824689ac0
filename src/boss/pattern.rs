use bevy::prelude::*;
use rand::{rngs::StdRng, Rng};

/// The three attacks the boss can pick from after a Defence phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackPattern {
    CoreExplosion,
    EyeLaser,
    Emp,
}

impl AttackPattern {
    /// Which patterns go into a fresh bag.
    ///
    /// Core explosion needs cores to explode, so it drops out once every
    /// core has been destroyed.
    pub fn eligible(all_cores_eliminated: bool) -> &'static [AttackPattern] {
        if all_cores_eliminated {
            &[AttackPattern::EyeLaser, AttackPattern::Emp]
        } else {
            &[
                AttackPattern::CoreExplosion,
                AttackPattern::EyeLaser,
                AttackPattern::Emp,
            ]
        }
    }
}

/// A "bag" of attack patterns drawn without replacement.
///
/// Every pattern in a fill is used once before any repeats. When the bag runs
/// dry it is refilled from [`AttackPattern::eligible`] using the core state
/// at refill time, so a change in eligibility only shows up in the next bag.
/// A CoreExplosion already sitting in the current bag stays there even if
/// the last core dies mid-bag; the Core-Explosion state copes with having
/// nothing to detonate.
#[derive(Debug)]
pub struct AttackPatternSelector {
    bag: Vec<AttackPattern>,
    rng: StdRng,
}

impl AttackPatternSelector {
    /// Starts with an empty bag: the first draw fills it.
    pub fn new(rng: StdRng) -> Self {
        Self {
            bag: Vec::new(),
            rng,
        }
    }

    pub fn select_next(&mut self, all_cores_eliminated: bool) -> AttackPattern {
        if self.bag.is_empty() {
            self.bag
                .extend_from_slice(AttackPattern::eligible(all_cores_eliminated));
            debug!("attack bag refilled: {:?}", self.bag);
        }

        let index = self.rng.gen_range(0..self.bag.len());
        self.bag.swap_remove(index)
    }
}

#[cfg(test)]
impl AttackPatternSelector {
    /// What is left in the current bag.
    pub fn remaining(&self) -> &[AttackPattern] {
        &self.bag
    }
}
