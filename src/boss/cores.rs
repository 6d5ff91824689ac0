use bevy::prelude::*;

use super::signal::Signal;

/// Opaque handle for one of the boss's weak points.
///
/// The Bevy layer keeps the mapping from `CoreId` to the core's entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(pub u32);

/// A live core and whether it can currently take damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Core {
    pub id: CoreId,
    pub vulnerable: bool,
}

/// What an add/remove did to the "all cores eliminated" flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreTransition {
    /// The flag didn't flip (including rejected or redundant calls).
    Unchanged,
    /// The last live core was removed.
    AllDestroyed,
    /// A core came back after all of them had been destroyed.
    Recovered,
}

/// Owns the set of live cores.
///
/// `all_eliminated` is derived from the live set and recomputed after every
/// add/remove. The two signals fire only when that flag actually flips, so
/// removing an already-removed core or re-adding a live one is silent.
#[derive(Debug)]
pub struct CoreGroupTracker {
    live: Vec<Core>,
    all_eliminated: bool,
    /// Vulnerability given to cores added later (Defence may have locked them).
    cores_vulnerable: bool,
    pub on_all_destroyed: Signal<()>,
    pub on_recovered: Signal<CoreId>,
}

impl CoreGroupTracker {
    pub fn new(cores: impl IntoIterator<Item = CoreId>) -> Self {
        let mut live: Vec<Core> = Vec::new();
        for id in cores {
            if live.iter().any(|core| core.id == id) {
                warn!("core {:?} listed twice, keeping one", id);
                continue;
            }
            live.push(Core {
                id,
                vulnerable: true,
            });
        }

        Self {
            all_eliminated: live.is_empty(),
            live,
            cores_vulnerable: true,
            on_all_destroyed: Signal::default(),
            on_recovered: Signal::default(),
        }
    }

    /// Drop a destroyed core. Removing a core that isn't live does nothing.
    pub fn remove(&mut self, id: CoreId) -> CoreTransition {
        let Some(index) = self.live.iter().position(|core| core.id == id) else {
            debug!("core {:?} is not live, ignoring removal", id);
            return CoreTransition::Unchanged;
        };

        self.live.remove(index);
        debug!("core {:?} removed, {} left", id, self.live.len());
        self.recompute(id)
    }

    /// Bring a core back. Adding a core that is already live is rejected.
    pub fn add(&mut self, id: CoreId) -> CoreTransition {
        if self.contains(id) {
            warn!("core {:?} is already live, ignoring recovery", id);
            return CoreTransition::Unchanged;
        }

        self.live.push(Core {
            id,
            vulnerable: self.cores_vulnerable,
        });
        info!("core {:?} recovered, {} live", id, self.live.len());
        self.recompute(id)
    }

    fn recompute(&mut self, changed: CoreId) -> CoreTransition {
        let was_eliminated = self.all_eliminated;
        self.all_eliminated = self.live.is_empty();

        match (was_eliminated, self.all_eliminated) {
            (false, true) => {
                info!("all cores destroyed");
                self.on_all_destroyed.emit(&());
                CoreTransition::AllDestroyed
            }
            (true, false) => {
                self.on_recovered.emit(&changed);
                CoreTransition::Recovered
            }
            _ => CoreTransition::Unchanged,
        }
    }

    /// Lock or unlock every live core (and any core recovered afterwards).
    pub fn set_all_vulnerable(&mut self, vulnerable: bool) {
        self.cores_vulnerable = vulnerable;
        for core in self.live.iter_mut() {
            core.vulnerable = vulnerable;
        }
    }

    pub fn all_eliminated(&self) -> bool {
        self.all_eliminated
    }

    pub fn contains(&self, id: CoreId) -> bool {
        self.live.iter().any(|core| core.id == id)
    }

    pub fn live_ids(&self) -> Vec<CoreId> {
        self.live.iter().map(|core| core.id).collect()
    }

    /// None if the core isn't live.
    pub fn is_vulnerable(&self, id: CoreId) -> Option<bool> {
        self.live
            .iter()
            .find(|core| core.id == id)
            .map(|core| core.vulnerable)
    }
}

#[cfg(test)]
impl CoreGroupTracker {
    pub fn live(&self) -> &[Core] {
        &self.live
    }
}
