use std::any::{type_name, TypeId};
use std::collections::HashMap;

use bevy::prelude::*;

/// One state of a [`StateMachine`] over a shared context `C`.
///
/// All hooks default to doing nothing, so a state only writes the ones it
/// cares about. `Send + Sync` because the machine ends up inside a component.
pub trait State<C>: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn on_enter(&mut self, _cx: &mut C) {}

    fn update(&mut self, _cx: &mut C, _delta: f32) {}

    fn on_exit(&mut self, _cx: &mut C) {}
}

/// Identifies a state type, plus its name for log and panic messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateKey {
    id: TypeId,
    name: &'static str,
}

impl StateKey {
    pub fn of<S: 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Holds every registered state, keyed by type, with at most one active.
///
/// The context is not owned here; every call takes it as `&mut C`.
pub struct StateMachine<C> {
    states: HashMap<TypeId, Box<dyn State<C>>>,
    current: Option<TypeId>,
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }
}

impl<C: 'static> StateMachine<C> {
    /// Register a state. A second registration of the same type is ignored.
    pub fn add_state<S: State<C>>(&mut self, state: S) {
        let id = TypeId::of::<S>();
        if self.states.contains_key(&id) {
            warn!("state {} registered twice, keeping the first", state.name());
            return;
        }
        self.states.insert(id, Box::new(state));
    }

    /// Switch to `S`. See [`StateMachine::change_to`].
    pub fn change_state<S: State<C>>(&mut self, cx: &mut C) -> bool {
        self.change_to(StateKey::of::<S>(), cx)
    }

    /// Exit the active state and enter `key`.
    ///
    /// Asking for the state that is already active does nothing (and returns
    /// false): no exit/enter pair, so per-state timers keep running.
    ///
    /// # Panics
    /// If `key` was never registered. That is a wiring bug, not something
    /// the game can recover from.
    pub fn change_to(&mut self, key: StateKey, cx: &mut C) -> bool {
        if !self.states.contains_key(&key.id) {
            panic!("state {} was never registered", key.name);
        }
        if self.current == Some(key.id) {
            return false;
        }

        if let Some(old) = self.current.and_then(|id| self.states.get_mut(&id)) {
            old.on_exit(cx);
            debug!("exited {}", old.name());
        }

        self.current = Some(key.id);
        if let Some(new) = self.states.get_mut(&key.id) {
            debug!("entering {}", new.name());
            new.on_enter(cx);
        }
        true
    }

    /// Run the active state's update hook. Does nothing before the first transition.
    pub fn update(&mut self, cx: &mut C, delta: f32) {
        if let Some(state) = self.current.and_then(|id| self.states.get_mut(&id)) {
            state.update(cx, delta);
        }
    }

    pub fn is_in<S: 'static>(&self) -> bool {
        self.current == Some(TypeId::of::<S>())
    }

}

#[cfg(test)]
impl<C: 'static> StateMachine<C> {
    pub fn current_name(&self) -> Option<&'static str> {
        self.current
            .and_then(|id| self.states.get(&id))
            .map(|state| state.name())
    }

    pub fn is_registered<S: 'static>(&self) -> bool {
        self.states.contains_key(&TypeId::of::<S>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every hook call is recorded here as "enter A", "update B", ...
    type Log = Vec<String>;

    struct Walk;
    struct Run;
    struct Swim;

    macro_rules! recording_state {
        ($ty:ty, $name:literal) => {
            impl State<Log> for $ty {
                fn name(&self) -> &'static str {
                    $name
                }
                fn on_enter(&mut self, log: &mut Log) {
                    log.push(format!("enter {}", $name));
                }
                fn update(&mut self, log: &mut Log, _delta: f32) {
                    log.push(format!("update {}", $name));
                }
                fn on_exit(&mut self, log: &mut Log) {
                    log.push(format!("exit {}", $name));
                }
            }
        };
    }

    recording_state!(Walk, "Walk");
    recording_state!(Run, "Run");
    recording_state!(Swim, "Swim");

    fn machine() -> StateMachine<Log> {
        let mut machine = StateMachine::default();
        machine.add_state(Walk);
        machine.add_state(Run);
        machine
    }

    #[test]
    fn changing_to_the_active_state_is_a_no_op() {
        let mut machine = machine();
        let mut log = Log::new();

        assert!(machine.change_state::<Walk>(&mut log));
        log.clear();

        assert!(!machine.change_state::<Walk>(&mut log));
        assert!(log.is_empty());
        assert!(machine.is_in::<Walk>());
    }

    #[test]
    fn changing_state_exits_once_then_enters_once() {
        let mut machine = machine();
        let mut log = Log::new();

        machine.change_state::<Walk>(&mut log);
        log.clear();
        machine.change_state::<Run>(&mut log);

        assert_eq!(log, vec!["exit Walk", "enter Run"]);
        assert_eq!(machine.current_name(), Some("Run"));
    }

    #[test]
    fn update_goes_to_the_active_state_only() {
        let mut machine = machine();
        let mut log = Log::new();

        machine.update(&mut log, 0.1);
        assert!(log.is_empty());

        machine.change_state::<Run>(&mut log);
        log.clear();
        machine.update(&mut log, 0.1);
        machine.update(&mut log, 0.1);

        assert_eq!(log, vec!["update Run", "update Run"]);
    }

    #[test]
    #[should_panic(expected = "was never registered")]
    fn unregistered_state_panics() {
        let mut machine = machine();
        let mut log = Log::new();
        machine.change_state::<Swim>(&mut log);
    }

    #[test]
    fn duplicate_registration_keeps_one_state() {
        let mut machine = machine();
        machine.add_state(Walk);

        assert!(machine.is_registered::<Walk>());
        assert!(!machine.is_registered::<Swim>());
    }
}
