use std::time::Duration;

use bevy::prelude::*;

/// Counts time spent in a state (or a step of a skill) against a fixed duration.
///
/// A Bevy `Timer` in `TimerMode::Once`, ticked with plain seconds from
/// `update(delta)`. `tick` reports expiry on a single tick; the timer then
/// stays finished until `reset()`.
#[derive(Debug, Clone)]
pub struct PhaseTimer(Timer);

impl PhaseTimer {
    pub fn new(seconds: f32) -> Self {
        // Negative durations become an instant timer.
        Self(Timer::from_seconds(seconds.max(0.0), TimerMode::Once))
    }

    /// Re-arm the timer. States call this from `on_enter`.
    pub fn reset(&mut self) {
        self.0.reset();
    }

    /// Advance by `delta` seconds. Returns true only on the tick where the
    /// elapsed time first reaches the duration.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.0.tick(Duration::from_secs_f32(delta.max(0.0)));
        self.0.just_finished()
    }
}

#[cfg(test)]
impl PhaseTimer {
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.0.elapsed_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_when_duration_is_reached() {
        let mut timer = PhaseTimer::new(1.0);

        assert!(!timer.tick(0.5));
        assert!(timer.tick(0.5));
        // Keeps reporting finished, but never "just finished" again.
        assert!(!timer.tick(0.5));
        assert!(!timer.tick(10.0));
        assert!(timer.is_finished());
    }

    #[test]
    fn reset_rearms_the_timer() {
        let mut timer = PhaseTimer::new(0.5);
        assert!(timer.tick(1.0));

        timer.reset();
        assert!(!timer.is_finished());
        assert_eq!(timer.elapsed_secs(), 0.0);
        assert!(timer.tick(0.5));
    }

    #[test]
    fn negative_duration_is_an_instant_timer() {
        let mut timer = PhaseTimer::new(-3.0);
        assert!(timer.tick(0.0));
    }
}
