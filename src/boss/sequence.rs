use bevy::prelude::*;

use super::skills::SkillIo;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SequenceId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished,
}

/// A step-by-step behavior spread over several ticks.
///
/// `resume` is called once per tick until it returns `Finished`. It is the
/// explicit form of a coroutine that yields every frame: the sequence keeps
/// its own progress in its fields and picks up where it left off.
pub trait Sequence: Send + Sync + 'static {
    fn label(&self) -> &'static str;

    fn resume(&mut self, delta: f32, io: &mut SkillIo<'_>) -> SequenceStatus;
}

/// Runs the boss's active skill sequences, in the order they were started.
///
/// Stopping a sequence drops it on the spot, so whatever it was waiting to
/// do (a detonation, a laser shot) never happens.
#[derive(Default)]
pub struct SequenceRunner {
    next_id: u64,
    active: Vec<(SequenceId, Box<dyn Sequence>)>,
}

impl SequenceRunner {
    pub fn start(&mut self, sequence: impl Sequence) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        debug!("sequence {} started ({:?})", sequence.label(), id);
        self.active.push((id, Box::new(sequence)));
        id
    }

    /// Cancel one sequence. Returns false if it had already finished.
    pub fn stop(&mut self, id: SequenceId) -> bool {
        let before = self.active.len();
        self.active.retain(|(active_id, _)| *active_id != id);
        self.active.len() != before
    }

    /// Cancel everything. Returns how many sequences were dropped.
    pub fn stop_all(&mut self) -> usize {
        let stopped = self.active.len();
        self.active.clear();
        if stopped > 0 {
            debug!("stopped {} skill sequences", stopped);
        }
        stopped
    }

    pub fn is_running(&self, id: SequenceId) -> bool {
        self.active.iter().any(|(active_id, _)| *active_id == id)
    }

    /// Resume every sequence once and drop the ones that finished.
    pub fn resume_all(&mut self, delta: f32, io: &mut SkillIo<'_>) {
        self.active.retain_mut(|(id, sequence)| {
            match sequence.resume(delta, io) {
                SequenceStatus::Running => true,
                SequenceStatus::Finished => {
                    debug!("sequence {} finished ({:?})", sequence.label(), id);
                    false
                }
            }
        });
    }
}

impl std::fmt::Debug for SequenceRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.active.iter().map(|(id, sequence)| (id, sequence.label())))
            .finish()
    }
}

#[cfg(test)]
impl SequenceRunner {
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
