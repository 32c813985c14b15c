use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::graph::ProgramRef;

/// Parameters staged by the driving thread since the last submission.
#[derive(Clone, Default)]
pub struct StagedParams {
    /// Simulation seconds to add to every view
    pub delta_seconds: f32,
    pub reinitialize: bool,
    /// Latest effect program, if one was set
    pub program: Option<ProgramRef>,
}

impl StagedParams {
    pub fn is_empty(&self) -> bool {
        self.delta_seconds == 0.0 && !self.reinitialize && self.program.is_none()
    }
}

/// Single-slot overwrite mailbox between the driving and submission threads.
///
/// Writers merge into the one staged snapshot; the reader swaps it out for
/// an empty one. Only the merged result reaches the next submission.
#[derive(Default)]
pub struct ParamMailbox {
    slot: Mutex<StagedParams>,
}

impl ParamMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StagedParams> {
        // Every write leaves the slot consistent, so a panicked writer is harmless.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accumulate simulation time. Negative deltas are ignored.
    pub fn advance_time(&self, delta_seconds: f32) {
        if delta_seconds > 0.0 {
            self.lock().delta_seconds += delta_seconds;
        }
    }

    pub fn request_reinitialize(&self) {
        self.lock().reinitialize = true;
    }

    pub fn set_program(&self, program: ProgramRef) {
        self.lock().program = Some(program);
    }

    /// Take everything staged so far, leaving the slot empty.
    pub fn take(&self) -> StagedParams {
        std::mem::take(&mut *self.lock())
    }
}

/// Driving-side handle to a pass's mailbox. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct GolDriver {
    mailbox: Arc<ParamMailbox>,
}

impl GolDriver {
    pub(crate) fn new(mailbox: Arc<ParamMailbox>) -> Self {
        Self { mailbox }
    }

    pub fn advance_time(&self, delta_seconds: f32) {
        self.mailbox.advance_time(delta_seconds);
    }

    pub fn request_reinitialize(&self) {
        self.mailbox.request_reinitialize();
    }

    pub fn set_effect_program(&self, program: ProgramRef) {
        self.mailbox.set_program(program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EffectProgram;
    use std::thread;

    #[test]
    fn test_take_empties_slot() {
        let mailbox = ParamMailbox::new();
        mailbox.advance_time(0.25);
        mailbox.advance_time(0.5);
        mailbox.request_reinitialize();

        let staged = mailbox.take();
        assert_eq!(staged.delta_seconds, 0.75);
        assert!(staged.reinitialize);
        assert!(mailbox.take().is_empty());
    }

    #[test]
    fn test_reinitialize_is_idempotent() {
        let mailbox = ParamMailbox::new();
        mailbox.request_reinitialize();
        mailbox.request_reinitialize();
        assert!(mailbox.take().reinitialize);
        assert!(!mailbox.take().reinitialize);
    }

    #[test]
    fn test_program_last_write_wins() {
        let mailbox = ParamMailbox::new();
        let first = EffectProgram::new("first", "").into_ref();
        let second = EffectProgram::new("second", "").into_ref();
        mailbox.set_program(first);
        mailbox.set_program(second.clone());
        let staged = mailbox.take().program.unwrap();
        assert!(Arc::ptr_eq(&staged, &second));
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mailbox = ParamMailbox::new();
        mailbox.advance_time(-1.0);
        mailbox.advance_time(0.0);
        assert!(mailbox.take().is_empty());
    }

    #[test]
    fn test_concurrent_drivers() {
        let mailbox = Arc::new(ParamMailbox::new());
        let driver = GolDriver::new(mailbox.clone());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let driver = driver.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        driver.advance_time(0.5);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // 400 exact binary halves: no rounding
        assert_eq!(mailbox.take().delta_seconds, 200.0);
    }
}
