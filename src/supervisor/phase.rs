// src/supervisor/phase.rs

use std::sync::{Arc, Mutex};

/// Lifecycle of one run once the worker has been spawned.
///
/// Only two transitions leave `Running`, and exactly one of them wins:
/// - close handling: `Running -> Resolved` (the verdict is delivered),
/// - interrupt: `Running -> Stopping` (the verdict is suppressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Stopping,
    Resolved,
}

/// Phase shared between the task awaiting the run and interrupt callers.
#[derive(Debug, Clone)]
pub struct SharedPhase(Arc<Mutex<RunPhase>>);

impl SharedPhase {
    pub fn running() -> Self {
        Self(Arc::new(Mutex::new(RunPhase::Running)))
    }

    pub fn get(&self) -> RunPhase {
        *self.lock()
    }

    /// `Running -> Resolved`. Returns false if an interrupt got there first.
    pub fn try_resolve(&self) -> bool {
        self.transition(RunPhase::Resolved)
    }

    /// `Running -> Stopping`. Returns false if the run already resolved.
    pub fn try_stop(&self) -> bool {
        self.transition(RunPhase::Stopping)
    }

    fn transition(&self, to: RunPhase) -> bool {
        let mut phase = self.lock();
        if *phase == RunPhase::Running {
            *phase = to;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunPhase> {
        // The phase is a plain enum; a poisoned lock still holds a valid value.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_wins_over_later_stop() {
        let phase = SharedPhase::running();
        assert!(phase.try_resolve());
        assert!(!phase.try_stop());
        assert_eq!(phase.get(), RunPhase::Resolved);
    }

    #[test]
    fn stop_wins_over_later_resolve() {
        let phase = SharedPhase::running();
        let other = phase.clone();
        assert!(other.try_stop());
        assert!(!phase.try_resolve());
        assert_eq!(phase.get(), RunPhase::Stopping);
    }

    #[test]
    fn exactly_one_transition_wins_under_contention() {
        for _ in 0..50 {
            let phase = SharedPhase::running();
            let a = phase.clone();
            let b = phase.clone();
            let t1 = std::thread::spawn(move || a.try_resolve());
            let t2 = std::thread::spawn(move || b.try_stop());
            let wins = [t1.join().unwrap(), t2.join().unwrap()];
            assert_eq!(wins.iter().filter(|w| **w).count(), 1);
        }
    }
}
