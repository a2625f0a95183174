/// Advance timer handle
///
/// The slideshow owns exactly one of these. It does not sleep by itself: the
/// driver turns a running timer into real ticks (see `Slideshow::ticker`) and
/// stamps every tick with the generation it was created for. Starting the timer
/// again bumps the generation, so ticks from the replaced timer are ignored
/// and two timers can never advance the show at once.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Stopped { generation: u64 },
    Running { period: Duration, generation: u64 },
}

impl Timer {
    pub fn new() -> Self {
        Timer::Stopped { generation: 0 }
    }

    /// Start (or restart) with `period`, replacing any running timer
    pub fn start(&mut self, period: Duration) {
        let generation = self.generation() + 1;
        *self = Timer::Running { period, generation };
    }

    /// Stop; harmless when already stopped
    pub fn stop(&mut self) {
        *self = Timer::Stopped {
            generation: self.generation(),
        };
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Timer::Running { .. })
    }

    pub fn generation(&self) -> u64 {
        match *self {
            Timer::Stopped { generation } | Timer::Running { generation, .. } => generation,
        }
    }

    /// Whether a tick stamped with `generation` belongs to the live timer
    pub fn accepts(&self, generation: u64) -> bool {
        matches!(*self, Timer::Running { generation: live, .. } if live == generation)
    }

    pub fn period(&self) -> Option<Duration> {
        match *self {
            Timer::Running { period, .. } => Some(period),
            Timer::Stopped { .. } => None,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_replaces_generation() {
        let mut timer = Timer::new();
        assert!(!timer.is_running());

        timer.start(Duration::from_secs(15));
        let first = timer.generation();
        assert!(timer.accepts(first));

        timer.start(Duration::from_secs(15));
        assert!(!timer.accepts(first));
        assert!(timer.accepts(first + 1));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut timer = Timer::new();
        timer.start(Duration::from_secs(1));
        let generation = timer.generation();

        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.accepts(generation));
        assert_eq!(timer.period(), None);
        assert_eq!(timer.generation(), generation);
    }
}
