use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ROUND_SECS, MIN_ROUND_SECS, TIMER_EXTENSION_SECS};

/// Seconds allotted to a round: more empty cells means more time, higher
/// levels shrink it. Always within `MIN_ROUND_SECS..=MAX_ROUND_SECS`.
pub fn round_duration_secs(empty_cells: usize, total_cells: usize, level: u32) -> u32 {
    let empty_percentage = if total_cells == 0 {
        0.0
    } else {
        (empty_cells as f64 / total_cells as f64).clamp(0.0, 1.0)
    };
    let base_time = MIN_ROUND_SECS as f64
        + (empty_percentage * (MAX_ROUND_SECS - MIN_ROUND_SECS) as f64).floor();
    let duration = (base_time * level_multiplier(level)).round() as u32;
    duration.clamp(MIN_ROUND_SECS, MAX_ROUND_SECS)
}

fn level_multiplier(level: u32) -> f64 {
    match level {
        0..=2 => 0.7,
        3..=5 => 0.6,
        6..=10 => 0.5,
        _ => 0.4,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Expired,
    Cancelled,
}

/// What a single one-second tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Expired,
    Ignored,
}

/// Round countdown in whole seconds.
///
/// `Idle -> Running -> {Expired, Cancelled}`; `Paused` freezes ticking while a
/// submission is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub duration: u32,
    pub remaining: u32,
    pub state: CountdownState,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            state: CountdownState::Idle,
        }
    }

    pub fn start(&mut self) {
        if self.state == CountdownState::Idle {
            self.state = CountdownState::Running;
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != CountdownState::Running {
            return TickOutcome::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }

    pub fn pause(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == CountdownState::Paused {
            self.state = CountdownState::Running;
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, CountdownState::Idle | CountdownState::Running | CountdownState::Paused) {
            self.state = CountdownState::Cancelled;
        }
    }

    /// Adds `TIMER_EXTENSION_SECS` and keeps (or resumes) ticking. Elapsed time
    /// is not reset. Has no effect once the countdown was cancelled.
    pub fn extend(&mut self) -> bool {
        match self.state {
            CountdownState::Cancelled | CountdownState::Idle => false,
            _ => {
                self.remaining += TIMER_EXTENSION_SECS;
                self.state = CountdownState::Running;
                true
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CountdownState::Running | CountdownState::Paused)
    }
}

pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bounds() {
        for level in 1..=40 {
            for total in 9..=21 {
                for empty in 0..=total {
                    let secs = round_duration_secs(empty, total, level);
                    assert!((MIN_ROUND_SECS..=MAX_ROUND_SECS).contains(&secs));
                }
            }
        }
    }

    #[test]
    fn test_duration_examples() {
        // 60% empty at level 1: 15 + floor(0.6 * 45) = 42 -> round(42 * 0.7) = 29
        assert_eq!(round_duration_secs(6, 10, 1), 29);
        // Fully empty at level 4: 60 * 0.6 = 36
        assert_eq!(round_duration_secs(10, 10, 4), 36);
        // Late levels hit the floor.
        assert_eq!(round_duration_secs(0, 21, 30), MIN_ROUND_SECS);
        assert_eq!(round_duration_secs(0, 0, 1), MIN_ROUND_SECS);
    }

    #[test]
    fn test_countdown_expires() {
        let mut countdown = Countdown::new(2);
        assert_eq!(countdown.tick(), TickOutcome::Ignored);
        countdown.start();
        assert_eq!(countdown.tick(), TickOutcome::Running(1));
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.state, CountdownState::Expired);
        assert_eq!(countdown.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut countdown = Countdown::new(5);
        countdown.start();
        countdown.pause();
        assert_eq!(countdown.tick(), TickOutcome::Ignored);
        assert_eq!(countdown.remaining, 5);
        countdown.resume();
        assert_eq!(countdown.tick(), TickOutcome::Running(4));
    }

    #[test]
    fn test_extend_keeps_progress() {
        let mut countdown = Countdown::new(20);
        countdown.start();
        for _ in 0..15 {
            countdown.tick();
        }
        assert!(countdown.extend());
        assert_eq!(countdown.remaining, 15);
        assert_eq!(countdown.duration, 20);

        countdown.cancel();
        assert!(!countdown.extend());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(75), "01:15");
        assert_eq!(format_time(9), "00:09");
    }
}
