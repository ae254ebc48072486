use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed for the timer started for `round`.
    Tick { round: u64 },
}

/// Handle to the background ticker of one round. Only one is alive at a time:
/// it is replaced when a round starts and the task is aborted on drop.
#[derive(Debug)]
pub struct RoundTimer {
    handle: JoinHandle<()>,
}

impl RoundTimer {
    pub fn start(round: u64, events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(TimerEvent::Tick { round }).is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RoundTimer::start(7, tx);

        let started = Instant::now();
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(TimerEvent::Tick { round: 7 }));
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
        drop(timer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_goes_quiet() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RoundTimer::start(1, tx);
        timer.stop();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.recv().await.is_none());
    }
}
