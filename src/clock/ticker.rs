#[cfg(test)]
use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::interval::phase::FRAME_RATE_HZ;

/// Source of frame ticks for the run loop.
///
/// `tick` resolves once per frame and returns `false` once the source has
/// no more frames to give.
pub trait Ticker {
    async fn tick(&mut self) -> bool;
}

pub fn frame_period() -> Duration {
    Duration::from_millis(1000) / FRAME_RATE_HZ as u32
}

/// Wall-clock ticker at the frame rate.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        // a stalled loop should not burst-catch-up frames
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn at_frame_rate() -> Self {
        Self::new(frame_period())
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Releases a scripted number of frames without waiting on the clock.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedTicker {
    batches: VecDeque<u64>,
    current: u64,
}

#[cfg(test)]
impl ScriptedTicker {
    pub fn new(batches: impl IntoIterator<Item = u64>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
            current: 0,
        }
    }
}

#[cfg(test)]
impl Ticker for ScriptedTicker {
    async fn tick(&mut self) -> bool {
        while self.current == 0 {
            match self.batches.pop_front() {
                Some(batch) => self.current = batch,
                None => return false,
            }
        }
        tokio::task::yield_now().await;
        self.current -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_frame_period_is_thirty_hz() {
        assert_eq!(frame_period(), Duration::from_nanos(33_333_333));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_paces_frames() {
        let start = Instant::now();
        let mut ticker = IntervalTicker::at_frame_rate();
        for _ in 0..31 {
            assert!(ticker.tick().await);
        }
        // first tick is immediate, thirty more make one second
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(999));
        assert!(elapsed < Duration::from_millis(1001));
    }

    #[tokio::test]
    async fn test_scripted_ticker_runs_out() {
        let mut ticker = ScriptedTicker::new([2]);
        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        assert!(!ticker.tick().await);
    }

    #[tokio::test]
    async fn test_scripted_ticker_skips_empty_batches() {
        let mut ticker = ScriptedTicker::new([1, 0, 2]);
        let mut count = 0;
        while ticker.tick().await {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
