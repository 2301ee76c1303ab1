//! Autoplay timer for the pacing engine.
//!
//! The scheduler never spawns threads or sleeps. The front end asks how
//! long until the next tick, waits for input for at most that long, and
//! then polls with the current instant. Only one timer exists at a time:
//! starting while running replaces the deadline, and a late poll fires
//! once and skips the deadlines it missed.

use crate::engine::{AdvanceResult, PacingEngine};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default speed curve bounds, in milliseconds.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 200;
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 5000;
/// Upper bound for either end of the curve.
pub const MAX_INTERVAL_CAP_MS: u64 = 60_000;
/// Number of user-facing speed levels.
pub const DEFAULT_SPEED_STEPS: u32 = 20;

/// Monotonic mapping from a speed level to a tick interval.
///
/// Level 1 is the slowest (`max_interval_ms`) and level `steps` the fastest
/// (`min_interval_ms`); levels in between are spaced evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedCurve {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub steps: u32,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            steps: DEFAULT_SPEED_STEPS,
        }
    }
}

impl SpeedCurve {
    pub fn new(min_interval_ms: u64, max_interval_ms: u64, steps: u32) -> Self {
        let min_interval_ms = min_interval_ms.clamp(1, MAX_INTERVAL_CAP_MS);
        Self {
            min_interval_ms,
            max_interval_ms: max_interval_ms.clamp(min_interval_ms, MAX_INTERVAL_CAP_MS),
            steps: steps.max(1),
        }
    }

    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.steps)
    }

    pub fn interval_for(&self, level: u32) -> Duration {
        let level = self.clamp_level(level);
        if self.steps == 1 {
            return Duration::from_millis(self.max_interval_ms);
        }
        let span = self.max_interval_ms - self.min_interval_ms;
        let fastness = u64::from(level - 1);
        let ms = self.max_interval_ms - span * fastness / u64::from(self.steps - 1);
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Stopped,
    Running {
        interval: Duration,
        next_due: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    state: TimerState,
    generation: u64,
}

impl Default for AutoplayScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoplayScheduler {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            generation: 0,
        }
    }

    /// Start ticking every `interval`, replacing any running timer.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        let interval = interval.max(Duration::from_millis(1));
        if self.is_running() {
            debug!(generation = self.generation, "Replacing running autoplay timer");
        }
        self.generation += 1;
        self.state = TimerState::Running {
            interval,
            next_due: now + interval,
        };
        info!(
            generation = self.generation,
            interval_ms = interval.as_millis() as u64,
            "Autoplay started"
        );
    }

    /// Cancel the timer. No tick fires after this returns.
    pub fn stop(&mut self) {
        if self.is_running() {
            info!(generation = self.generation, "Autoplay stopped");
        }
        self.state = TimerState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn interval(&self) -> Option<Duration> {
        match self.state {
            TimerState::Running { interval, .. } => Some(interval),
            TimerState::Stopped => None,
        }
    }

    /// Identifies the current timer; bumps on every start.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time left until the next tick, `None` when stopped.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Running { next_due, .. } => Some(next_due.saturating_duration_since(now)),
            TimerState::Stopped => None,
        }
    }

    /// Whether a tick is due at `now`. Consumes the tick when it is.
    pub fn poll(&mut self, now: Instant) -> bool {
        let TimerState::Running { interval, next_due } = self.state else {
            return false;
        };
        if now < next_due {
            return false;
        }
        let mut following = next_due + interval;
        while following <= now {
            following += interval;
        }
        self.state = TimerState::Running {
            interval,
            next_due: following,
        };
        true
    }

    /// Poll and, when a tick is due, advance the engine. Stops itself when
    /// the book is finished.
    pub fn drive(&mut self, engine: &mut PacingEngine, now: Instant) -> Option<AdvanceResult> {
        if !self.poll(now) {
            return None;
        }
        let result = engine.advance();
        if result == AdvanceResult::Finished {
            info!("Reached end of book; stopping autoplay");
            self.stop();
        }
        Some(result)
    }
}
