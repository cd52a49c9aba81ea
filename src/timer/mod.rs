//! Countdown state machine
//!
//! `Countdown` holds the committed duration, the remaining seconds and the
//! clock state. It never sleeps; ticking is delegated to a [`Scheduler`] and
//! fired handles come back in through [`Countdown::on_tick`].

pub mod scheduler;

use std::time::Duration;
use thiserror::Error;

pub use scheduler::{Scheduler, TickHandle, TokioScheduler};

/// Period of the repeating countdown tick
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Why a piece of input text is not a usable duration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("duration must be a whole number of seconds, got {0}")]
    Fractional(f64),
    #[error("duration is out of range")]
    OutOfRange,
    #[error("duration is zero")]
    Zero,
}

/// Parse duration input text into whole seconds
///
/// Negative values parse fine; rejecting them is up to `set_duration`.
pub fn parse_duration(text: &str) -> Result<i64, DurationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DurationError::Empty);
    }

    let value: f64 = text
        .parse()
        .map_err(|_| DurationError::NotANumber(text.to_string()))?;

    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return Err(DurationError::OutOfRange);
    }
    if value.fract() != 0.0 {
        return Err(DurationError::Fractional(value));
    }
    if value == 0.0 {
        return Err(DurationError::Zero);
    }

    Ok(value as i64)
}

/// Format seconds as `mm:ss` (minutes keep growing past 99)
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    Idle,
    Ticking(TickHandle),
}

/// What a delivered tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second removed, this many remain
    Decremented(u64),
    /// Reached zero and stopped
    Finished,
    /// Tick came from a cancelled handle and was ignored
    Stale,
}

pub struct Countdown<S: Scheduler> {
    duration: Option<i64>,
    time_left: u64,
    clock: Clock,
    prompt_visible: bool,
    scheduler: S,
}

impl<S: Scheduler> Countdown<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            duration: None,
            time_left: 0,
            clock: Clock::Idle,
            prompt_visible: true,
            scheduler,
        }
    }

    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        matches!(self.clock, Clock::Ticking(_))
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    /// Remaining time as `mm:ss`
    pub fn display(&self) -> String {
        format_time(self.time_left)
    }

    /// Label for the start button; doubles as the running indicator
    pub fn start_label(&self) -> &'static str {
        if self.is_running() {
            "Running"
        } else {
            "Start"
        }
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Store the parsed value of the raw input text, or empty if it doesn't parse
    pub fn set_duration_input(&mut self, text: &str) {
        self.duration = match parse_duration(text) {
            Ok(secs) => Some(secs),
            Err(e) => {
                tracing::debug!("duration input cleared: {}", e);
                None
            }
        };
    }

    /// Commit the current duration into the countdown
    ///
    /// Returns false (and changes nothing) unless the duration is positive.
    pub fn set_duration(&mut self) -> bool {
        let secs = match self.duration {
            Some(d) if d > 0 => d as u64,
            _ => return false,
        };

        self.stop();
        self.time_left = secs;
        self.prompt_visible = false;
        tracing::debug!(secs, "duration committed");
        true
    }

    /// Start or resume ticking; no-op when already running or at zero
    pub fn start(&mut self) -> bool {
        if self.time_left == 0 || self.is_running() {
            return false;
        }

        self.stop();
        let handle = self.scheduler.schedule_repeating(TICK_INTERVAL);
        self.clock = Clock::Ticking(handle);
        tracing::debug!(time_left = self.time_left, "countdown started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.stop();
        tracing::debug!(time_left = self.time_left, "countdown paused");
        true
    }

    /// Stop, restore the duration (0 when there is none) and show the prompt again
    pub fn reset(&mut self) {
        self.stop();
        self.time_left = self.duration.map_or(0, |d| d.max(0) as u64);
        self.prompt_visible = true;
        tracing::debug!(time_left = self.time_left, "countdown reset");
    }

    /// Apply one fired tick
    pub fn on_tick(&mut self, handle: TickHandle) -> TickOutcome {
        match self.clock {
            Clock::Ticking(active) if active == handle => {}
            _ => return TickOutcome::Stale,
        }

        if self.time_left <= 1 {
            self.time_left = 0;
            self.stop();
            tracing::info!("countdown finished");
            TickOutcome::Finished
        } else {
            self.time_left -= 1;
            TickOutcome::Decremented(self.time_left)
        }
    }

    /// Cancel the active tick, if any, and go idle
    fn stop(&mut self) {
        if let Clock::Ticking(handle) = self.clock {
            self.scheduler.cancel(handle);
        }
        self.clock = Clock::Idle;
    }
}

impl<S: Scheduler> Drop for Countdown<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
