//! Clock and delay utilities for session timing.
//!
//! Session start goes through fixed settle and backoff waits. The [`Delay`]
//! trait abstracts those waits so the retry path can be driven in tests
//! without real wall-clock sleeps. [`SessionClock`] anchors a session's log
//! lines to the moment the session was created.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A per-session clock anchored to the session's creation instant.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session was created.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a clock from a known epoch.
    pub fn from_epoch(epoch: Instant, wall: String) -> Self {
        Self {
            epoch,
            epoch_wall: wall,
        }
    }

    /// Seconds elapsed since the session was created.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session creation.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Timing knobs for the bounded session-start retry sequence.
///
/// `max_retries` counts retries after the first attempt, so a session that
/// never starts issues `1 + max_retries` platform start calls. The backoff is
/// a fixed delay, not exponential.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the initial start attempt.
    pub max_retries: u32,

    /// Fixed wait between start attempts.
    pub backoff: Duration,

    /// Settle wait before the first start attempt.
    pub settle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
            settle: Duration::from_millis(150),
        }
    }
}

impl RetryPolicy {
    /// A policy with zero waits, for tests that still want real retry counts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

/// An awaitable wait, injectable so retry timing is testable.
#[async_trait::async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait::async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test double: returns immediately and records each requested duration.
#[derive(Debug, Default)]
pub struct RecordedDelay {
    slept: Mutex<Vec<Duration>>,
}

impl RecordedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The durations requested so far, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl Delay for RecordedDelay {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
