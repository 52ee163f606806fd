//! Per-platform request pacing
//!
//! Inserts a randomized delay before an upstream call when the previous call
//! to the same platform was too recent.

use std::ops::RangeInclusive;
use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::debug;

use crate::config::PacingConfig;

/// Pacing clock for one platform
///
/// The last-call stamp is read and written under a short lock that is never
/// held across an await. Two concurrent callers may both see a stale stamp
/// and under-delay; that only degrades pacing quality.
#[derive(Debug)]
pub struct Pacer {
    platform: &'static str,
    min: Duration,
    max: Duration,
    enabled: bool,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a pacer from the shared pacing configuration
    pub fn new(platform: &'static str, config: &PacingConfig) -> Self {
        Self {
            platform,
            min: config.min(),
            max: config.max(),
            enabled: config.anti_detection,
            last_call: Mutex::new(None),
        }
    }

    /// A pacer that never sleeps (tests, trusted environments)
    pub fn disabled(platform: &'static str) -> Self {
        Self {
            platform,
            min: Duration::ZERO,
            max: Duration::ZERO,
            enabled: false,
            last_call: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wait if the previous call was less than `min` ago, then stamp now
    pub async fn pace(&self) {
        if !self.enabled {
            return;
        }

        let since_last = self.read_last().map(|t| t.elapsed());

        if since_last.is_some_and(|elapsed| elapsed < self.min) {
            let delay = self.random_delay();
            debug!("Pacing {} request for {:?}", self.platform, delay);
            tokio::time::sleep(delay).await;
        }

        self.stamp();
    }

    /// Randomized pause of `range` seconds, skipped when anti-detection is off
    pub async fn jitter(&self, range: RangeInclusive<f64>) {
        if !self.enabled {
            return;
        }

        let secs = {
            let (lo, hi) = (range.start().max(0.0), range.end().max(0.0));
            if hi > lo {
                rand::rng().random_range(lo..=hi)
            } else {
                lo
            }
        };
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    fn random_delay(&self) -> Duration {
        if self.max > self.min {
            rand::rng().random_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn read_last(&self) -> Option<Instant> {
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn stamp(&self) {
        *self.last_call.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }
}
