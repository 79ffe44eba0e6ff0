// Sample timestamp grid
//
// 0, interval, 2*interval, ... up to and including the last multiple <= duration.

use std::fmt;
use std::iter::FusedIterator;

use serde::Serialize;

use crate::constants::TIMESTAMP_WIDTH;
use crate::error::{Result, ShotDeckError};

/// An offset into the video, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SampleTimestamp(u64);

impl SampleTimestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Fixed-width label used in frame filenames, e.g. `0065s`.
    pub fn file_label(&self) -> String {
        format!("{:0width$}s", self.0, width = TIMESTAMP_WIDTH)
    }

    /// Human clock format, H:MM:SS.
    pub fn clock(&self) -> String {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl fmt::Display for SampleTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Reject a non-positive interval. Returns it as an unsigned step.
pub fn check_interval(interval: i64) -> Result<u64> {
    if interval <= 0 {
        return Err(ShotDeckError::InvalidInterval(interval));
    }
    Ok(interval as u64)
}

/// Lazy, restartable sequence of sample timestamps.
///
/// Cloning a grid gives an independent iterator starting at the same point,
/// so a fresh `generate` call and a clone taken before iteration agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    step: u64,
    next: u64,
    count: u64,
}

impl Iterator for TimeGrid {
    type Item = SampleTimestamp;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let ts = SampleTimestamp(self.next * self.step);
        self.next += 1;
        Some(ts)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n as u64).min(self.count);
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TimeGrid {}

impl FusedIterator for TimeGrid {}

/// Build the grid for a video of `duration` seconds sampled every `interval` seconds.
///
/// Yields `floor(duration / interval) + 1` timestamps. A zero duration yields
/// the single timestamp 0.
pub fn generate(duration: f64, interval: i64) -> Result<TimeGrid> {
    let step = check_interval(interval)?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(ShotDeckError::InvalidDuration(duration));
    }

    // The float cast saturates, so an oversized duration shows up as overflow here
    let last_index = (duration / step as f64).floor() as u64;
    let count = last_index
        .checked_mul(step)
        .and_then(|_| last_index.checked_add(1))
        .ok_or(ShotDeckError::InvalidDuration(duration))?;

    Ok(TimeGrid { step, next: 0, count })
}
