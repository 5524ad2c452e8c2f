//! Offline feed for desktop runs.
//!
//! Each feed key gets its own slow sine wave between 0% and 100%, offset by
//! a phase derived from the key so plants do not move in lockstep. Every
//! fetch of a key advances that key's wave by one step. Values are returned
//! as strings with two decimals, the way Adafruit IO stores them.

use std::collections::HashMap;

use super::{FeedDatum, FeedSource, FeedValue};
use crate::error::FetchError;

/// Wave advance per fetch, in radians.
const STEP: f32 = 0.35;

/// Deterministic sinusoidal readings.
#[derive(Debug, Default)]
pub struct SimulatedFeed {
    ticks: HashMap<String, u32>,
}

impl SimulatedFeed {
    pub fn new() -> Self { Self::default() }

    /// Value of `feed_key`'s wave at step `tick`.
    pub fn sample(
        feed_key: &str,
        tick: u32,
    ) -> f32 {
        let t = tick as f32 * STEP + phase(feed_key);
        fake_signal(t, 0.0, 100.0, 1.0)
    }
}

impl FeedSource for SimulatedFeed {
    fn fetch_latest(
        &mut self,
        feed_key: &str,
    ) -> Result<Vec<FeedDatum>, FetchError> {
        let tick = self.ticks.entry(feed_key.to_string()).or_insert(0);
        let value = Self::sample(feed_key, *tick);
        *tick = tick.wrapping_add(1);
        Ok(vec![FeedDatum::new(FeedValue::Text(format!("{value:.2}")))])
    }
}

/// Sinusoidal signal oscillating between `min` and `max`.
fn fake_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// Phase offset in `[0, TAU)` from the key bytes (FNV-1a).
fn phase(feed_key: &str) -> f32 {
    let hash = feed_key
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
    (hash % 3600) as f32 / 3600.0 * std::f32::consts::TAU
}
