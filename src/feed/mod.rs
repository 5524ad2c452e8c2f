//! Moisture data sources.
//!
//! A [`FeedSource`] returns the most recent data points of a feed, newest
//! first. [`fetch_reading`] turns that into a [`Reading`]:
//!
//! | Feed returns | Result |
//! |--------------|--------|
//! | no data points | reading 0 |
//! | first value `"75.9"` or `75.9` | reading 75 (truncated) |
//! | first value not a finite number | [`FetchError::Malformed`] |
//! | transport / HTTP / JSON failure | the source's [`FetchError`] |
//!
//! Out-of-range numbers are clamped to `[0, 100]`.

mod adafruit_io;
mod simulated;

pub use adafruit_io::{AdafruitIoFeed, parse_feed_data};
pub use simulated::SimulatedFeed;

use serde::Deserialize;

use crate::error::FetchError;
use crate::mapper::Reading;

/// Anything that can look up the latest values of a feed by key.
pub trait FeedSource {
    /// Latest data points for `feed_key`, newest first. May be empty.
    fn fetch_latest(
        &mut self,
        feed_key: &str,
    ) -> Result<Vec<FeedDatum>, FetchError>;
}

impl<S: FeedSource + ?Sized> FeedSource for Box<S> {
    fn fetch_latest(
        &mut self,
        feed_key: &str,
    ) -> Result<Vec<FeedDatum>, FetchError> {
        (**self).fetch_latest(feed_key)
    }
}

/// One data point. Adafruit IO sends more fields; only `value` is kept.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FeedDatum {
    pub value: FeedValue,
}

impl FeedDatum {
    pub const fn new(value: FeedValue) -> Self { Self { value } }
}

/// Raw datum value. Adafruit IO stores everything as strings, but numbers
/// are accepted too.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeedValue {
    Number(f64),
    Text(String),
}

impl FeedValue {
    /// Parse as a float.
    pub fn as_f64(&self) -> Result<f64, FetchError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s.trim().parse().map_err(|_| FetchError::Malformed(s.clone())),
        }
    }

    /// Truncated, clamped reading.
    pub fn to_reading(&self) -> Result<Reading, FetchError> {
        let raw = self.as_f64()?;
        Reading::from_raw(raw).ok_or_else(|| FetchError::Malformed(raw.to_string()))
    }
}

impl From<&str> for FeedValue {
    fn from(value: &str) -> Self { Self::Text(value.to_string()) }
}

impl From<f64> for FeedValue {
    fn from(value: f64) -> Self { Self::Number(value) }
}

/// Fetch `feed_key` and interpret its newest value.
pub fn fetch_reading<S: FeedSource + ?Sized>(
    source: &mut S,
    feed_key: &str,
) -> Result<Reading, FetchError> {
    let data = source.fetch_latest(feed_key)?;
    match data.first() {
        Some(datum) => datum.value.to_reading(),
        None => Ok(Reading::new(0)),
    }
}
