//! Reading → visual mapping.
//!
//! Pure functions turning a moisture percentage into a bar height and a bar
//! color. Height uses exact integer arithmetic: `floor(value * max / 100)`,
//! clamped to `[1, max]` so a tile never goes completely dark, even at 0%.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb888;

use crate::colors::Palette;
use crate::scene::{LABEL_LEN, LabelText};
use crate::thresholds::{MOISTURE_DRY_BELOW, MOISTURE_MAX, MOISTURE_MIN, MOISTURE_WET_FROM};

const _: () = assert!("100%".len() <= LABEL_LEN);

/// A moisture reading in whole percent, always within `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reading(u8);

impl Reading {
    /// Reading for the given percentage, clamped to `[0, 100]`.
    pub const fn new(percent: u8) -> Self {
        if percent > MOISTURE_MAX { Self(MOISTURE_MAX) } else { Self(percent) }
    }

    /// Truncate a raw feed value toward zero and clamp it.
    ///
    /// Returns `None` for NaN and infinities, which have no integer value.
    pub fn from_raw(raw: f64) -> Option<Self> {
        if !raw.is_finite() {
            return None;
        }
        let truncated = raw.trunc().clamp(f64::from(MOISTURE_MIN), f64::from(MOISTURE_MAX));
        Some(Self(truncated as u8))
    }

    #[inline]
    pub const fn percent(self) -> u8 { self.0 }

    /// Percentage label text, e.g. `"75%"`.
    pub fn label(self) -> LabelText {
        let mut text = LabelText::new();
        // "100%" always fits
        let _ = write!(text, "{}%", self.0);
        text
    }
}

/// Color band of a reading. Intervals are closed-open, so a value on a
/// threshold belongs to the higher band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoistureBand {
    /// `[0, 20)`
    Dry,
    /// `[20, 50)`
    Moist,
    /// `[50, 100]`
    Wet,
}

impl MoistureBand {
    pub const fn for_reading(reading: Reading) -> Self {
        let value = reading.percent();
        if value < MOISTURE_DRY_BELOW {
            Self::Dry
        } else if value < MOISTURE_WET_FROM {
            Self::Moist
        } else {
            Self::Wet
        }
    }

    pub const fn color(
        self,
        palette: &Palette,
    ) -> Rgb888 {
        match self {
            Self::Dry => palette.dry,
            Self::Moist => palette.moist,
            Self::Wet => palette.wet,
        }
    }
}

/// Bar color for a reading.
#[inline]
pub const fn color_for(
    reading: Reading,
    palette: &Palette,
) -> Rgb888 {
    MoistureBand::for_reading(reading).color(palette)
}

/// Bar height in pixels for a reading, within `[1, max_bar_height]`.
///
/// `max_bar_height` of 0 is treated as 1.
pub const fn bar_height_for(
    reading: Reading,
    max_bar_height: u32,
) -> u32 {
    let max = if max_bar_height == 0 { 1 } else { max_bar_height };
    let scaled = reading.percent() as u32 * max / MOISTURE_MAX as u32;
    if scaled < 1 {
        1
    } else if scaled > max {
        max
    } else {
        scaled
    }
}
