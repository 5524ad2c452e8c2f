//! Color constants for the moisture dashboard.
//!
//! The LED matrix is driven with 24-bit color, so everything here is
//! [`Rgb888`]. The values are deliberately dim: a 64x32 HUB75 panel at full
//! brightness is uncomfortable to look at indoors, and dim colors also keep
//! the panel's current draw down.
//!
//! [`Palette`] groups the colors the dashboard actually uses so they can be
//! overridden from the configuration file. The constants below are the
//! defaults.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

// =============================================================================
// Default Palette
// =============================================================================

/// Dark red (0x880000). Dry soil, water soon.
pub const RED: Rgb888 = Rgb888::new(0x88, 0x00, 0x00);

/// Dark yellow (0x888800). Drying out.
pub const YELLOW: Rgb888 = Rgb888::new(0x88, 0x88, 0x00);

/// Dark green (0x004400). Well watered.
pub const GREEN: Rgb888 = Rgb888::new(0x00, 0x44, 0x00);

/// Pure black. Background and the placeholder bar drawn before the first reading.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// White (0xFFFFFF). Plant name labels.
pub const TEXT: Rgb888 = Rgb888::WHITE;

/// Mid gray (0x888888). Percentage labels, dimmer than the names.
pub const PCT: Rgb888 = Rgb888::new(0x88, 0x88, 0x88);

/// Convert a `0xRRGGBB` integer into an [`Rgb888`].
///
/// The configuration file stores colors in this form, matching how they are
/// usually written for LED matrix projects.
#[inline]
pub const fn from_hex(hex: u32) -> Rgb888 {
    Rgb888::new(((hex >> 16) & 0xFF) as u8, ((hex >> 8) & 0xFF) as u8, (hex & 0xFF) as u8)
}

/// Colors used by the scene builder and the refresh cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Bar color below the dry threshold.
    pub dry: Rgb888,
    /// Bar color between the dry and wet thresholds.
    pub moist: Rgb888,
    /// Bar color at or above the wet threshold.
    pub wet: Rgb888,
    /// Background, and the initial bar color.
    pub background: Rgb888,
    /// Plant name label color.
    pub name_text: Rgb888,
    /// Percentage label color.
    pub pct_text: Rgb888,
}

impl Palette {
    pub const fn new() -> Self {
        Self {
            dry: RED,
            moist: YELLOW,
            wet: GREEN,
            background: BLACK,
            name_text: TEXT,
            pct_text: PCT,
        }
    }
}

impl Default for Palette {
    fn default() -> Self { Self::new() }
}
