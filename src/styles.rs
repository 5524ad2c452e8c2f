//! Fonts and text alignment styles for the tile labels.
//!
//! Label colors come from the configurable [`Palette`](crate::colors::Palette),
//! so only the font references and alignment styles are constants here;
//! `MonoTextStyle::new(font, color)` is built at draw time.
//!
//! | Label | Font | Anchor |
//! |-------|------|--------|
//! | Plant name | `FONT_5X8` (fills the 8px name band) | center-middle |
//! | Percentage | `FONT_4X6` (tiny, fits the 6px band) | bottom-center |

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8};
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};

/// Font for plant names.
pub const NAME_FONT: &MonoFont<'static> = &FONT_5X8;

/// Font for percentage labels. Has almost no descent, so the label can sit
/// directly on the bar top.
pub const PCT_FONT: &MonoFont<'static> = &FONT_4X6;

/// Text anchored at its horizontal and vertical center.
pub const CENTER_MIDDLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Text anchored at its bottom edge, centered horizontally.
pub const CENTER_BOTTOM: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Bottom)
    .build();
