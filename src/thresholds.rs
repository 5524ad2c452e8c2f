//! Soil-moisture threshold configuration.
//!
//! Thresholds are compile-time constants with `const` ordering assertions, so
//! a bad edit fails the build instead of producing overlapping color bands.
//!
//! Bands are closed-open: a reading exactly on a threshold belongs to the
//! higher band.
//!
//! | Range | Band | Bar color |
//! |-------|------|-----------|
//! | `[0, 20)` | Dry | RED |
//! | `[20, 50)` | Moist | YELLOW |
//! | `[50, 100]` | Wet | GREEN |

/// Lowest reading in percent.
pub const MOISTURE_MIN: u8 = 0;

/// Highest reading in percent. Raw feed values above this are clamped.
pub const MOISTURE_MAX: u8 = 100;

/// Readings below this are dry (RED).
pub const MOISTURE_DRY_BELOW: u8 = 20;

/// Readings below this (and at or above the dry threshold) are moist (YELLOW).
/// At or above it the soil is wet (GREEN).
pub const MOISTURE_WET_FROM: u8 = 50;

const _: () = assert!(MOISTURE_MIN < MOISTURE_DRY_BELOW);
const _: () = assert!(MOISTURE_DRY_BELOW < MOISTURE_WET_FROM);
const _: () = assert!(MOISTURE_WET_FROM <= MOISTURE_MAX);
