// Crate-level lints: Allow common embedded/graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // u32->i32 and f32->u32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32->f32 in metrics and the simulated feed
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for our value ranges
#![allow(clippy::cast_sign_loss)] // f64->u8 after clamping to [0, 100]
#![allow(clippy::module_name_repetitions)] // SceneGraph in scene, FeedSource in feed

//! Soil-moisture dashboard for a 64x32 RGB LED matrix.
//!
//! One tile per plant: a vertical bar whose height and color encode the
//! moisture reading, the plant name underneath, and the percentage riding on
//! top of the bar. Readings come from Adafruit IO feeds (or a simulated feed)
//! and are polled on a fixed interval.
//!
//! # Pipeline
//!
//! | Stage | Module | Runs |
//! |-------|--------|------|
//! | Grid and tile geometry | [`layout`] | once, geometry recomputed per tick |
//! | Reading → height / color | [`mapper`], [`thresholds`] | per plant per tick |
//! | Initial elements | [`builder`] | once |
//! | Element list | [`scene`] | mutated in place |
//! | Poll and replace | [`refresh`] | every tick |
//! | Draw | [`render`], [`styles`] | when the scene changed |
//!
//! Only the bar and the percentage label of a tile ever change. They are
//! swapped in place through [`scene::SceneGraph::replace`], which keeps each
//! element's position in the draw order, so the tile grid and the name labels
//! are built once and never touched again.
//!
//! # Drawing
//!
//! Everything draws onto any `embedded-graphics` [`DrawTarget`] with
//! [`Rgb888`] color. The binary uses the simulator's frame buffer (PNG
//! snapshots, or an SDL window with the `window` feature); a HUB75 driver
//! implementing `DrawTarget` plugs in the same way.
//!
//! [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
//! [`Rgb888`]: embedded_graphics::pixelcolor::Rgb888

pub mod builder;
pub mod colors;
pub mod config;
pub mod error;
pub mod feed;
pub mod layout;
pub mod mapper;
pub mod metrics;
pub mod refresh;
pub mod render;
pub mod scene;
pub mod styles;
pub mod thresholds;

pub use config::DashboardConfig;
pub use error::DashboardError;
pub use refresh::{Dashboard, TickReport};
