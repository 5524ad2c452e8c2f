//! Dynamic grid layout for the plant tiles.
//!
//! The grid is computed once from the plant count and never changes. Tile
//! geometry is a pure function of the tile index and the grid, so the refresh
//! cycle simply recomputes it instead of caching it.
//!
//! # Tile Anatomy
//!
//! Each cell is built from the bottom up:
//!
//! ```text
//! ┌──────────────┐  cell_y
//! │     75%      │  pct_area     (percentage label rides on the bar top)
//! │  ██████████  │
//! │  ██████████  │  max_bar_height
//! │  ██████████  │  ← bar_bottom_y
//! │              │  text_buffer
//! │     FIG      │  text_area
//! └──────────────┘  cell_y + cell_height
//! ```
//!
//! # Column Partitioning
//!
//! Column edges are `floor(col * width / cols)`, which always covers the full
//! width with no gap or overlap. When the width does not divide evenly the
//! columns differ by one pixel, with the extra pixels landing towards the
//! right; for 3 columns on 64px the edges are 0, 21, 42, 64.
//!
//! Bars are one pixel narrower than their cell to leave a dark gutter between
//! neighbours, except in the last column of a row which has no right
//! neighbour and keeps the full width.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::{PCT_AREA_HEIGHT, TEXT_AREA_HEIGHT, TEXT_BUFFER};
use crate::error::LayoutError;

/// Plant counts up to this fit on a single row.
pub const SINGLE_ROW_MAX: u32 = 4;

/// Fixed vertical bands of a tile, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandHeights {
    /// Name label band at the bottom of the cell.
    pub text_area: u32,
    /// Gap between the name band and the bar.
    pub text_buffer: u32,
    /// Percentage label band above the bar region.
    pub pct_area: u32,
}

impl BandHeights {
    pub const fn new(
        text_area: u32,
        text_buffer: u32,
        pct_area: u32,
    ) -> Self {
        Self {
            text_area,
            text_buffer,
            pct_area,
        }
    }

    /// Height taken by everything except the bar.
    #[inline]
    pub const fn total(&self) -> u32 { self.text_area + self.text_buffer + self.pct_area }
}

impl Default for BandHeights {
    fn default() -> Self { Self::new(TEXT_AREA_HEIGHT, TEXT_BUFFER, PCT_AREA_HEIGHT) }
}

/// Grid parameters shared by every tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub cell_height: u32,
    /// Tallest bar a tile can show. Always at least 1.
    pub max_bar_height: u32,
    /// Screen width the columns partition.
    pub screen_width: u32,
    pub bands: BandHeights,
    /// `true` when the bands did not leave room for a bar and
    /// `max_bar_height` was floored to 1.
    pub degraded: bool,
}

impl GridLayout {
    /// Compute the grid for `num_plants` tiles.
    ///
    /// Up to [`SINGLE_ROW_MAX`] plants share one row; more are split over two
    /// rows with `ceil(n / 2)` columns.
    pub fn compute(
        num_plants: usize,
        screen: Size,
        bands: BandHeights,
    ) -> Result<Self, LayoutError> {
        if num_plants == 0 {
            return Err(LayoutError::NoPlants);
        }

        let n = num_plants as u32;
        let (rows, cols) = if n <= SINGLE_ROW_MAX { (1, n) } else { (2, n.div_ceil(2)) };
        let cell_height = screen.height / rows;

        let available = i64::from(cell_height) - i64::from(bands.total());
        let degraded = available < 1;
        let max_bar_height = if degraded { 1 } else { available as u32 };

        Ok(Self {
            rows,
            cols,
            cell_height,
            max_bar_height,
            screen_width: screen.width,
            bands,
            degraded,
        })
    }

    /// Geometry of tile `index` (row-major placement).
    pub fn tile(
        &self,
        index: usize,
    ) -> TileGeometry {
        let index = index as u32;
        let row = index / self.cols;
        let col = index % self.cols;

        // u64 so `col * width` cannot overflow for large screens
        let edge = |c: u32| (u64::from(c) * u64::from(self.screen_width) / u64::from(self.cols)) as u32;
        let x_start = edge(col);
        let x_end = edge(col + 1);
        let cell_width = x_end - x_start;

        let is_last_column = col == self.cols - 1;
        let bar_width = if is_last_column { cell_width } else { cell_width.saturating_sub(1) };

        let cell_y = (row * self.cell_height) as i32;
        let bar_bottom_y = cell_y + (self.bands.pct_area + self.max_bar_height) as i32;

        TileGeometry {
            row,
            col,
            cell_origin_x: x_start as i32,
            cell_y,
            cell_width,
            cell_height: self.cell_height,
            bar_width,
            bar_bottom_y,
            center_x: (x_start + cell_width / 2) as i32,
            text_area: self.bands.text_area,
        }
    }
}

/// Pixel geometry of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGeometry {
    pub row: u32,
    pub col: u32,
    pub cell_origin_x: i32,
    pub cell_y: i32,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Bar width, `cell_width - 1` except in the last column.
    pub bar_width: u32,
    /// Y coordinate one past the bar's bottom row.
    pub bar_bottom_y: i32,
    pub center_x: i32,
    text_area: u32,
}

impl TileGeometry {
    /// Bar rectangle of `height` pixels standing on `bar_bottom_y`.
    pub fn bar_rect(
        &self,
        height: u32,
    ) -> Rectangle {
        Rectangle::new(
            Point::new(self.cell_origin_x, self.bar_top_y(height)),
            Size::new(self.bar_width, height),
        )
    }

    /// Top row of a bar of `height` pixels.
    #[inline]
    pub const fn bar_top_y(
        &self,
        height: u32,
    ) -> i32 {
        self.bar_bottom_y - height as i32
    }

    /// Center of the name band (name labels are anchored center-middle).
    pub const fn name_anchor(&self) -> Point {
        Point::new(
            self.center_x,
            self.cell_y + self.cell_height as i32 - (self.text_area / 2) as i32,
        )
    }

    /// Bottom-center anchor for the percentage label resting on a bar of
    /// `height`. The label's bottom row is the row just above the bar.
    pub const fn pct_anchor(
        &self,
        height: u32,
    ) -> Point {
        Point::new(self.center_x, self.bar_top_y(height) - 1)
    }
}
