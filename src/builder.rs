//! Initial scene construction.
//!
//! Runs once at startup. Every slot gets three elements, pushed in this order
//! so bars sit under their labels:
//!
//! | # | Element | Initial state |
//! |---|---------|---------------|
//! | 1 | Bar | 1px, background color, resting on `bar_bottom_y` |
//! | 2 | Name label | plant name, center-middle in the name band |
//! | 3 | Percentage label | `"0%"`, bottom-center on the bar top |
//!
//! The element constructors are shared with the refresh cycle so both place
//! bars and labels identically.

use embedded_graphics::pixelcolor::Rgb888;
use log::debug;

use crate::colors::Palette;
use crate::config::PlantConfig;
use crate::error::SceneError;
use crate::layout::{GridLayout, TileGeometry};
use crate::mapper::Reading;
use crate::scene::{Anchor, Bar, Element, ElementKind, LabelFont, LabelText, SceneGraph, SlotId, TextLabel};

/// One monitored plant, fixed for the process lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlantSlot {
    /// Tile position, row-major.
    pub index: SlotId,
    pub display_name: LabelText,
    pub feed_key: String,
}

impl PlantSlot {
    /// Slot `index` for a configured plant. Names longer than the label
    /// buffer are cut (configuration validation normally rejects them).
    pub fn from_config(
        index: SlotId,
        plant: &PlantConfig,
    ) -> Self {
        let mut display_name = LabelText::new();
        for ch in plant.name.chars() {
            if display_name.push(ch).is_err() {
                break;
            }
        }
        Self {
            index,
            display_name,
            feed_key: plant.feed_key.clone(),
        }
    }
}

/// Slots for the configured plants, in display order.
pub fn slots_from_config(plants: &[PlantConfig]) -> Vec<PlantSlot> {
    plants
        .iter()
        .enumerate()
        .map(|(index, plant)| PlantSlot::from_config(index, plant))
        .collect()
}

/// Bar of `height` pixels standing on the tile's bar bottom.
pub fn bar_element(
    tile: &TileGeometry,
    height: u32,
    color: Rgb888,
) -> Element {
    Element::Bar(Bar {
        rect: tile.bar_rect(height),
        color,
    })
}

/// Plant name centered in the name band.
pub fn name_label(
    tile: &TileGeometry,
    name: &LabelText,
    palette: &Palette,
) -> Element {
    Element::Label(TextLabel {
        text: name.clone(),
        font: LabelFont::Name,
        color: palette.name_text,
        anchor: Anchor::CenterMiddle,
        position: tile.name_anchor(),
    })
}

/// Percentage text resting on top of a bar of `height` pixels.
///
/// A height of 0 rests the label on the bar bottom line, where it starts out.
pub fn percent_label(
    tile: &TileGeometry,
    reading: Reading,
    height: u32,
    palette: &Palette,
) -> Element {
    Element::Label(TextLabel {
        text: reading.label(),
        font: LabelFont::Percent,
        color: palette.pct_text,
        anchor: Anchor::CenterBottom,
        position: tile.pct_anchor(height),
    })
}

/// Build the startup scene for `slots`.
pub fn build_scene(
    slots: &[PlantSlot],
    grid: &GridLayout,
    palette: &Palette,
) -> Result<SceneGraph, SceneError> {
    let mut scene = SceneGraph::new();

    for slot in slots {
        let tile = grid.tile(slot.index);
        debug!(
            "tile {} ({}): x={} w={} y={} bar_w={} bar_bottom={}",
            slot.index,
            slot.display_name,
            tile.cell_origin_x,
            tile.cell_width,
            tile.cell_y,
            tile.bar_width,
            tile.bar_bottom_y
        );

        scene.push(slot.index, ElementKind::Bar, bar_element(&tile, 1, palette.background))?;
        scene.push(
            slot.index,
            ElementKind::NameLabel,
            name_label(&tile, &slot.display_name, palette),
        )?;
        scene.push(
            slot.index,
            ElementKind::PercentLabel,
            percent_label(&tile, Reading::new(0), 0, palette),
        )?;
    }

    Ok(scene)
}
