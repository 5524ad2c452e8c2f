//! Refresh cycle: poll every plant once and update its tile in place.
//!
//! Plants are processed sequentially in slot order. For each plant:
//!
//! 1. Fetch the reading by feed key.
//! 2. Recompute the tile geometry, bar height and bar color.
//! 3. Replace the bar, keeping its place in the draw order.
//! 4. Replace the percentage label with the new text, resting on the bar top.
//!
//! A failed fetch skips the plant for this tick and leaves its previous bar
//! and label on screen. Failures never touch other plants, and nothing here
//! ever aborts the polling loop. Name labels are never modified.

use log::{debug, info, warn};

use crate::builder::{PlantSlot, bar_element, build_scene, percent_label, slots_from_config};
use crate::colors::Palette;
use crate::config::{DashboardConfig, MAX_PLANTS};
use crate::error::{DashboardError, SceneError};
use crate::feed::{FeedSource, fetch_reading};
use crate::layout::GridLayout;
use crate::mapper::{Reading, bar_height_for, color_for};
use crate::scene::{ElementKind, Placement, SceneGraph, SlotId};

/// Outcome of one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots whose bar and label were replaced.
    pub updated: heapless::Vec<SlotId, MAX_PLANTS>,
    /// Slots skipped because the fetch (or the scene update) failed.
    pub failed: heapless::Vec<SlotId, MAX_PLANTS>,
    /// Replacements that had to be inserted at the bottom of the scene.
    pub fallbacks: u32,
}

impl TickReport {
    /// Whether the scene changed during this tick.
    #[inline]
    pub fn changed(&self) -> bool { !self.updated.is_empty() }

    /// Whether every plant updated without a fallback.
    #[inline]
    pub fn is_clean(&self) -> bool { self.failed.is_empty() && self.fallbacks == 0 }
}

/// The live dashboard: plant slots, fixed grid, and the scene being shown.
#[derive(Debug)]
pub struct Dashboard {
    slots: Vec<PlantSlot>,
    grid: GridLayout,
    palette: Palette,
    scene: SceneGraph,
}

impl Dashboard {
    /// Lay out the grid and build the initial scene.
    pub fn new(config: &DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;

        let slots = slots_from_config(&config.plants);
        let grid = GridLayout::compute(slots.len(), config.screen, config.bands)?;
        info!(
            "grid: {} plants in {}x{} cells, cell height {}px, bars up to {}px",
            slots.len(),
            grid.rows,
            grid.cols,
            grid.cell_height,
            grid.max_bar_height
        );
        if grid.degraded {
            warn!(
                "{}px cells leave no room for bars after {}px of text bands; bars are stuck at 1px",
                grid.cell_height,
                config.bands.total()
            );
        }

        let scene = build_scene(&slots, &grid, &config.palette)?;

        Ok(Self {
            slots,
            grid,
            palette: config.palette,
            scene,
        })
    }

    /// Run one tick against `source`.
    pub fn refresh<S: FeedSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> TickReport {
        let mut report = TickReport::default();

        for index in 0..self.slots.len() {
            let plant = &self.slots[index];
            let outcome = fetch_reading(source, &plant.feed_key);

            let reading = match outcome {
                Ok(reading) => reading,
                Err(e) => {
                    warn!("{}: fetching {:?} failed: {e}", plant.display_name, plant.feed_key);
                    let _ = report.failed.push(index);
                    continue;
                }
            };
            info!("{}: {}%", plant.display_name, reading.percent());

            match self.apply_reading(index, reading) {
                Ok(fallbacks) => {
                    report.fallbacks += fallbacks;
                    let _ = report.updated.push(index);
                }
                Err(e) => {
                    warn!("{}: scene update failed: {e}", self.slots[index].display_name);
                    let _ = report.failed.push(index);
                }
            }
        }

        report
    }

    /// Replace `slot`'s bar and percentage label to show `reading`.
    ///
    /// Returns how many of the two replacements fell back to index 0.
    pub fn apply_reading(
        &mut self,
        slot: SlotId,
        reading: Reading,
    ) -> Result<u32, SceneError> {
        let plant = self.slots.get(slot).ok_or(SceneError::UnknownSlot(slot))?;
        let tile = self.grid.tile(plant.index);
        let height = bar_height_for(reading, self.grid.max_bar_height);
        let color = color_for(reading, &self.palette);
        debug!(
            "{}: bar {}px at y={} color {:?}",
            plant.display_name,
            height,
            tile.bar_top_y(height),
            color
        );

        let mut fallbacks = 0;
        for (kind, element) in [
            (ElementKind::Bar, bar_element(&tile, height, color)),
            (ElementKind::PercentLabel, percent_label(&tile, reading, height, &self.palette)),
        ] {
            if self.scene.replace(slot, kind, element)? == Placement::Fallback {
                warn!("{}: {kind:?} was missing from the scene, re-inserted at the bottom", plant.display_name);
                fallbacks += 1;
            }
        }
        Ok(fallbacks)
    }

    #[inline]
    pub const fn scene(&self) -> &SceneGraph { &self.scene }

    /// Direct scene access, for collaborators that manage the element list
    /// themselves.
    #[inline]
    pub const fn scene_mut(&mut self) -> &mut SceneGraph { &mut self.scene }

    #[inline]
    pub const fn grid(&self) -> &GridLayout { &self.grid }

    #[inline]
    pub fn slots(&self) -> &[PlantSlot] { &self.slots }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use embedded_graphics::prelude::*;

    use super::*;
    use crate::colors::{GREEN, RED, YELLOW};
    use crate::config::PlantConfig;
    use crate::error::FetchError;
    use crate::feed::{FeedDatum, FeedValue};
    use crate::scene::Element;

    /// Fixed answers per feed key; keys mapped to `None` fail.
    #[derive(Default)]
    struct FixedFeed {
        values: HashMap<String, Option<&'static str>>,
        calls: u32,
    }

    impl FixedFeed {
        fn with(
            mut self,
            key: &str,
            value: Option<&'static str>,
        ) -> Self {
            self.values.insert(key.to_string(), value);
            self
        }
    }

    impl FeedSource for FixedFeed {
        fn fetch_latest(
            &mut self,
            feed_key: &str,
        ) -> Result<Vec<FeedDatum>, FetchError> {
            self.calls += 1;
            match self.values.get(feed_key) {
                Some(Some(v)) => Ok(vec![FeedDatum::new(FeedValue::from(*v))]),
                Some(None) | None => Err(FetchError::Status(503)),
            }
        }
    }

    fn dashboard() -> Dashboard { Dashboard::new(&DashboardConfig::default()).unwrap() }

    fn all_ok() -> FixedFeed {
        FixedFeed::default()
            .with("plant-1", Some("10"))
            .with("plant-2", Some("35.5"))
            .with("plant-3", Some("75"))
    }

    #[test]
    fn test_tick_updates_every_plant() {
        let mut dash = dashboard();
        let report = dash.refresh(&mut all_ok());

        assert_eq!(report.updated.as_slice(), &[0, 1, 2]);
        assert!(report.is_clean());
        assert!(report.changed());

        assert_eq!(dash.scene().bar(0).unwrap().color, RED);
        assert_eq!(dash.scene().bar(1).unwrap().color, YELLOW);
        assert_eq!(dash.scene().bar(2).unwrap().color, GREEN);
        assert_eq!(dash.scene().label(0, ElementKind::PercentLabel).unwrap().text.as_str(), "10%");
        assert_eq!(dash.scene().label(1, ElementKind::PercentLabel).unwrap().text.as_str(), "35%");
        assert_eq!(dash.scene().label(2, ElementKind::PercentLabel).unwrap().text.as_str(), "75%");
    }

    #[test]
    fn test_bar_and_label_geometry() {
        let mut dash = dashboard();
        dash.refresh(&mut all_ok());

        // max bar 17: 75% -> 12px, 10% -> 1px
        let tile = dash.grid().tile(2);
        let bar = dash.scene().bar(2).unwrap();
        assert_eq!(bar.rect.size, Size::new(22, 12));
        assert_eq!(bar.rect.top_left, Point::new(42, tile.bar_bottom_y - 12));

        let label = dash.scene().label(2, ElementKind::PercentLabel).unwrap();
        assert_eq!(label.position, Point::new(tile.center_x, tile.bar_bottom_y - 12 - 1));

        assert_eq!(dash.scene().bar(0).unwrap().rect.size, Size::new(20, 1));
    }

    #[test]
    fn test_draw_order_survives_updates() {
        let mut dash = dashboard();
        let before: Vec<_> = dash.scene().layers().collect();
        for _ in 0..3 {
            dash.refresh(&mut all_ok());
        }
        let after: Vec<_> = dash.scene().layers().collect();
        assert_eq!(before, after);
        assert_eq!(dash.scene().len(), 9);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut dash = dashboard();
        dash.refresh(&mut all_ok());
        let first: Vec<Element> = dash.scene().elements().cloned().collect();
        dash.refresh(&mut all_ok());
        let second: Vec<Element> = dash.scene().elements().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_plant_keeps_previous_state() {
        let mut dash = dashboard();
        dash.refresh(&mut all_ok());
        let ivy_bar = *dash.scene().bar(1).unwrap();
        let ivy_label = dash.scene().label(1, ElementKind::PercentLabel).unwrap().clone();

        let mut feed = FixedFeed::default()
            .with("plant-1", Some("60"))
            .with("plant-2", None)
            .with("plant-3", Some("5"));
        let report = dash.refresh(&mut feed);

        assert_eq!(feed.calls, 3, "a failure does not stop the tick");
        assert_eq!(report.updated.as_slice(), &[0, 2]);
        assert_eq!(report.failed.as_slice(), &[1]);
        assert_eq!(*dash.scene().bar(1).unwrap(), ivy_bar);
        assert_eq!(*dash.scene().label(1, ElementKind::PercentLabel).unwrap(), ivy_label);
        assert_eq!(dash.scene().bar(0).unwrap().color, GREEN);
        assert_eq!(dash.scene().bar(2).unwrap().color, RED);
    }

    #[test]
    fn test_failure_before_first_success_keeps_initial_tile() {
        let mut dash = dashboard();
        let report = dash.refresh(&mut FixedFeed::default());
        assert_eq!(report.failed.as_slice(), &[0, 1, 2]);
        assert!(!report.changed());
        for slot in 0..3 {
            assert_eq!(dash.scene().label(slot, ElementKind::PercentLabel).unwrap().text.as_str(), "0%");
            let bar = dash.scene().bar(slot).unwrap();
            assert_eq!((bar.rect.size.height, bar.color), (1, dash.palette.background));
        }
    }

    #[test]
    fn test_missing_bar_is_reinserted_at_bottom() {
        let mut dash = dashboard();
        let handle = dash.scene().handle(2, ElementKind::Bar).unwrap();
        dash.scene_mut().remove(handle);

        let report = dash.refresh(&mut all_ok());
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.updated.len(), 3);
        assert_eq!(dash.scene().layers().next(), Some((2, ElementKind::Bar)));
        assert_eq!(dash.scene().len(), 9);

        // Stays where it landed from then on
        let report = dash.refresh(&mut all_ok());
        assert_eq!(report.fallbacks, 0);
        assert_eq!(dash.scene().layers().next(), Some((2, ElementKind::Bar)));
    }

    #[test]
    fn test_name_labels_never_change() {
        let mut dash = dashboard();
        let names: Vec<_> =
            (0..3).map(|s| dash.scene().label(s, ElementKind::NameLabel).unwrap().clone()).collect();
        dash.refresh(&mut all_ok());
        for (slot, name) in names.iter().enumerate() {
            assert_eq!(dash.scene().label(slot, ElementKind::NameLabel).unwrap(), name);
        }
    }

    #[test]
    fn test_apply_unknown_slot() {
        let mut dash = dashboard();
        assert_eq!(dash.apply_reading(7, Reading::new(50)), Err(SceneError::UnknownSlot(7)));
    }

    #[test]
    fn test_zero_plants_rejected() {
        let config = DashboardConfig {
            plants: Vec::new(),
            ..DashboardConfig::default()
        };
        assert!(Dashboard::new(&config).is_err());
    }

    #[test]
    fn test_degraded_layout_still_builds() {
        let config = DashboardConfig {
            plants: (0..6)
                .map(|i| PlantConfig {
                    feed_key: format!("plant-{i}"),
                    name: format!("P{i}"),
                })
                .collect(),
            screen: Size::new(64, 24),
            ..DashboardConfig::default()
        };
        let mut dash = Dashboard::new(&config).unwrap();
        assert!(dash.grid().degraded);
        dash.apply_reading(5, Reading::new(100)).unwrap();
        assert_eq!(dash.scene().bar(5).unwrap().rect.size.height, 1);
    }
}
