//! Frame rendering with dirty tracking.
//!
//! The matrix is tiny, so a redraw is a full clear followed by drawing every
//! scene element in list order. What this module avoids is redrawing when
//! nothing changed: between refresh ticks the driver loop may spin many times
//! (window mode pumps events every frame) while the scene stays put.
//!
//! # Update Strategy
//!
//! | Trigger | Redraw? |
//! |---------|---------|
//! | First frame | yes (builder's initial scene) |
//! | Tick replaced any element | yes |
//! | Tick where every fetch failed | no |
//!
//! A full clear is needed because a bar that shrinks would otherwise leave its
//! old top rows lit.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::scene::SceneGraph;

/// Tracks whether the scene needs to be pushed to the display.
#[derive(Debug)]
pub struct RenderState {
    /// Whether this is the first frame (need full redraw).
    first_frame: bool,

    /// Whether the scene changed since the last draw.
    scene_dirty: bool,

    /// Frames actually drawn.
    frames_drawn: u64,
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            first_frame: true,
            scene_dirty: false,
            frames_drawn: 0,
        }
    }

    /// The scene was mutated; draw it on the next [`render`](Self::render).
    #[inline]
    pub const fn mark_scene_dirty(&mut self) { self.scene_dirty = true; }

    #[inline]
    pub const fn needs_redraw(&self) -> bool { self.first_frame || self.scene_dirty }

    #[inline]
    pub const fn frames_drawn(&self) -> u64 { self.frames_drawn }

    /// Draw `scene` if anything changed. Returns whether a frame was drawn.
    pub fn render<D>(
        &mut self,
        display: &mut D,
        scene: &SceneGraph,
        background: Rgb888,
    ) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if !self.needs_redraw() {
            return Ok(false);
        }

        render_scene(display, scene, background)?;

        self.first_frame = false;
        self.scene_dirty = false;
        self.frames_drawn += 1;
        Ok(true)
    }
}

impl Default for RenderState {
    fn default() -> Self { Self::new() }
}

/// Clear to `background` and draw every element bottom to top.
pub fn render_scene<D>(
    display: &mut D,
    scene: &SceneGraph,
    background: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    display.clear(background)?;
    scene.draw(display)
}
