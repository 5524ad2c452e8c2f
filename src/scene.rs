//! Scene graph: the ordered element list the dashboard renders.
//!
//! Elements are drawn in list order, index 0 first (bottom). Every element
//! belongs to a plant slot and has a kind; the scene keeps a
//! `slot → (kind → handle)` table so callers never hold element indices or
//! references that could go stale when the list changes.
//!
//! # Mutation
//!
//! After the initial [`push`](SceneGraph::push)es done by the scene builder,
//! [`replace`](SceneGraph::replace) is the only way the dashboard changes the
//! scene. It puts the new element at the list index the old one occupied, so
//! draw order (and therefore z-order relative to other tiles' labels) never
//! changes.
//!
//! If the old element has disappeared from the list (see
//! [`remove`](SceneGraph::remove)), the replacement is inserted at index 0,
//! beneath everything else. That keeps bars under labels, at the cost of the
//! previous ordering; [`Placement::Fallback`] tells the caller it happened.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Text, TextStyle};
use heapless::{String, Vec};

use crate::config::MAX_PLANTS;
use crate::error::SceneError;
use crate::styles::{CENTER_BOTTOM, CENTER_MIDDLE, NAME_FONT, PCT_FONT};

/// Index of a plant slot (its tile position).
pub type SlotId = usize;

/// Capacity of label text.
pub const LABEL_LEN: usize = 8;

/// Label text buffer.
pub type LabelText = String<LABEL_LEN>;

/// Elements per slot: bar, name label, percentage label.
pub const ELEMENTS_PER_SLOT: usize = ElementKind::ALL.len();

/// Maximum number of elements in a scene.
pub const SCENE_CAPACITY: usize = MAX_PLANTS * ELEMENTS_PER_SLOT;

/// Identity of one element instance. A replacement gets a fresh handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

/// Role of an element within its tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Moisture bar, replaced every refresh.
    Bar,
    /// Plant name, never changes after startup.
    NameLabel,
    /// Percentage text riding on the bar, replaced every refresh.
    PercentLabel,
}

impl ElementKind {
    pub const ALL: [Self; 3] = [Self::Bar, Self::NameLabel, Self::PercentLabel];

    #[inline]
    const fn table_index(self) -> usize {
        match self {
            Self::Bar => 0,
            Self::NameLabel => 1,
            Self::PercentLabel => 2,
        }
    }
}

/// Font reference stored in a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelFont {
    Name,
    Percent,
}

impl LabelFont {
    pub const fn mono_font(self) -> &'static MonoFont<'static> {
        match self {
            Self::Name => NAME_FONT,
            Self::Percent => PCT_FONT,
        }
    }
}

/// Which point of the text's bounding box `position` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    CenterMiddle,
    CenterBottom,
}

impl Anchor {
    pub const fn text_style(self) -> TextStyle {
        match self {
            Self::CenterMiddle => CENTER_MIDDLE,
            Self::CenterBottom => CENTER_BOTTOM,
        }
    }
}

/// Filled rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bar {
    pub rect: Rectangle,
    pub color: Rgb888,
}

/// Anchored single-line text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLabel {
    pub text: LabelText,
    pub font: LabelFont,
    pub color: Rgb888,
    pub anchor: Anchor,
    pub position: Point,
}

/// Anything the scene can hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Bar(Bar),
    Label(TextLabel),
}

impl Element {
    pub const fn as_bar(&self) -> Option<&Bar> {
        match self {
            Self::Bar(bar) => Some(bar),
            Self::Label(_) => None,
        }
    }

    pub const fn as_label(&self) -> Option<&TextLabel> {
        match self {
            Self::Label(label) => Some(label),
            Self::Bar(_) => None,
        }
    }
}

/// Where [`SceneGraph::replace`] put the new element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Took over the old element's list index.
    InPlace { index: usize },
    /// Old element was missing; inserted at index 0.
    Fallback,
}

#[derive(Clone, Debug)]
struct Entry {
    handle: ElementHandle,
    slot: SlotId,
    kind: ElementKind,
    element: Element,
}

/// Ordered, slot-indexed element list.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    entries: Vec<Entry, SCENE_CAPACITY>,
    slots: Vec<[Option<ElementHandle>; ELEMENTS_PER_SLOT], MAX_PLANTS>,
    next_handle: u64,
}

impl SceneGraph {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            slots: Vec::new(),
            next_handle: 0,
        }
    }

    /// Append `element` on top of the scene and register it as `slot`'s `kind`.
    pub fn push(
        &mut self,
        slot: SlotId,
        kind: ElementKind,
        element: Element,
    ) -> Result<ElementHandle, SceneError> {
        while self.slots.len() <= slot {
            self.slots
                .push([None; ELEMENTS_PER_SLOT])
                .map_err(|_| SceneError::UnknownSlot(slot))?;
        }

        let handle = self.allocate_handle();
        self.entries
            .push(Entry {
                handle,
                slot,
                kind,
                element,
            })
            .map_err(|_| SceneError::Full {
                capacity: SCENE_CAPACITY,
            })?;
        self.slots[slot][kind.table_index()] = Some(handle);
        Ok(handle)
    }

    /// Swap `slot`'s `kind` element for `element`, keeping its list index.
    pub fn replace(
        &mut self,
        slot: SlotId,
        kind: ElementKind,
        element: Element,
    ) -> Result<Placement, SceneError> {
        let current = self
            .slots
            .get(slot)
            .ok_or(SceneError::UnknownSlot(slot))?[kind.table_index()];
        let handle = self.allocate_handle();
        let entry = Entry {
            handle,
            slot,
            kind,
            element,
        };

        let placement = match current.and_then(|h| self.index_of(h)) {
            Some(index) => {
                // Removal plus insertion at the same index
                self.entries[index] = entry;
                Placement::InPlace { index }
            }
            None => {
                self.entries.insert(0, entry).map_err(|_| SceneError::Full {
                    capacity: SCENE_CAPACITY,
                })?;
                Placement::Fallback
            }
        };

        self.slots[slot][kind.table_index()] = Some(handle);
        Ok(placement)
    }

    /// Remove an element from the list.
    ///
    /// The slot table is left pointing at the removed handle; the next
    /// [`replace`](Self::replace) for that slot falls back to index 0.
    pub fn remove(
        &mut self,
        handle: ElementHandle,
    ) -> Option<Element> {
        let index = self.index_of(handle)?;
        Some(self.entries.remove(index).element)
    }

    /// List index of `handle`, if it is still in the scene.
    pub fn index_of(
        &self,
        handle: ElementHandle,
    ) -> Option<usize> {
        self.entries.iter().position(|e| e.handle == handle)
    }

    /// Handle currently registered for `slot`'s `kind`.
    pub fn handle(
        &self,
        slot: SlotId,
        kind: ElementKind,
    ) -> Option<ElementHandle> {
        self.slots.get(slot)?[kind.table_index()]
    }

    /// `slot`'s `kind` element, if present.
    pub fn get(
        &self,
        slot: SlotId,
        kind: ElementKind,
    ) -> Option<&Element> {
        let index = self.index_of(self.handle(slot, kind)?)?;
        Some(&self.entries[index].element)
    }

    pub fn bar(
        &self,
        slot: SlotId,
    ) -> Option<&Bar> {
        self.get(slot, ElementKind::Bar)?.as_bar()
    }

    pub fn label(
        &self,
        slot: SlotId,
        kind: ElementKind,
    ) -> Option<&TextLabel> {
        self.get(slot, kind)?.as_label()
    }

    /// Elements in draw order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> { self.entries.iter().map(|e| &e.element) }

    /// `(slot, kind)` of each element in draw order.
    pub fn layers(&self) -> impl Iterator<Item = (SlotId, ElementKind)> + '_ {
        self.entries.iter().map(|e| (e.slot, e.kind))
    }

    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    fn allocate_handle(&mut self) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        handle
    }
}

// =============================================================================
// Drawing
// =============================================================================

impl Drawable for Bar {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(
        &self,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.rect.into_styled(PrimitiveStyle::with_fill(self.color)).draw(target)
    }
}

impl Drawable for TextLabel {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(
        &self,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let style = MonoTextStyle::new(self.font.mono_font(), self.color);
        Text::with_text_style(&self.text, self.position, style, self.anchor.text_style())
            .draw(target)
            .map(|_| ())
    }
}

impl Drawable for Element {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(
        &self,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        match self {
            Self::Bar(bar) => bar.draw(target),
            Self::Label(label) => label.draw(target),
        }
    }
}

impl Drawable for SceneGraph {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(
        &self,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.elements().try_for_each(|element| element.draw(target))
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::mock_display::MockDisplay;

    use super::*;
    use crate::colors::{GREEN, PCT, RED, TEXT};

    fn bar(
        x: i32,
        height: u32,
        color: Rgb888,
    ) -> Element {
        Element::Bar(Bar {
            rect: Rectangle::new(Point::new(x, 20 - height as i32), Size::new(4, height)),
            color,
        })
    }

    fn label(text: &str) -> Element {
        let mut buf = LabelText::new();
        let _ = buf.push_str(text);
        Element::Label(TextLabel {
            text: buf,
            font: LabelFont::Percent,
            color: PCT,
            anchor: Anchor::CenterBottom,
            position: Point::new(10, 10),
        })
    }

    /// Two slots, each bar / name / percent, like the scene builder makes.
    fn two_slot_scene() -> SceneGraph {
        let mut scene = SceneGraph::new();
        for slot in 0..2 {
            let x = slot as i32 * 8;
            scene.push(slot, ElementKind::Bar, bar(x, 1, RED)).unwrap();
            scene.push(slot, ElementKind::NameLabel, label("FIG")).unwrap();
            scene.push(slot, ElementKind::PercentLabel, label("0%")).unwrap();
        }
        scene
    }

    #[test]
    fn test_push_keeps_order() {
        let scene = two_slot_scene();
        assert_eq!(scene.len(), 6);
        let layers: std::vec::Vec<_> = scene.layers().collect();
        assert_eq!(
            layers,
            [
                (0, ElementKind::Bar),
                (0, ElementKind::NameLabel),
                (0, ElementKind::PercentLabel),
                (1, ElementKind::Bar),
                (1, ElementKind::NameLabel),
                (1, ElementKind::PercentLabel),
            ]
        );
    }

    #[test]
    fn test_replace_keeps_list_index() {
        let mut scene = two_slot_scene();
        let old = scene.handle(1, ElementKind::Bar).unwrap();

        let placement = scene.replace(1, ElementKind::Bar, bar(8, 5, GREEN)).unwrap();
        assert_eq!(placement, Placement::InPlace { index: 3 });

        let new = scene.handle(1, ElementKind::Bar).unwrap();
        assert_ne!(old, new, "replacement gets a fresh handle");
        assert_eq!(scene.index_of(old), None);
        assert_eq!(scene.index_of(new), Some(3));
        assert_eq!(scene.bar(1).unwrap().color, GREEN);
        assert_eq!(scene.len(), 6);

        // Neighbours untouched
        assert_eq!(scene.bar(0).unwrap().color, RED);
        assert_eq!(scene.label(1, ElementKind::NameLabel).unwrap().text.as_str(), "FIG");
    }

    #[test]
    fn test_replace_label() {
        let mut scene = two_slot_scene();
        scene.replace(0, ElementKind::PercentLabel, label("42%")).unwrap();
        assert_eq!(scene.label(0, ElementKind::PercentLabel).unwrap().text.as_str(), "42%");
        assert_eq!(scene.index_of(scene.handle(0, ElementKind::PercentLabel).unwrap()), Some(2));
    }

    #[test]
    fn test_replace_missing_element_falls_back_to_bottom() {
        let mut scene = two_slot_scene();
        let handle = scene.handle(1, ElementKind::Bar).unwrap();
        assert!(scene.remove(handle).is_some());
        assert_eq!(scene.len(), 5);
        assert!(scene.bar(1).is_none());

        let placement = scene.replace(1, ElementKind::Bar, bar(8, 3, GREEN)).unwrap();
        assert_eq!(placement, Placement::Fallback);
        assert_eq!(scene.len(), 6);
        assert_eq!(scene.layers().next(), Some((1, ElementKind::Bar)));
        assert_eq!(scene.bar(1).unwrap().color, GREEN);

        // Next replacement finds it again
        let placement = scene.replace(1, ElementKind::Bar, bar(8, 4, GREEN)).unwrap();
        assert_eq!(placement, Placement::InPlace { index: 0 });
    }

    #[test]
    fn test_remove_unknown_handle() {
        let mut scene = two_slot_scene();
        let handle = scene.handle(0, ElementKind::NameLabel).unwrap();
        assert!(scene.remove(handle).is_some());
        assert!(scene.remove(handle).is_none());
    }

    #[test]
    fn test_replace_unknown_slot() {
        let mut scene = two_slot_scene();
        assert_eq!(
            scene.replace(5, ElementKind::Bar, bar(0, 1, RED)),
            Err(SceneError::UnknownSlot(5))
        );
    }

    #[test]
    fn test_push_beyond_capacity() {
        let mut scene = SceneGraph::new();
        for i in 0..SCENE_CAPACITY {
            scene.push(i % MAX_PLANTS, ElementKind::Bar, bar(0, 1, RED)).unwrap();
        }
        assert_eq!(
            scene.push(0, ElementKind::Bar, bar(0, 1, RED)),
            Err(SceneError::Full {
                capacity: SCENE_CAPACITY
            })
        );
        assert_eq!(
            scene.push(MAX_PLANTS, ElementKind::Bar, bar(0, 1, RED)),
            Err(SceneError::UnknownSlot(MAX_PLANTS))
        );
    }

    #[test]
    fn test_draw_bar_pixels() {
        let mut scene = SceneGraph::new();
        scene.push(0, ElementKind::Bar, bar(2, 3, GREEN)).unwrap();

        let mut display: MockDisplay<Rgb888> = MockDisplay::new();
        scene.draw(&mut display).unwrap();

        assert_eq!(display.get_pixel(Point::new(2, 17)), Some(GREEN));
        assert_eq!(display.get_pixel(Point::new(5, 19)), Some(GREEN));
        assert_eq!(display.get_pixel(Point::new(2, 16)), None);
        assert_eq!(display.get_pixel(Point::new(6, 19)), None);
        assert_eq!(display.get_pixel(Point::new(2, 20)), None);
    }

    #[test]
    fn test_draw_label_pixels() {
        let mut text = LabelText::new();
        let _ = text.push_str("IVY");
        let element = Element::Label(TextLabel {
            text,
            font: LabelFont::Name,
            color: TEXT,
            anchor: Anchor::CenterMiddle,
            position: Point::new(32, 16),
        });

        let mut display: MockDisplay<Rgb888> = MockDisplay::new();
        element.draw(&mut display).unwrap();

        let lit = display.affected_area();
        assert!(!lit.is_zero_sized());
        // Centered horizontally around x = 32
        let center = lit.center();
        assert!((center.x - 32).abs() <= 1, "label centered at {center:?}");
    }
}
