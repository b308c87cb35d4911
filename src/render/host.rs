//! The screen-object contract the pipeline renders, plus its collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::geometry::{PixelRect, Point, Size};
use crate::render::font::GlyphSource;
use crate::surface::{Cell, Surface};

/// A surface shared between its owner and the pipeline under a single-thread
/// update model.
pub type SharedSurface = Rc<RefCell<Surface>>;

/// What the pipeline needs to know about the object it renders.
pub trait ScreenHost {
    /// The cell surface to draw.
    fn surface(&self) -> &SharedSurface;

    /// Glyph atlas used for this object.
    fn font(&self) -> &Rc<dyn GlyphSource>;

    /// Pixel size one cell is rendered at; need not match the font's native
    /// glyph size.
    fn font_size(&self) -> Size;

    /// Pixel area the object occupies on the display.
    fn absolute_area(&self) -> PixelRect;

    /// Tint applied when the object's textures are composited.
    fn tint(&self) -> Rgba;
}

/// Concrete screen object: one surface, a font, and a pixel position.
pub struct ScreenObject {
    surface: SharedSurface,
    font: Rc<dyn GlyphSource>,
    font_size: Size,
    position: Point,
    tint: Rgba,
}

impl ScreenObject {
    /// Wrap a surface for rendering with the given font at its native size.
    pub fn new(surface: Surface, font: Rc<dyn GlyphSource>) -> Self {
        let font_size = font.glyph_size();
        Self {
            surface: Rc::new(RefCell::new(surface)),
            font,
            font_size,
            position: Point::ORIGIN,
            tint: Rgba::WHITE,
        }
    }

    /// Render cells at a size other than the font's native glyph size
    /// (builder pattern).
    pub fn with_font_size(mut self, font_size: Size) -> Self {
        self.font_size = font_size;
        self
    }

    /// Place the object at a pixel position (builder pattern).
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Move the object to a pixel position.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Set the composite tint.
    pub fn set_tint(&mut self, tint: Rgba) {
        self.tint = tint;
    }
}

impl ScreenHost for ScreenObject {
    fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    fn font(&self) -> &Rc<dyn GlyphSource> {
        &self.font
    }

    fn font_size(&self) -> Size {
        self.font_size
    }

    fn absolute_area(&self) -> PixelRect {
        let view = self.surface.borrow().view_size();
        PixelRect::new(
            self.position.x,
            self.position.y,
            view.width as u32 * self.font_size.width as u32,
            view.height as u32 * self.font_size.height as u32,
        )
    }

    fn tint(&self) -> Rgba {
        self.tint
    }
}

/// Extra surfaces composited above the host's main surface, bottom first.
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<SharedSurface>,
}

impl LayerStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new transparent layer of the given size, returning the shared
    /// handle for editing.
    pub fn add_layer(&mut self, width: u16, height: u16) -> SharedSurface {
        let layer = Rc::new(RefCell::new(Surface::new(width, height)));
        self.layers.push(Rc::clone(&layer));
        layer
    }

    /// The layers, bottom first.
    pub fn layers(&self) -> &[SharedSurface] {
        &self.layers
    }

    /// True when any layer needs repainting.
    pub fn is_dirty(&self) -> bool {
        self.layers.iter().any(|l| l.borrow().is_dirty())
    }

    /// Clear dirty state on every layer.
    pub fn clear_dirty(&mut self) {
        for layer in &self.layers {
            layer.borrow_mut().clear_dirty();
        }
    }
}

/// A free-floating glyph drawn at a grid position above the surface.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Grid position in surface coordinates.
    pub position: Point,
    /// The glyph cell drawn for this entity.
    pub appearance: Cell,
    /// Hidden entities are skipped entirely.
    pub visible: bool,
}

impl Entity {
    /// Create a visible entity.
    pub fn new(position: Point, appearance: Cell) -> Self {
        Self {
            position,
            appearance,
            visible: true,
        }
    }
}

/// Owns the entities rendered by the entity step.
#[derive(Debug, Default)]
pub struct EntityHost {
    entities: Vec<Entity>,
    dirty: bool,
}

impl EntityHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its index.
    pub fn add(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.dirty = true;
        self.entities.len() - 1
    }

    /// Remove an entity by index.
    pub fn remove(&mut self, index: usize) -> Option<Entity> {
        if index < self.entities.len() {
            self.dirty = true;
            Some(self.entities.remove(index))
        } else {
            None
        }
    }

    /// All entities in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to one entity; marks the host for repaint.
    pub fn entity_mut(&mut self, index: usize) -> Option<&mut Entity> {
        if index < self.entities.len() {
            self.dirty = true;
            self.entities.get_mut(index)
        } else {
            None
        }
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entities exist.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True when the entity texture needs repainting.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge a repaint.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// The input cursor drawn above the surface.
#[derive(Debug, Clone)]
pub struct Cursor {
    position: Point,
    visible: bool,
    appearance: Cell,
    dirty: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// A hidden cursor at the origin rendered as a solid block.
    pub fn new() -> Self {
        Self {
            position: Point::ORIGIN,
            visible: false,
            appearance: Cell::new(219, Rgba::WHITE, Rgba::TRANSPARENT),
            dirty: false,
        }
    }

    /// Grid position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the cursor, marking it for repaint on change.
    pub fn set_position(&mut self, position: Point) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    /// Whether the cursor is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the cursor.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }

    /// The glyph cell drawn at the cursor position.
    pub fn appearance(&self) -> &Cell {
        &self.appearance
    }

    /// Replace the cursor's appearance.
    pub fn set_appearance(&mut self, appearance: Cell) {
        self.appearance = appearance;
        self.dirty = true;
    }

    /// True when the cursor changed since the last frame.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge a repaint.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// An overlay surface drawn above everything but the final output, intended
/// for interactive controls.
pub struct ControlHost {
    surface: SharedSurface,
}

impl ControlHost {
    /// Create a transparent overlay of the given cell size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            surface: Rc::new(RefCell::new(Surface::new(width, height))),
        }
    }

    /// The overlay surface.
    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// True when the overlay needs repainting.
    pub fn is_dirty(&self) -> bool {
        self.surface.borrow().is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{DrawBackend, SoftwareBackend};
    use crate::render::font::GridFont;

    fn screen() -> ScreenObject {
        let mut backend = SoftwareBackend::new();
        let atlas = backend.create_texture(64, 64);
        let font: Rc<dyn GlyphSource> = Rc::new(GridFont::new(atlas, 8, 8, 8, 8, 11));
        ScreenObject::new(Surface::new(10, 5), font)
    }

    #[test]
    fn absolute_area_tracks_view_and_font() {
        let host = screen().with_position(Point::new(16, 8));
        assert_eq!(host.absolute_area(), PixelRect::new(16, 8, 80, 40));
    }

    #[test]
    fn absolute_area_follows_view_resize() {
        let host = screen();
        host.surface().borrow_mut().set_view_size(Size::new(4, 2));
        assert_eq!(host.absolute_area().size(), (32, 16));
    }

    #[test]
    fn cursor_tracks_changes() {
        let mut cursor = Cursor::new();
        assert!(!cursor.is_dirty());
        cursor.set_position(Point::new(1, 1));
        assert!(cursor.is_dirty());
        cursor.clear_dirty();
        cursor.set_position(Point::new(1, 1));
        assert!(!cursor.is_dirty());
    }

    #[test]
    fn entity_host_marks_dirty_on_mutation() {
        let mut host = EntityHost::new();
        let idx = host.add(Entity::new(Point::new(2, 2), Cell::default()));
        host.clear_dirty();
        host.entity_mut(idx).unwrap().position = Point::new(3, 3);
        assert!(host.is_dirty());
    }

    #[test]
    fn layer_stack_aggregates_dirty() {
        let mut stack = LayerStack::new();
        let layer = stack.add_layer(4, 4);
        layer.borrow_mut().clear_dirty();
        assert!(!stack.is_dirty());
        layer.borrow_mut().set_glyph(0, 0, 65);
        assert!(stack.is_dirty());
    }
}
