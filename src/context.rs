use std::path::Path;
use std::rc::Rc;

use crate::adaptor::{Image, NullAdaptor, SharedAdaptor, TextureId, share};
use crate::dispatch::dispatch;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::event::{CursorType, Event, EventKind, EventTag, Key, PointerState};
use crate::graphics::Vec2;
use crate::render::compose;
use crate::renderer::Renderer;

/// Owns the document, the renderer and the active adaptor, and turns raw
/// platform input into dispatched events.
///
/// Every input method returns the dispatch result: `true` when the event
/// reached the body without being consumed.
pub struct Context {
    document: Document,
    renderer: Renderer,
    adaptor: SharedAdaptor,
    pointer: PointerState,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_adaptor(share(NullAdaptor))
    }

    pub fn with_adaptor(adaptor: SharedAdaptor) -> Self {
        Self {
            document: Document::new(),
            renderer: Renderer::new(Rc::clone(&adaptor)),
            adaptor,
            pointer: PointerState::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Per-frame update hook. Nothing animates yet.
    pub fn update(&mut self, _dt: f32) {}

    pub fn add_input_characters(&mut self, characters: &str) -> bool {
        self.dispatch(Event::text_input(characters))
    }

    pub fn set_key_press(&mut self, key: Key) -> bool {
        self.dispatch(Event::key_press(key))
    }

    /// Handlers see the old position through the pointer state; the new one
    /// is stored only after dispatch returns. Moves to the same position are
    /// still dispatched.
    pub fn set_mouse_position(&mut self, x: i32, y: i32) -> bool {
        self.document.set_cursor(CursorType::Arrow);
        let bubbled = self.dispatch(Event::mouse_move(x, y));
        self.pointer.x = x;
        self.pointer.y = y;
        bubbled
    }

    pub fn set_scroll_direction(&mut self, direction: i32) -> bool {
        self.pointer.scroll_direction = direction;
        self.dispatch(Event::mouse_scroll(direction, self.pointer.x, self.pointer.y))
    }

    pub fn mouse_position(&self) -> Vec2 {
        Vec2::new(self.pointer.x as f32, self.pointer.y as f32)
    }

    pub fn scroll_direction(&self) -> i32 {
        self.pointer.scroll_direction
    }

    /// Clicks at the stored pointer position. Focus is cleared when nothing
    /// claims the click.
    pub fn set_mouse_down(&mut self) -> bool {
        self.dispatch(Event::mouse_down(self.pointer.x, self.pointer.y))
    }

    pub fn set_double_click(&mut self) -> bool {
        self.dispatch(Event::named(EventTag::DoubleClick))
    }

    pub fn send_event(&mut self, kind: EventKind) -> bool {
        self.dispatch(Event::new(kind))
    }

    fn dispatch(&mut self, mut event: Event) -> bool {
        dispatch(&mut self.document, &mut event, self.pointer)
    }

    pub fn adaptor(&self) -> &SharedAdaptor {
        &self.adaptor
    }

    /// Swaps the platform adaptor. The renderer is rebound in the same call,
    /// so the next frame already draws through `adaptor`.
    pub fn use_adaptor(&mut self, adaptor: SharedAdaptor) {
        self.renderer.set_adaptor(Rc::clone(&adaptor));
        self.adaptor = adaptor;
        log::debug!("adaptor replaced");
    }

    pub fn load_image(&mut self, name: &str) -> Result<Image> {
        let mut adaptor = self.adaptor.try_borrow_mut().map_err(|_| Error::AdaptorBusy)?;
        adaptor
            .load_image(name)
            .inspect_err(|e| log::warn!("failed to load image {}: {}", name, e))
    }

    pub fn load_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId> {
        let mut adaptor = self.adaptor.try_borrow_mut().map_err(|_| Error::AdaptorBusy)?;
        adaptor.load_texture(width, height, pixels)
    }

    pub fn load_font(&mut self, name: &str, location: impl AsRef<Path>) -> Result<()> {
        self.renderer
            .font_manager_mut()
            .load_font(name, location)
            .inspect_err(|e| log::warn!("failed to load font {}: {}", name, e))
    }

    /// Paints one frame. `dt` is accepted for callers' frame loops and not
    /// used yet.
    pub fn render(&mut self, _dt: f32) {
        debug_assert!(self.renderer.is_bound_to(&self.adaptor));
        compose(&self.document, &mut self.renderer);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("document", &self.document)
            .field("renderer", &self.renderer)
            .field("pointer", &self.pointer)
            .finish()
    }
}
