//! Stock elements: a styled box, a text label, a picture and a single-line
//! text box.

use crate::adaptor::{ImageRef, TextureId};
use crate::dispatch::EventContext;
use crate::element::{Element, PaintInfo};
use crate::event::{CursorType, Event, EventKind, Key};
use crate::graphics::{Color, Rect, TextMeasurer};
use crate::render::DrawContext;

/// A rectangle with optional background and border. Never consumes events.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub background: Option<Color>,
    pub border_color: Option<Color>,
    pub border_width: f32,
    pub border_radius: f32,
    pub clip: bool,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_border(mut self, width: f32, color: Color) -> Self {
        self.border_width = width;
        self.border_color = Some(color);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.border_radius = radius;
        self
    }

    pub fn clipped(mut self) -> Self {
        self.clip = true;
        self
    }
}

impl Element for Block {
    fn handle_event(&mut self, _event: &mut Event, _cx: &mut EventContext<'_>) {}

    fn render(&self, info: PaintInfo, ctx: &mut DrawContext<'_>) {
        ctx.renderer_mut().draw_rect(
            info.bounds,
            self.background,
            self.border_radius,
            self.border_width,
            self.border_color,
        );
    }

    fn clips_children(&self) -> bool {
        self.clip
    }
}

#[derive(Clone, Debug)]
pub struct Label {
    pub text: String,
    pub color: Color,
    pub font_size: f32,
    pub font: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::BLACK,
            font_size: 16.0,
            font: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_font(mut self, name: impl Into<String>, size: f32) -> Self {
        self.font = Some(name.into());
        self.font_size = size;
        self
    }
}

impl Element for Label {
    fn handle_event(&mut self, _event: &mut Event, _cx: &mut EventContext<'_>) {}

    fn render(&self, info: PaintInfo, ctx: &mut DrawContext<'_>) {
        ctx.renderer_mut()
            .draw_text(&self.text, info.bounds, self.color, self.font_size, self.font.as_deref());
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PictureSource {
    Image(ImageRef),
    Texture(TextureId),
}

/// An adaptor-loaded image or texture stretched over the element's bounds.
///
/// Handles the adaptor does not know are drawn as a placeholder.
#[derive(Clone, Debug)]
pub struct Picture {
    pub source: PictureSource,
    pub border_radius: f32,
}

impl Picture {
    pub fn image(image: ImageRef) -> Self {
        Self { source: PictureSource::Image(image), border_radius: 0.0 }
    }

    pub fn texture(texture: TextureId) -> Self {
        Self { source: PictureSource::Texture(texture), border_radius: 0.0 }
    }

    /// Rounds the corners. Textures are always drawn square.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.border_radius = radius;
        self
    }
}

impl Element for Picture {
    fn handle_event(&mut self, _event: &mut Event, _cx: &mut EventContext<'_>) {}

    fn render(&self, info: PaintInfo, ctx: &mut DrawContext<'_>) {
        let renderer = ctx.renderer_mut();
        match self.source {
            PictureSource::Image(image) => {
                renderer.draw_image(image, info.bounds, self.border_radius)
            }
            PictureSource::Texture(texture) => renderer.draw_texture(texture, info.bounds),
        }
    }
}

/// Single-line editable text.
///
/// A mouse-down inside the box takes focus and is consumed. While focused
/// the box consumes text input and editing keys; Escape gives focus back.
#[derive(Clone, Debug)]
pub struct TextBox {
    text: String,
    /// Caret position in characters.
    caret: usize,
    pub color: Color,
    pub background: Color,
    pub border_color: Color,
    pub focus_color: Color,
    pub font_size: f32,
    pub padding: f32,
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            color: Color::BLACK,
            background: Color::WHITE,
            border_color: Color::rgb(160, 160, 160),
            focus_color: Color::rgb(40, 120, 220),
            font_size: 16.0,
            padding: 4.0,
        }
    }
}

impl TextBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.caret = self.text.chars().count();
        self
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn insert(&mut self, characters: &str) {
        let at = self.byte_offset(self.caret);
        self.text.insert_str(at, characters);
        self.caret += characters.chars().count();
    }

    /// Applies an editing key. Returns false for keys the box does not use.
    fn edit(&mut self, key: Key) -> bool {
        let len = self.text.chars().count();
        match key {
            Key::Backspace => {
                if self.caret > 0 {
                    self.caret -= 1;
                    let at = self.byte_offset(self.caret);
                    self.text.remove(at);
                }
            }
            Key::Delete => {
                if self.caret < len {
                    let at = self.byte_offset(self.caret);
                    self.text.remove(at);
                }
            }
            Key::Left => self.caret = self.caret.saturating_sub(1),
            Key::Right => self.caret = (self.caret + 1).min(len),
            Key::Home => self.caret = 0,
            Key::End => self.caret = len,
            _ => return false,
        }
        true
    }
}

impl Element for TextBox {
    fn handle_event(&mut self, event: &mut Event, cx: &mut EventContext<'_>) {
        let consumed = match event.kind() {
            EventKind::MouseDown { x, y } => {
                if cx.bounds().contains(*x as f32, *y as f32) {
                    cx.focus();
                    true
                } else {
                    false
                }
            }
            EventKind::MouseMove { x, y } => {
                if cx.bounds().contains(*x as f32, *y as f32) {
                    cx.set_cursor(CursorType::IBeam);
                }
                false
            }
            EventKind::TextInput { characters } if cx.is_focused() => {
                self.insert(characters);
                true
            }
            EventKind::KeyPress { key: Key::Escape } if cx.is_focused() => {
                cx.blur();
                true
            }
            EventKind::KeyPress { key } if cx.is_focused() => self.edit(*key),
            _ => false,
        };

        if consumed {
            event.consume();
        }
    }

    fn render(&self, info: PaintInfo, ctx: &mut DrawContext<'_>) {
        let border = if info.focused { self.focus_color } else { self.border_color };
        let content = info.bounds.inset(self.padding);
        let caret_x = {
            let prefix = &self.text[..self.byte_offset(self.caret)];
            ctx.renderer().measure_text(prefix, self.font_size).0
        };

        let renderer = ctx.renderer_mut();
        renderer.draw_rect(info.bounds, Some(self.background), 2.0, 1.0, Some(border));
        renderer.push_clip(info.bounds);
        renderer.draw_text(&self.text, content, self.color, self.font_size, None);
        if info.focused {
            let caret = Rect::new(content.x + caret_x, content.y, 1.0, self.font_size);
            renderer.fill_rect(caret, self.color);
        }
        renderer.pop_clip();
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}
