use std::rc::Rc;

use crate::adaptor::{ImageRef, SharedAdaptor, TextureId};
use crate::fonts::FontManager;
use crate::graphics::{Color, DrawCommand, Rect, TextMeasurer};

/// Records the primitives elements emit while painting a frame.
///
/// The renderer owns the font manager and keeps a handle to the active
/// adaptor so elements can reach platform resources during paint. The
/// adaptor turns the recorded commands into pixels in its render callback.
pub struct Renderer {
    font_manager: FontManager,
    adaptor: SharedAdaptor,
    commands: Vec<DrawCommand>,
    clip_depth: usize,
}

impl Renderer {
    pub fn new(adaptor: SharedAdaptor) -> Self {
        Self {
            font_manager: FontManager::new(),
            adaptor,
            commands: Vec::new(),
            clip_depth: 0,
        }
    }

    pub fn font_manager(&self) -> &FontManager {
        &self.font_manager
    }

    pub fn font_manager_mut(&mut self) -> &mut FontManager {
        &mut self.font_manager
    }

    pub fn adaptor(&self) -> &SharedAdaptor {
        &self.adaptor
    }

    pub fn set_adaptor(&mut self, adaptor: SharedAdaptor) {
        self.adaptor = adaptor;
    }

    pub fn is_bound_to(&self, adaptor: &SharedAdaptor) -> bool {
        Rc::ptr_eq(&self.adaptor, adaptor)
    }

    /// Discards the previous frame's commands.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.clip_depth = 0;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.draw_rect(rect, Some(color), 0.0, 0.0, None);
    }

    pub fn draw_rect(
        &mut self,
        rect: Rect,
        color: Option<Color>,
        border_radius: f32,
        border_width: f32,
        border_color: Option<Color>,
    ) {
        if color.is_none() && (border_width <= 0.0 || border_color.is_none()) {
            return;
        }
        self.commands.push(DrawCommand::DrawRect {
            rect,
            color,
            border_radius,
            border_width,
            border_color,
        });
    }

    /// Draws text with the named font, or the default font when `font` is `None`
    /// or unknown.
    pub fn draw_text(
        &mut self,
        text: &str,
        rect: Rect,
        color: Color,
        font_size: f32,
        font: Option<&str>,
    ) {
        if text.is_empty() {
            return;
        }
        let font = font.and_then(|name| self.font_manager.index_of(name));
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            rect,
            color,
            font_size,
            font,
        });
    }

    pub fn draw_image(&mut self, image: ImageRef, rect: Rect, border_radius: f32) {
        self.commands.push(DrawCommand::DrawImage { image, rect, border_radius });
    }

    pub fn draw_texture(&mut self, texture: TextureId, rect: Rect) {
        self.commands.push(DrawCommand::DrawTexture { texture, rect });
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.commands.push(DrawCommand::Clip { rect });
    }

    /// Unbalanced pops are ignored.
    pub fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without a matching push_clip");
            return;
        }
        self.clip_depth -= 1;
        self.commands.push(DrawCommand::PopClip);
    }
}

impl TextMeasurer for Renderer {
    fn measure_text(&self, text: &str, font_size: f32) -> (f32, f32) {
        self.font_manager.measure_text(text, font_size)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("font_manager", &self.font_manager)
            .field("commands", &self.commands.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::{NullAdaptor, share};

    #[test]
    fn records_commands_per_frame() {
        let mut renderer = Renderer::new(share(NullAdaptor));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

        renderer.fill_rect(rect, Color::WHITE);
        renderer.draw_rect(rect, None, 0.0, 0.0, None);
        renderer.push_clip(rect);
        renderer.draw_text("", rect, Color::BLACK, 12.0, None);
        renderer.draw_text("hi", rect, Color::BLACK, 12.0, Some("missing"));
        renderer.pop_clip();
        renderer.pop_clip();

        assert_eq!(renderer.commands().len(), 4);
        assert!(matches!(renderer.commands()[2], DrawCommand::DrawText { font: None, .. }));
        assert_eq!(renderer.commands()[3], DrawCommand::PopClip);

        renderer.begin_frame();
        assert!(renderer.commands().is_empty());
    }

    #[test]
    fn rebinding_the_adaptor() {
        let first = share(NullAdaptor);
        let second = share(NullAdaptor);
        let mut renderer = Renderer::new(first.clone());
        assert!(renderer.is_bound_to(&first));

        renderer.set_adaptor(second.clone());
        assert!(renderer.is_bound_to(&second));
        assert!(!renderer.is_bound_to(&first));
    }
}
