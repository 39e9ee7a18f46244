use std::rc::Rc;

#[cfg(feature = "profile")]
use coarse_prof::profile;

#[cfg(not(feature = "profile"))]
macro_rules! profile {
    ($($tt:tt)*) => {};
}

use crate::document::Document;
use crate::renderer::Renderer;

/// Per-frame paint state: viewport geometry plus the active renderer.
///
/// Built fresh for every frame and dropped when the frame ends.
pub struct DrawContext<'a> {
    pub width: f32,
    pub height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    renderer: &'a mut Renderer,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        width: f32,
        height: f32,
        screen_width: f32,
        screen_height: f32,
        renderer: &'a mut Renderer,
    ) -> Self {
        Self { width, height, screen_width, screen_height, renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &*self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut *self.renderer
    }

    /// Physical pixels per logical unit on each axis.
    pub fn scale_factor(&self) -> (f32, f32) {
        let sx = if self.width > 0.0 { self.screen_width / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { self.screen_height / self.height } else { 1.0 };
        (sx, sy)
    }
}

/// Runs one frame: paint the document, then hand the frame to the adaptor.
///
/// The adaptor is always read from the renderer, so the frame can never
/// pair the renderer with a different adaptor than the one it draws through.
pub fn compose(document: &Document, renderer: &mut Renderer) {
    profile!("compose");
    renderer.begin_frame();
    let adaptor = Rc::clone(renderer.adaptor());

    // TODO: cache the draw context in the renderer and rebuild it only on resize.
    let mut ctx = DrawContext::new(
        document.width(),
        document.height(),
        document.screen_width(),
        document.screen_height(),
        renderer,
    );

    if document.body().is_some() {
        profile!("paint");
        document.paint(&mut ctx);
    }

    match adaptor.try_borrow_mut() {
        Ok(mut adaptor) => {
            profile!("render_callback");
            adaptor.render_callback(&ctx);
        }
        Err(_) => log::warn!("adaptor busy, skipping render callback"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::{NullAdaptor, share};

    #[test]
    fn scale_factor_handles_empty_viewport() {
        let mut renderer = Renderer::new(share(NullAdaptor));
        let ctx = DrawContext::new(400.0, 300.0, 800.0, 900.0, &mut renderer);
        assert_eq!(ctx.scale_factor(), (2.0, 3.0));

        let ctx = DrawContext::new(0.0, 0.0, 800.0, 600.0, &mut renderer);
        assert_eq!(ctx.scale_factor(), (1.0, 1.0));
    }
}
