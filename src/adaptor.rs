use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::render::DrawContext;

/// Opaque handle to an image owned by an adaptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageRef(pub u64);

/// Opaque handle to a texture owned by an adaptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Image {
    pub handle: ImageRef,
    pub width: u32,
    pub height: u32,
}

/// The platform capability boundary.
///
/// One adaptor is active at a time. It is shared between the context and
/// the renderer through a [`SharedAdaptor`]; implementations must not
/// borrow that shared handle again from inside their own methods.
pub trait Adaptor {
    fn load_image(&mut self, name: &str) -> Result<Image>;

    /// Uploads a tightly packed RGBA8 buffer of `width * height` pixels.
    fn load_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId>;

    /// Called once per frame, after the document has painted.
    fn render_callback(&mut self, ctx: &DrawContext<'_>);
}

pub type SharedAdaptor = Rc<RefCell<dyn Adaptor>>;

pub fn share<A: Adaptor + 'static>(adaptor: A) -> SharedAdaptor {
    Rc::new(RefCell::new(adaptor))
}

/// Adaptor used until the platform installs a real one.
#[derive(Debug, Default)]
pub struct NullAdaptor;

impl Adaptor for NullAdaptor {
    fn load_image(&mut self, _name: &str) -> Result<Image> {
        Err(Error::Unsupported("image loading"))
    }

    fn load_texture(&mut self, _width: u32, _height: u32, _pixels: &[u8]) -> Result<TextureId> {
        Err(Error::Unsupported("texture upload"))
    }

    fn render_callback(&mut self, _ctx: &DrawContext<'_>) {}
}
