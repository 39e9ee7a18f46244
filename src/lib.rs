pub mod adaptor;
pub mod context;
pub mod dispatch;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod focus;
pub mod fonts;
pub mod graphics;
pub mod render;
pub mod renderer;
pub mod widgets;

pub use adaptor::{Adaptor, Image, ImageRef, NullAdaptor, SharedAdaptor, TextureId, share};
pub use context::Context;
pub use dispatch::{EventContext, dispatch};
pub use document::{Document, Viewport};
pub use element::{Element, PaintInfo};
pub use error::{Error, Result};
pub use event::{CursorType, Event, EventKind, EventTag, Key, PointerState};
pub use focus::FocusManager;
pub use fonts::FontManager;
pub use graphics::{Color, DrawCommand, Rect, TextMeasurer, Vec2};
pub use render::{DrawContext, compose};
pub use renderer::Renderer;
pub use widgets::{Block, Label, Picture, PictureSource, TextBox};

/// Re-exported so callers can build styles and node ids without a direct taffy dependency.
pub use taffy;
