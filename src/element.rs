use crate::dispatch::EventContext;
use crate::event::Event;
use crate::graphics::Rect;
use crate::render::DrawContext;

/// What an element knows about itself while painting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintInfo {
    /// Absolute, logical bounds from the last layout pass.
    pub bounds: Rect,
    pub focused: bool,
}

/// Behaviour attached to a node of the document tree.
pub trait Element {
    /// Called once per event for each element on the bubble path, deepest first.
    /// Call [`Event::consume`] to stop the event reaching ancestors.
    fn handle_event(&mut self, event: &mut Event, cx: &mut EventContext<'_>);

    fn render(&self, _info: PaintInfo, _ctx: &mut DrawContext<'_>) {}

    /// When true, children are painted inside a clip of this element's bounds.
    fn clips_children(&self) -> bool {
        false
    }

    /// Text content, for elements that have any.
    fn text(&self) -> Option<&str> {
        None
    }
}
