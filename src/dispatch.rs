use taffy::NodeId;

#[cfg(feature = "profile")]
use coarse_prof::profile;

#[cfg(not(feature = "profile"))]
macro_rules! profile {
    ($($tt:tt)*) => {};
}

use crate::document::Document;
use crate::event::{CursorType, Event, EventKind, PointerState};
use crate::focus::FocusManager;
use crate::graphics::Rect;

/// What a handler may see and change while an event passes through it.
pub struct EventContext<'a> {
    node: NodeId,
    target: NodeId,
    bounds: Rect,
    pointer: PointerState,
    focus: &'a mut FocusManager,
    cursor: &'a mut CursorType,
}

impl EventContext<'_> {
    /// The element currently handling the event.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The element the event was first delivered to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_target(&self) -> bool {
        self.node == self.target
    }

    /// Absolute bounds of the current element.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Pointer state from before this event was dispatched.
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn is_focused(&self) -> bool {
        self.focus.is_focused(self.node)
    }

    /// Gives keyboard and text focus to the current element.
    pub fn focus(&mut self) {
        self.focus.focus(self.node);
    }

    /// Releases focus if the current element holds it.
    pub fn blur(&mut self) {
        self.focus.forget(self.node);
    }

    pub fn set_cursor(&mut self, cursor: CursorType) {
        *self.cursor = cursor;
    }
}

/// Delivers `event` to its target and bubbles it toward the body.
///
/// Returns true when the event left the body unconsumed, including when
/// the document has no body at all. An unconsumed mouse-down clears focus.
pub fn dispatch(document: &mut Document, event: &mut Event, pointer: PointerState) -> bool {
    profile!("dispatch");
    let bubbled = match document.body {
        Some(body) => {
            let target = route(document, event, body);
            let path = document.ancestors(target);
            deliver(document, event, &path, target, pointer)
        }
        None => true,
    };

    if bubbled && matches!(event.kind(), EventKind::MouseDown { .. }) {
        document.focus_manager.clear();
    }
    bubbled
}

/// Pointer events go to the element under the pointer, everything else to
/// the focused element. Either falls back to the body.
fn route(document: &Document, event: &Event, body: NodeId) -> NodeId {
    match event.position() {
        Some((x, y)) => document.hit_test(x as f32, y as f32).unwrap_or(body),
        None => document.focused().unwrap_or(body),
    }
}

fn deliver(
    document: &mut Document,
    event: &mut Event,
    path: &[NodeId],
    target: NodeId,
    pointer: PointerState,
) -> bool {
    for &node in path {
        let bounds = document.bounds(node).unwrap_or_default();
        let Some(element) = document.elements.get_mut(&node) else {
            continue;
        };

        let mut cx = EventContext {
            node,
            target,
            bounds,
            pointer,
            focus: &mut document.focus_manager,
            cursor: &mut document.cursor,
        };
        element.handle_event(event, &mut cx);

        if event.is_consumed() {
            log::trace!("{:?} consumed by {:?}", event.kind(), node);
            return false;
        }
    }
    log::trace!("{:?} bubbled to the body", event.kind());
    true
}
