/// Keys the platform layer forwards as discrete presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Tags for events that carry no payload of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTag {
    DoubleClick,
    Custom(&'static str),
}

/// Cursor shape hint the document exposes to the platform shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorType {
    #[default]
    Arrow,
    IBeam,
    Hand,
    Crosshair,
    ResizeHorizontal,
    ResizeVertical,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    TextInput { characters: String },
    KeyPress { key: Key },
    MouseMove { x: i32, y: i32 },
    MouseScroll { direction: i32, x: i32, y: i32 },
    MouseDown { x: i32, y: i32 },
    Named(EventTag),
}

/// A single input occurrence on its way through the element tree.
///
/// The payload is fixed at construction. Only the consumed flag changes,
/// and it only ever goes from `false` to `true`.
#[derive(Clone, Debug)]
pub struct Event {
    kind: EventKind,
    consumed: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, consumed: false }
    }

    pub fn text_input(characters: impl Into<String>) -> Self {
        Self::new(EventKind::TextInput { characters: characters.into() })
    }

    pub fn key_press(key: Key) -> Self {
        Self::new(EventKind::KeyPress { key })
    }

    pub fn mouse_move(x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseMove { x, y })
    }

    pub fn mouse_scroll(direction: i32, x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseScroll { direction, x, y })
    }

    pub fn mouse_down(x: i32, y: i32) -> Self {
        Self::new(EventKind::MouseDown { x, y })
    }

    pub fn named(tag: EventTag) -> Self {
        Self::new(EventKind::Named(tag))
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Stops propagation. Ancestors above the current element will not see the event.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Pointer coordinates for mouse events, `None` for everything else.
    pub fn position(&self) -> Option<(i32, i32)> {
        match self.kind {
            EventKind::MouseMove { x, y }
            | EventKind::MouseScroll { x, y, .. }
            | EventKind::MouseDown { x, y } => Some((x, y)),
            EventKind::TextInput { .. } | EventKind::KeyPress { .. } | EventKind::Named(_) => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.position().is_some()
    }
}

/// Last known pointer state, owned by the context.
///
/// A copy taken before dispatch is handed to every handler, so during a
/// mouse move this is still the position the pointer moved *from*.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub scroll_direction: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_is_sticky() {
        let mut event = Event::key_press(Key::Enter);
        assert!(!event.is_consumed());
        event.consume();
        event.consume();
        assert!(event.is_consumed());
        assert_eq!(event.kind(), &EventKind::KeyPress { key: Key::Enter });
    }

    #[test]
    fn only_mouse_events_have_a_position() {
        assert_eq!(Event::mouse_scroll(-1, 3, 4).position(), Some((3, 4)));
        assert_eq!(Event::mouse_down(9, 2).position(), Some((9, 2)));
        assert!(Event::mouse_move(0, 0).is_pointer());
        assert_eq!(Event::text_input("hi").position(), None);
        assert!(!Event::named(EventTag::DoubleClick).is_pointer());
    }
}
