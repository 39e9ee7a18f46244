use taffy::NodeId;

/// Tracks which element, if any, receives keyboard and text input.
///
/// The handle is an arena key, never a reference. The document calls
/// [`FocusManager::forget`] for every node it removes, so a stale key is
/// never reported as focused.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<NodeId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, node: NodeId) -> bool {
        self.focused == Some(node)
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.focused != Some(node) {
            log::debug!("focus moved to {:?}", node);
            self.focused = Some(node);
        }
    }

    /// Drops focus, returning the element that held it.
    pub fn clear(&mut self) -> Option<NodeId> {
        let previous = self.focused.take();
        if let Some(node) = previous {
            log::debug!("focus cleared from {:?}", node);
        }
        previous
    }

    /// Clears focus only if `node` holds it.
    pub fn forget(&mut self, node: NodeId) {
        if self.focused == Some(node) {
            self.focused = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_transitions() {
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        let mut focus = FocusManager::new();
        assert_eq!(focus.focused(), None);

        focus.focus(a);
        focus.focus(a);
        assert!(focus.is_focused(a));

        focus.forget(b);
        assert_eq!(focus.focused(), Some(a));

        assert_eq!(focus.clear(), Some(a));
        assert_eq!(focus.clear(), None);
    }
}
