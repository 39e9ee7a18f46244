use std::collections::HashMap;

use taffy::prelude::*;

#[cfg(feature = "profile")]
use coarse_prof::profile;

#[cfg(not(feature = "profile"))]
macro_rules! profile {
    ($($tt:tt)*) => {};
}

use crate::element::{Element, PaintInfo};
use crate::error::{Error, Result};
use crate::event::CursorType;
use crate::focus::FocusManager;
use crate::graphics::Rect;
use crate::render::DrawContext;

/// Logical and physical size of the surface the document is shown on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_scale(width, height, 1.0)
    }

    pub fn with_scale(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width,
            height,
            screen_width: width * scale,
            screen_height: height * scale,
        }
    }
}

/// The element tree.
///
/// Structure and geometry live in a taffy arena; behaviour lives in the
/// element map keyed by the same node ids. A node belongs to the document
/// exactly when it has an entry in the element map.
pub struct Document {
    pub(crate) taffy: TaffyTree,
    pub(crate) elements: HashMap<NodeId, Box<dyn Element>>,
    pub(crate) body: Option<NodeId>,
    pub(crate) focus_manager: FocusManager,
    pub(crate) cursor: CursorType,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            taffy: TaffyTree::new(),
            elements: HashMap::new(),
            body: None,
            focus_manager: FocusManager::new(),
            cursor: CursorType::Arrow,
            viewport: Viewport::default(),
        }
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    /// Installs the root element, dropping any previous body and its subtree.
    pub fn set_body(&mut self, element: impl Element + 'static, style: Style) -> Result<NodeId> {
        if let Some(old) = self.body {
            self.remove(old)?;
        }
        let id = self.taffy.new_leaf(style)?;
        self.elements.insert(id, Box::new(element));
        self.body = Some(id);
        Ok(id)
    }

    pub fn append(
        &mut self,
        parent: NodeId,
        element: impl Element + 'static,
        style: Style,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(Error::UnknownElement(parent));
        }
        let id = self.taffy.new_leaf(style)?;
        self.taffy.add_child(parent, id)?;
        self.elements.insert(id, Box::new(element));
        Ok(id)
    }

    /// Removes `node` and everything below it.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if !self.contains(node) {
            return Err(Error::UnknownElement(node));
        }

        let mut pending = vec![node];
        let mut doomed = Vec::new();
        while let Some(current) = pending.pop() {
            pending.extend(self.taffy.children(current)?);
            doomed.push(current);
        }

        for current in doomed {
            self.taffy.remove(current)?;
            self.elements.remove(&current);
            self.focus_manager.forget(current);
        }

        if self.body == Some(node) {
            self.body = None;
        }
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.elements.contains_key(&node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        self.taffy.parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        self.taffy.children(node).unwrap_or_default()
    }

    /// `node` followed by each of its ancestors, ending at the body.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(node).filter(|n| self.contains(*n));
        while let Some(n) = current {
            path.push(n);
            current = self.taffy.parent(n);
        }
        path
    }

    pub fn element(&self, node: NodeId) -> Option<&dyn Element> {
        self.elements.get(&node).map(|e| e.as_ref())
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut (dyn Element + 'static)> {
        self.elements.get_mut(&node).map(|e| e.as_mut())
    }

    pub fn set_style(&mut self, node: NodeId, style: Style) -> Result<()> {
        if !self.contains(node) {
            return Err(Error::UnknownElement(node));
        }
        self.taffy.set_style(node, style)?;
        Ok(())
    }

    pub fn compute_layout(&mut self, available_space: Size<AvailableSpace>) -> Result<()> {
        profile!("compute_layout");
        if let Some(body) = self.body {
            self.taffy.compute_layout(body, available_space)?;
        }
        Ok(())
    }

    /// Lays the tree out against the logical viewport size.
    pub fn layout_to_viewport(&mut self) -> Result<()> {
        self.compute_layout(Size {
            width: AvailableSpace::Definite(self.viewport.width),
            height: AvailableSpace::Definite(self.viewport.height),
        })
    }

    /// Absolute bounds from the most recent layout pass.
    pub fn bounds(&self, node: NodeId) -> Option<Rect> {
        if !self.contains(node) {
            return None;
        }
        let layout = self.taffy.layout(node).ok()?;
        let mut x = layout.location.x;
        let mut y = layout.location.y;

        let mut current = self.taffy.parent(node);
        while let Some(parent) = current {
            let parent_layout = self.taffy.layout(parent).ok()?;
            x += parent_layout.location.x;
            y += parent_layout.location.y;
            current = self.taffy.parent(parent);
        }

        Some(Rect::new(x, y, layout.size.width, layout.size.height))
    }

    /// The deepest, topmost element under the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<NodeId> {
        profile!("hit_test");
        let body = self.body?;
        hit_test_recursive(&self.taffy, body, x, y, 0.0, 0.0)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus_manager.focused().filter(|node| self.contains(*node))
    }

    /// Returns false when `node` is not part of the document.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        self.focus_manager.focus(node);
        true
    }

    pub fn focus_manager(&self) -> &FocusManager {
        &self.focus_manager
    }

    pub fn blur(&mut self) -> Option<NodeId> {
        self.focus_manager.clear()
    }

    pub fn cursor(&self) -> CursorType {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: CursorType) {
        self.cursor = cursor;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn width(&self) -> f32 {
        self.viewport.width
    }

    pub fn height(&self) -> f32 {
        self.viewport.height
    }

    pub fn screen_width(&self) -> f32 {
        self.viewport.screen_width
    }

    pub fn screen_height(&self) -> f32 {
        self.viewport.screen_height
    }

    /// Paints the body subtree, parents before children.
    pub fn paint(&self, ctx: &mut DrawContext<'_>) {
        if let Some(body) = self.body {
            self.paint_node(body, 0.0, 0.0, ctx);
        }
    }

    fn paint_node(&self, node: NodeId, offset_x: f32, offset_y: f32, ctx: &mut DrawContext<'_>) {
        let layout = match self.taffy.layout(node) {
            Ok(l) => l,
            Err(_) => return,
        };

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;
        let bounds = Rect::new(x, y, layout.size.width, layout.size.height);

        let element = self.elements.get(&node);
        if let Some(element) = element {
            let info = PaintInfo {
                bounds,
                focused: self.focus_manager.is_focused(node),
            };
            element.render(info, ctx);
        }

        let clips = element.is_some_and(|e| e.clips_children());
        if clips {
            ctx.renderer_mut().push_clip(bounds);
        }

        if let Ok(children) = self.taffy.children(node) {
            for child in children {
                self.paint_node(child, x, y, ctx);
            }
        }

        if clips {
            ctx.renderer_mut().pop_clip();
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("body", &self.body)
            .field("elements", &self.elements.len())
            .field("focused", &self.focus_manager.focused())
            .field("viewport", &self.viewport)
            .finish()
    }
}

fn hit_test_recursive(
    taffy: &TaffyTree,
    root: NodeId,
    x: f32,
    y: f32,
    abs_x: f32,
    abs_y: f32,
) -> Option<NodeId> {
    let layout = taffy.layout(root).ok()?;
    let left = abs_x + layout.location.x;
    let top = abs_y + layout.location.y;
    let bounds = Rect::new(left, top, layout.size.width, layout.size.height);

    if !bounds.contains(x, y) {
        return None;
    }

    if let Ok(children) = taffy.children(root) {
        // Later siblings paint on top, so they win the hit.
        for child in children.iter().rev() {
            if let Some(hit) = hit_test_recursive(taffy, *child, x, y, left, top) {
                return Some(hit);
            }
        }
    }
    Some(root)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adaptor::{NullAdaptor, share};
    use crate::dispatch::EventContext;
    use crate::event::Event;
    use crate::graphics::Color;
    use crate::renderer::Renderer;
    use std::cell::RefCell;
    use std::rc::Rc;
    use taffy::prelude::{FlexDirection, Size, Style, TaffyMaxContent, length};

    pub(crate) type Log = Rc<RefCell<Vec<String>>>;

    /// Records every event and paint call under its name.
    pub(crate) struct Spy {
        pub name: &'static str,
        pub log: Log,
        pub consume: bool,
        pub clip: bool,
    }

    impl Spy {
        pub fn new(name: &'static str, log: &Log) -> Self {
            Self { name, log: log.clone(), consume: false, clip: false }
        }

        pub fn consuming(mut self) -> Self {
            self.consume = true;
            self
        }
    }

    impl Element for Spy {
        fn handle_event(&mut self, event: &mut Event, _cx: &mut EventContext<'_>) {
            self.log.borrow_mut().push(format!("event:{}", self.name));
            if self.consume {
                event.consume();
            }
        }

        fn render(&self, info: PaintInfo, ctx: &mut DrawContext<'_>) {
            self.log.borrow_mut().push(format!("paint:{}", self.name));
            ctx.renderer_mut().fill_rect(info.bounds, Color::WHITE);
        }

        fn clips_children(&self) -> bool {
            self.clip
        }
    }

    pub(crate) fn sized(width: f32, height: f32) -> Style {
        Style {
            size: Size { width: length(width), height: length(height) },
            flex_shrink: 0.0,
            ..Style::default()
        }
    }

    /// body (100x100) > outer (50x50 at 10,10 via padding) > inner (20x20), plus a sibling.
    pub(crate) fn nested(log: &Log) -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc
            .set_body(
                Spy::new("body", log),
                Style {
                    padding: taffy::geometry::Rect {
                        left: length(10.0),
                        right: length(0.0),
                        top: length(10.0),
                        bottom: length(0.0),
                    },
                    ..sized(100.0, 100.0)
                },
            )
            .unwrap();
        let outer = doc.append(body, Spy::new("outer", log), sized(50.0, 50.0)).unwrap();
        let inner = doc.append(outer, Spy::new("inner", log), sized(20.0, 20.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();
        (doc, body, outer, inner)
    }

    #[test]
    fn bounds_and_hit_testing_follow_layout() {
        let log = Log::default();
        let (doc, body, outer, inner) = nested(&log);

        assert_eq!(doc.bounds(outer), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
        assert_eq!(doc.bounds(inner), Some(Rect::new(10.0, 10.0, 20.0, 20.0)));

        assert_eq!(doc.hit_test(15.0, 15.0), Some(inner));
        assert_eq!(doc.hit_test(45.0, 45.0), Some(outer));
        assert_eq!(doc.hit_test(90.0, 90.0), Some(body));
        assert_eq!(doc.hit_test(500.0, 5.0), None);
        assert_eq!(doc.ancestors(inner), vec![inner, outer, body]);
    }

    fn shared_edge_hit(direction: FlexDirection) -> (NodeId, NodeId, Option<NodeId>) {
        let log = Log::default();
        let mut doc = Document::new();
        let row = Style { flex_direction: direction, ..sized(20.0, 10.0) };
        let body = doc.set_body(Spy::new("body", &log), row).unwrap();
        let first = doc.append(body, Spy::new("first", &log), sized(10.0, 10.0)).unwrap();
        let second = doc.append(body, Spy::new("second", &log), sized(10.0, 10.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();
        (first, second, doc.hit_test(10.0, 5.0))
    }

    #[test]
    fn shared_edges_belong_to_the_right_hand_sibling() {
        let (_, second, hit) = shared_edge_hit(FlexDirection::Row);
        assert_eq!(hit, Some(second));

        let (first, _, hit) = shared_edge_hit(FlexDirection::RowReverse);
        assert_eq!(hit, Some(first));
    }

    #[test]
    fn remove_drops_subtree_and_focus() {
        let log = Log::default();
        let (mut doc, body, outer, inner) = nested(&log);

        assert!(doc.focus(inner));
        doc.remove(outer).unwrap();

        assert!(!doc.contains(outer));
        assert!(!doc.contains(inner));
        assert_eq!(doc.focused(), None);
        assert!(doc.children(body).is_empty());
        assert!(!doc.focus(inner));
        assert!(matches!(doc.remove(inner), Err(Error::UnknownElement(_))));
        assert!(matches!(
            doc.append(inner, Spy::new("late", &log), Style::default()),
            Err(Error::UnknownElement(_))
        ));
    }

    #[test]
    fn set_body_replaces_previous_tree() {
        let log = Log::default();
        let (mut doc, body, outer, _) = nested(&log);
        let fresh = doc.set_body(Spy::new("fresh", &log), Style::default()).unwrap();

        assert_eq!(doc.body(), Some(fresh));
        assert!(!doc.contains(body));
        assert!(!doc.contains(outer));
    }

    #[test]
    fn paint_is_preorder_with_balanced_clips() {
        let log = Log::default();
        let mut doc = Document::new();
        let mut body = Spy::new("body", &log);
        body.clip = true;
        let body = doc.set_body(body, sized(100.0, 100.0)).unwrap();
        let a = doc.append(body, Spy::new("a", &log), sized(10.0, 10.0)).unwrap();
        doc.append(a, Spy::new("a1", &log), sized(5.0, 5.0)).unwrap();
        doc.append(body, Spy::new("b", &log), sized(10.0, 10.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        let mut renderer = Renderer::new(share(NullAdaptor));
        let mut ctx = DrawContext::new(100.0, 100.0, 100.0, 100.0, &mut renderer);
        doc.paint(&mut ctx);

        assert_eq!(*log.borrow(), vec!["paint:body", "paint:a", "paint:a1", "paint:b"]);
        let commands = renderer.commands();
        assert!(matches!(commands[1], crate::graphics::DrawCommand::Clip { .. }));
        assert_eq!(commands.last(), Some(&crate::graphics::DrawCommand::PopClip));
    }

    #[test]
    fn viewport_scale() {
        let mut doc = Document::new();
        doc.set_viewport(Viewport::with_scale(400.0, 300.0, 2.0));
        assert_eq!(doc.width(), 400.0);
        assert_eq!(doc.screen_height(), 600.0);
    }
}
