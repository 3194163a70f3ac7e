//! In-memory host page backed by an html5ever document.
//!
//! There is no layout engine: element boxes, computed styles, scroll offset
//! and framing information are assigned by the caller. Hit-testing returns
//! the most recently laid-out connected element containing the point.
//! Posted messages are collected in an outbox.

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_document, Attribute, LocalName, QualName};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle, WeakHandle};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;
use tendril::StrTendril;

use crate::page::{InputListener, Page, Point, Rect};
use crate::provenance::{DebugMetadata, DebugSource, FiberId};

lazy_static! {
    static ref STYLE_DECLARATION: Regex = Regex::new(r"([A-Za-z-]+)\s*:\s*([^;]*)").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub data: serde_json::Value,
    pub target_origin: String,
}

struct FiberRecord {
    source: Option<DebugSource>,
    parent: Option<FiberId>,
}

#[derive(Default)]
struct FiberTable {
    attached: Vec<(WeakHandle, FiberId)>,
    records: Vec<FiberRecord>,
}

impl DebugMetadata<Handle> for FiberTable {
    fn fiber_of(&self, element: &Handle) -> Option<FiberId> {
        self.attached
            .iter()
            .find(|(weak, _)| weak.upgrade().is_some_and(|h| Rc::ptr_eq(&h, element)))
            .map(|(_, fiber)| *fiber)
    }

    fn debug_source(&self, fiber: FiberId) -> Option<DebugSource> {
        self.records.get(fiber.0 as usize)?.source.clone()
    }

    fn return_fiber(&self, fiber: FiberId) -> Option<FiberId> {
        self.records.get(fiber.0 as usize)?.parent
    }
}

pub struct StaticPage {
    dom: RcDom,
    layout: Vec<(WeakHandle, Rect)>,
    computed: Vec<(WeakHandle, IndexMap<String, String>)>,
    scroll: Point,
    ancestor_origins: Vec<String>,
    referrer: Option<String>,
    listeners: HashSet<InputListener>,
    outbox: Vec<PostedMessage>,
    fibers: FiberTable,
}

impl StaticPage {
    pub fn parse(html: &str) -> io::Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        Ok(Self {
            dom,
            layout: Vec::new(),
            computed: Vec::new(),
            scroll: Point::default(),
            ancestor_origins: Vec::new(),
            referrer: None,
            listeners: HashSet::new(),
            outbox: Vec::new(),
            fibers: FiberTable::default(),
        })
    }

    // ── fixtures ─────────────────────────────────────────────────────────────

    /// Give `element` a viewport-relative box. Later boxes sit on top of earlier ones.
    pub fn set_layout(&mut self, element: &Handle, rect: Rect) {
        self.layout.retain(|(weak, _)| !points_to(weak, element));
        self.layout.push((Rc::downgrade(element), rect));
    }

    pub fn set_computed_style(&mut self, element: &Handle, property: &str, value: &str) {
        match self.computed.iter_mut().find(|(weak, _)| points_to(weak, element)) {
            Some((_, styles)) => {
                styles.insert(property.to_string(), value.to_string());
            }
            None => {
                let mut styles = IndexMap::new();
                styles.insert(property.to_string(), value.to_string());
                self.computed.push((Rc::downgrade(element), styles));
            }
        }
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    pub fn set_ancestor_origins(&mut self, origins: Vec<String>) {
        self.ancestor_origins = origins;
    }

    pub fn set_referrer(&mut self, referrer: Option<String>) {
        self.referrer = referrer;
    }

    pub fn add_fiber(&mut self, source: Option<DebugSource>, parent: Option<FiberId>) -> FiberId {
        let id = FiberId(self.fibers.records.len() as u64);
        self.fibers.records.push(FiberRecord { source, parent });
        id
    }

    pub fn attach_fiber(&mut self, element: &Handle, fiber: FiberId) {
        self.fibers.attached.push((Rc::downgrade(element), fiber));
    }

    // ── inspection ───────────────────────────────────────────────────────────

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// First element with this tag name, in document order.
    pub fn first_by_tag(&self, tag: &str) -> Option<Handle> {
        elements(&self.dom.document)
            .into_iter()
            .find(|el| element_name(el).as_deref() == Some(tag))
    }

    pub fn is_listening(&self, listener: InputListener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn outbox(&self) -> &[PostedMessage] {
        &self.outbox
    }

    pub fn inline_style(&self, element: &Handle, property: &str) -> Option<String> {
        let style = self.attribute(element, "style")?;
        parse_inline_style(&style).shift_remove(property)
    }

    pub fn body_style(&self, property: &str) -> Option<String> {
        let body = self.first_by_tag("body")?;
        self.inline_style(&body, property)
    }

    /// Geometry of a visible overlay, `None` if missing or hidden.
    pub fn overlay_geometry(&self, id: &str) -> Option<Rect> {
        let overlay = self.get_element_by_id(id)?;
        if self.inline_style(&overlay, "display").as_deref() != Some("block") {
            return None;
        }
        let px = |property: &str| -> Option<f64> {
            self.inline_style(&overlay, property)?
                .trim_end_matches("px")
                .parse()
                .ok()
        };
        Some(Rect::new(px("left")?, px("top")?, px("width")?, px("height")?))
    }

    fn update_inline_style(&mut self, element: &Handle, updates: &[(&str, &str)]) {
        let mut styles = self
            .attribute(element, "style")
            .map(|s| parse_inline_style(&s))
            .unwrap_or_default();
        for (property, value) in updates {
            if value.is_empty() {
                styles.shift_remove(*property);
            } else {
                styles.insert(property.to_string(), value.to_string());
            }
        }
        if styles.is_empty() {
            self.remove_attribute(element, "style");
        } else {
            let serialized = styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attribute(element, "style", &serialized);
        }
    }
}

impl Page for StaticPage {
    type Element = Handle;
    type WeakElement = WeakHandle;

    fn downgrade(&self, element: &Handle) -> WeakHandle {
        Rc::downgrade(element)
    }

    fn upgrade(&self, handle: &WeakHandle) -> Option<Handle> {
        handle.upgrade().filter(is_connected)
    }

    fn same_element(&self, a: &Handle, b: &Handle) -> bool {
        Rc::ptr_eq(a, b)
    }

    fn element_from_point(&self, point: Point) -> Option<Handle> {
        self.layout
            .iter()
            .rev()
            .filter(|(_, rect)| rect.contains(point))
            .find_map(|(weak, _)| weak.upgrade().filter(is_connected))
    }

    fn bounding_client_rect(&self, element: &Handle) -> Rect {
        self.layout
            .iter()
            .find(|(weak, _)| points_to(weak, element))
            .map(|(_, rect)| *rect)
            .unwrap_or_default()
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn computed_style(&self, element: &Handle, property: &str) -> Option<String> {
        self.computed
            .iter()
            .find(|(weak, _)| points_to(weak, element))
            .and_then(|(_, styles)| styles.get(property).cloned())
            .or_else(|| self.inline_style(element, property))
    }

    fn tag_name(&self, element: &Handle) -> String {
        element_name(element).unwrap_or_default().to_lowercase()
    }

    fn attribute(&self, element: &Handle, name: &str) -> Option<String> {
        match &element.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    fn attributes(&self, element: &Handle) -> Vec<(String, String)> {
        match &element.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn parent_element(&self, element: &Handle) -> Option<Handle> {
        parent_of(element).filter(|p| matches!(p.data, NodeData::Element { .. }))
    }

    fn child_elements(&self, element: &Handle) -> Vec<Handle> {
        element
            .children
            .borrow()
            .iter()
            .filter(|c| matches!(c.data, NodeData::Element { .. }))
            .cloned()
            .collect()
    }

    fn get_element_by_id(&self, id: &str) -> Option<Handle> {
        elements(&self.dom.document)
            .into_iter()
            .find(|el| self.attribute(el, "id").as_deref() == Some(id))
    }

    fn outer_html(&self, element: &Handle) -> String {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        let handle = SerializableHandle::from(element.clone());
        if serialize(&mut buf, &handle, opts).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }

    fn text_content(&self, element: &Handle) -> String {
        let mut out = String::new();
        collect_text(element, &mut out);
        out
    }

    fn set_attribute(&mut self, element: &Handle, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &element.data {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|a| &*a.name.local == name) {
                Some(attr) => attr.value = StrTendril::from_slice(value),
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(name)),
                    value: StrTendril::from_slice(value),
                }),
            }
        }
    }

    fn remove_attribute(&mut self, element: &Handle, name: &str) {
        if let NodeData::Element { attrs, .. } = &element.data {
            attrs.borrow_mut().retain(|a| &*a.name.local != name);
        }
    }

    fn set_body_style(&mut self, property: &str, value: &str) {
        if let Some(body) = self.first_by_tag("body") {
            self.update_inline_style(&body, &[(property, value)]);
        }
    }

    fn ensure_stylesheet(&mut self, id: &str, css: &str) {
        if self.get_element_by_id(id).is_some() {
            return;
        }
        let Some(container) = self.first_by_tag("head").or_else(|| self.first_by_tag("body")) else {
            return;
        };
        let style = new_element("style", &[("id", id)]);
        append_child(
            &style,
            Node::new(NodeData::Text {
                contents: RefCell::new(StrTendril::from_slice(css)),
            }),
        );
        append_child(&container, style);
    }

    fn create_overlay(&mut self, id: &str) -> Handle {
        let overlay = new_element("div", &[("id", id)]);
        if let Some(body) = self.first_by_tag("body") {
            append_child(&body, overlay.clone());
        }
        overlay
    }

    fn set_overlay_geometry(&mut self, overlay: &Handle, geometry: Option<Rect>) {
        match geometry {
            Some(rect) => {
                let left = format!("{}px", rect.left);
                let top = format!("{}px", rect.top);
                let width = format!("{}px", rect.width);
                let height = format!("{}px", rect.height);
                self.update_inline_style(
                    overlay,
                    &[
                        ("left", left.as_str()),
                        ("top", top.as_str()),
                        ("width", width.as_str()),
                        ("height", height.as_str()),
                        ("display", "block"),
                    ],
                );
            }
            None => self.update_inline_style(overlay, &[("display", "none")]),
        }
    }

    fn remove_element(&mut self, element: &Handle) {
        if let Some(parent) = parent_of(element) {
            parent.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, element));
        }
        element.parent.set(None);
    }

    fn add_capture_listener(&mut self, listener: InputListener) {
        self.listeners.insert(listener);
    }

    fn remove_capture_listener(&mut self, listener: InputListener) {
        self.listeners.remove(&listener);
    }

    fn ancestor_origins(&self) -> Vec<String> {
        self.ancestor_origins.clone()
    }

    fn referrer(&self) -> Option<String> {
        self.referrer.clone()
    }

    fn post_to_parent(&mut self, message: serde_json::Value, target_origin: &str) {
        self.outbox.push(PostedMessage {
            data: message,
            target_origin: target_origin.to_string(),
        });
    }

    fn debug_metadata(&self) -> Option<&dyn DebugMetadata<Handle>> {
        if self.fibers.records.is_empty() {
            None
        } else {
            Some(&self.fibers)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn points_to(weak: &WeakHandle, element: &Handle) -> bool {
    weak.upgrade().is_some_and(|h| Rc::ptr_eq(&h, element))
}

fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

fn is_connected(node: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if matches!(current.data, NodeData::Document) {
            return true;
        }
        match parent_of(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Element descendants of `root` in document order.
fn elements(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if matches!(node.data, NodeData::Element { .. }) {
            out.push(node.clone());
        }
        for child in node.children.borrow().iter().rev() {
            stack.push(child.clone());
        }
    }
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

fn new_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(
            attrs
                .iter()
                .map(|(name, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(*name)),
                    value: StrTendril::from_slice(value),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

fn parse_inline_style(style: &str) -> IndexMap<String, String> {
    STYLE_DECLARATION
        .captures_iter(style)
        .map(|cap| (cap[1].trim().to_lowercase(), cap[2].trim().to_string()))
        .filter(|(_, v)| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_query() {
        let page = StaticPage::parse(
            r#"<html><body><div id="root"><p class="a b">Hello <b>world</b></p></div></body></html>"#,
        )
        .unwrap();
        let p = page.first_by_tag("p").unwrap();
        assert_eq!(page.tag_name(&p), "p");
        assert_eq!(page.attribute(&p, "class").as_deref(), Some("a b"));
        assert_eq!(page.text_content(&p), "Hello world");
        assert_eq!(page.outer_html(&p), r#"<p class="a b">Hello <b>world</b></p>"#);
        let root = page.get_element_by_id("root").unwrap();
        assert!(page.same_element(&page.parent_element(&p).unwrap(), &root));
    }

    #[test]
    fn test_hit_testing_prefers_latest_layout() {
        let mut page =
            StaticPage::parse("<body><div id=\"outer\"><span id=\"inner\">x</span></div></body>").unwrap();
        let outer = page.get_element_by_id("outer").unwrap();
        let inner = page.get_element_by_id("inner").unwrap();
        page.set_layout(&outer, Rect::new(0.0, 0.0, 100.0, 100.0));
        page.set_layout(&inner, Rect::new(10.0, 10.0, 20.0, 20.0));

        let hit = page.element_from_point(Point::new(15.0, 15.0)).unwrap();
        assert!(Rc::ptr_eq(&hit, &inner));
        let hit = page.element_from_point(Point::new(50.0, 50.0)).unwrap();
        assert!(Rc::ptr_eq(&hit, &outer));
        assert!(page.element_from_point(Point::new(500.0, 5.0)).is_none());
    }

    #[test]
    fn test_removed_elements_are_not_hit_or_upgraded() {
        let mut page = StaticPage::parse("<body><div id=\"a\"></div></body>").unwrap();
        let a = page.get_element_by_id("a").unwrap();
        page.set_layout(&a, Rect::new(0.0, 0.0, 10.0, 10.0));
        let weak = page.downgrade(&a);
        page.remove_element(&a);
        assert!(page.element_from_point(Point::new(1.0, 1.0)).is_none());
        assert!(page.upgrade(&weak).is_none());
    }

    #[test]
    fn test_inline_style_round_trip() {
        let mut page = StaticPage::parse("<body style=\"color: red\"></body>").unwrap();
        page.set_body_style("user-select", "none");
        assert_eq!(page.body_style("user-select").as_deref(), Some("none"));
        assert_eq!(page.body_style("color").as_deref(), Some("red"));
        page.set_body_style("user-select", "");
        assert_eq!(page.body_style("user-select"), None);
    }

    #[test]
    fn test_stylesheet_inserted_once() {
        let mut page = StaticPage::parse("<html><head></head><body></body></html>").unwrap();
        page.ensure_stylesheet("s", "a{}");
        page.ensure_stylesheet("s", "b{}");
        let head = page.first_by_tag("head").unwrap();
        assert_eq!(page.child_elements(&head).len(), 1);
        assert_eq!(page.text_content(&head), "a{}");
    }
}
