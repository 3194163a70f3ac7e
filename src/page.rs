//! Host page abstraction the picker is written against.
//!
//! The page owns every element. The picker holds strong handles only to the
//! two overlays it creates; everything else it remembers through
//! [`Page::WeakElement`] and re-resolves before use.

use serde::{Deserialize, Serialize};

use crate::provenance::DebugMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Box in CSS pixels. Client rects are viewport-relative; overlay geometry is document-relative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn translate(&self, offset: Point) -> Rect {
        Rect {
            left: self.left + offset.x,
            top: self.top + offset.y,
            ..*self
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.left + self.width
            && point.y >= self.top
            && point.y < self.top + self.height
    }
}

/// Document-level listeners the picker installs, all in capture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputListener {
    PointerMove,
    TouchStart,
    Click,
    PointerLeave,
}

pub const CAPTURE_LISTENERS: [InputListener; 4] = [
    InputListener::PointerMove,
    InputListener::TouchStart,
    InputListener::Click,
    InputListener::PointerLeave,
];

pub trait Page {
    type Element: Clone;
    type WeakElement: Clone;

    fn downgrade(&self, element: &Self::Element) -> Self::WeakElement;
    fn upgrade(&self, handle: &Self::WeakElement) -> Option<Self::Element>;
    fn same_element(&self, a: &Self::Element, b: &Self::Element) -> bool;

    // ── layout ───────────────────────────────────────────────────────────────

    /// Topmost element under a viewport point, if any.
    fn element_from_point(&self, point: Point) -> Option<Self::Element>;
    fn bounding_client_rect(&self, element: &Self::Element) -> Rect;
    fn scroll_offset(&self) -> Point;
    /// Resolved value of a CSS property, `None` or empty when unset.
    fn computed_style(&self, element: &Self::Element, property: &str) -> Option<String>;

    // ── structure ────────────────────────────────────────────────────────────

    /// Lowercase node name.
    fn tag_name(&self, element: &Self::Element) -> String;
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    /// All attributes in document order.
    fn attributes(&self, element: &Self::Element) -> Vec<(String, String)>;
    fn parent_element(&self, element: &Self::Element) -> Option<Self::Element>;
    fn child_elements(&self, element: &Self::Element) -> Vec<Self::Element>;
    fn get_element_by_id(&self, id: &str) -> Option<Self::Element>;
    fn outer_html(&self, element: &Self::Element) -> String;
    fn text_content(&self, element: &Self::Element) -> String;

    // ── mutation ─────────────────────────────────────────────────────────────

    fn set_attribute(&mut self, element: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&mut self, element: &Self::Element, name: &str);
    /// Set an inline style property on `<body>`; an empty value removes it.
    fn set_body_style(&mut self, property: &str, value: &str);
    /// Insert a `<style>` with this id into `<head>` unless one already exists.
    fn ensure_stylesheet(&mut self, id: &str, css: &str);
    /// Create an empty `<div id=..>` appended to `<body>`.
    fn create_overlay(&mut self, id: &str) -> Self::Element;
    /// Position and show an overlay, or hide it with `None`.
    fn set_overlay_geometry(&mut self, overlay: &Self::Element, geometry: Option<Rect>);
    fn remove_element(&mut self, element: &Self::Element);

    // ── events ───────────────────────────────────────────────────────────────

    fn add_capture_listener(&mut self, listener: InputListener);
    fn remove_capture_listener(&mut self, listener: InputListener);

    // ── framing ──────────────────────────────────────────────────────────────

    /// Origins of the embedding frames, nearest first. Empty when unsupported.
    fn ancestor_origins(&self) -> Vec<String>;
    fn referrer(&self) -> Option<String>;
    fn post_to_parent(&mut self, message: serde_json::Value, target_origin: &str);

    /// Framework debug metadata, when the host runtime exposes any.
    fn debug_metadata(&self) -> Option<&dyn DebugMetadata<Self::Element>> {
        None
    }
}
