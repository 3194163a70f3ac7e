//! Selection mode: hover highlighting and click-to-select inside an embedded page.
//!
//! A [`SelectionSession`] is either disabled or active. All state that exists
//! only while active (tracked elements, the two overlays) lives in
//! [`ActiveState`], created on enable and dropped on disable, so a disabled
//! session holds nothing of the page. Handlers receive the page by reference;
//! the session never reaches for ambient globals.

use log::{debug, trace};

use crate::config::PickerConfig;
use crate::dom_context::{extract_dom_context, DomContext};
use crate::messages::{ElementSelectedPayload, InboundMessage, OutboundMessage};
use crate::origin::OriginPolicy;
use crate::page::{Page, Point, Rect, CAPTURE_LISTENERS};
use crate::provenance::{source_file_for, strip_deployment_prefix};

pub const STYLESHEET_ID: &str = "selection-mode-styles";
pub const HOVER_OVERLAY_ID: &str = "selection-mode-overlay";
pub const SELECTED_OVERLAY_ID: &str = "selection-mode-selected-overlay";

/// Input the page forwards while listeners are installed.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove(Point),
    /// Current touch points; only the first is used.
    TouchStart(Vec<Point>),
    Click(Point),
    PointerLeave,
}

/// What the page should do with the event after the handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Continue,
    /// Prevent the default action and stop all further propagation.
    Intercepted,
}

/// Result of a completed selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub dom_context: DomContext,
    pub file_path: Option<String>,
    /// Origin the selection was posted to, if any.
    pub notified_origin: Option<String>,
}

struct ActiveState<P: Page> {
    hovered: Option<P::WeakElement>,
    selected: Option<P::WeakElement>,
    hover_overlay: Option<P::Element>,
    selected_overlay: Option<P::Element>,
}

impl<P: Page> Default for ActiveState<P> {
    fn default() -> Self {
        Self {
            hovered: None,
            selected: None,
            hover_overlay: None,
            selected_overlay: None,
        }
    }
}

pub struct SelectionSession<P: Page> {
    config: PickerConfig,
    policy: OriginPolicy,
    active: Option<ActiveState<P>>,
    last_selection: Option<Selection>,
}

impl<P: Page> SelectionSession<P> {
    pub fn new(config: PickerConfig) -> Self {
        let policy = OriginPolicy::new(config.allowed_parent_origins.iter().cloned());
        Self {
            config,
            policy,
            active: None,
            last_selection: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn hovered_element(&self, page: &P) -> Option<P::Element> {
        let handle = self.active.as_ref()?.hovered.as_ref()?;
        page.upgrade(handle)
    }

    pub fn selected_element(&self, page: &P) -> Option<P::Element> {
        let handle = self.active.as_ref()?.selected.as_ref()?;
        page.upgrade(handle)
    }

    pub fn last_selection(&self) -> Option<&Selection> {
        self.last_selection.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════════

    /// React to a cross-frame message from any origin. Only the toggles are handled.
    pub fn handle_message(&mut self, page: &mut P, data: &serde_json::Value) {
        match InboundMessage::from_data(data) {
            Some(InboundMessage::EnableSelectionMode) => self.enable(page),
            Some(InboundMessage::DisableSelectionMode) => self.disable(page),
            _ => {}
        }
    }

    pub fn enable(&mut self, page: &mut P) {
        if self.active.is_some() {
            return;
        }
        debug!("selection mode enabled");

        let mut state = ActiveState::default();
        if let Some(root) = page.get_element_by_id(&self.config.root_element_id) {
            page.set_attribute(&root, &self.config.enabled_attribute, "true");
        }
        page.set_body_style("user-select", "none");
        self.ensure_overlay(page, &mut state.hover_overlay, HOVER_OVERLAY_ID);
        for listener in CAPTURE_LISTENERS {
            page.add_capture_listener(listener);
        }
        self.active = Some(state);
    }

    pub fn disable(&mut self, page: &mut P) {
        let Some(mut state) = self.active.take() else {
            return;
        };
        debug!("selection mode disabled");

        if let Some(root) = page.get_element_by_id(&self.config.root_element_id) {
            page.remove_attribute(&root, &self.config.enabled_attribute);
        }
        page.set_body_style("user-select", "");
        if let Some(overlay) = state.hover_overlay.take() {
            page.set_overlay_geometry(&overlay, None);
            page.remove_element(&overlay);
        }
        if let Some(overlay) = state.selected_overlay.take() {
            page.remove_element(&overlay);
        }
        for listener in CAPTURE_LISTENERS {
            page.remove_capture_listener(listener);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // INPUT HANDLERS
    // ═══════════════════════════════════════════════════════════════════════════════

    pub fn handle_input(&mut self, page: &mut P, event: &InputEvent) -> EventDisposition {
        match event {
            InputEvent::PointerMove(point) => self.on_pointer_move(page, *point),
            InputEvent::TouchStart(touches) => self.on_touch_start(page, touches),
            InputEvent::Click(point) => return self.on_click(page, *point),
            InputEvent::PointerLeave => self.on_pointer_leave(page),
        }
        EventDisposition::Continue
    }

    pub fn on_pointer_move(&mut self, page: &mut P, point: Point) {
        if self.active.is_none() {
            return;
        }

        let Some(element) = page.element_from_point(point) else {
            trace!("nothing under pointer");
            self.hide_hover(page);
            self.set_hovered(page, None);
            return;
        };

        if self.is_overlay(page, &element) {
            return;
        }

        let unchanged = self
            .hovered_element(page)
            .is_some_and(|current| page.same_element(&current, &element));
        if !unchanged {
            self.set_hovered(page, Some(&element));
            self.show_hover(page, &element);
        }
    }

    pub fn on_touch_start(&mut self, page: &mut P, touches: &[Point]) {
        if self.active.is_none() {
            return;
        }
        let Some(touch) = touches.first() else {
            return;
        };

        let Some(element) = page.element_from_point(*touch) else {
            self.set_hovered(page, None);
            return;
        };

        if self.is_overlay(page, &element) {
            return;
        }

        self.set_hovered(page, Some(&element));
        self.show_hover(page, &element);
    }

    pub fn on_click(&mut self, page: &mut P, point: Point) -> EventDisposition {
        if self.active.is_none() {
            return EventDisposition::Continue;
        }

        let element = match self.hovered_element(page) {
            Some(element) => element,
            None => {
                let Some(hit) = page.element_from_point(point) else {
                    return EventDisposition::Continue;
                };
                if self.is_overlay(page, &hit) {
                    return EventDisposition::Continue;
                }
                self.set_hovered(page, Some(&hit));
                hit
            }
        };

        let Some(dom_context) = extract_dom_context(page, Some(&element), &self.config) else {
            return EventDisposition::Intercepted;
        };

        let handle = page.downgrade(&element);
        if let Some(state) = self.active.as_mut() {
            state.selected = Some(handle);
        }
        self.show_selected(page, &element);

        let file_path = page
            .debug_metadata()
            .and_then(|metadata| source_file_for(metadata, &element))
            .map(|path| strip_deployment_prefix(&path, &self.config.deployment_marker));

        let referrer = page.referrer();
        let notified_origin = self
            .policy
            .trusted_parent(&page.ancestor_origins(), referrer.as_deref());

        match &notified_origin {
            Some(origin) => {
                let message = OutboundMessage::ElementSelected(ElementSelectedPayload {
                    file_path: file_path.clone(),
                    dom_context: dom_context.clone(),
                });
                match serde_json::to_value(&message) {
                    Ok(value) => page.post_to_parent(value, origin),
                    Err(e) => debug!("could not encode selection message: {}", e),
                }
            }
            None => debug!("parent origin not allow-listed, selection kept local"),
        }

        self.last_selection = Some(Selection {
            dom_context,
            file_path,
            notified_origin,
        });
        EventDisposition::Intercepted
    }

    pub fn on_pointer_leave(&mut self, page: &mut P) {
        if self.active.is_none() {
            return;
        }
        self.hide_hover(page);
        self.set_hovered(page, None);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // OVERLAYS
    // ═══════════════════════════════════════════════════════════════════════════════

    fn overlay_css(&self) -> String {
        let color = &self.config.highlight_color;
        format!(
            "#{HOVER_OVERLAY_ID} {{ position: absolute; border: 2px dashed {color}; pointer-events: none; z-index: 999999; }}\n\
             #{SELECTED_OVERLAY_ID} {{ position: absolute; border: 3px solid {color}; pointer-events: none; z-index: 999998; }}"
        )
    }

    fn ensure_overlay(&self, page: &mut P, slot: &mut Option<P::Element>, id: &str) -> P::Element {
        if let Some(existing) = slot {
            return existing.clone();
        }
        page.ensure_stylesheet(STYLESHEET_ID, &self.overlay_css());
        let overlay = page.create_overlay(id);
        *slot = Some(overlay.clone());
        overlay
    }

    /// Overlay box for an element: its client rect moved into document coordinates.
    fn geometry_for(page: &P, element: &P::Element) -> Rect {
        page.bounding_client_rect(element).translate(page.scroll_offset())
    }

    fn show_hover(&mut self, page: &mut P, element: &P::Element) {
        let geometry = Self::geometry_for(page, element);
        let Some(mut state) = self.active.take() else {
            return;
        };
        let overlay = self.ensure_overlay(page, &mut state.hover_overlay, HOVER_OVERLAY_ID);
        page.set_overlay_geometry(&overlay, Some(geometry));
        self.active = Some(state);
    }

    fn show_selected(&mut self, page: &mut P, element: &P::Element) {
        let geometry = Self::geometry_for(page, element);
        let Some(mut state) = self.active.take() else {
            return;
        };
        let overlay = self.ensure_overlay(page, &mut state.selected_overlay, SELECTED_OVERLAY_ID);
        page.set_overlay_geometry(&overlay, Some(geometry));
        self.active = Some(state);
    }

    fn hide_hover(&self, page: &mut P) {
        if let Some(overlay) = self.active.as_ref().and_then(|s| s.hover_overlay.as_ref()) {
            page.set_overlay_geometry(overlay, None);
        }
    }

    fn is_overlay(&self, page: &P, element: &P::Element) -> bool {
        let Some(state) = self.active.as_ref() else {
            return false;
        };
        [&state.hover_overlay, &state.selected_overlay]
            .into_iter()
            .flatten()
            .any(|overlay| page.same_element(overlay, element))
    }

    fn set_hovered(&mut self, page: &P, element: Option<&P::Element>) {
        let handle = element.map(|e| page.downgrade(e));
        if let Some(state) = self.active.as_mut() {
            state.hovered = handle;
        }
    }
}
