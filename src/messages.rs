//! Cross-frame message shapes.

use serde::Serialize;

use crate::dom_context::DomContext;

pub const MESSAGE_TYPE_ENABLE_SELECTION_MODE: &str = "enableSelectionMode";
pub const MESSAGE_TYPE_DISABLE_SELECTION_MODE: &str = "disableSelectionMode";
pub const MESSAGE_TYPE_REDIRECT_HOME: &str = "redirect-home";

/// Messages a page reacts to. Only the `type` field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage {
    EnableSelectionMode,
    DisableSelectionMode,
    RedirectHome,
}

impl InboundMessage {
    /// Classify arbitrary message data; anything unrecognised is `None`.
    pub fn from_data(data: &serde_json::Value) -> Option<Self> {
        match data.get("type")?.as_str()? {
            MESSAGE_TYPE_ENABLE_SELECTION_MODE => Some(Self::EnableSelectionMode),
            MESSAGE_TYPE_DISABLE_SELECTION_MODE => Some(Self::DisableSelectionMode),
            MESSAGE_TYPE_REDIRECT_HOME => Some(Self::RedirectHome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSelectedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub dom_context: DomContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    #[serde(rename = "elementSelected")]
    ElementSelected(ElementSelectedPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteChanged {
    pub message: &'static str,
    pub route: String,
}

impl RouteChanged {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            message: "route-changed",
            route: route.into(),
        }
    }
}
