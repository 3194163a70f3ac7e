//! Snapshot of a selected element, sent to the embedding parent.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::PickerConfig;
use crate::page::Page;

/// Layout, box, colour and typography properties worth reporting.
pub const IMPORTANT_STYLES: [&str; 19] = [
    "display",
    "position",
    "flex-direction",
    "justify-content",
    "align-items",
    "width",
    "height",
    "padding",
    "margin",
    "border",
    "background-color",
    "color",
    "font-size",
    "font-weight",
    "font-family",
    "border-radius",
    "box-shadow",
    "gap",
    "grid-template-columns",
];

lazy_static! {
    static ref CLASS_SEPARATOR: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomContext {
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
    /// `tag#id` / `tag.class...:nth-of-type(n)` segments from the root down, joined by `" > "`.
    pub selector: String,
    pub attributes: IndexMap<String, String>,
    pub computed_styles: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

/// Build the context for `element`, or nothing at all when there is no element.
pub fn extract_dom_context<P: Page>(
    page: &P,
    element: Option<&P::Element>,
    config: &PickerConfig,
) -> Option<DomContext> {
    let element = element?;

    let text = page.text_content(element);
    let text = text.trim();
    let text_content = if !text.is_empty() && text.encode_utf16().count() < config.text_content_max_len {
        Some(text.to_string())
    } else {
        None
    };

    Some(DomContext {
        outer_html: page.outer_html(element),
        selector: selector_path(page, element, config.max_selector_depth),
        attributes: page.attributes(element).into_iter().collect(),
        computed_styles: computed_styles(page, element),
        text_content,
    })
}

/// CSS-like path from the root to `element`. Walking stops at the first
/// ancestor with an id, since ids are taken as unique, or after `max_depth` levels.
pub fn selector_path<P: Page>(page: &P, element: &P::Element, max_depth: usize) -> String {
    let mut path: Vec<String> = Vec::new();
    let mut current = Some(element.clone());
    let mut depth = 0;

    while let Some(node) = current {
        if depth >= max_depth {
            break;
        }

        let mut segment = page.tag_name(&node);

        if let Some(id) = page.attribute(&node, "id").filter(|id| !id.is_empty()) {
            segment.push('#');
            segment.push_str(&id);
            path.push(segment);
            break;
        }

        if let Some(class_name) = page.attribute(&node, "class") {
            let classes: Vec<&str> = CLASS_SEPARATOR
                .split(class_name.trim())
                .filter(|c| !c.is_empty())
                .collect();
            if !classes.is_empty() {
                segment.push('.');
                segment.push_str(&classes.join("."));
            }
        }

        let parent = page.parent_element(&node);
        if let Some(parent) = &parent {
            let tag = page.tag_name(&node);
            let same_type: Vec<P::Element> = page
                .child_elements(parent)
                .into_iter()
                .filter(|sibling| page.tag_name(sibling) == tag)
                .collect();
            if same_type.len() > 1 {
                if let Some(pos) = same_type.iter().position(|s| page.same_element(s, &node)) {
                    segment.push_str(&format!(":nth-of-type({})", pos + 1));
                }
            }
        }

        path.push(segment);
        current = parent;
        depth += 1;
    }

    path.reverse();
    path.join(" > ")
}

/// Allow-listed computed styles, skipping empty, `none` and `normal` values.
pub fn computed_styles<P: Page>(page: &P, element: &P::Element) -> IndexMap<String, String> {
    IMPORTANT_STYLES
        .iter()
        .filter_map(|property| {
            let value = page.computed_style(element, property)?;
            let value = value.trim();
            if value.is_empty() || value == "none" || value == "normal" {
                None
            } else {
                Some((property.to_string(), value.to_string()))
            }
        })
        .collect()
}
