//! # Selection Locator
//!
//! Two halves of the "click an element, open its source" pipeline for
//! embedded previews.
//!
//! ## Picker
//!
//! Runs against the previewed page ([`page::Page`]). While enabled it
//! highlights the element under the pointer and, on click, builds a
//! [`DomContext`] and posts it to the embedding parent, but only when the
//! parent origin is allow-listed. [`route_restore`] keeps the frame on the
//! same route across reloads.
//!
//! ## Locator
//!
//! Runs with file-system access. Given `filePath`, `line` and `column` it:
//!
//! 1. Validates the path against the project root and excluded directories.
//! 2. Parses the file with error recovery (JSX + TypeScript).
//! 3. Finds the JSX element that best matches the position:
//!    exact (same line, column ±1) short-circuits; otherwise the closest
//!    same-line or enclosing element within threshold (50 same-line, 500
//!    multi-line with a 100-per-line penalty).
//! 4. Returns nothing for pseudo-components (`Helmet`, `title`, ...).
//! 5. Regenerates source text for the matched element.
//!
//! [`resolve_element_source`] never fails: every outcome is a
//! [`LocatorResult`].

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod config;
pub mod error;

mod blacklist;
mod extract;
mod locator;
mod path_guard;
mod position;
mod search;

pub mod dom_context;
pub mod messages;
pub mod origin;
pub mod page;
pub mod picker;
pub mod provenance;
pub mod route_restore;
pub mod static_page;

#[cfg(test)]
mod dom_context_tests;

pub use config::{LocatorOptions, MatchTuning, PickerConfig, RouteRestoreConfig};
pub use error::LocatorError;

// Locator API
pub use blacklist::is_blacklisted_tag;
pub use extract::{generate_element_source, generate_with_source_map, GeneratedSource};
pub use locator::{resolve_element_source, resolve_many, resolve_request, LocateRequest, LocatorResult};
pub use path_guard::validate_file_path;
pub use position::{LineIndex, SourcePosition};
pub use search::{find_element_at_position, MatchKind, MatchedNode};

#[cfg(feature = "napi")]
pub use locator::resolve_element_source_native;

// Picker API
pub use dom_context::{extract_dom_context, DomContext};
pub use picker::{EventDisposition, InputEvent, Selection, SelectionSession};
pub use route_restore::{RestoreOutcome, RouteHost, RouteRestorer};
pub use static_page::StaticPage;

#[cfg(feature = "napi")]
#[napi]
pub fn locator_bridge() -> String {
    "Selection Locator Native Bridge Connected".to_string()
}
