//! Click-to-source resolution.
//!
//! `resolve_element_source` maps a file path plus a line/column hint to the
//! source text of the JSX element rendered there. Every invocation is
//! self-contained: it owns its allocator, parser and file handle, so requests
//! can run concurrently without coordination.

#[cfg(feature = "napi")]
use napi_derive::napi;
use log::{error, warn};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::config::LocatorOptions;
use crate::error::LocatorError;
use crate::extract::generate_element_source;
use crate::path_guard::validate_file_path;
use crate::position::{LineIndex, SourcePosition};
use crate::search::find_element_at_position;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST / RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateRequest {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    /// Opaque DOM snapshot echoed back on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_context: Option<serde_json::Value>,
}

impl LocatorResult {
    fn found(file_path: &str, source_text: String) -> Self {
        Self {
            success: true,
            file_path: Some(file_path.to_string()),
            source_text: Some(source_text),
            error: None,
            dom_context: None,
        }
    }

    fn failed(reason: String, dom_context: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            file_path: None,
            source_text: None,
            error: Some(reason),
            dom_context,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve the element at `line`/`column` of `file_path` (relative to the project root).
///
/// Never fails: validation problems, misses and internal faults all come back
/// as an unsuccessful result carrying `dom_context`. A match on a non-visual
/// component succeeds with empty source text.
pub fn resolve_element_source(
    file_path: &str,
    line: u32,
    column: u32,
    dom_context: Option<serde_json::Value>,
    options: &LocatorOptions,
) -> LocatorResult {
    let absolute = match validate_file_path(file_path, options) {
        Ok(path) => path,
        Err(e) => return LocatorResult::failed(e.reason(), dom_context),
    };

    let target = SourcePosition { line, column };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| locate(&absolute, target, options)))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(LocatorError::Generation(message))
        });

    match outcome {
        Ok(source_text) => LocatorResult::found(file_path, source_text),
        Err(e) => {
            if !e.is_expected() {
                error!("failed to extract code blocks from {}: {}", file_path, e);
            }
            LocatorResult::failed(e.reason(), dom_context)
        }
    }
}

pub fn resolve_request(request: LocateRequest, options: &LocatorOptions) -> LocatorResult {
    resolve_element_source(
        &request.file_path,
        request.line,
        request.column,
        request.dom_context,
        options,
    )
}

/// Resolve independent requests in parallel. Results keep the input order.
pub fn resolve_many(requests: Vec<LocateRequest>, options: &LocatorOptions) -> Vec<LocatorResult> {
    requests
        .into_par_iter()
        .map(|request| resolve_request(request, options))
        .collect()
}

fn locate(
    absolute: &Path,
    target: SourcePosition,
    options: &LocatorOptions,
) -> Result<String, LocatorError> {
    let source = fs::read_to_string(absolute).map_err(LocatorError::Read)?;

    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true);
    let ret = Parser::new(&allocator, &source, source_type).parse();

    if ret.panicked {
        let detail = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unrecoverable syntax error".to_string());
        return Err(LocatorError::Parse(detail));
    }

    if !ret.errors.is_empty() {
        // A file mid-edit still yields whatever the parser recovered.
        warn!(
            "{} parse error(s) in {}, searching the recovered tree: {:?}",
            ret.errors.len(),
            absolute.display(),
            ret.errors.first()
        );
    }

    let index = LineIndex::new(&source);
    let matched = find_element_at_position(&ret.program, &index, target, &options.tuning)
        .ok_or(LocatorError::NodeNotFound)?;

    if matched.blacklisted {
        return Ok(String::new());
    }

    generate_element_source(&allocator, &ret.program, matched.element_span)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BINDING
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn resolve_element_source_native(
    project_root: String,
    request: serde_json::Value,
) -> napi::Result<serde_json::Value> {
    let request: LocateRequest =
        serde_json::from_value(request).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let options = LocatorOptions::with_root(project_root);
    let result = resolve_request(request, &options);
    serde_json::to_value(result).map_err(|e| napi::Error::from_reason(e.to_string()))
}
