//! Nearest-match search for the JSX element at a source position.
//!
//! Rules, in order of authority:
//! 1. An opening tag on the target line within `column_tolerance` columns is
//!    an exact match and ends the search.
//! 2. Otherwise every element whose span covers the target line is a
//!    candidate. An opening tag on the target line scores its column delta;
//!    one that starts above scores `line_delta * line_penalty`.
//! 3. The closest candidate wins if it is within the threshold for its kind
//!    (see [`MatchTuning::threshold_for`]). Ties keep the first candidate in
//!    traversal order.

use log::debug;
use oxc_ast::ast::{JSXElement, Program};
use oxc_ast_visit::{walk, Visit};
use oxc_span::Span;

use crate::blacklist::{is_blacklisted, resolve_tag_name};
use crate::config::MatchTuning;
use crate::position::{LineIndex, SourcePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    SameLine,
    Enclosing,
}

/// The opening tag picked for a position, with enough to find its element again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedNode {
    pub kind: MatchKind,
    pub distance: u32,
    /// Start of the opening tag.
    pub start: SourcePosition,
    pub opening_span: Span,
    /// Span of the enclosing element, closing tag included.
    pub element_span: Span,
    pub tag_name: Option<String>,
    pub blacklisted: bool,
}

pub fn find_element_at_position(
    program: &Program<'_>,
    index: &LineIndex<'_>,
    target: SourcePosition,
    tuning: &MatchTuning,
) -> Option<MatchedNode> {
    let mut search = ElementSearch {
        index,
        target,
        tuning,
        exact: None,
        closest: None,
    };
    search.visit_program(program);
    search.finish()
}

struct ElementSearch<'i, 's> {
    index: &'i LineIndex<'s>,
    target: SourcePosition,
    tuning: &'i MatchTuning,
    exact: Option<MatchedNode>,
    closest: Option<MatchedNode>,
}

impl ElementSearch<'_, '_> {
    fn candidate(&self, element: &JSXElement<'_>, kind: MatchKind, distance: u32) -> MatchedNode {
        let opening = &element.opening_element;
        MatchedNode {
            kind,
            distance,
            start: self.index.position(opening.span.start),
            opening_span: opening.span,
            element_span: element.span,
            tag_name: resolve_tag_name(&opening.name).map(str::to_string),
            blacklisted: is_blacklisted(&opening.name),
        }
    }

    fn offer(&mut self, element: &JSXElement<'_>, kind: MatchKind, distance: u32) {
        let closer = self
            .closest
            .as_ref()
            .map_or(true, |best| distance < best.distance);
        if closer {
            self.closest = Some(self.candidate(element, kind, distance));
        }
    }

    fn inspect(&mut self, element: &JSXElement<'_>) {
        let line = self.target.line;
        let column = self.target.column;
        let start = self.index.position(element.span.start);
        let end = self.index.position(element.span.end);
        let opening = self.index.position(element.opening_element.span.start);

        if start.line <= line && end.line >= line {
            if opening.line == line {
                self.offer(element, MatchKind::SameLine, opening.column.abs_diff(column));
            } else if opening.line < line {
                let distance = (line - opening.line).saturating_mul(self.tuning.line_penalty);
                self.offer(element, MatchKind::Enclosing, distance);
            }
        }

        if opening.line == line && opening.column.abs_diff(column) <= self.tuning.column_tolerance {
            self.exact = Some(self.candidate(
                element,
                MatchKind::Exact,
                opening.column.abs_diff(column),
            ));
        }
    }

    fn finish(self) -> Option<MatchedNode> {
        if let Some(exact) = self.exact {
            debug!(
                "exact match <{}> at {}:{}",
                exact.tag_name.as_deref().unwrap_or("?"),
                exact.start.line,
                exact.start.column
            );
            return Some(exact);
        }

        let closest = self.closest?;
        let threshold = self.tuning.threshold_for(closest.distance);
        if closest.distance <= threshold {
            debug!(
                "closest match <{}> at {}:{} (distance {}, threshold {})",
                closest.tag_name.as_deref().unwrap_or("?"),
                closest.start.line,
                closest.start.column,
                closest.distance,
                threshold
            );
            Some(closest)
        } else {
            debug!(
                "closest candidate at distance {} exceeds threshold {}",
                closest.distance, threshold
            );
            None
        }
    }
}

impl<'a> Visit<'a> for ElementSearch<'_, '_> {
    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        if self.exact.is_some() {
            return;
        }
        self.inspect(it);
        if self.exact.is_some() {
            return;
        }
        walk::walk_jsx_element(self, it);
    }
}
