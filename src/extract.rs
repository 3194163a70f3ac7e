//! Source text generation for matched elements and whole files.

use oxc_allocator::{Allocator, Box as OxcBox, CloneIn};
use oxc_ast::ast::{Expression, JSXElement, Program};
use oxc_ast::AstBuilder;
use oxc_ast_visit::{walk, Visit};
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_span::{Span, SPAN};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::LocatorError;

/// Regenerate the element whose span is `span` as a standalone expression.
pub fn generate_element_source<'a>(
    allocator: &'a Allocator,
    program: &Program<'a>,
    span: Span,
) -> Result<String, LocatorError> {
    let mut finder = ElementFinder {
        allocator,
        span,
        found: None,
    };
    finder.visit_program(program);
    let element = finder.found.ok_or_else(|| {
        LocatorError::Generation(format!("no element at {}..{}", span.start, span.end))
    })?;

    let ast = AstBuilder::new(allocator);
    let code = Codegen::new()
        .build(&Program {
            span: SPAN,
            source_type: program.source_type,
            hashbang: None,
            directives: ast.vec(),
            body: {
                let mut b = ast.vec();
                b.push(ast.statement_expression(SPAN, Expression::JSXElement(element)));
                b
            },
            source_text: "",
            comments: ast.vec(),
            scope_id: std::cell::Cell::new(None),
        })
        .code;

    Ok(code.trim().trim_end_matches(';').to_string())
}

struct ElementFinder<'a> {
    allocator: &'a Allocator,
    span: Span,
    found: Option<OxcBox<'a, JSXElement<'a>>>,
}

impl<'a> Visit<'a> for ElementFinder<'a> {
    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        if self.found.is_some() {
            return;
        }
        if it.span == self.span {
            self.found = Some(OxcBox::new_in(it.clone_in(self.allocator), self.allocator));
            return;
        }
        walk::walk_jsx_element(self, it);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WHOLE-FILE GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSource {
    pub code: String,
    /// Source map v3 linking `code` back to the original text.
    pub map: serde_json::Value,
}

/// Regenerate a full (possibly edited) program together with a source map
/// pointing at `original_text` under the name `file_name`.
pub fn generate_with_source_map(
    program: &Program<'_>,
    file_name: &str,
    original_text: &str,
) -> Result<GeneratedSource, LocatorError> {
    let options = CodegenOptions {
        source_map_path: Some(PathBuf::from(file_name)),
        ..CodegenOptions::default()
    };
    let ret = Codegen::new().with_options(options).build(program);

    let map = ret
        .map
        .ok_or_else(|| LocatorError::Generation("source map was not produced".to_string()))?;
    let mut map: serde_json::Value = serde_json::from_str(&map.to_json_string())
        .map_err(|e| LocatorError::Generation(e.to_string()))?;

    if let Some(obj) = map.as_object_mut() {
        obj.insert("sources".to_string(), serde_json::json!([file_name]));
        obj.insert("sourcesContent".to_string(), serde_json::json!([original_text]));
    }

    Ok(GeneratedSource {
        code: ret.code,
        map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn source_type() -> SourceType {
        SourceType::default()
            .with_module(true)
            .with_typescript(true)
            .with_jsx(true)
    }

    #[test]
    fn test_generate_element_by_span() {
        let code = "const App = () => <main><h1 className=\"title\">Hello</h1></main>;";
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, source_type()).parse();
        assert!(ret.errors.is_empty());

        let start = code.find("<h1").unwrap() as u32;
        let end = (code.find("</h1>").unwrap() + "</h1>".len()) as u32;
        let out = generate_element_source(&allocator, &ret.program, Span::new(start, end)).unwrap();

        assert!(out.starts_with("<h1"));
        assert!(out.contains("title"));
        assert!(out.contains("Hello"));
        assert!(!out.contains("<main"));
        assert!(!out.ends_with(';'));
    }

    #[test]
    fn test_generate_unknown_span_fails() {
        let code = "const a = <div />;";
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, source_type()).parse();
        let err = generate_element_source(&allocator, &ret.program, Span::new(0, 3)).unwrap_err();
        assert!(matches!(err, LocatorError::Generation(_)));
    }

    #[test]
    fn test_source_map_links_original() {
        let code = "export default function Home() {\n  return <section>Hi</section>;\n}\n";
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, source_type()).parse();

        let out = generate_with_source_map(&ret.program, "src/pages/Home.jsx", code).unwrap();
        assert!(out.code.contains("section"));
        assert_eq!(out.map["sources"][0], "src/pages/Home.jsx");
        assert_eq!(out.map["sourcesContent"][0], code);
        assert!(out.map["mappings"].as_str().is_some_and(|m| !m.is_empty()));
    }
}
