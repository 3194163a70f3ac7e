//! Best-effort source provenance for rendered elements.
//!
//! Some UI runtimes attach debug records to DOM nodes in development builds:
//! each node points at an internal tree node, which may carry a source
//! descriptor and always links to its parent. The lookup walks that chain
//! upward until a descriptor with a file name turns up. Absence at any step is
//! a normal outcome.

use serde::{Deserialize, Serialize};

/// Opaque handle into the host runtime's internal tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSource {
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
}

pub trait DebugMetadata<E> {
    /// Internal node attached to a DOM element.
    fn fiber_of(&self, element: &E) -> Option<FiberId>;
    /// Source descriptor recorded on an internal node, from whichever slot carries one.
    fn debug_source(&self, fiber: FiberId) -> Option<DebugSource>;
    fn return_fiber(&self, fiber: FiberId) -> Option<FiberId>;
}

/// Upper bound on the parent walk; a well-formed chain ends long before this.
const MAX_FIBER_WALK: usize = 10_000;

pub fn source_file_for<E>(metadata: &dyn DebugMetadata<E>, element: &E) -> Option<String> {
    let mut current = metadata.fiber_of(element);
    let mut steps = 0;
    while let Some(fiber) = current {
        if steps >= MAX_FIBER_WALK {
            return None;
        }
        if let Some(file_name) = metadata
            .debug_source(fiber)
            .and_then(|source| source.file_name)
            .filter(|name| !name.is_empty())
        {
            return Some(file_name);
        }
        current = metadata.return_fiber(fiber);
        steps += 1;
    }
    None
}

/// Drop everything up to and including `marker`, turning a deployed absolute
/// path into a project-relative one.
pub fn strip_deployment_prefix(file_path: &str, marker: &str) -> String {
    if marker.is_empty() {
        return file_path.to_string();
    }
    match file_path.find(marker) {
        Some(index) => file_path[index + marker.len()..].to_string(),
        None => file_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Chain {
        attached: HashMap<&'static str, FiberId>,
        sources: HashMap<u64, DebugSource>,
        parents: HashMap<u64, FiberId>,
    }

    impl DebugMetadata<&'static str> for Chain {
        fn fiber_of(&self, element: &&'static str) -> Option<FiberId> {
            self.attached.get(element).copied()
        }
        fn debug_source(&self, fiber: FiberId) -> Option<DebugSource> {
            self.sources.get(&fiber.0).cloned()
        }
        fn return_fiber(&self, fiber: FiberId) -> Option<FiberId> {
            self.parents.get(&fiber.0).copied()
        }
    }

    fn source(file: &str) -> DebugSource {
        DebugSource {
            file_name: Some(file.to_string()),
            line_number: Some(3),
            column_number: Some(4),
        }
    }

    #[test]
    fn test_walks_up_to_first_source() {
        let mut chain = Chain::default();
        chain.attached.insert("span", FiberId(1));
        chain.parents.insert(1, FiberId(2));
        chain.parents.insert(2, FiberId(3));
        chain.sources.insert(2, DebugSource::default());
        chain.sources.insert(3, source("/var/www/public_html/src/App.jsx"));

        assert_eq!(
            source_file_for(&chain, &"span").as_deref(),
            Some("/var/www/public_html/src/App.jsx")
        );
    }

    #[test]
    fn test_absent_metadata_is_none() {
        let mut chain = Chain::default();
        assert_eq!(source_file_for(&chain, &"div"), None);
        chain.attached.insert("div", FiberId(7));
        assert_eq!(source_file_for(&chain, &"div"), None);
    }

    #[test]
    fn test_cyclic_chain_terminates() {
        let mut chain = Chain::default();
        chain.attached.insert("p", FiberId(1));
        chain.parents.insert(1, FiberId(2));
        chain.parents.insert(2, FiberId(1));
        assert_eq!(source_file_for(&chain, &"p"), None);
    }

    #[test]
    fn test_strip_deployment_prefix() {
        assert_eq!(
            strip_deployment_prefix("/home/u/domains/x/public_html/src/pages/Home.jsx", "public_html/"),
            "src/pages/Home.jsx"
        );
        assert_eq!(
            strip_deployment_prefix("src/App.jsx", "public_html/"),
            "src/App.jsx"
        );
    }
}
