//! Non-visual components that are valid click targets but never extracted.

use lazy_static::lazy_static;
use oxc_ast::ast::JSXElementName;
use std::collections::HashSet;

lazy_static! {
    /// Document head, metadata and script wrappers, in both the intrinsic
    /// lowercase form and the component form.
    static ref COMPONENT_BLACKLIST: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Helmet");
        s.insert("HelmetProvider");
        s.insert("Head");
        s.insert("head");
        s.insert("Meta");
        s.insert("meta");
        s.insert("Script");
        s.insert("script");
        s.insert("NoScript");
        s.insert("noscript");
        s.insert("Style");
        s.insert("style");
        s.insert("title");
        s.insert("Title");
        s.insert("link");
        s.insert("Link");
        s
    };
}

/// Final identifier of an element name: `Foo` → `Foo`, `UI.Dialog.Title` → `Title`.
///
/// Namespaced (`svg:rect`) and `this` names have no such identifier.
pub fn resolve_tag_name<'n>(name: &'n JSXElementName<'_>) -> Option<&'n str> {
    match name {
        JSXElementName::Identifier(id) => Some(id.name.as_str()),
        JSXElementName::IdentifierReference(id) => Some(id.name.as_str()),
        JSXElementName::MemberExpression(member) => Some(member.property.name.as_str()),
        JSXElementName::NamespacedName(_) | JSXElementName::ThisExpression(_) => None,
    }
}

pub fn is_blacklisted_tag(tag: &str) -> bool {
    COMPONENT_BLACKLIST.contains(tag)
}

pub fn is_blacklisted(name: &JSXElementName<'_>) -> bool {
    resolve_tag_name(name).is_some_and(is_blacklisted_tag)
}
