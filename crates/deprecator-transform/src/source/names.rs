//! Simple-name resolution for the deprecation annotation
//!
//! A bare `@Deprecated` means `java.lang.Deprecated` unless the compilation
//! unit shadows the simple name. Only syntactic evidence is used:
//!
//! - a single-type import of another type named `Deprecated`
//! - a type named `Deprecated` declared in the unit

use crate::marker::{DEPRECATED_QUALIFIED_NAME, DEPRECATED_SIMPLE_NAME};
use tree_sitter::Node;

/// Type declarations whose name can shadow an imported simple name
const TYPE_DECLARATIONS: [&str; 5] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "annotation_type_declaration",
    "record_declaration",
];

/// Body nodes searched for nested type declarations
const TYPE_BODIES: [&str; 6] = [
    "class_body",
    "interface_body",
    "enum_body",
    "enum_body_declarations",
    "annotation_type_body",
    "ERROR",
];

/// What `Deprecated` resolves to in one compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameScope {
    simple_name_shadowed: bool,
}

impl NameScope {
    /// Scan a parsed compilation unit
    #[must_use]
    pub fn from_unit(root: Node<'_>, source: &[u8]) -> Self {
        Self {
            simple_name_shadowed: imports_other_deprecated(root, source) || declares_deprecated(root, source),
        }
    }

    /// Whether a bare `Deprecated` still denotes `java.lang.Deprecated`
    #[inline]
    #[must_use]
    pub fn simple_name_resolves(&self) -> bool {
        !self.simple_name_shadowed
    }
}

fn imports_other_deprecated(root: Node<'_>, source: &[u8]) -> bool {
    let mut cursor = root.walk();
    let imports: Vec<Node<'_>> = root
        .named_children(&mut cursor)
        .filter(|node| node.kind() == "import_declaration")
        .collect();
    imports.into_iter().any(|import| {
        let mut inner = import.walk();
        let children: Vec<Node<'_>> = import.named_children(&mut inner).collect();
        if children.iter().any(|c| c.kind() == "asterisk") {
            return false;
        }
        children
            .iter()
            .filter(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            .filter_map(|c| c.utf8_text(source).ok())
            .map(|text| text.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .any(|name| {
                let simple = name.rsplit('.').next().unwrap_or(&name);
                simple == DEPRECATED_SIMPLE_NAME && name != DEPRECATED_QUALIFIED_NAME
            })
    })
}

fn declares_deprecated(node: Node<'_>, source: &[u8]) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    children.into_iter().any(|child| {
        if TYPE_DECLARATIONS.contains(&child.kind()) {
            let named = child
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
                .is_some_and(|name| name == DEPRECATED_SIMPLE_NAME);
            named || child.child_by_field_name("body").is_some_and(|body| declares_deprecated(body, source))
        } else if TYPE_BODIES.contains(&child.kind()) {
            declares_deprecated(child, source)
        } else {
            false
        }
    })
}
