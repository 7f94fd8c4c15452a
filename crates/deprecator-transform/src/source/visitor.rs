//! Declaration traversal over one parsed source unit
//!
//! Containers are evaluated and then descended into through their body.
//! Leaves are evaluated and never descended into, so method bodies,
//! initializers and enum-constant class bodies are out of reach.

use super::declaration::{DeclarationKind, KindFilter};
use super::edit::EditSet;
use super::javadoc::{is_doc_comment, new_doc, rebuild_doc};
use super::names::NameScope;
use crate::marker::{should_mark, AnnotationName, Marker};
use crate::report::UnitReport;
use tree_sitter::Node;

pub(crate) struct DeclarationVisitor<'a> {
    source: &'a str,
    marker: &'a Marker,
    kinds: &'a KindFilter,
    java_release: u16,
    scope: NameScope,
    edits: EditSet,
    report: UnitReport,
}

impl<'a> DeclarationVisitor<'a> {
    pub(crate) fn new(source: &'a str, marker: &'a Marker, kinds: &'a KindFilter, java_release: u16, scope: NameScope) -> Self {
        Self {
            source,
            marker,
            kinds,
            java_release,
            scope,
            edits: EditSet::new(),
            report: UnitReport::default(),
        }
    }

    /// Walk the unit and hand back the requested edits
    pub(crate) fn visit_unit(mut self, root: Node<'_>) -> (EditSet, UnitReport) {
        self.visit_members(root);
        (self.edits, self.report)
    }

    fn visit_members(&mut self, parent: Node<'_>) {
        let mut cursor = parent.walk();
        let children: Vec<Node<'_>> = parent.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn visit(&mut self, node: Node<'_>) {
        match DeclarationKind::from_node_kind(node.kind(), self.java_release) {
            Some(kind) => {
                self.evaluate(node, kind);
                if kind.is_container() {
                    if let Some(body) = node.child_by_field_name("body") {
                        self.visit_members(body);
                    }
                }
            }
            None => {
                // enum members after `;`, and declarations the parser could only partly recognize
                if matches!(node.kind(), "enum_body_declarations" | "ERROR") {
                    self.visit_members(node);
                }
            }
        }
    }

    fn evaluate(&mut self, node: Node<'_>, kind: DeclarationKind) {
        if !self.kinds.contains(kind) {
            return;
        }
        let names = self.annotation_names(node);
        let resolves = self.scope.simple_name_resolves();
        let marked = should_mark(names.iter().map(|name| AnnotationName::new(name, resolves)));
        self.report.record(kind.category(), marked);
        if marked {
            self.request_marker(node);
        }
    }

    fn annotation_names(&self, node: Node<'_>) -> Vec<&'a str> {
        let source = self.source;
        let mut cursor = node.walk();
        let Some(modifiers) = node.named_children(&mut cursor).find(|c| c.kind() == "modifiers") else {
            return Vec::new();
        };
        let mut inner = modifiers.walk();
        modifiers
            .named_children(&mut inner)
            .filter(|c| matches!(c.kind(), "marker_annotation" | "annotation"))
            .filter_map(|annotation| annotation.child_by_field_name("name"))
            .filter_map(|name| name.utf8_text(source.as_bytes()).ok())
            .collect()
    }

    fn request_marker(&mut self, node: Node<'_>) {
        let source = self.source;
        let start = node.start_byte();
        let indent = line_indent(source, start);
        let mut text = String::new();

        if let Some(tag) = self.marker.doc_tag() {
            match self.preceding_doc(node) {
                Some(comment) => {
                    let existing = &source[comment.byte_range()];
                    let own_line = line_indent(source, comment.start_byte());
                    let comment_indent = own_line.or(indent).unwrap_or("");
                    let adjacent = source
                        .get(comment.end_byte()..start)
                        .is_some_and(|gap| gap.trim().is_empty());
                    if let Some(rebuilt) = rebuild_doc(existing, tag, comment_indent) {
                        match own_line {
                            // doc shared the declaration's line; both move to their own lines
                            Some(own) if indent.is_none() && adjacent => {
                                self.edits.replace(comment.start_byte()..start, format!("{rebuilt}\n{own}"));
                                text.push_str(Marker::SOURCE_ANNOTATION);
                                text.push_str(&separator(Some(own)));
                                self.edits.insert(start, text);
                                return;
                            }
                            _ => self.edits.replace(comment.byte_range(), rebuilt),
                        }
                    }
                }
                None => {
                    text.push_str(&new_doc(tag, indent));
                    text.push_str(&separator(indent));
                }
            }
        }

        text.push_str(Marker::SOURCE_ANNOTATION);
        text.push_str(&separator(indent));
        self.edits.insert(start, text);
    }

    /// Nearest documentation comment in front of a declaration
    ///
    /// Plain line and block comments between the two are skipped.
    fn preceding_doc<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut end = node.start_byte();
        let mut sibling = node.prev_sibling();
        while let Some(comment) = sibling {
            if !matches!(comment.kind(), "block_comment" | "line_comment") {
                return None;
            }
            let gap = self.source.get(comment.end_byte()..end)?;
            if !gap.trim().is_empty() {
                return None;
            }
            if comment.kind() == "block_comment" && is_doc_comment(&self.source[comment.byte_range()]) {
                return Some(comment);
            }
            end = comment.start_byte();
            sibling = comment.prev_sibling();
        }
        None
    }
}

/// Indentation of the line holding byte `at`, if nothing but whitespace precedes it
fn line_indent(source: &str, at: usize) -> Option<&str> {
    let before = source.get(..at)?;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let prefix = &before[line_start..];
    prefix.chars().all(|c| c == ' ' || c == '\t').then_some(prefix)
}

fn separator(indent: Option<&str>) -> String {
    match indent {
        Some(indent) => format!("\n{indent}"),
        None => " ".to_string(),
    }
}
