//! Source transformer
//!
//! Parses each source unit with tree-sitter, walks its declarations and
//! applies the requested marker edits in a single pass per unit. Text outside
//! the edits is reproduced unchanged.
//!
//! - [`declaration`]: declaration kinds and the caller's kind filter
//! - [`edit`]: byte-range edit set
//! - [`javadoc`]: documentation comment rebuild
//! - [`names`]: whether a bare `Deprecated` is shadowed

pub mod declaration;
pub mod edit;
pub mod javadoc;
pub mod names;
mod visitor;

pub use declaration::{DeclarationKind, KindError, KindFilter, RECORDS_SINCE_RELEASE};
pub use edit::{Edit, EditSet};
pub use names::NameScope;

use crate::error::{TransformError, TransformResult};
use crate::marker::Marker;
use crate::report::{ArchiveReport, UnitReport};
use crate::scratch::walk_error;
use std::fs;
use std::path::Path;
use tree_sitter::Parser;
use visitor::DeclarationVisitor;
use walkdir::WalkDir;

/// File suffix of source units
pub const SOURCE_UNIT_SUFFIX: &str = ".java";

/// Java release assumed when none is configured
pub const DEFAULT_JAVA_RELEASE: u16 = 16;

/// Whether an archive entry name denotes a source unit
#[inline]
#[must_use]
pub fn is_source_unit(entry_name: &str) -> bool {
    entry_name.ends_with(SOURCE_UNIT_SUFFIX) && !entry_name.ends_with('/')
}

/// Adds the deprecation marker and documentation tag to source units
#[derive(Debug, Clone)]
pub struct SourceTransformer {
    marker: Marker,
    kinds: KindFilter,
    java_release: u16,
}

impl SourceTransformer {
    /// Transformer with the given message, every kind and the default release
    #[must_use]
    pub fn new(message: Option<&str>) -> Self {
        Self {
            marker: Marker::source(message),
            kinds: KindFilter::all(),
            java_release: DEFAULT_JAVA_RELEASE,
        }
    }

    /// Restrict marking to `kinds`
    #[must_use]
    pub fn with_kinds(mut self, kinds: KindFilter) -> Self {
        self.kinds = kinds;
        self
    }

    /// Language level used to recognize release-dependent declarations
    #[must_use]
    pub fn with_java_release(mut self, java_release: u16) -> Self {
        self.java_release = java_release;
        self
    }

    #[inline]
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    #[inline]
    #[must_use]
    pub fn kinds(&self) -> &KindFilter {
        &self.kinds
    }

    /// Rewrite one source unit
    ///
    /// # Errors
    /// Fails when the grammar cannot be loaded or the parser gives up
    pub fn transform_unit(&self, name: &str, text: &str) -> TransformResult<(String, UnitReport)> {
        let mut parser = new_parser()?;
        self.rewrite(&mut parser, name, text)
    }

    /// Rewrite every source unit under `input_dir` into `output_dir`
    ///
    /// Other files, and source units that are not valid UTF-8, are copied
    /// unchanged.
    ///
    /// # Errors
    /// Fails on filesystem errors or when a unit cannot be parsed at all
    pub fn transform_tree(&self, input_dir: &Path, output_dir: &Path) -> TransformResult<ArchiveReport> {
        let mut parser = new_parser()?;
        let mut report = ArchiveReport::default();

        for entry in WalkDir::new(input_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(input_dir, e))?;
            let Ok(relative) = entry.path().strip_prefix(input_dir) else {
                continue;
            };
            let target = output_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| TransformError::io_error(&target, e))?;
                continue;
            }

            let bytes = fs::read(entry.path()).map_err(|e| TransformError::io_error(entry.path(), e))?;
            let name = relative.to_string_lossy().replace('\\', "/");
            let output = if is_source_unit(&name) {
                match String::from_utf8(bytes) {
                    Ok(text) => {
                        let (rewritten, unit) = self.rewrite(&mut parser, &name, &text)?;
                        report.add_unit(&unit);
                        rewritten.into_bytes()
                    }
                    Err(e) => {
                        tracing::warn!("Passing through {} unchanged: not valid UTF-8", name);
                        report.add_skipped_unit();
                        e.into_bytes()
                    }
                }
            } else {
                report.add_resource();
                bytes
            };
            fs::write(&target, output).map_err(|e| TransformError::io_error(&target, e))?;
        }
        Ok(report)
    }

    fn rewrite(&self, parser: &mut Parser, name: &str, text: &str) -> TransformResult<(String, UnitReport)> {
        let tree = parser.parse(text, None).ok_or_else(|| TransformError::SourceParse {
            unit: name.to_string(),
        })?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::warn!("Syntax errors in {}; marking recognizable declarations only", name);
        }

        let scope = NameScope::from_unit(root, text.as_bytes());
        let visitor = DeclarationVisitor::new(text, &self.marker, &self.kinds, self.java_release, scope);
        let (edits, report) = visitor.visit_unit(root);

        if edits.is_empty() {
            return Ok((text.to_string(), report));
        }
        tracing::debug!("Marked {}: {} declarations", name, report.newly_marked());
        Ok((edits.apply(text), report))
    }
}

impl Default for SourceTransformer {
    fn default() -> Self {
        Self::new(None)
    }
}

fn new_parser() -> TransformResult<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| TransformError::ParserInit(e.to_string()))?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mark(source: &str) -> (String, UnitReport) {
        SourceTransformer::default().transform_unit("A.java", source).unwrap()
    }

    #[test]
    fn marks_type_members_on_own_lines() {
        let source = "package p;\n\npublic class A {\n    private int x;\n\n    public void m() {}\n}\n";
        let (out, report) = mark(source);
        assert_eq!(
            out,
            "package p;\n\n/**\n * @deprecated Deprecated API.\n */\n@java.lang.Deprecated\npublic class A {\n    /**\n     * @deprecated Deprecated API.\n     */\n    @java.lang.Deprecated\n    private int x;\n\n    /**\n     * @deprecated Deprecated API.\n     */\n    @java.lang.Deprecated\n    public void m() {}\n}\n"
        );
        assert_eq!(report.newly_marked(), 3);
    }

    #[test]
    fn extends_existing_documentation() {
        let source = "/**\n * Greets.\n */\npublic class A {}\n";
        let (out, _) = mark(source);
        assert_eq!(
            out,
            "/**\n * Greets.\n * @deprecated Deprecated API.\n */\n@java.lang.Deprecated\npublic class A {}\n"
        );
    }

    #[test]
    fn plain_comments_do_not_hide_documentation() {
        let (out, _) = mark("/** Doc. */\n// note\npublic class A {}\n");
        assert_eq!(
            out,
            "/** Doc.\n * @deprecated Deprecated API.\n */\n// note\n@java.lang.Deprecated\npublic class A {}\n"
        );

        let (out, _) = mark("/** Doc. */\n/* plain */\nclass B {}\n");
        assert_eq!(out.matches("/**").count(), 1);
        assert!(out.starts_with("/** Doc.\n * @deprecated Deprecated API.\n */\n/* plain */\n@java.lang.Deprecated\nclass B"));
    }

    #[test]
    fn same_line_documentation_moves_declaration_down() {
        let (out, _) = mark("class A {\n    /** Doc. */ private int x;\n}\n");
        assert_eq!(
            out,
            "/**\n * @deprecated Deprecated API.\n */\n@java.lang.Deprecated\nclass A {\n    /** Doc.\n     * @deprecated Deprecated API.\n     */\n    @java.lang.Deprecated\n    private int x;\n}\n"
        );
    }

    #[test]
    fn already_marked_declarations_are_untouched() {
        let source = "@Deprecated\nclass A {\n    @java.lang.Deprecated int x;\n}\n";
        let (out, report) = mark(source);
        assert_eq!(out, source);
        assert_eq!(report.already_marked(), 2);
        assert!(!report.changed());
    }

    #[test]
    fn shadowed_simple_name_is_not_a_marker() {
        let source = "import com.example.Deprecated;\n@Deprecated\nclass A {}\n";
        let (out, report) = mark(source);
        assert!(out.contains("@java.lang.Deprecated\n@Deprecated\nclass A"));
        assert_eq!(report.types.marked, 1);
    }

    #[test]
    fn inline_enum_constants_get_inline_markers() {
        let source = "enum E { ONE, TWO }\n";
        let (out, report) = mark(source);
        assert_eq!(
            out,
            "/**\n * @deprecated Deprecated API.\n */\n@java.lang.Deprecated\nenum E { /** @deprecated Deprecated API. */ @java.lang.Deprecated ONE, /** @deprecated Deprecated API. */ @java.lang.Deprecated TWO }\n"
        );
        assert_eq!(report.enum_constants.marked, 2);
    }

    #[test]
    fn method_bodies_are_not_entered() {
        let source = "class A {\n    void m() {\n        class Local {}\n        Runnable r = new Runnable() { public void run() {} };\n    }\n    static { class InInit {} }\n}\n";
        let (out, report) = mark(source);
        assert_eq!(out.matches("@java.lang.Deprecated").count(), 2);
        assert!(out.contains("        class Local {}"));
        assert_eq!(report.types.marked, 1);
        assert_eq!(report.methods.marked, 1);
    }

    #[test]
    fn kind_filter_still_descends_into_containers() {
        let transformer = SourceTransformer::default().with_kinds(KindFilter::only([DeclarationKind::Method]));
        let (out, report) = transformer
            .transform_unit("A.java", "class A {\n    int f;\n    void m() {}\n}\n")
            .unwrap();
        assert_eq!(out.matches("@java.lang.Deprecated").count(), 1);
        assert_eq!(report.methods.marked, 1);
        assert_eq!(report.types, Default::default());
    }

    #[test]
    fn records_follow_release() {
        let source = "record R(int x) {\n    void m() {}\n}\n";
        let (_, modern) = mark(source);
        assert_eq!(modern.newly_marked(), 2);

        let legacy = SourceTransformer::default().with_java_release(11);
        let (_, report) = legacy.transform_unit("R.java", source).unwrap();
        assert_eq!(report.types.marked, 0);
    }

    #[test]
    fn syntax_errors_are_tolerated() {
        let source = "class A {\n    void ok() {}\n    int broken = ;\n}\n";
        let (out, report) = mark(source);
        assert!(out.contains("@java.lang.Deprecated\n    void ok()"));
        assert!(report.methods.marked >= 1);
    }

    #[test]
    fn message_is_used_verbatim() {
        let transformer = SourceTransformer::new(Some("Use Foo instead."));
        let (out, _) = transformer.transform_unit("A.java", "class A {}\n").unwrap();
        assert!(out.contains(" * @deprecated Use Foo instead.\n"));
    }
}
