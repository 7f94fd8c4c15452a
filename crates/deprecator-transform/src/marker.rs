//! Declaration marker policy
//!
//! Pure decisions shared by both transformers: whether a declaration already
//! carries the deprecation marker, and what a new marker looks like.

/// Type descriptor of the deprecation annotation in compiled code
pub const DEPRECATED_DESCRIPTOR: &str = "Ljava/lang/Deprecated;";

/// Fully qualified source name of the deprecation annotation
pub const DEPRECATED_QUALIFIED_NAME: &str = "java.lang.Deprecated";

/// Simple source name of the deprecation annotation
pub const DEPRECATED_SIMPLE_NAME: &str = "Deprecated";

/// Documentation tag body used when the caller supplies no message
pub const DEFAULT_MESSAGE: &str = "Deprecated API.";

/// An annotation already present on a declaration
pub trait ExistingMarker {
    /// Whether this annotation is the deprecation marker itself
    fn is_deprecation(&self) -> bool;
}

/// Annotation seen in compiled code, identified by its type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationDescriptor<'a>(pub &'a str);

impl ExistingMarker for AnnotationDescriptor<'_> {
    #[inline]
    fn is_deprecation(&self) -> bool {
        self.0 == DEPRECATED_DESCRIPTOR
    }
}

/// Annotation seen in source, identified by the name written after `@`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationName<'a> {
    name: &'a str,
    simple_name_resolves: bool,
}

impl<'a> AnnotationName<'a> {
    /// `simple_name_resolves` tells whether a bare `Deprecated` in this
    /// compilation unit still denotes `java.lang.Deprecated`
    #[inline]
    #[must_use]
    pub fn new(name: &'a str, simple_name_resolves: bool) -> Self {
        Self {
            name,
            simple_name_resolves,
        }
    }
}

impl ExistingMarker for AnnotationName<'_> {
    fn is_deprecation(&self) -> bool {
        // `java . lang . Deprecated` is legal source
        let compact: String = self.name.chars().filter(|c| !c.is_whitespace()).collect();
        compact == DEPRECATED_QUALIFIED_NAME
            || (self.simple_name_resolves && compact == DEPRECATED_SIMPLE_NAME)
    }
}

/// Whether a declaration with `existing` annotations needs a marker
///
/// Idempotent: once a marker is present this returns `false` forever.
pub fn should_mark<M: ExistingMarker>(existing: impl IntoIterator<Item = M>) -> bool {
    !existing.into_iter().any(|m| m.is_deprecation())
}

/// Which transformer a marker is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerMode {
    /// Compiled code: annotation only
    Binary,
    /// Source code: annotation plus documentation tag
    Source,
}

/// `@deprecated` documentation tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    message: String,
}

impl DocTag {
    /// Tag name as written in documentation comments
    pub const NAME: &'static str = "@deprecated";

    /// Message carried by the tag
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tag text, safe to embed in a block comment
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {}", Self::NAME, self.message.replace("*/", "*&#47;"))
    }
}

/// A deprecation marker ready to be attached to a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    doc_tag: Option<DocTag>,
}

impl Marker {
    /// Annotation text inserted into source
    pub const SOURCE_ANNOTATION: &'static str = "@java.lang.Deprecated";

    /// Marker for compiled code
    #[inline]
    #[must_use]
    pub fn binary() -> Self {
        Self { doc_tag: None }
    }

    /// Marker for source code; blank or missing messages fall back to [`DEFAULT_MESSAGE`]
    #[must_use]
    pub fn source(message: Option<&str>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MESSAGE);
        Self {
            doc_tag: Some(DocTag {
                message: message.to_string(),
            }),
        }
    }

    /// Type descriptor written into compiled code
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &'static str {
        DEPRECATED_DESCRIPTOR
    }

    /// Documentation tag (source markers only)
    #[inline]
    #[must_use]
    pub fn doc_tag(&self) -> Option<&DocTag> {
        self.doc_tag.as_ref()
    }
}

/// Build a marker for `mode`; `message` only matters in source mode
#[must_use]
pub fn build_marker(mode: MarkerMode, message: Option<&str>) -> Marker {
    match mode {
        MarkerMode::Binary => Marker::binary(),
        MarkerMode::Source => Marker::source(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_match_is_exact() {
        assert!(!should_mark([AnnotationDescriptor("Ljava/lang/Deprecated;")]));
        assert!(should_mark([AnnotationDescriptor("Lcom/example/Deprecated;")]));
        assert!(should_mark(Vec::<AnnotationDescriptor<'_>>::new()));
    }

    #[test]
    fn simple_name_counts_only_when_it_resolves() {
        assert!(!should_mark([AnnotationName::new("Deprecated", true)]));
        assert!(should_mark([AnnotationName::new("Deprecated", false)]));
        assert!(!should_mark([AnnotationName::new("java.lang.Deprecated", false)]));
        assert!(!should_mark([AnnotationName::new("java . lang . Deprecated", false)]));
        assert!(should_mark([AnnotationName::new("com.example.Deprecated", true)]));
    }

    #[test]
    fn other_annotations_do_not_count() {
        let existing = [AnnotationName::new("Override", true), AnnotationName::new("SuppressWarnings", true)];
        assert!(should_mark(existing));
    }

    #[test]
    fn source_marker_uses_default_message() {
        let marker = build_marker(MarkerMode::Source, None);
        assert_eq!(marker.doc_tag().map(DocTag::message), Some(DEFAULT_MESSAGE));

        let blank = build_marker(MarkerMode::Source, Some("   "));
        assert_eq!(blank.doc_tag().map(DocTag::message), Some(DEFAULT_MESSAGE));
    }

    #[test]
    fn source_marker_keeps_message_verbatim() {
        let marker = build_marker(MarkerMode::Source, Some("Use Foo instead."));
        assert_eq!(marker.doc_tag().unwrap().render(), "@deprecated Use Foo instead.");
    }

    #[test]
    fn binary_marker_has_no_doc_tag() {
        let marker = build_marker(MarkerMode::Binary, Some("ignored"));
        assert!(marker.doc_tag().is_none());
        assert_eq!(marker.descriptor(), DEPRECATED_DESCRIPTOR);
    }

    #[test]
    fn comment_terminator_is_escaped() {
        let marker = Marker::source(Some("see a*/b"));
        assert_eq!(marker.doc_tag().unwrap().render(), "@deprecated see a*&#47;b");
    }
}
