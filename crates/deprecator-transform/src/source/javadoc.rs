//! Documentation comments
//!
//! Existing comments are kept verbatim and the `@deprecated` block tag is
//! appended as a new line before the closing `*/`.

use crate::marker::DocTag;

/// Whether a comment is a documentation comment
#[inline]
#[must_use]
pub fn is_doc_comment(comment: &str) -> bool {
    comment.starts_with("/**") && comment != "/**/" && comment.ends_with("*/")
}

/// Whether a documentation comment already carries an `@deprecated` block tag
#[must_use]
pub fn has_deprecated_tag(comment: &str) -> bool {
    comment.lines().any(|line| {
        let content = line
            .trim_start()
            .trim_start_matches('/')
            .trim_start_matches('*')
            .trim_start();
        content
            .strip_prefix(DocTag::NAME)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
    })
}

/// New documentation comment holding only `tag`
///
/// `indent` is the declaration's indentation; `None` renders a single-line
/// comment for inline declarations.
#[must_use]
pub fn new_doc(tag: &DocTag, indent: Option<&str>) -> String {
    match indent {
        Some(indent) => format!("/**\n{indent} * {}\n{indent} */", tag.render()),
        None => format!("/** {} */", tag.render()),
    }
}

/// Existing comment with `tag` appended, or `None` when it has one already
#[must_use]
pub fn rebuild_doc(existing: &str, tag: &DocTag, indent: &str) -> Option<String> {
    if has_deprecated_tag(existing) {
        return None;
    }
    let body = existing.strip_suffix("*/")?;
    let open = body.trim_end_matches([' ', '\t']);

    if open.ends_with('\n') {
        // closing `*/` sits on its own line
        Some(format!("{open}{indent} * {}\n{indent} */", tag.render()))
    } else {
        let open = body.trim_end();
        Some(format!("{open}\n{indent} * {}\n{indent} */", tag.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Marker;
    use pretty_assertions::assert_eq;

    fn tag(message: &str) -> DocTag {
        Marker::source(Some(message)).doc_tag().cloned().unwrap()
    }

    #[test]
    fn recognizes_doc_comments() {
        assert!(is_doc_comment("/** Hi */"));
        assert!(!is_doc_comment("/* Hi */"));
        assert!(!is_doc_comment("/**/"));
        assert!(!is_doc_comment("// Hi"));
    }

    #[test]
    fn appends_to_multi_line_doc() {
        let existing = "/**\n     * Does things.\n     *\n     * @param x the x\n     */";
        let rebuilt = rebuild_doc(existing, &tag("Use Foo instead."), "    ").unwrap();
        assert_eq!(
            rebuilt,
            "/**\n     * Does things.\n     *\n     * @param x the x\n     * @deprecated Use Foo instead.\n     */"
        );
    }

    #[test]
    fn expands_single_line_doc() {
        let rebuilt = rebuild_doc("/** Short. */", &tag("Gone."), "  ").unwrap();
        assert_eq!(rebuilt, "/** Short.\n   * @deprecated Gone.\n   */");
    }

    #[test]
    fn keeps_existing_deprecated_tag() {
        assert!(rebuild_doc("/**\n * @deprecated old\n */", &tag("new"), "").is_none());
        assert!(has_deprecated_tag("/** @deprecated */"));
        assert!(!has_deprecated_tag("/** @deprecatedFoo */"));
        assert!(!has_deprecated_tag("/** see {@link Deprecated} */"));
    }

    #[test]
    fn new_doc_layouts() {
        let tag = tag("Deprecated API.");
        assert_eq!(new_doc(&tag, Some("    ")), "/**\n     * @deprecated Deprecated API.\n     */");
        assert_eq!(new_doc(&tag, None), "/** @deprecated Deprecated API. */");
    }
}
