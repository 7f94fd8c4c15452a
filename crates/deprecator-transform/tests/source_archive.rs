//! Source archive tests.
//!
//! Core guarantees exercised here:
//! - Nested containers and their members are each marked independently.
//! - Declarations inside method bodies are never reached.
//! - The caller's message lands verbatim in every new documentation tag.
//! - Resources pass through byte-identical and scratch space never leaks.

use deprecator_test_utils::{read_entry, read_jar, read_text_entry, write_jar, write_source_jar};
use deprecator_transform::{process_source_archive, scratch_path, SourceTransformer, TransformError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const OUTER: &str = "\
package com.example;

public class Outer {
    public static class Inner {
        public void first() {}

        public int second(int x) {
            return x;
        }
    }
}
";

/// Outer and Inner both get a marker and documentation tag; Inner's methods each get one too.
#[test]
fn nested_types_and_members_are_marked() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("lib-sources.jar");
    let output = temp.path().join("lib-sources-deprecated.jar");
    write_source_jar(&input, &[("com/example/Outer.java", OUTER)]);

    let report = process_source_archive(&input, &output, &SourceTransformer::default()).unwrap();

    let expected = "\
package com.example;

/**
 * @deprecated Deprecated API.
 */
@java.lang.Deprecated
public class Outer {
    /**
     * @deprecated Deprecated API.
     */
    @java.lang.Deprecated
    public static class Inner {
        /**
         * @deprecated Deprecated API.
         */
        @java.lang.Deprecated
        public void first() {}

        /**
         * @deprecated Deprecated API.
         */
        @java.lang.Deprecated
        public int second(int x) {
            return x;
        }
    }
}
";
    assert_eq!(read_text_entry(&output, "com/example/Outer.java"), expected);
    assert_eq!(report.declarations.types.marked, 2);
    assert_eq!(report.declarations.methods.marked, 2);
    assert_eq!(report.units_changed, 1);
}

/// A local class inside a marked method stays unmarked.
#[test]
fn local_classes_are_out_of_scope() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("a-sources.jar");
    let output = temp.path().join("a-sources-deprecated.jar");
    let source = "\
class A {
    void work() {
        class Helper {
            void help() {}
        }
        new Helper().help();
    }
}
";
    write_source_jar(&input, &[("A.java", source)]);

    process_source_archive(&input, &output, &SourceTransformer::default()).unwrap();

    let text = read_text_entry(&output, "A.java");
    assert!(text.contains("    @java.lang.Deprecated\n    void work() {"));
    assert!(text.contains("\n        class Helper {\n            void help() {}\n"));
    assert_eq!(text.matches("@java.lang.Deprecated").count(), 2);
}

/// Existing documentation is extended with the caller's message.
#[test]
fn message_propagates_verbatim() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("b-sources.jar");
    let output = temp.path().join("b-sources-deprecated.jar");
    let source = "\
/**
 * Entry point.
 *
 * @since 1.0
 */
public interface Api {
    int LIMIT = 10;

    void call();
}
";
    write_source_jar(&input, &[("Api.java", source)]);

    let transformer = SourceTransformer::new(Some("Use Foo instead."));
    process_source_archive(&input, &output, &transformer).unwrap();

    let text = read_text_entry(&output, "Api.java");
    assert!(text.starts_with("/**\n * Entry point.\n *\n * @since 1.0\n * @deprecated Use Foo instead.\n */\n@java.lang.Deprecated\npublic interface Api {"));
    assert_eq!(text.matches("@deprecated Use Foo instead.").count(), 3);
    assert!(!text.contains("Deprecated API."));
}

/// Resources and non-UTF-8 sources come out byte-identical.
#[test]
fn resources_pass_through() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("c-sources.jar");
    let output = temp.path().join("c-sources-deprecated.jar");
    let manifest = b"Manifest-Version: 1.0\r\n\r\n".to_vec();
    let latin1 = b"class L { String s = \"\xE9\"; }\n".to_vec();
    write_jar(
        &input,
        &[
            ("META-INF/", b""),
            ("META-INF/MANIFEST.MF", &manifest),
            ("p/L.java", &latin1),
            ("p/messages.properties", b"greeting=hi\n"),
            ("p/A.java", b"class A {}\n"),
        ],
    );

    let report = process_source_archive(&input, &output, &SourceTransformer::default()).unwrap();

    assert_eq!(read_entry(&output, "META-INF/MANIFEST.MF"), manifest);
    assert_eq!(read_entry(&output, "p/L.java"), latin1);
    assert_eq!(read_entry(&output, "p/messages.properties"), b"greeting=hi\n".to_vec());
    assert_eq!(report.units, 1);
    assert_eq!(report.units_skipped, 1);
    assert_eq!(report.resources, 2);

    let names: Vec<String> = read_jar(&output).into_iter().map(|e| e.name).collect();
    assert!(names.contains(&"META-INF/".to_string()));
    assert_eq!(names.len(), 5);
}

/// Scratch directories are gone after success and after failure.
#[test]
fn scratch_space_is_cleaned_up() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("d-sources.jar");
    let output = temp.path().join("d-sources-deprecated.jar");
    write_source_jar(&input, &[("A.java", "class A {}\n")]);

    process_source_archive(&input, &output, &SourceTransformer::default()).unwrap();
    assert!(output.exists());
    assert!(!scratch_path(&input).exists());
    assert!(!scratch_path(&output).exists());

    let evil = temp.path().join("evil-sources.jar");
    let evil_out = temp.path().join("evil-sources-deprecated.jar");
    write_source_jar(&evil, &[("A.java", "class A {}\n"), ("../escape.java", "class E {}\n")]);

    let err = process_source_archive(&evil, &evil_out, &SourceTransformer::default()).unwrap_err();
    assert!(matches!(err, TransformError::UnsafeEntryName { .. }));
    assert!(!scratch_path(&evil).exists());
    assert!(!scratch_path(&evil_out).exists());
    assert!(!evil_out.exists());
    assert!(!temp.path().join("escape.java").exists());
}

/// Stale scratch directories from an interrupted run are replaced.
#[test]
fn stale_scratch_is_replaced() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("e-sources.jar");
    let output = temp.path().join("e-sources-deprecated.jar");
    write_source_jar(&input, &[("A.java", "class A {}\n")]);

    let stale = scratch_path(&output);
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("Leftover.java"), "class Leftover {}\n").unwrap();

    process_source_archive(&input, &output, &SourceTransformer::default()).unwrap();

    let names: Vec<String> = read_jar(&output).into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["A.java".to_string()]);
}

fn member_names() -> impl Strategy<Value = Vec<(bool, bool)>> {
    prop::collection::vec((any::<bool>(), any::<bool>()), 0..6)
}

proptest! {
    /// Rewriting rewritten source changes nothing.
    #[test]
    fn prop_source_marking_is_idempotent(members in member_names(), class_marked in any::<bool>()) {
        let mut source = String::new();
        if class_marked {
            source.push_str("@Deprecated\n");
        }
        source.push_str("public class Gen {\n");
        for (i, (is_method, marked)) in members.iter().enumerate() {
            if !*is_method {
                source.push_str(&format!("    /** Field {i}. */\n"));
            }
            if *marked {
                source.push_str("    @Deprecated\n");
            }
            if *is_method {
                source.push_str(&format!("    public void m{i}() {{}}\n"));
            } else {
                source.push_str(&format!("    public int f{i};\n"));
            }
        }
        source.push_str("}\n");

        let transformer = SourceTransformer::default();
        let (once, first) = transformer.transform_unit("Gen.java", &source).unwrap();
        let (twice, second) = transformer.transform_unit("Gen.java", &once).unwrap();

        let unmarked = members.iter().filter(|(_, m)| !*m).count() + usize::from(!class_marked);
        prop_assert_eq!(first.newly_marked(), unmarked);
        prop_assert_eq!(second.newly_marked(), 0);
        prop_assert_eq!(twice, once);
    }
}
