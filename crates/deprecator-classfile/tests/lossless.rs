//! Class-file codec properties.
//!
//! Core guarantees exercised here:
//! - Writing a parsed model reproduces the input bytes exactly.
//! - Arbitrary input never panics the reader.
//! - Appending a marker leaves every other attribute byte-identical.

use deprecator_classfile::{Annotated, Attribute, ClassFile, ClassFormat, ConstantPool, Member};
use proptest::prelude::*;

const DEPRECATED: &str = "Ljava/lang/Deprecated;";

fn member_names() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    prop::collection::vec(("[a-z][a-zA-Z0-9_]{0,12}", prop::collection::vec(any::<u8>(), 0..32)), 0..6)
}

fn build(fields: &[(String, Vec<u8>)], methods: &[(String, Vec<u8>)]) -> ClassFile {
    let mut pool = ConstantPool::new();
    let this_class = pool.intern_class("com/example/Generated").unwrap();
    let super_class = pool.intern_class("java/lang/Object").unwrap();
    let opaque = pool.intern_utf8("Opaque").unwrap();

    let mut member = |name: &str, descriptor: &str, body: &[u8]| Member {
        access_flags: 0x0001,
        name_index: pool.intern_utf8(name).unwrap(),
        descriptor_index: pool.intern_utf8(descriptor).unwrap(),
        attributes: vec![Attribute { name_index: opaque, info: body.to_vec() }],
    };
    let fields = fields.iter().map(|(name, body)| member(name, "I", body)).collect();
    let methods = methods.iter().map(|(name, body)| member(name, "()V", body)).collect();

    ClassFile {
        minor_version: 0,
        major_version: 52,
        constant_pool: pool,
        access_flags: 0x0021,
        this_class,
        super_class,
        interfaces: Vec::new(),
        fields,
        methods,
        attributes: Vec::new(),
    }
}

proptest! {
    /// Parsing then writing is the identity on well-formed class files.
    #[test]
    fn parse_then_write_is_identity(fields in member_names(), methods in member_names()) {
        let bytes = build(&fields, &methods).to_bytes().unwrap();
        let parsed = ClassFile::parse(&bytes, ClassFormat::default()).unwrap();
        prop_assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    /// Garbage is an error, never a panic.
    #[test]
    fn garbage_never_panics(mut bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        if bytes.len() >= 4 {
            bytes[..4].copy_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        }
        let _ = ClassFile::parse(&bytes, ClassFormat::default());
    }

    /// Marking every method touches only the annotation attributes.
    #[test]
    fn marking_preserves_other_attributes(methods in member_names()) {
        let mut class = build(&[], &methods);
        let ClassFile { constant_pool, methods: members, .. } = &mut class;
        for method in members.iter_mut() {
            method.add_visible_annotation(constant_pool, DEPRECATED).unwrap();
        }

        let parsed = ClassFile::parse(&class.to_bytes().unwrap(), ClassFormat::default()).unwrap();
        for (index, (_, body)) in methods.iter().enumerate() {
            let method = &parsed.methods[index];
            prop_assert_eq!(&method.attributes[0].info, body);
            prop_assert_eq!(
                method.visible_annotation_descriptors(&parsed.constant_pool).unwrap(),
                vec![DEPRECATED]
            );
        }
    }
}
