//! Testing utilities for the Deprecator workspace
//!
//! Class-file fixtures, archive writers/readers, and annotation inspection.

#![allow(missing_docs)]

use deprecator_classfile::{
    add_visible_annotation, Annotated, Attribute, ClassFile, ClassFormat, ConstantPool, Member,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub const DEPRECATED: &str = "Ljava/lang/Deprecated;";

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;

#[derive(Debug, Clone)]
struct MemberShape {
    name: String,
    descriptor: String,
    access_flags: u16,
    annotations: Vec<String>,
}

/// Builds minimal but valid class files
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    major_version: u16,
    annotations: Vec<String>,
    fields: Vec<MemberShape>,
    methods: Vec<MemberShape>,
}

impl ClassBuilder {
    /// Public class extending `java/lang/Object`, class-file version 52
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            major_version: 52,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn major_version(mut self, major: u16) -> Self {
        self.major_version = major;
        self
    }

    /// Add a runtime-visible annotation to the class
    pub fn annotated(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    pub fn deprecated(self) -> Self {
        self.annotated(DEPRECATED)
    }

    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.field_with(name, descriptor, &[])
    }

    pub fn deprecated_field(self, name: &str, descriptor: &str) -> Self {
        self.field_with(name, descriptor, &[DEPRECATED])
    }

    pub fn field_with(mut self, name: &str, descriptor: &str, annotations: &[&str]) -> Self {
        self.fields.push(shape(name, descriptor, ACC_PUBLIC, annotations));
        self
    }

    /// Public method with a trivial body
    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with(name, descriptor, ACC_PUBLIC, &[])
    }

    pub fn deprecated_method(self, name: &str, descriptor: &str) -> Self {
        self.method_with(name, descriptor, ACC_PUBLIC, &[DEPRECATED])
    }

    pub fn method_with(mut self, name: &str, descriptor: &str, access_flags: u16, annotations: &[&str]) -> Self {
        self.methods.push(shape(name, descriptor, access_flags, annotations));
        self
    }

    /// Class-file model
    pub fn build(&self) -> ClassFile {
        let mut pool = ConstantPool::new();
        let this_class = pool.intern_class(&self.name).unwrap();
        let super_class = match &self.super_name {
            Some(name) => pool.intern_class(name).unwrap(),
            None => 0,
        };
        let interfaces = self
            .interfaces
            .iter()
            .map(|i| pool.intern_class(i).unwrap())
            .collect();

        let fields = self.fields.iter().map(|f| member(&mut pool, f, false)).collect();
        let methods = self.methods.iter().map(|m| member(&mut pool, m, true)).collect();

        let mut attributes = Vec::new();
        for descriptor in &self.annotations {
            add_visible_annotation(&mut attributes, &mut pool, descriptor).unwrap();
        }
        let source_file = pool.intern_utf8("SourceFile").unwrap();
        let file_name = pool.intern_utf8("Fixture.java").unwrap();
        attributes.push(Attribute {
            name_index: source_file,
            info: file_name.to_be_bytes().to_vec(),
        });

        ClassFile {
            minor_version: 0,
            major_version: self.major_version,
            constant_pool: pool,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        }
    }

    /// Encoded class file
    pub fn to_bytes(&self) -> Vec<u8> {
        self.build().to_bytes().unwrap()
    }

    /// Archive entry name, e.g. `com/example/A.class`
    pub fn entry_name(&self) -> String {
        format!("{}.class", self.name)
    }
}

fn shape(name: &str, descriptor: &str, access_flags: u16, annotations: &[&str]) -> MemberShape {
    MemberShape {
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        access_flags,
        annotations: annotations.iter().map(|a| (*a).to_string()).collect(),
    }
}

fn member(pool: &mut ConstantPool, shape: &MemberShape, with_code: bool) -> Member {
    let mut attributes = Vec::new();
    if with_code {
        // max_stack 1, max_locals 1, `return`, no handlers, no attributes
        let code = pool.intern_utf8("Code").unwrap();
        attributes.push(Attribute {
            name_index: code,
            info: vec![0, 1, 0, 1, 0, 0, 0, 1, 0xB1, 0, 0, 0, 0],
        });
    }
    for descriptor in &shape.annotations {
        add_visible_annotation(&mut attributes, pool, descriptor).unwrap();
    }
    Member {
        access_flags: shape.access_flags,
        name_index: pool.intern_utf8(&shape.name).unwrap(),
        descriptor_index: pool.intern_utf8(&shape.descriptor).unwrap(),
        attributes,
    }
}

/// Runtime-visible annotation descriptors of a class and its members
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassAnnotations {
    pub class: Vec<String>,
    /// Keyed by `name + descriptor`
    pub methods: BTreeMap<String, Vec<String>>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ClassAnnotations {
    pub fn class_markers(&self) -> usize {
        count_deprecated(&self.class)
    }

    pub fn method_markers(&self, signature: &str) -> usize {
        self.methods.get(signature).map_or(0, |a| count_deprecated(a))
    }

    pub fn field_markers(&self, name: &str) -> usize {
        self.fields.get(name).map_or(0, |a| count_deprecated(a))
    }
}

pub fn count_deprecated(descriptors: &[String]) -> usize {
    descriptors.iter().filter(|d| d.as_str() == DEPRECATED).count()
}

/// Parse a class file and list its annotations
pub fn class_annotations(bytes: &[u8]) -> ClassAnnotations {
    let class = ClassFile::parse(bytes, ClassFormat::default()).unwrap();
    let pool = &class.constant_pool;
    let descriptors = |owner: &dyn Annotated| -> Vec<String> {
        owner
            .visible_annotation_descriptors(pool)
            .unwrap()
            .into_iter()
            .map(str::to_string)
            .collect()
    };

    ClassAnnotations {
        class: descriptors(&class),
        methods: class
            .methods
            .iter()
            .map(|m| (format!("{}{}", m.name(pool).unwrap(), m.descriptor(pool).unwrap()), descriptors(m)))
            .collect(),
        fields: class
            .fields
            .iter()
            .map(|f| (f.name(pool).unwrap().to_string(), descriptors(f)))
            .collect(),
    }
}

/// Fixed entry timestamp used by fixture archives
pub fn fixture_timestamp() -> DateTime {
    DateTime::from_date_and_time(2020, 5, 17, 10, 30, 0).unwrap()
}

/// Write an archive whose entries all carry [`fixture_timestamp`]
///
/// Names ending in `/` become directory entries.
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    write_jar_with(path, entries, CompressionMethod::Deflated);
}

pub fn write_jar_with(path: &Path, entries: &[(&str, &[u8])], compression: CompressionMethod) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default()
        .compression_method(compression)
        .last_modified_time(fixture_timestamp());
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Source archive from `(entry name, text)` pairs
pub fn write_source_jar(path: &Path, units: &[(&str, &str)]) {
    let entries: Vec<(&str, &[u8])> = units.iter().map(|(n, t)| (*n, t.as_bytes())).collect();
    write_jar(path, &entries);
}

/// One entry read back from an archive
#[derive(Debug, Clone, PartialEq)]
pub struct JarEntry {
    pub name: String,
    pub bytes: Vec<u8>,
    /// `(datepart, timepart)` in MS-DOS encoding
    pub timestamp: (u16, u16),
    pub compression: CompressionMethod,
}

/// All entries of an archive, in archive order
pub fn read_jar(path: &Path) -> Vec<JarEntry> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            let modified = entry.last_modified();
            JarEntry {
                name: entry.name().to_string(),
                bytes,
                timestamp: (modified.datepart(), modified.timepart()),
                compression: entry.compression(),
            }
        })
        .collect()
}

/// Entry bytes by name
pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    read_jar(path)
        .into_iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("{name} missing from {}", path.display()))
        .bytes
}

/// Entry text by name
pub fn read_text_entry(path: &Path, name: &str) -> String {
    String::from_utf8(read_entry(path, name)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_output_parses() {
        let bytes = ClassBuilder::new("com/example/A")
            .deprecated()
            .method("foo", "()V")
            .deprecated_field("bar", "I")
            .to_bytes();
        let annotations = class_annotations(&bytes);
        assert_eq!(annotations.class_markers(), 1);
        assert_eq!(annotations.method_markers("foo()V"), 0);
        assert_eq!(annotations.field_markers("bar"), 1);
    }
}
