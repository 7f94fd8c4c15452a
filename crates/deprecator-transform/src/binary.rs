//! Binary transformer
//!
//! Marks one compiled code unit: the type itself, then every direct method
//! and field. Nested types live in their own code units and are handled when
//! the archive reaches them.

use crate::error::{TransformError, TransformResult};
use crate::hierarchy::InheritanceProvider;
use crate::marker::{should_mark, AnnotationDescriptor, Marker};
use crate::report::{Category, UnitReport};
use deprecator_classfile::{
    add_visible_annotation, visible_annotations, Attribute, ClassFile, ClassFileResult, ClassFormat, ConstantPool,
};
use std::sync::Arc;

/// File suffix of compiled code units
pub const CODE_UNIT_SUFFIX: &str = ".class";

/// Whether an archive entry name denotes a compiled code unit
#[inline]
#[must_use]
pub fn is_code_unit(entry_name: &str) -> bool {
    entry_name.ends_with(CODE_UNIT_SUFFIX) && !entry_name.ends_with('/')
}

/// One compiled unit read from an archive
#[derive(Debug, Clone)]
pub struct CodeUnit {
    /// Archive entry name
    pub name: String,
    /// Modification time carried by the archive entry
    pub timestamp: zip::DateTime,
    /// Class-file bytes
    pub bytes: Vec<u8>,
}

impl CodeUnit {
    /// Same identity with new content
    #[must_use]
    pub fn with_bytes(self, bytes: Vec<u8>) -> Self {
        Self { bytes, ..self }
    }
}

/// Adds the deprecation marker to compiled code units
#[derive(Clone)]
pub struct BinaryTransformer {
    format: ClassFormat,
    hierarchy: Arc<dyn InheritanceProvider>,
    marker: Marker,
}

impl std::fmt::Debug for BinaryTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryTransformer")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl BinaryTransformer {
    /// Create a transformer for one job
    #[must_use]
    pub fn new(format: ClassFormat, hierarchy: Arc<dyn InheritanceProvider>) -> Self {
        Self {
            format,
            hierarchy,
            marker: Marker::binary(),
        }
    }

    /// Class-file versions this transformer accepts
    #[inline]
    #[must_use]
    pub fn format(&self) -> ClassFormat {
        self.format
    }

    /// Mark one code unit
    ///
    /// A unit that needs no marker is returned with its original bytes.
    ///
    /// # Errors
    /// Fails when the unit cannot be parsed or re-serialized
    pub fn transform(&self, unit: CodeUnit) -> TransformResult<(CodeUnit, UnitReport)> {
        let mut class = ClassFile::parse(&unit.bytes, self.format).map_err(|e| TransformError::class_file(&unit.name, e))?;
        let report = self
            .mark_class(&mut class)
            .map_err(|e| TransformError::class_file(&unit.name, e))?;

        if !report.changed() {
            tracing::debug!("{} already fully marked", unit.name);
            return Ok((unit, report));
        }

        let bytes = class.to_bytes().map_err(|e| TransformError::class_file(&unit.name, e))?;
        tracing::debug!(
            "Marked {}: {} declarations, {} overriding methods",
            unit.name,
            report.newly_marked(),
            report.overriding_methods
        );
        Ok((unit.with_bytes(bytes), report))
    }

    fn mark_class(&self, class: &mut ClassFile) -> ClassFileResult<UnitReport> {
        let owner = class.name().unwrap_or_default().to_string();
        let descriptor = self.marker.descriptor();
        let mut report = UnitReport::default();

        let ClassFile {
            constant_pool,
            attributes,
            methods,
            fields,
            ..
        } = class;

        let marked = mark_attributes(attributes, constant_pool, descriptor)?;
        report.record(Category::Type, marked);

        for method in methods.iter_mut() {
            let marked = mark_attributes(&mut method.attributes, constant_pool, descriptor)?;
            report.record(Category::Method, marked);
            if !marked {
                continue;
            }
            let (Some(name), Some(desc)) = (method.name(constant_pool), method.descriptor(constant_pool)) else {
                continue;
            };
            if self.hierarchy.overrides(&owner, name, desc) {
                tracing::debug!("{}.{}{} overrides an inherited method", owner, name, desc);
                report.overriding_methods += 1;
            }
        }

        for field in fields.iter_mut() {
            let marked = mark_attributes(&mut field.attributes, constant_pool, descriptor)?;
            report.record(Category::Field, marked);
        }

        Ok(report)
    }
}

/// Append the marker to one attribute table unless it is already there
fn mark_attributes(attributes: &mut Vec<Attribute>, pool: &mut ConstantPool, descriptor: &str) -> ClassFileResult<bool> {
    let existing = visible_annotations(attributes, pool)?;
    let needed = should_mark(existing.iter().filter_map(|a| a.descriptor(pool)).map(AnnotationDescriptor));
    if needed {
        add_visible_annotation(attributes, pool, descriptor)?;
    }
    Ok(needed)
}
