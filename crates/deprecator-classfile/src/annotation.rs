//! Runtime-visible annotations
//!
//! Only the annotation type is decoded; element values are kept as encoded
//! bytes and skipped structurally.

use crate::bytes::{put_count, ByteReader};
use crate::class_file::Attribute;
use crate::constant_pool::ConstantPool;
use crate::error::{ClassFileError, ClassFileResult};

/// Attribute name holding runtime-visible annotations
pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";

/// One encoded annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Constant-pool index of the field descriptor naming the annotation type
    pub type_index: u16,
    /// Full encoding, starting with `type_index`
    raw: Vec<u8>,
}

impl Annotation {
    /// Annotation with no element values
    #[must_use]
    pub fn marker(type_index: u16) -> Self {
        let mut raw = Vec::with_capacity(4);
        raw.extend_from_slice(&type_index.to_be_bytes());
        raw.extend_from_slice(&0u16.to_be_bytes());
        Self { type_index, raw }
    }

    /// Type descriptor, e.g. `Ljava/lang/Deprecated;`
    #[must_use]
    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Option<&'p str> {
        pool.utf8(self.type_index)
    }

    /// Encoded bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    fn read(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        let mut start = reader.clone();
        let before = reader.remaining();
        let type_index = reader.u16()?;
        skip_element_pairs(reader)?;
        let raw = start.take(before - reader.remaining())?.to_vec();
        Ok(Self { type_index, raw })
    }
}

fn skip_element_pairs(reader: &mut ByteReader<'_>) -> ClassFileResult<()> {
    let pairs = reader.u16()?;
    for _ in 0..pairs {
        reader.u16()?;
        skip_element_value(reader)?;
    }
    Ok(())
}

fn skip_element_value(reader: &mut ByteReader<'_>) -> ClassFileResult<()> {
    match reader.u8()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            reader.u16()?;
        }
        b'e' => {
            reader.u16()?;
            reader.u16()?;
        }
        b'@' => {
            reader.u16()?;
            skip_element_pairs(reader)?;
        }
        b'[' => {
            let values = reader.u16()?;
            for _ in 0..values {
                skip_element_value(reader)?;
            }
        }
        tag => return Err(ClassFileError::InvalidElementTag(tag)),
    }
    Ok(())
}

/// Decode the body of a `RuntimeVisibleAnnotations` attribute
///
/// # Errors
/// Returns an error when the body is truncated or malformed
pub fn decode_annotations(info: &[u8]) -> ClassFileResult<Vec<Annotation>> {
    let mut reader = ByteReader::new(info);
    let count = reader.u16()?;
    let mut annotations = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        annotations.push(Annotation::read(&mut reader)?);
    }
    if reader.remaining() != 0 {
        return Err(ClassFileError::TrailingBytes(reader.remaining()));
    }
    Ok(annotations)
}

/// Encode annotations as a `RuntimeVisibleAnnotations` body
///
/// # Errors
/// Returns `TooMany` when more than 65535 annotations are given
pub fn encode_annotations(annotations: &[Annotation]) -> ClassFileResult<Vec<u8>> {
    let mut out = Vec::with_capacity(2 + annotations.iter().map(|a| a.raw.len()).sum::<usize>());
    put_count(&mut out, "annotations", annotations.len())?;
    for annotation in annotations {
        out.extend_from_slice(&annotation.raw);
    }
    Ok(out)
}

/// Runtime-visible annotations found in an attribute table
///
/// # Errors
/// Returns an error when an annotation attribute is malformed
pub fn visible_annotations(attributes: &[Attribute], pool: &ConstantPool) -> ClassFileResult<Vec<Annotation>> {
    let mut found = Vec::new();
    for attribute in attributes {
        if attribute.is_named(pool, RUNTIME_VISIBLE_ANNOTATIONS) {
            found.extend(decode_annotations(&attribute.info)?);
        }
    }
    Ok(found)
}

/// Append a marker annotation of type `descriptor` to an attribute table
///
/// The annotation goes into the first existing `RuntimeVisibleAnnotations`
/// attribute, or into a new one appended to the table.
///
/// # Errors
/// Returns an error when the pool is full or an existing attribute is malformed
pub fn add_visible_annotation(
    attributes: &mut Vec<Attribute>,
    pool: &mut ConstantPool,
    descriptor: &str,
) -> ClassFileResult<()> {
    let type_index = pool.intern_utf8(descriptor)?;
    let marker = Annotation::marker(type_index);

    match attributes.iter_mut().find(|a| a.is_named(pool, RUNTIME_VISIBLE_ANNOTATIONS)) {
        Some(attribute) => {
            let mut annotations = decode_annotations(&attribute.info)?;
            annotations.push(marker);
            attribute.info = encode_annotations(&annotations)?;
        }
        None => {
            let name_index = pool.intern_utf8(RUNTIME_VISIBLE_ANNOTATIONS)?;
            let info = encode_annotations(&[marker])?;
            attributes.push(Attribute { name_index, info });
        }
    }
    Ok(())
}

/// Anything that owns an attribute table (class, field, method)
pub trait Annotated {
    /// Attribute table
    fn attributes(&self) -> &[Attribute];

    /// Mutable attribute table
    fn attributes_mut(&mut self) -> &mut Vec<Attribute>;

    /// Runtime-visible annotations, in declaration order
    ///
    /// # Errors
    /// Returns an error when an annotation attribute is malformed
    fn visible_annotations(&self, pool: &ConstantPool) -> ClassFileResult<Vec<Annotation>> {
        visible_annotations(self.attributes(), pool)
    }

    /// Descriptors of the runtime-visible annotations
    ///
    /// # Errors
    /// Returns an error when an annotation attribute is malformed
    fn visible_annotation_descriptors<'p>(&self, pool: &'p ConstantPool) -> ClassFileResult<Vec<&'p str>> {
        Ok(self
            .visible_annotations(pool)?
            .iter()
            .filter_map(|a| a.descriptor(pool))
            .collect())
    }

    /// Append a marker annotation of type `descriptor`
    ///
    /// # Errors
    /// Returns an error when the pool is full or an existing attribute is malformed
    fn add_visible_annotation(&mut self, pool: &mut ConstantPool, descriptor: &str) -> ClassFileResult<()> {
        add_visible_annotation(self.attributes_mut(), pool, descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_annotation_body(pool: &mut ConstantPool) -> Vec<u8> {
        let outer = pool.intern_utf8("Lcom/example/Outer;").unwrap();
        let value = pool.intern_utf8("value").unwrap();
        let inner = pool.intern_utf8("Lcom/example/Inner;").unwrap();
        let enum_type = pool.intern_utf8("Lcom/example/Mode;").unwrap();
        let constant = pool.intern_utf8("FAST").unwrap();

        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&outer.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&value.to_be_bytes());
        // value = { @Inner(value = Mode.FAST) }
        body.push(b'[');
        body.extend_from_slice(&1u16.to_be_bytes());
        body.push(b'@');
        body.extend_from_slice(&inner.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&value.to_be_bytes());
        body.push(b'e');
        body.extend_from_slice(&enum_type.to_be_bytes());
        body.extend_from_slice(&constant.to_be_bytes());
        body
    }

    #[test]
    fn decodes_nested_element_values() {
        let mut pool = ConstantPool::new();
        let body = nested_annotation_body(&mut pool);
        let annotations = decode_annotations(&body).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].descriptor(&pool), Some("Lcom/example/Outer;"));
        assert_eq!(encode_annotations(&annotations).unwrap(), body);
    }

    #[test]
    fn marker_has_no_elements() {
        let marker = Annotation::marker(0x0102);
        assert_eq!(marker.as_bytes(), &[0x01, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn invalid_element_tag_is_rejected() {
        let body = [0x00, 0x01, 0x00, 0x05, 0x00, 0x01, 0x00, 0x06, b'?'];
        assert_eq!(decode_annotations(&body), Err(ClassFileError::InvalidElementTag(b'?')));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let body = [0x00, 0x00, 0xFF];
        assert_eq!(decode_annotations(&body), Err(ClassFileError::TrailingBytes(1)));
    }
}
