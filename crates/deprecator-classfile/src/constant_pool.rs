//! Constant pool
//!
//! Entries are kept in their encoded form so that a read/write cycle is
//! lossless. New entries are only ever appended, which keeps every existing
//! index (and therefore every method body) valid.

use crate::bytes::{put_u16, put_u32, ByteReader};
use crate::error::{ClassFileError, ClassFileResult};

/// A single constant-pool entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Modified UTF-8 bytes, stored as encoded
    Utf8(Vec<u8>),
    Integer(u32),
    Float(u32),
    Long(u64),
    Double(u64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Slot 0 and the second slot of `Long`/`Double` entries
    Unusable,
}

impl Constant {
    /// Whether this entry occupies two pool slots
    #[inline]
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }

    fn read(reader: &mut ByteReader<'_>, index: u16) -> ClassFileResult<Self> {
        let tag = reader.u8()?;
        let constant = match tag {
            1 => {
                let len = usize::from(reader.u16()?);
                Constant::Utf8(reader.take(len)?.to_vec())
            }
            3 => Constant::Integer(reader.u32()?),
            4 => Constant::Float(reader.u32()?),
            5 => Constant::Long(reader.u64()?),
            6 => Constant::Double(reader.u64()?),
            7 => Constant::Class { name_index: reader.u16()? },
            8 => Constant::String { string_index: reader.u16()? },
            9 => Constant::FieldRef { class_index: reader.u16()?, name_and_type_index: reader.u16()? },
            10 => Constant::MethodRef { class_index: reader.u16()?, name_and_type_index: reader.u16()? },
            11 => Constant::InterfaceMethodRef {
                class_index: reader.u16()?,
                name_and_type_index: reader.u16()?,
            },
            12 => Constant::NameAndType { name_index: reader.u16()?, descriptor_index: reader.u16()? },
            15 => Constant::MethodHandle { reference_kind: reader.u8()?, reference_index: reader.u16()? },
            16 => Constant::MethodType { descriptor_index: reader.u16()? },
            17 => Constant::Dynamic { bootstrap_index: reader.u16()?, name_and_type_index: reader.u16()? },
            18 => Constant::InvokeDynamic {
                bootstrap_index: reader.u16()?,
                name_and_type_index: reader.u16()?,
            },
            19 => Constant::Module { name_index: reader.u16()? },
            20 => Constant::Package { name_index: reader.u16()? },
            tag => return Err(ClassFileError::InvalidConstantTag { tag, index }),
        };
        Ok(constant)
    }

    fn write(&self, out: &mut Vec<u8>) -> ClassFileResult<()> {
        match self {
            Constant::Utf8(bytes) => {
                out.push(1);
                let len = u16::try_from(bytes.len())
                    .map_err(|_| ClassFileError::too_many("utf8 bytes", bytes.len()))?;
                put_u16(out, len);
                out.extend_from_slice(bytes);
            }
            Constant::Integer(v) => {
                out.push(3);
                put_u32(out, *v);
            }
            Constant::Float(v) => {
                out.push(4);
                put_u32(out, *v);
            }
            Constant::Long(v) => {
                out.push(5);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Constant::Double(v) => {
                out.push(6);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Constant::Class { name_index } => {
                out.push(7);
                put_u16(out, *name_index);
            }
            Constant::String { string_index } => {
                out.push(8);
                put_u16(out, *string_index);
            }
            Constant::FieldRef { class_index, name_and_type_index } => {
                out.push(9);
                put_u16(out, *class_index);
                put_u16(out, *name_and_type_index);
            }
            Constant::MethodRef { class_index, name_and_type_index } => {
                out.push(10);
                put_u16(out, *class_index);
                put_u16(out, *name_and_type_index);
            }
            Constant::InterfaceMethodRef { class_index, name_and_type_index } => {
                out.push(11);
                put_u16(out, *class_index);
                put_u16(out, *name_and_type_index);
            }
            Constant::NameAndType { name_index, descriptor_index } => {
                out.push(12);
                put_u16(out, *name_index);
                put_u16(out, *descriptor_index);
            }
            Constant::MethodHandle { reference_kind, reference_index } => {
                out.push(15);
                out.push(*reference_kind);
                put_u16(out, *reference_index);
            }
            Constant::MethodType { descriptor_index } => {
                out.push(16);
                put_u16(out, *descriptor_index);
            }
            Constant::Dynamic { bootstrap_index, name_and_type_index } => {
                out.push(17);
                put_u16(out, *bootstrap_index);
                put_u16(out, *name_and_type_index);
            }
            Constant::InvokeDynamic { bootstrap_index, name_and_type_index } => {
                out.push(18);
                put_u16(out, *bootstrap_index);
                put_u16(out, *name_and_type_index);
            }
            Constant::Module { name_index } => {
                out.push(19);
                put_u16(out, *name_index);
            }
            Constant::Package { name_index } => {
                out.push(20);
                put_u16(out, *name_index);
            }
            Constant::Unusable => {}
        }
        Ok(())
    }
}

/// Indexed constant pool (index 0 is reserved)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Empty pool containing only the reserved slot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { entries: vec![Constant::Unusable] }
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable);
        let mut index = 1u16;
        while index < count {
            let constant = Constant::read(reader, index)?;
            let wide = constant.is_wide();
            entries.push(constant);
            index = index.saturating_add(1);
            if wide {
                entries.push(Constant::Unusable);
                index = index.saturating_add(1);
            }
        }
        // A wide entry in the last slot overshoots `count`; the JVM rejects that too.
        if entries.len() != usize::from(count) {
            return Err(ClassFileError::InvalidConstantIndex { index: count, expected: "pool slot" });
        }
        Ok(Self { entries })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> ClassFileResult<()> {
        crate::bytes::put_count(out, "constant-pool entries", self.entries.len())?;
        for constant in &self.entries[1..] {
            constant.write(out)?;
        }
        Ok(())
    }

    /// Number of slots including the reserved slot 0 (the encoded `constant_pool_count`)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool holds no usable entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Entry at `index`, if any
    #[inline]
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(usize::from(index))
    }

    /// Raw UTF-8 entry bytes at `index`
    ///
    /// # Errors
    /// Returns `InvalidConstantIndex` when the entry is missing or not a `Utf8` entry
    pub fn utf8_bytes(&self, index: u16) -> ClassFileResult<&[u8]> {
        match self.get(index) {
            Some(Constant::Utf8(bytes)) => Ok(bytes),
            _ => Err(ClassFileError::InvalidConstantIndex { index, expected: "Utf8" }),
        }
    }

    /// UTF-8 entry at `index` as `&str`
    ///
    /// Modified UTF-8 that is not valid standard UTF-8 (embedded NULs,
    /// surrogate pairs) yields `None`; callers compare such names byte-wise.
    #[must_use]
    pub fn utf8(&self, index: u16) -> Option<&str> {
        self.utf8_bytes(index).ok().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Internal class name referenced by a `Class` entry
    #[must_use]
    pub fn class_name(&self, index: u16) -> Option<&str> {
        match self.get(index) {
            Some(Constant::Class { name_index }) => self.utf8(*name_index),
            _ => None,
        }
    }

    /// Index of an existing `Utf8` entry equal to `value`
    #[must_use]
    pub fn find_utf8(&self, value: &str) -> Option<u16> {
        self.entries
            .iter()
            .position(|c| matches!(c, Constant::Utf8(bytes) if bytes.as_slice() == value.as_bytes()))
            .and_then(|pos| u16::try_from(pos).ok())
    }

    /// Index of a `Utf8` entry for `value`, appending one if none exists
    ///
    /// Only strings without NUL characters are accepted, since those encode
    /// identically in standard and modified UTF-8.
    ///
    /// # Errors
    /// Returns `TooMany` when the pool is full
    pub fn intern_utf8(&mut self, value: &str) -> ClassFileResult<u16> {
        if let Some(index) = self.find_utf8(value) {
            return Ok(index);
        }
        debug_assert!(!value.contains('\0'));
        self.push(Constant::Utf8(value.as_bytes().to_vec()))
    }

    /// Index of a `Class` entry naming `internal_name`, appending one if needed
    ///
    /// # Errors
    /// Returns `TooMany` when the pool is full
    pub fn intern_class(&mut self, internal_name: &str) -> ClassFileResult<u16> {
        let name_index = self.intern_utf8(internal_name)?;
        let existing = self
            .entries
            .iter()
            .position(|c| matches!(c, Constant::Class { name_index: n } if *n == name_index));
        match existing.and_then(|pos| u16::try_from(pos).ok()) {
            Some(index) => Ok(index),
            None => self.push(Constant::Class { name_index }),
        }
    }

    /// Append an entry, returning its index
    ///
    /// # Errors
    /// Returns `TooMany` when the pool would exceed 65535 slots
    pub fn push(&mut self, constant: Constant) -> ClassFileResult<u16> {
        let slots = if constant.is_wide() { 2 } else { 1 };
        let new_len = self.entries.len() + slots;
        if new_len > usize::from(u16::MAX) {
            return Err(ClassFileError::too_many("constant-pool entries", new_len));
        }
        let index = u16::try_from(self.entries.len())
            .map_err(|_| ClassFileError::too_many("constant-pool entries", new_len))?;
        let wide = constant.is_wide();
        self.entries.push(constant);
        if wide {
            self.entries.push(Constant::Unusable);
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(pool: &ConstantPool) -> Vec<u8> {
        let mut out = Vec::new();
        pool.write(&mut out).unwrap();
        out
    }

    #[test]
    fn intern_reuses_existing_entries() {
        let mut pool = ConstantPool::new();
        let a = pool.intern_utf8("Ljava/lang/Deprecated;").unwrap();
        let b = pool.intern_utf8("Ljava/lang/Deprecated;").unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn wide_entries_take_two_slots() {
        let mut pool = ConstantPool::new();
        let long = pool.push(Constant::Long(7)).unwrap();
        let next = pool.intern_utf8("x").unwrap();
        assert_eq!(long, 1);
        assert_eq!(next, 3);
        assert_eq!(pool.get(2), Some(&Constant::Unusable));
    }

    #[test]
    fn read_write_is_lossless() {
        let mut pool = ConstantPool::new();
        pool.intern_class("com/example/A").unwrap();
        pool.push(Constant::Double(0x4009_21FB_5444_2D18)).unwrap();
        pool.push(Constant::MethodHandle { reference_kind: 6, reference_index: 2 }).unwrap();
        let bytes = encoded(&pool);

        let mut reader = ByteReader::new(&bytes);
        let decoded = ConstantPool::read(&mut reader).unwrap();
        assert_eq!(decoded, pool);
        assert_eq!(encoded(&decoded), bytes);
    }

    #[test]
    fn class_name_resolves_through_utf8() {
        let mut pool = ConstantPool::new();
        let class = pool.intern_class("com/example/A").unwrap();
        assert_eq!(pool.class_name(class), Some("com/example/A"));
        assert_eq!(pool.class_name(0), None);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes = [0x00, 0x02, 0x02, 0x00];
        let mut reader = ByteReader::new(&bytes);
        let err = ConstantPool::read(&mut reader).unwrap_err();
        assert_eq!(err, ClassFileError::InvalidConstantTag { tag: 2, index: 1 });
    }
}
