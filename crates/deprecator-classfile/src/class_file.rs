//! Class-file model
//!
//! Parsing keeps every structure this crate does not interpret (method
//! bodies, stack maps, signatures, constant values) as opaque attribute bytes,
//! so writing an unmodified model reproduces the input exactly.

use crate::annotation::Annotated;
use crate::bytes::{put_count, put_u16, put_u32, ByteReader};
use crate::constant_pool::ConstantPool;
use crate::error::{ClassFileError, ClassFileResult};
use crate::format::ClassFormat;

/// Class-file magic number
pub const MAGIC: u32 = 0xCAFE_BABE;

/// `ACC_PRIVATE`
pub const ACC_PRIVATE: u16 = 0x0002;
/// `ACC_STATIC`
pub const ACC_STATIC: u16 = 0x0008;

/// An attribute with an undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Constant-pool index of the attribute name
    pub name_index: u16,
    /// Attribute body
    pub info: Vec<u8>,
}

impl Attribute {
    /// Whether the attribute name equals `name`
    #[inline]
    #[must_use]
    pub fn is_named(&self, pool: &ConstantPool, name: &str) -> bool {
        pool.utf8_bytes(self.name_index)
            .is_ok_and(|bytes| bytes == name.as_bytes())
    }

    fn read(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        let name_index = reader.u16()?;
        let len = reader.u32()? as usize;
        let info = reader.take(len)?.to_vec();
        Ok(Self { name_index, info })
    }

    fn write(&self, out: &mut Vec<u8>) -> ClassFileResult<()> {
        put_u16(out, self.name_index);
        let len = u32::try_from(self.info.len())
            .map_err(|_| ClassFileError::too_many("attribute bytes", self.info.len()))?;
        put_u32(out, len);
        out.extend_from_slice(&self.info);
        Ok(())
    }
}

fn read_attributes(reader: &mut ByteReader<'_>) -> ClassFileResult<Vec<Attribute>> {
    let count = reader.u16()?;
    (0..count).map(|_| Attribute::read(reader)).collect()
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[Attribute]) -> ClassFileResult<()> {
    put_count(out, "attributes", attributes.len())?;
    attributes.iter().try_for_each(|a| a.write(out))
}

/// A field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl Member {
    /// Member name
    #[inline]
    #[must_use]
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Option<&'p str> {
        pool.utf8(self.name_index)
    }

    /// Member descriptor
    #[inline]
    #[must_use]
    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Option<&'p str> {
        pool.utf8(self.descriptor_index)
    }

    fn read(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        Ok(Self {
            access_flags: reader.u16()?,
            name_index: reader.u16()?,
            descriptor_index: reader.u16()?,
            attributes: read_attributes(reader)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> ClassFileResult<()> {
        put_u16(out, self.access_flags);
        put_u16(out, self.name_index);
        put_u16(out, self.descriptor_index);
        write_attributes(out, &self.attributes)
    }
}

impl Annotated for Member {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}

/// A complete class file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Parse a class file
    ///
    /// # Errors
    /// - `BadMagic` if the input is not a class file
    /// - `UnsupportedVersion` if `format` does not accept the file's version
    /// - `UnexpectedEof` / `TrailingBytes` / `InvalidConstantTag` on malformed input
    pub fn parse(bytes: &[u8], format: ClassFormat) -> ClassFileResult<Self> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor_version = reader.u16()?;
        let major_version = reader.u16()?;
        if !format.accepts(major_version) {
            return Err(ClassFileError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
                max_major: format.max_major_version(),
            });
        }

        let constant_pool = ConstantPool::read(&mut reader)?;
        let access_flags = reader.u16()?;
        let this_class = reader.u16()?;
        let super_class = reader.u16()?;
        let interface_count = reader.u16()?;
        let interfaces = (0..interface_count)
            .map(|_| reader.u16())
            .collect::<ClassFileResult<Vec<_>>>()?;
        let field_count = reader.u16()?;
        let fields = (0..field_count)
            .map(|_| Member::read(&mut reader))
            .collect::<ClassFileResult<Vec<_>>>()?;
        let method_count = reader.u16()?;
        let methods = (0..method_count)
            .map(|_| Member::read(&mut reader))
            .collect::<ClassFileResult<Vec<_>>>()?;
        let attributes = read_attributes(&mut reader)?;

        if reader.remaining() != 0 {
            return Err(ClassFileError::TrailingBytes(reader.remaining()));
        }

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Serialize the class file
    ///
    /// # Errors
    /// Returns `TooMany` when a table no longer fits the format's counters
    pub fn to_bytes(&self) -> ClassFileResult<Vec<u8>> {
        let mut out = Vec::new();
        put_u32(&mut out, MAGIC);
        put_u16(&mut out, self.minor_version);
        put_u16(&mut out, self.major_version);
        self.constant_pool.write(&mut out)?;
        put_u16(&mut out, self.access_flags);
        put_u16(&mut out, self.this_class);
        put_u16(&mut out, self.super_class);
        put_count(&mut out, "interfaces", self.interfaces.len())?;
        for interface in &self.interfaces {
            put_u16(&mut out, *interface);
        }
        put_count(&mut out, "fields", self.fields.len())?;
        self.fields.iter().try_for_each(|f| f.write(&mut out))?;
        put_count(&mut out, "methods", self.methods.len())?;
        self.methods.iter().try_for_each(|m| m.write(&mut out))?;
        write_attributes(&mut out, &self.attributes)?;
        Ok(out)
    }

    /// Internal name of this class (`com/example/A`)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Internal name of the superclass; `None` for `java/lang/Object` and modules
    #[inline]
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        if self.super_class == 0 {
            return None;
        }
        self.constant_pool.class_name(self.super_class)
    }

    /// Internal names of the direct superinterfaces
    #[must_use]
    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces
            .iter()
            .filter_map(|i| self.constant_pool.class_name(*i))
            .collect()
    }
}

impl Annotated for ClassFile {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}
