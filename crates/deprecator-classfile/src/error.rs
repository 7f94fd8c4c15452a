//! Error types for class-file decoding and encoding

/// Errors raised while reading or writing a class file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassFileError {
    /// Input does not start with `0xCAFEBABE`
    #[error("bad magic number: {0:#010x}")]
    BadMagic(u32),

    /// Input ended before a structure was complete
    #[error("unexpected end of input at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Class-file version newer than the configured format accepts
    #[error("unsupported class-file version {major}.{minor} (newest supported major: {max_major})")]
    UnsupportedVersion { major: u16, minor: u16, max_major: u16 },

    /// Unknown constant-pool tag
    #[error("invalid constant-pool tag {tag} at index {index}")]
    InvalidConstantTag { tag: u8, index: u16 },

    /// Constant-pool index out of range or pointing at the wrong kind of entry
    #[error("invalid constant-pool reference {index}: expected {expected}")]
    InvalidConstantIndex { index: u16, expected: &'static str },

    /// Unknown annotation element-value tag
    #[error("invalid annotation element tag {0:#04x}")]
    InvalidElementTag(u8),

    /// Bytes left over after the final attribute
    #[error("{0} trailing bytes after class file")]
    TrailingBytes(usize),

    /// A table grew beyond what the format can count
    #[error("too many {what}: {count}")]
    TooMany { what: &'static str, count: usize },
}

impl ClassFileError {
    /// Create an EOF error for a read of `needed` bytes at `offset`
    #[inline]
    #[must_use]
    pub fn eof(offset: usize, needed: usize) -> Self {
        Self::UnexpectedEof { offset, needed }
    }

    /// Create an overflow error for a table
    #[inline]
    #[must_use]
    pub fn too_many(what: &'static str, count: usize) -> Self {
        Self::TooMany { what, count }
    }
}

/// Result alias for class-file operations
pub type ClassFileResult<T> = Result<T, ClassFileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_magic_display() {
        let err = ClassFileError::BadMagic(0xDEAD_BEEF);
        assert_eq!(err.to_string(), "bad magic number: 0xdeadbeef");
    }

    #[test]
    fn version_display_names_ceiling() {
        let err = ClassFileError::UnsupportedVersion { major: 70, minor: 0, max_major: 62 };
        assert!(err.to_string().contains("newest supported major: 62"));
    }
}
