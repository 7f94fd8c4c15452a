//! Class-file format level
//!
//! The format level is an explicit value handed to every reader call. There is
//! no process-wide version constant.

/// Format level accepted by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassFormat {
    max_major_version: u16,
}

impl ClassFormat {
    /// Java 8 (major 52)
    pub const JAVA_8: Self = Self::with_max_major(52);
    /// Java 11 (major 55)
    pub const JAVA_11: Self = Self::with_max_major(55);
    /// Java 17 (major 61)
    pub const JAVA_17: Self = Self::with_max_major(61);
    /// Java 18 (major 62)
    pub const JAVA_18: Self = Self::with_max_major(62);

    /// Format that accepts class files up to `max_major_version`
    #[inline]
    #[must_use]
    pub const fn with_max_major(max_major_version: u16) -> Self {
        Self { max_major_version }
    }

    /// Format for a Java feature release (8, 11, 17, ...)
    ///
    /// Release `n` maps to major version `n + 44`.
    #[inline]
    #[must_use]
    pub const fn for_release(release: u16) -> Self {
        Self::with_max_major(release.saturating_add(44))
    }

    /// Newest accepted major version
    #[inline]
    #[must_use]
    pub const fn max_major_version(&self) -> u16 {
        self.max_major_version
    }

    /// Whether a class file of `major` can be read
    #[inline]
    #[must_use]
    pub const fn accepts(&self, major: u16) -> bool {
        major <= self.max_major_version
    }
}

impl Default for ClassFormat {
    fn default() -> Self {
        Self::JAVA_18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_maps_to_major() {
        assert_eq!(ClassFormat::for_release(17), ClassFormat::JAVA_17);
        assert_eq!(ClassFormat::for_release(8).max_major_version(), 52);
    }

    #[test]
    fn default_accepts_java_18() {
        let format = ClassFormat::default();
        assert!(format.accepts(62));
        assert!(!format.accepts(63));
    }
}
