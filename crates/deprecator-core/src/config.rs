//! Run configuration

use crate::error::DeprecatorError;
use deprecator_classfile::ClassFormat;
use deprecator_transform::source::DEFAULT_JAVA_RELEASE;
use deprecator_transform::KindFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Worker pool size when none is given
pub const DEFAULT_PARALLELISM: usize = 4;

/// How long shutdown waits for workers before abandoning them
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Deprecator configuration
#[derive(Debug, Clone)]
pub struct DeprecatorConfig {
    /// Worker pool size
    pub parallelism: usize,
    /// Documentation message for source jobs; `None` uses the default text
    pub message: Option<String>,
    /// Newest class-file version accepted in binary jobs
    pub class_format: ClassFormat,
    /// Language level for source jobs
    pub java_release: u16,
    /// Declaration kinds marked in source jobs
    pub kinds: KindFilter,
    /// Extra archives consulted for type hierarchy in binary jobs
    pub classpath: Vec<PathBuf>,
    /// Shutdown grace period
    pub shutdown_grace: Duration,
}

impl DeprecatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With worker pool size
    #[inline]
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// With documentation message
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// With class-file version ceiling
    #[inline]
    #[must_use]
    pub fn with_class_format(mut self, format: ClassFormat) -> Self {
        self.class_format = format;
        self
    }

    /// With source language level
    #[inline]
    #[must_use]
    pub fn with_java_release(mut self, release: u16) -> Self {
        self.java_release = release;
        self
    }

    /// With declaration kind filter
    #[inline]
    #[must_use]
    pub fn with_kinds(mut self, kinds: KindFilter) -> Self {
        self.kinds = kinds;
        self
    }

    /// With extra classpath archives
    #[inline]
    #[must_use]
    pub fn with_classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    /// With shutdown grace period
    #[inline]
    #[must_use]
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Check values that would make the run impossible
    ///
    /// # Errors
    /// Returns [`DeprecatorError::InvalidParallelism`] for a pool size of zero
    pub fn validate(&self) -> Result<(), DeprecatorError> {
        if self.parallelism == 0 {
            return Err(DeprecatorError::InvalidParallelism);
        }
        Ok(())
    }
}

impl Default for DeprecatorConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            message: None,
            class_format: ClassFormat::default(),
            java_release: DEFAULT_JAVA_RELEASE,
            kinds: KindFilter::all(),
            classpath: Vec::new(),
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DeprecatorConfig::new();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.shutdown_grace, Duration::from_secs(3));
        assert_eq!(config.class_format, ClassFormat::JAVA_18);
        assert!(config.message.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let config = DeprecatorConfig::new().with_parallelism(0);
        assert!(matches!(config.validate(), Err(DeprecatorError::InvalidParallelism)));
    }
}
