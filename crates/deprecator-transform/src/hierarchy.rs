//! Classpath-aware type hierarchy
//!
//! The binary transformer resolves supertypes through an
//! [`InheritanceProvider`]. The default provider is built once per job from
//! the job's own archive plus any extra classpath archives. Classpath lookups
//! are advisory: anything that cannot be resolved is treated as unknown.

use crate::error::{TransformError, TransformResult};
use deprecator_classfile::{ClassFile, ClassFormat, ACC_PRIVATE, ACC_STATIC};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A method as seen by the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub descriptor: String,
    pub access_flags: u16,
}

impl MethodSignature {
    /// Whether this method takes part in virtual dispatch
    #[inline]
    #[must_use]
    pub fn is_overridable(&self) -> bool {
        !self.name.starts_with('<') && self.access_flags & (ACC_PRIVATE | ACC_STATIC) == 0
    }
}

/// Supertypes and methods of one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodSignature>,
}

impl ClassInfo {
    /// Extract hierarchy information from a parsed class
    #[must_use]
    pub fn from_class(class: &ClassFile) -> Option<Self> {
        let pool = &class.constant_pool;
        let methods = class
            .methods
            .iter()
            .filter_map(|m| {
                Some(MethodSignature {
                    name: m.name(pool)?.to_string(),
                    descriptor: m.descriptor(pool)?.to_string(),
                    access_flags: m.access_flags,
                })
            })
            .collect();
        Some(Self {
            name: class.name()?.to_string(),
            super_name: class.super_name().map(str::to_string),
            interfaces: class.interface_names().into_iter().map(str::to_string).collect(),
            methods,
        })
    }

    fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.super_name
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

/// Type-hierarchy resolver consulted by the binary transformer
pub trait InheritanceProvider: Send + Sync {
    /// Hierarchy information for an internal class name
    fn class_info(&self, name: &str) -> Option<&ClassInfo>;

    /// Whether `owner.name descriptor` overrides a method declared in a supertype
    ///
    /// Supertypes that cannot be resolved are skipped.
    fn overrides(&self, owner: &str, name: &str, descriptor: &str) -> bool {
        let Some(start) = self.class_info(owner) else {
            return false;
        };
        let mut queue: VecDeque<&str> = start.supertypes().collect();
        let mut visited: HashSet<&str> = HashSet::from([owner]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(info) = self.class_info(current) else {
                continue;
            };
            let declares = info
                .methods
                .iter()
                .any(|m| m.is_overridable() && m.name == name && m.descriptor == descriptor);
            if declares {
                return true;
            }
            queue.extend(info.supertypes());
        }
        false
    }
}

/// Hierarchy indexed from archives on disk
#[derive(Debug, Clone, Default)]
pub struct ClasspathHierarchy {
    classes: HashMap<String, ClassInfo>,
}

impl ClasspathHierarchy {
    /// Empty hierarchy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hierarchy for one job
    ///
    /// Classes from `archive` take precedence over classpath entries with the
    /// same name.
    ///
    /// # Errors
    /// Fails when `archive` itself cannot be read. Unreadable classpath
    /// entries are logged and skipped.
    pub fn build(archive: &Path, classpath: &[PathBuf], format: ClassFormat) -> TransformResult<Self> {
        let mut hierarchy = Self::new();
        let indexed = hierarchy.index_archive(archive, format)?;
        tracing::debug!("Indexed {} classes from {}", indexed, archive.display());

        for entry in classpath {
            match hierarchy.index_archive(entry, format) {
                Ok(count) => tracing::debug!("Indexed {} classpath classes from {}", count, entry.display()),
                Err(e) => tracing::warn!("Skipping unreadable classpath entry {}: {}", entry.display(), e),
            }
        }
        Ok(hierarchy)
    }

    /// Add a class; an existing entry with the same name is kept
    pub fn insert(&mut self, info: ClassInfo) {
        self.classes.entry(info.name.clone()).or_insert(info);
    }

    /// Index every `.class` entry of a zip archive, returning the number added
    ///
    /// # Errors
    /// Fails on unreadable archives or malformed code units
    pub fn index_archive(&mut self, path: &Path, format: ClassFormat) -> TransformResult<usize> {
        let file = File::open(path).map_err(|e| TransformError::io_error(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| TransformError::archive(path, e))?;

        let mut added = 0;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| TransformError::archive(path, e))?;
            if !crate::binary::is_code_unit(entry.name()) {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| TransformError::io_error(path.join(&name), e))?;
            let class = ClassFile::parse(&bytes, format).map_err(|e| TransformError::class_file(&name, e))?;
            if let Some(info) = ClassInfo::from_class(&class) {
                let before = self.classes.len();
                self.insert(info);
                added += self.classes.len() - before;
            }
        }
        Ok(added)
    }

    /// Number of indexed classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether nothing is indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl InheritanceProvider for ClasspathHierarchy {
    fn class_info(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }
}
