//! Declaration kinds in source units
//!
//! A closed set split into containers, which hold further markable
//! declarations and are descended into, and leaves, which are not.

use crate::report::Category;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// First Java release with record declarations
pub const RECORDS_SINCE_RELEASE: u16 = 16;

/// Markable declaration kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclarationKind {
    /// Class or interface
    Type,
    Enum,
    AnnotationType,
    Record,
    /// Method or constructor
    Method,
    Field,
    EnumConstant,
}

impl DeclarationKind {
    /// Every kind, containers first
    pub const ALL: [Self; 7] = [
        Self::Type,
        Self::Enum,
        Self::AnnotationType,
        Self::Record,
        Self::Method,
        Self::Field,
        Self::EnumConstant,
    ];

    /// Map a syntax node kind to a declaration kind
    ///
    /// Records are only recognized from `java_release` 16 on.
    #[must_use]
    pub fn from_node_kind(node_kind: &str, java_release: u16) -> Option<Self> {
        match node_kind {
            "class_declaration" | "interface_declaration" => Some(Self::Type),
            "enum_declaration" => Some(Self::Enum),
            "annotation_type_declaration" => Some(Self::AnnotationType),
            "record_declaration" if java_release >= RECORDS_SINCE_RELEASE => Some(Self::Record),
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => Some(Self::Method),
            "field_declaration" | "constant_declaration" => Some(Self::Field),
            "enum_constant" => Some(Self::EnumConstant),
            _ => None,
        }
    }

    /// Whether traversal continues into this declaration's members
    #[inline]
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Type | Self::Enum | Self::AnnotationType | Self::Record)
    }

    /// Reporting bucket
    #[inline]
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::Type | Self::Enum | Self::AnnotationType | Self::Record => Category::Type,
            Self::Method => Category::Method,
            Self::Field => Category::Field,
            Self::EnumConstant => Category::EnumConstant,
        }
    }

    /// Name used on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Enum => "enum",
            Self::AnnotationType => "annotation",
            Self::Record => "record",
            Self::Method => "method",
            Self::Field => "field",
            Self::EnumConstant => "enum-constant",
        }
    }
}

impl Display for DeclarationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclarationKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KindError::Unknown(wanted.to_string()))
    }
}

/// Declaration kinds the caller asked to mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFilter(BTreeSet<DeclarationKind>);

impl KindFilter {
    /// Mark every kind
    #[must_use]
    pub fn all() -> Self {
        Self(DeclarationKind::ALL.into_iter().collect())
    }

    /// Mark only `kinds`
    #[must_use]
    pub fn only(kinds: impl IntoIterator<Item = DeclarationKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Whether `kind` should be marked
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: DeclarationKind) -> bool {
        self.0.contains(&kind)
    }

    /// Selected kinds in declaration order
    pub fn iter(&self) -> impl Iterator<Item = DeclarationKind> + '_ {
        self.0.iter().copied()
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl Display for KindFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(DeclarationKind::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for KindFilter {
    type Err = KindError;

    /// Comma-separated kind names, e.g. `type,method`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<BTreeSet<_>, _>>()?;
        if kinds.is_empty() {
            return Err(KindError::Empty);
        }
        Ok(Self(kinds))
    }
}

/// Errors parsing declaration kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    /// Name is not a declaration kind
    #[error("unknown declaration kind: {0} (expected one of type, enum, annotation, record, method, field, enum-constant)")]
    Unknown(String),

    /// No kinds given
    #[error("at least one declaration kind is required")]
    Empty,
}
