//! Deprecator class-file model
//!
//! A lossless, mutable view of a compiled class:
//!
//! - [`ClassFile`]: header, constant pool, members and attributes
//! - [`ConstantPool`]: append-only pool with `Utf8`/`Class` interning
//! - [`Annotated`]: read and append runtime-visible annotations
//! - [`ClassFormat`]: the newest class-file version the reader accepts
//!
//! # Example
//!
//! ```rust,ignore
//! use deprecator_classfile::{Annotated, ClassFile, ClassFormat};
//!
//! let mut class = ClassFile::parse(&bytes, ClassFormat::default())?;
//! let ClassFile { constant_pool, methods, .. } = &mut class;
//! for method in methods.iter_mut() {
//!     method.add_visible_annotation(constant_pool, "Ljava/lang/Deprecated;")?;
//! }
//! let rewritten = class.to_bytes()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bytes;

pub mod annotation;
pub mod class_file;
pub mod constant_pool;
pub mod error;
pub mod format;

pub use annotation::{add_visible_annotation, visible_annotations, Annotated, Annotation};
pub use class_file::{Attribute, ClassFile, Member, ACC_PRIVATE, ACC_STATIC};
pub use constant_pool::{Constant, ConstantPool};
pub use error::{ClassFileError, ClassFileResult};
pub use format::ClassFormat;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
