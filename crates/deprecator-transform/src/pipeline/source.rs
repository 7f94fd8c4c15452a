//! Source archive pipeline
//!
//! `<input>` is extracted into `<input>.dir`, rewritten into `<output>.dir`
//! and packed into `<output>`. Both scratch directories are removed however
//! the job ends.

use super::{ensure_distinct, rewrite_compression, PendingOutput};
use crate::error::{TransformError, TransformResult};
use crate::report::ArchiveReport;
use crate::scratch::{delete_recursively, walk_error, ScratchDir};
use crate::source::SourceTransformer;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Entry metadata carried from the input archive to the output archive
#[derive(Debug, Clone, Copy)]
struct EntryMeta {
    timestamp: DateTime,
    compression: CompressionMethod,
    unix_mode: Option<u32>,
}

impl EntryMeta {
    fn options(self) -> FileOptions {
        let options = FileOptions::default()
            .compression_method(rewrite_compression(self.compression))
            .last_modified_time(self.timestamp);
        match self.unix_mode {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        }
    }
}

/// Rewrite every source unit of `input` and write the result to `output`
///
/// # Errors
/// Fails on archive or scratch-directory I/O, unsafe entry names, or a unit
/// the parser cannot handle at all
pub fn process_source_archive(input: &Path, output: &Path, transformer: &SourceTransformer) -> TransformResult<ArchiveReport> {
    ensure_distinct(input, output)?;
    delete_recursively(output)?;

    let extracted = ScratchDir::for_archive(input)?;
    let rewritten = ScratchDir::for_archive(output)?;

    let entries = extract(input, extracted.path())?;
    let report = transformer.transform_tree(extracted.path(), rewritten.path())?;
    pack(rewritten.path(), output, &entries)?;

    tracing::debug!(
        "{}: {} source units ({} changed, {} passed through), {} resources",
        input.display(),
        report.units,
        report.units_changed,
        report.units_skipped,
        report.resources
    );
    Ok(report)
}

/// Unpack `archive` into `dir`, returning per-entry metadata keyed by entry name
fn extract(archive_path: &Path, dir: &Path) -> TransformResult<HashMap<String, EntryMeta>> {
    let file = File::open(archive_path).map_err(|e| TransformError::io_error(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| TransformError::archive(archive_path, e))?;
    let mut entries = HashMap::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| TransformError::archive(archive_path, e))?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(TransformError::UnsafeEntryName {
                archive: archive_path.to_path_buf(),
                name: entry.name().to_string(),
            });
        };
        let target = dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| TransformError::io_error(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| TransformError::io_error(parent, e))?;
            }
            let mut out = File::create(&target).map_err(|e| TransformError::io_error(&target, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| TransformError::io_error(&target, e))?;
        }

        entries.insert(
            entry_name(&relative, entry.is_dir()),
            EntryMeta {
                timestamp: entry.last_modified(),
                compression: entry.compression(),
                unix_mode: entry.unix_mode(),
            },
        );
    }
    Ok(entries)
}

/// Zip the contents of `dir` into `output`
fn pack(dir: &Path, output: &Path, entries: &HashMap<String, EntryMeta>) -> TransformResult<()> {
    let (pending, file) = PendingOutput::create(output)?;
    let mut writer = ZipWriter::new(file);

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let is_dir = entry.file_type().is_dir();
        let name = entry_name(relative, is_dir);
        let meta = entries.get(&name).copied();

        if is_dir {
            // only directories the input archive listed explicitly
            if let Some(meta) = meta {
                writer
                    .add_directory(name.as_str(), meta.options())
                    .map_err(|e| TransformError::archive(output, e))?;
            }
            continue;
        }

        let options = meta.map_or_else(
            || FileOptions::default().compression_method(CompressionMethod::Deflated),
            EntryMeta::options,
        );
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| TransformError::archive(output, e))?;
        let mut source = File::open(entry.path()).map_err(|e| TransformError::io_error(entry.path(), e))?;
        io::copy(&mut source, &mut writer).map_err(|e| TransformError::io_error(output, e))?;
    }

    writer.finish().map_err(|e| TransformError::archive(output, e))?;
    pending.commit();
    Ok(())
}

/// Archive entry name for a path relative to the scratch root
fn entry_name(relative: &Path, is_dir: bool) -> String {
    let mut name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if is_dir {
        name.push('/');
    }
    name
}
