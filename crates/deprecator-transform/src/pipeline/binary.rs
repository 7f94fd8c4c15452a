//! Binary archive pipeline

use super::{ensure_distinct, rewrite_compression, PendingOutput};
use crate::binary::{is_code_unit, BinaryTransformer, CodeUnit};
use crate::error::{TransformError, TransformResult};
use crate::report::ArchiveReport;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Mark every code unit of `input` and write the result to `output`
///
/// Non-code entries are raw-copied, so their bytes, timestamps and
/// compression are unchanged. Code units keep their name, timestamp and
/// permissions. A failed job leaves no output behind.
///
/// # Errors
/// Fails on unreadable archives and on the first malformed code unit
pub fn process_binary_archive(input: &Path, output: &Path, transformer: &BinaryTransformer) -> TransformResult<ArchiveReport> {
    ensure_distinct(input, output)?;

    let file = File::open(input).map_err(|e| TransformError::io_error(input, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| TransformError::archive(input, e))?;

    let (pending, out_file) = PendingOutput::create(output)?;
    let mut writer = ZipWriter::new(out_file);
    let mut report = ArchiveReport::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| TransformError::archive(input, e))?;

        if entry.is_dir() || !is_code_unit(entry.name()) {
            writer.raw_copy_file(entry).map_err(|e| TransformError::archive(output, e))?;
            report.add_resource();
            continue;
        }

        let name = entry.name().to_string();
        let timestamp = entry.last_modified();
        let mut options = FileOptions::default()
            .compression_method(rewrite_compression(entry.compression()))
            .last_modified_time(timestamp);
        if let Some(mode) = entry.unix_mode() {
            options = options.unix_permissions(mode);
        }

        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| TransformError::io_error(input.join(&name), e))?;
        drop(entry);

        let (unit, unit_report) = transformer.transform(CodeUnit { name, timestamp, bytes })?;
        report.add_unit(&unit_report);

        writer
            .start_file(unit.name.as_str(), options)
            .map_err(|e| TransformError::archive(output, e))?;
        writer
            .write_all(&unit.bytes)
            .map_err(|e| TransformError::io_error(output, e))?;
    }

    writer.finish().map_err(|e| TransformError::archive(output, e))?;
    pending.commit();

    tracing::debug!(
        "{}: {} code units ({} changed), {} resources",
        input.display(),
        report.units,
        report.units_changed,
        report.resources
    );
    Ok(report)
}
