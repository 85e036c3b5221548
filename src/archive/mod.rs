//! Packing extracted competition records into a downloadable ZIP of CSV files.

mod csv_files;

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::model::{ArchiveField, CompetitionArchive, CompetitionResults, FieldSelection, ScoreSheet};
use crate::translit::safe_file_name;

use csv_files::ArchiveFile;

/// Records an archive is built from. Absent records leave their folders out.
#[derive(Debug, Clone, Default)]
pub struct ArchiveSources {
    pub results: Option<CompetitionResults>,
    pub marks: Option<ScoreSheet>,
    pub skating: Option<ScoreSheet>,
}

/// Build the archive for the selected categories.
///
/// Output depends only on the inputs: entries are written in a fixed order
/// with a fixed timestamp.
pub fn build_archive(
    title: &str,
    sources: &ArchiveSources,
    selection: &FieldSelection,
) -> Result<CompetitionArchive> {
    let files = collect_files(sources, selection)?;
    debug!(files = files.len(), "packing competition archive");

    Ok(CompetitionArchive {
        file_name: archive_file_name(title, selection),
        bytes: pack(&files)?,
    })
}

/// `<safe title>[_<fields>].zip`
pub fn archive_file_name(title: &str, selection: &FieldSelection) -> String {
    match selection.name() {
        Some(fields) => format!("{}_{fields}.zip", safe_file_name(title)),
        None => format!("{}.zip", safe_file_name(title)),
    }
}

fn collect_files(sources: &ArchiveSources, selection: &FieldSelection) -> Result<Vec<ArchiveFile>> {
    let mut files = Vec::new();

    if let Some(results) = &sources.results {
        if selection.includes(ArchiveField::Info) {
            files.push(csv_files::competition_details(results)?);
            files.extend(csv_files::officials(results)?);
        }
        if selection.includes(ArchiveField::Judges) {
            files.extend(csv_files::judges(&results.judges)?);
        }
        if selection.includes(ArchiveField::Results) {
            files.extend(csv_files::results(&results.results)?);
        }
    }

    for (field, sheet) in [
        (ArchiveField::Marks, &sources.marks),
        (ArchiveField::Skating, &sources.skating),
    ] {
        if let Some(sheet) = sheet.as_ref().filter(|_| selection.includes(field)) {
            files.extend(csv_files::score_sections(&field.to_string(), &sheet.sections)?);
        }
    }

    Ok(files)
}

fn pack(files: &[ArchiveFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        zip.start_file(file.path.as_str(), entry_options())?;
        zip.write_all(&file.contents)?;
    }
    Ok(zip.finish()?.into_inner())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}
