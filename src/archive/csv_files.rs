use std::collections::HashSet;

use itertools::Itertools;

use crate::error::Result;
use crate::model::{CompetitionResults, Judge, ResultEntry, ScoreSection};
use crate::translit::safe_file_name;

/// Section name used for results that appear before any section header.
pub(crate) const OTHER_RESULTS: &str = "Other Results";

/// A file destined for the archive, path relative to the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArchiveFile {
    pub(crate) path: String,
    pub(crate) contents: Vec<u8>,
}

impl ArchiveFile {
    fn new(folder: &str, name: &str, contents: Vec<u8>) -> Self {
        Self {
            path: format!("{folder}/{name}.csv"),
            contents,
        }
    }
}

/// Write records as CSV after an optional `# comment` line.
fn write_csv<I, R>(comment: Option<&str>, records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut buffer = Vec::new();
    if let Some(comment) = comment {
        buffer.extend_from_slice(format!("# {comment}\n").as_bytes());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(&mut buffer);
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    drop(writer);
    Ok(buffer)
}

/// `competition-details.csv`: one `label,value` line per known field.
pub(crate) fn competition_details(results: &CompetitionResults) -> Result<ArchiveFile> {
    let rows = [
        ("Title", Some(&results.title)),
        ("Date", Some(&results.date)),
        ("Location", Some(&results.location)),
        ("Organizer", Some(&results.organizer)),
        (
            "Organizer Representative",
            results.organizer_representative.as_ref(),
        ),
        ("Type", Some(&results.kind)),
        ("Participant Count", results.participant_count.as_ref()),
    ];
    let records = rows
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| [label, v.as_str()]));

    Ok(ArchiveFile::new(
        "competition-info",
        "competition-details",
        write_csv(None, records)?,
    ))
}

/// `officials.csv`, or `None` when no official besides the judges is known.
pub(crate) fn officials(results: &CompetitionResults) -> Result<Option<ArchiveFile>> {
    if !results.has_officials() {
        return Ok(None);
    }

    let named = [
        ("Commissioner", results.commissioner.as_deref()),
        ("Supervisor", results.supervisor.as_deref()),
        ("Announcer", results.announcer.as_deref()),
    ]
    .into_iter()
    .filter_map(|(role, name)| name.map(|n| [role, n]));
    let counters = results.counters.iter().map(|c| ["Counter", c.as_str()]);

    let records = std::iter::once(["Role", "Name"])
        .chain(named)
        .chain(counters);

    Ok(Some(ArchiveFile::new(
        "competition-info",
        "officials",
        write_csv(None, records)?,
    )))
}

pub(crate) fn judges(judges: &[Judge]) -> Result<Option<ArchiveFile>> {
    if judges.is_empty() {
        return Ok(None);
    }

    let records = std::iter::once(["Name", "Location"])
        .chain(judges.iter().map(|j| [j.name.as_str(), j.location.as_str()]));

    Ok(Some(ArchiveFile::new(
        "judges",
        "judges",
        write_csv(None, records)?,
    )))
}

/// One file per results section, in order of first appearance.
pub(crate) fn results(entries: &[ResultEntry]) -> Result<Vec<ArchiveFile>> {
    let grouped = entries
        .iter()
        .into_group_map_by(|entry| section_name(*entry));
    let order = entries.iter().map(section_name).unique();

    let mut used = HashSet::new();
    let mut files = Vec::new();
    for section in order {
        let Some(rows) = grouped.get(section) else {
            continue;
        };
        let records = std::iter::once(["Position", "Number", "Name", "Club"]).chain(
            rows.iter().map(|r| {
                [
                    r.position.as_str(),
                    r.number.as_str(),
                    r.name.as_str(),
                    r.club.as_str(),
                ]
            }),
        );
        let name = unique_name(&mut used, safe_file_name(section));
        files.push(ArchiveFile::new("results", &name, write_csv(None, records)?));
    }
    Ok(files)
}

fn section_name(entry: &ResultEntry) -> &str {
    if entry.section.is_empty() {
        OTHER_RESULTS
    } else {
        &entry.section
    }
}

/// Append `_2`, `_3`, ... until `name` has not been handed out before.
fn unique_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// One file per score sheet section, named `<title>_<index>`.
pub(crate) fn score_sections(folder: &str, sections: &[ScoreSection]) -> Result<Vec<ArchiveFile>> {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let header = (!section.headers.is_empty()).then(|| section.headers.clone());
            let rows = section.rows.iter().map(|row| {
                section
                    .headers
                    .iter()
                    .map(|h| row.get(h).cloned().unwrap_or_default())
                    .collect_vec()
            });
            let contents = write_csv(Some(&section.title), header.into_iter().chain(rows))?;
            let name = format!("{}_{index}", safe_file_name(&section.title));
            Ok(ArchiveFile::new(folder, &name, contents))
        })
        .collect()
}
