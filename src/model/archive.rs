use std::str::FromStr;

use itertools::Itertools;
use strum_macros::EnumString;

/// A category of data that can be packed into a competition archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ArchiveField {
    Info,
    Judges,
    Results,
    Marks,
    Skating,
}

/// Which categories an archive request asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    #[default]
    All,
    Only(Vec<ArchiveField>),
}

impl FieldSelection {
    /// Parse a comma-separated list such as `"judges,info"`.
    ///
    /// Blank input, any `all` entry, or a list naming no known field selects
    /// everything; unknown names are otherwise ignored.
    pub fn parse(fields: &str) -> Self {
        let names = fields
            .split(',')
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect_vec();
        if names.is_empty() || names.iter().any(|f| f.eq_ignore_ascii_case("all")) {
            return FieldSelection::All;
        }
        let selected = names
            .into_iter()
            .filter_map(|f| ArchiveField::from_str(f).ok())
            .unique()
            .collect_vec();
        if selected.is_empty() {
            return FieldSelection::All;
        }
        FieldSelection::Only(selected)
    }

    pub fn includes(&self, field: ArchiveField) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::Only(fields) => fields.contains(&field),
        }
    }

    /// Suffix appended to the archive name, `None` for a full archive.
    pub fn name(&self) -> Option<String> {
        match self {
            FieldSelection::All => None,
            FieldSelection::Only(fields) => Some(fields.iter().join("_")),
        }
    }
}

/// A finished ZIP archive ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CompetitionArchive {
    pub const CONTENT_TYPE: &'static str = "application/zip";

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}
