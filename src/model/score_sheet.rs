use std::collections::BTreeMap;

use serde::Serialize;

/// A single table row keyed by column header.
pub type ScoreRow = BTreeMap<String, String>;

/// Judge marks or skating calculation tables of a competition.
///
/// Both upstream pages share one layout, so [`MarkData`] and [`SkatingData`]
/// are the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSheet {
    pub title: String,
    pub sections: Vec<ScoreSection>,
}

pub type MarkData = ScoreSheet;
pub type SkatingData = ScoreSheet;

/// One round or dance within a score sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

impl ScoreSection {
    pub fn new(title: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
        }
    }
}
