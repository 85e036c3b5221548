use std::collections::BTreeMap;

use serde::Serialize;

/// Filters of the national ranking page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingQuery {
    /// Reference date, `YYYY.MM.DD`.
    pub date: String,
    /// Age group code, e.g. `FLN` (adult).
    pub age_group: String,
    /// `S` (standard) or `L` (latin).
    pub dance_type: String,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            date: "2025.03.28".to_string(),
            age_group: "FLN".to_string(),
            dance_type: "L".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rankings {
    pub date: String,
    pub age_group: String,
    pub dance_type: String,
    pub competitions: Vec<RankedCompetition>,
    pub rankings: Vec<RankingEntry>,
}

/// A competition column of the ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCompetition {
    /// Column index, matching the keys of [`RankingEntry::competitions`].
    pub index: usize,
    pub name: String,
    pub location: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub position: String,
    pub dancers: Dancer,
    pub competitions: BTreeMap<usize, ScoreCell>,
    pub wdsf: String,
    pub national: String,
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dancer {
    pub name: String,
    pub club: String,
    pub url: String,
}

/// A ranking score for one competition column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCell {
    pub value: String,
    /// Greyed out upstream: the score does not count towards the total.
    pub grayed: bool,
}
