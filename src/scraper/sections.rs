//! Section tracking for tables that interleave round headers with data rows.
//!
//! Results, marks and skating tables announce rounds ("Döntő", "Elődöntő", ...)
//! as header rows in the middle of the body. The extractors classify each row
//! and hand the sequence to the folds below, which know nothing about HTML.

use std::mem;

use crate::model::{ScoreRow, ScoreSection};

/// A classified table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanRow<T> {
    /// Starts a new section with the given title.
    Header(String),
    Data(T),
    /// Neither header nor usable data.
    Skip,
}

/// Running state of a results scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum SectionState {
    #[default]
    NoSectionYet,
    InSection(String),
}

impl SectionState {
    pub(crate) fn label(&self) -> &str {
        match self {
            SectionState::NoSectionYet => "",
            SectionState::InSection(title) => title,
        }
    }

    /// Advance by one row, emitting data rows tagged with the current section.
    pub(crate) fn step<T>(self, row: ScanRow<T>) -> (SectionState, Option<(String, T)>) {
        match row {
            ScanRow::Header(title) => (SectionState::InSection(title), None),
            ScanRow::Data(data) => {
                let label = self.label().to_string();
                (self, Some((label, data)))
            }
            ScanRow::Skip => (self, None),
        }
    }
}

/// Tag every data row with the title of the nearest preceding header
/// (empty before the first header).
pub(crate) fn tag_rows<T>(rows: impl IntoIterator<Item = ScanRow<T>>) -> Vec<(String, T)> {
    rows.into_iter()
        .scan(SectionState::default(), |state, row| {
            let (next, emitted) = mem::take(state).step(row);
            *state = next;
            Some(emitted)
        })
        .flatten()
        .collect()
}

/// Sections collected from one score table.
#[derive(Debug, Default)]
struct TableSections {
    opened: Vec<ScoreSection>,
    loose_rows: Vec<ScoreRow>,
}

/// Group the body rows of one marks/skating table into sections.
///
/// A data row joins the most recently opened section of this table. Before
/// any header row it joins a section named after the table (`table_title`),
/// and when the table has no title it is collected separately and emitted last
/// under `fallback_title`.
pub(crate) fn group_score_rows(
    table_title: Option<&str>,
    fallback_title: &str,
    headers: &[String],
    rows: impl IntoIterator<Item = ScanRow<ScoreRow>>,
) -> Vec<ScoreSection> {
    let mut grouped = rows
        .into_iter()
        .fold(TableSections::default(), |mut acc, row| {
            match row {
                ScanRow::Header(title) => {
                    acc.opened.push(ScoreSection::new(title, headers.to_vec()));
                }
                ScanRow::Data(data) if data.is_empty() => {}
                ScanRow::Data(data) => {
                    if let Some(current) = acc.opened.last_mut() {
                        current.rows.push(data);
                    } else if let Some(title) = table_title {
                        let mut section = ScoreSection::new(title, headers.to_vec());
                        section.rows.push(data);
                        acc.opened.push(section);
                    } else {
                        acc.loose_rows.push(data);
                    }
                }
                ScanRow::Skip => {}
            }
            acc
        });

    if !grouped.loose_rows.is_empty() {
        let mut section = ScoreSection::new(fallback_title, headers.to_vec());
        section.rows = mem::take(&mut grouped.loose_rows);
        grouped.opened.push(section);
    }
    grouped.opened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> ScoreRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn headers() -> Vec<String> {
        vec!["A".to_string(), "B".to_string()]
    }

    #[test]
    fn test_tag_rows_before_and_after_headers() {
        let rows = vec![
            ScanRow::Data(1),
            ScanRow::Header("Döntő".to_string()),
            ScanRow::Data(2),
            ScanRow::Skip,
            ScanRow::Data(3),
            ScanRow::Header("Elődöntő".to_string()),
            ScanRow::Data(4),
        ];
        let tagged = tag_rows(rows);
        assert_eq!(
            tagged,
            vec![
                (String::new(), 1),
                ("Döntő".to_string(), 2),
                ("Döntő".to_string(), 3),
                ("Elődöntő".to_string(), 4),
            ]
        );
    }

    #[test]
    fn test_step_keeps_state_on_data() {
        let state = SectionState::InSection("Döntő".to_string());
        let (state, emitted) = state.step(ScanRow::Data("x"));
        assert_eq!(state.label(), "Döntő");
        assert_eq!(emitted, Some(("Döntő".to_string(), "x")));
    }

    #[test]
    fn test_group_untitled_table_with_delimiter() {
        let rows = vec![
            ScanRow::Data(row(&[("A", "1"), ("B", "2")])),
            ScanRow::Header("Final".to_string()),
            ScanRow::Data(row(&[("A", "3"), ("B", "4")])),
        ];
        let sections = group_score_rows(None, "Section 1", &headers(), rows);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Final");
        assert_eq!(sections[0].rows, vec![row(&[("A", "3"), ("B", "4")])]);
        assert_eq!(sections[1].title, "Section 1");
        assert_eq!(sections[1].rows, vec![row(&[("A", "1"), ("B", "2")])]);
    }

    #[test]
    fn test_group_titled_table_with_delimiter() {
        let rows = vec![
            ScanRow::Data(row(&[("A", "1"), ("B", "2")])),
            ScanRow::Header("Final".to_string()),
            ScanRow::Data(row(&[("A", "3"), ("B", "4")])),
        ];
        let sections = group_score_rows(Some("Keringő"), "Section 1", &headers(), rows);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Keringő");
        assert_eq!(sections[0].headers, headers());
        assert_eq!(sections[0].rows, vec![row(&[("A", "1"), ("B", "2")])]);
        assert_eq!(sections[1].title, "Final");
        assert_eq!(sections[1].rows, vec![row(&[("A", "3"), ("B", "4")])]);
    }

    #[test]
    fn test_group_drops_empty_rows_and_keeps_empty_sections() {
        let rows = vec![
            ScanRow::Header("Elődöntő".to_string()),
            ScanRow::Data(ScoreRow::new()),
            ScanRow::Header("Döntő".to_string()),
            ScanRow::Data(row(&[("A", "1")])),
        ];
        let sections = group_score_rows(None, "Section 2", &headers(), rows);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].rows.is_empty());
        assert_eq!(sections[1].rows.len(), 1);
    }

    #[test]
    fn test_group_empty_table() {
        let sections = group_score_rows(None, "Section 1", &headers(), Vec::new());
        assert!(sections.is_empty());
    }
}
