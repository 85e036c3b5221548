use ::scraper::{ElementRef, Selector};
use itertools::Itertools;
use strum_macros::Display;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{ScoreRow, ScoreSection, ScoreSheet};
use crate::scraper::sections::{group_score_rows, ScanRow};
use crate::scraper::{self, cells, closest_preceding_sibling, element_text, select_text};

/// The two upstream pages laid out as score sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ScoreSheetKind {
    Marks,
    Skating,
}

impl ScoreSheetKind {
    fn page(self) -> &'static str {
        match self {
            ScoreSheetKind::Marks => "hodnot_sut.php",
            ScoreSheetKind::Skating => "skating.php",
        }
    }
}

#[instrument(skip(client))]
pub(crate) async fn get_score_sheet(
    client: &scraper::PageClient,
    base_url: &str,
    kind: ScoreSheetKind,
    id: &str,
) -> Result<ScoreSheet> {
    let url = format!("{base_url}/{}?sutaz_id={id}", kind.page());
    let body = scraper::fetch_page(client, &url).await?;
    let sheet = parse_score_sheet(&scraper::parse_document(&body))?;
    debug!(%kind, sections = sheet.sections.len(), "parsed score sheet");
    Ok(sheet)
}

pub(crate) fn parse_score_sheet(document: &scraper::Html) -> Result<ScoreSheet> {
    let title_selector = Selector::parse("h3")?;
    let table_selector = Selector::parse("table.table")?;

    let title = document
        .select(&title_selector)
        .next()
        .map(|h3| element_text(&h3))
        .unwrap_or_default();

    let mut sections = Vec::new();
    for (index, table) in document.select(&table_selector).enumerate() {
        sections.extend(parse_table(&table, index)?);
    }

    Ok(ScoreSheet { title, sections })
}

fn parse_table(table: &ElementRef, index: usize) -> Result<Vec<ScoreSection>> {
    let header_selector = Selector::parse("thead th")?;
    let row_selector = Selector::parse("tbody tr")?;

    let table_title = table_title(table)?;
    let headers = table
        .select(&header_selector)
        .map(|th| element_text(&th))
        .collect_vec();

    let rows = table
        .select(&row_selector)
        .map(|row| classify_score_row(&row, &headers))
        .collect::<Result<Vec<_>>>()?;

    let fallback = format!("Section {}", index + 1);
    Ok(group_score_rows(
        table_title.as_deref(),
        &fallback,
        &headers,
        rows,
    ))
}

/// The closest heading before the table (not reaching past an earlier table),
/// else the table's caption.
fn table_title(table: &ElementRef) -> Result<Option<String>> {
    let heading_selector = Selector::parse("h3, h4, p.lead, table")?;
    let caption_selector = Selector::parse("caption")?;

    let heading = closest_preceding_sibling(table, &heading_selector)
        .filter(|e| e.value().name() != "table")
        .map(|e| element_text(&e))
        .filter(|t| !t.is_empty());
    if heading.is_some() {
        return Ok(heading);
    }

    Ok(Some(select_text(table, &caption_selector)).filter(|t| !t.is_empty()))
}

/// A row with a spanning cell and emphasized text opens a subsection; any
/// other row becomes a header-keyed map of its non-empty cells.
fn classify_score_row(row: &ElementRef, headers: &[String]) -> Result<ScanRow<ScoreRow>> {
    let spanning_selector = Selector::parse("td[colspan]")?;
    let emphasis_selector = Selector::parse("td i, td b")?;

    if row.select(&spanning_selector).next().is_some()
        && row.select(&emphasis_selector).next().is_some()
    {
        let title = element_text(row);
        return Ok(if title.is_empty() {
            ScanRow::Skip
        } else {
            ScanRow::Header(title)
        });
    }

    let values = cells(row)
        .iter()
        .zip(headers)
        .map(|(cell, header)| (header.clone(), element_text(cell)))
        .filter(|(_, value)| !value.is_empty())
        .collect::<ScoreRow>();
    Ok(ScanRow::Data(values))
}
