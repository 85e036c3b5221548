use std::sync::LazyLock;

use ::scraper::{ElementRef, Selector};
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::model::{CompetitionResults, Judge, ResultEntry};
use crate::scraper::sections::{tag_rows, ScanRow};
use crate::scraper::{self, cell_text, cells, element_text, first_link};

/// `"Őszi Kupa (2024.10.12)"`: title and trailing parenthesized date.
#[allow(clippy::expect_used)]
static TITLE_WITH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?s)(.*?)\s*\(([^()]+)\)\s*$").expect("title regex is valid")
});

/// `"A - Kovács Béla (Budapest)"`: judge code, name and home town.
#[allow(clippy::expect_used)]
static JUDGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z])\s*-\s*([^(]+)\(([^)]+)\)").expect("judge regex is valid")
});

const JUDGES_LABEL: &str = "Pontózók";
const RESULTS_HEADER: &str = "Helyezés";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingField {
    Location,
    Organizer,
    OrganizerRepresentative,
    Kind,
    ParticipantCount,
}

/// `h5` label to field. The value is whatever follows the label.
const HEADING_LABELS: &[(&str, HeadingField)] = &[
    ("Helyszín:", HeadingField::Location),
    ("Rendező:", HeadingField::Organizer),
    ("Szervező képviselője:", HeadingField::OrganizerRepresentative),
    ("Típus:", HeadingField::Kind),
    ("Párok száma", HeadingField::ParticipantCount),
];

impl HeadingField {
    fn apply(self, results: &mut CompetitionResults, value: String) {
        match self {
            HeadingField::Location => results.location = value,
            HeadingField::Organizer => results.organizer = value,
            HeadingField::OrganizerRepresentative => {
                results.organizer_representative = Some(value).filter(|v| !v.is_empty())
            }
            HeadingField::Kind => results.kind = value,
            HeadingField::ParticipantCount => {
                results.participant_count = Some(value).filter(|v| !v.is_empty())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Official {
    Commissioner,
    Announcer,
    Counters,
    Supervisor,
}

const OFFICIAL_LABELS: &[(&str, Official)] = &[
    ("Döntnök", Official::Commissioner),
    ("Műsorvezető", Official::Announcer),
    ("Számlálók", Official::Counters),
    ("Versenyfelügyelő", Official::Supervisor),
];

#[instrument(skip(client))]
pub(crate) async fn get_competition_results(
    client: &scraper::PageClient,
    base_url: &str,
    id: &str,
) -> Result<CompetitionResults> {
    let url = format!("{base_url}/sutaz.php?sutaz_id={id}");
    let body = scraper::fetch_page(client, &url).await?;
    let results = parse_competition_results(&scraper::parse_document(&body))?;
    debug!(
        judges = results.judges.len(),
        results = results.results.len(),
        "parsed competition results"
    );
    Ok(results)
}

pub(crate) fn parse_competition_results(
    document: &scraper::Html,
) -> Result<CompetitionResults> {
    let mut results = CompetitionResults::default();

    let heading_selector = Selector::parse("h3")?;
    if let Some(heading) = document.select(&heading_selector).next() {
        let (title, date) = split_title_date(&element_text(&heading));
        results.title = title;
        results.date = date;
    }

    let details_selector = Selector::parse("h5")?;
    for detail in document.select(&details_selector) {
        let text = element_text(&detail);
        if let Some((label, field)) = HEADING_LABELS
            .iter()
            .find(|(label, _)| text.contains(label))
        {
            field.apply(&mut results, value_after(&text, label));
        }
    }

    results.judges = parse_judges(document)?;
    apply_officials(&mut results, &officials_text(document)?);
    results.results = parse_result_rows(document)?;

    Ok(results)
}

/// Split `"<title> (<date>)"`. Without a trailing parenthetical the whole
/// text is the title and the date is empty.
pub(crate) fn split_title_date(text: &str) -> (String, String) {
    let text = text.trim();
    match TITLE_WITH_DATE.captures(text) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
        None => (text.to_string(), String::new()),
    }
}

fn value_after(text: &str, label: &str) -> String {
    text.rfind(label)
        .map(|i| text[i + label.len()..].trim().to_string())
        .unwrap_or_default()
}

fn parse_judges(document: &scraper::Html) -> Result<Vec<Judge>> {
    let bold_selector = Selector::parse("b")?;
    let anchor_selector = Selector::parse("a")?;

    let Some(container) = document
        .select(&bold_selector)
        .find(|b| element_text(b).contains(JUDGES_LABEL))
        .and_then(|b| b.parent())
        .and_then(ElementRef::wrap)
    else {
        return Ok(Vec::new());
    };

    Ok(container
        .select(&anchor_selector)
        .filter_map(|anchor| {
            let text = element_text(&anchor);
            let judge = parse_judge(&text, anchor.value().attr("href"));
            if judge.is_none() {
                trace!(text, "skipping judge link");
            }
            judge
        })
        .collect())
}

/// Parse a judge link caption; `None` when it does not follow the
/// `"<code> - <name>(<location>)"` pattern.
pub(crate) fn parse_judge(text: &str, href: Option<&str>) -> Option<Judge> {
    let caps = JUDGE.captures(text)?;
    Some(Judge {
        name: caps[2].trim().to_string(),
        location: caps[3].trim().to_string(),
        link: href.filter(|h| !h.is_empty()).map(str::to_string),
        id: Some(caps[1].to_string()),
    })
}

/// Text of the block listing officials other than the judges. When several
/// blocks qualify the last one wins.
fn officials_text(document: &scraper::Html) -> Result<String> {
    let block_selector = Selector::parse(".container > .pull-left")?;
    Ok(document
        .select(&block_selector)
        .map(|block| block.text().collect::<String>())
        .filter(|text| {
            OFFICIAL_LABELS.iter().any(|(label, _)| text.contains(label))
                && !text.contains(JUDGES_LABEL)
        })
        .last()
        .unwrap_or_default())
}

/// The text between `label` (and an optional colon) and the next known
/// official label, or the end of the text.
pub(crate) fn official_value(text: &str, label: &str) -> Option<String> {
    let start = text.find(label)? + label.len();
    let rest = text[start..].trim_start_matches(':');
    let end = OFFICIAL_LABELS
        .iter()
        .filter_map(|(other, _)| rest.find(other))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].trim().to_string()).filter(|v| !v.is_empty())
}

fn apply_officials(results: &mut CompetitionResults, text: &str) {
    for (label, official) in OFFICIAL_LABELS {
        let Some(value) = official_value(text, label) else {
            continue;
        };
        match official {
            Official::Commissioner => results.commissioner = Some(value),
            Official::Announcer => results.announcer = Some(value),
            Official::Supervisor => results.supervisor = Some(value),
            Official::Counters => {
                results.counters = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect_vec()
            }
        }
    }
}

fn parse_result_rows(document: &scraper::Html) -> Result<Vec<ResultEntry>> {
    let table_selector = Selector::parse("table.table")?;
    let header_selector = Selector::parse("th")?;
    let row_selector = Selector::parse("tbody tr")?;
    let italic_selector = Selector::parse("td i")?;

    let mut entries = Vec::new();
    for table in document.select(&table_selector) {
        let is_results_table = table
            .select(&header_selector)
            .any(|th| element_text(&th).contains(RESULTS_HEADER));
        if !is_results_table {
            continue;
        }

        let rows = table
            .select(&row_selector)
            .map(|row| classify_result_row(&row, &italic_selector))
            .collect::<Result<Vec<_>>>()?;

        entries.extend(tag_rows(rows).into_iter().map(|(section, mut entry)| {
            entry.section = section;
            entry
        }));
    }
    Ok(entries)
}

fn classify_result_row(row: &ElementRef, italic_selector: &Selector) -> Result<ScanRow<ResultEntry>> {
    let italic = row
        .select(italic_selector)
        .map(|i| element_text(&i))
        .collect::<String>();
    if !italic.is_empty() && squash(&italic) == squash(&element_text(row)) {
        return Ok(ScanRow::Header(italic));
    }

    let cells = cells(row);
    let position = cell_text(&cells, 0);
    if position.is_empty() {
        return Ok(ScanRow::Skip);
    }

    let anchor_selector = Selector::parse("a")?;
    let (name, profile_link) = match cells
        .get(2)
        .and_then(|cell| cell.select(&anchor_selector).next())
    {
        Some(anchor) => (element_text(&anchor), first_link(&cells[2])?),
        None => (cell_text(&cells, 2), None),
    };
    if name.is_empty() {
        return Ok(ScanRow::Skip);
    }

    Ok(ScanRow::Data(ResultEntry {
        position,
        number: cell_text(&cells, 1),
        name,
        club: cell_text(&cells, 3),
        section: String::new(),
        profile_link,
    }))
}

/// Text with all whitespace removed, for comparing row and italic content.
fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body><div class="container">
          <h3>Őszi Kupa - Felnőtt Standard <small>(2024.10.12)</small></h3>
          <h5>Helyszín: Budapest, Sportcsarnok</h5>
          <h5>Rendező: Budapesti Tánc SE</h5>
          <h5>Szervező képviselője: Kiss Anna</h5>
          <h5>Típus: Országos bajnokság</h5>
          <h5>Párok száma 12</h5>
          <div class="pull-left"><b>Pontózók:</b><br>
            <a href="biro.php?id=1">A - Kovács Béla (Budapest)</a><br>
            <a href="biro.php?id=2">B - Nagy Éva(Szeged)</a><br>
            <a href="biro.php?id=3">Ismeretlen formátum</a>
          </div>
          <div class="pull-left">
            <b>Döntnök:</b> Szabó Péter <b>Versenyfelügyelő:</b> Tóth Gábor
            <b>Műsorvezető:</b> Varga Zsófia <b>Számlálók:</b> Molnár Ádám, Farkas Lili
          </div>
          <table class="table">
            <thead><tr><th>Helyezés</th><th>Rajtszám</th><th>Név</th><th>Klub</th></tr></thead>
            <tbody>
              <tr><td colspan="4"><i>Döntő</i></td></tr>
              <tr><td>1.</td><td>12</td><td><a href="par.php?id=77">Kiss Péter - Nagy Anna</a></td><td>Tánc SE</td></tr>
              <tr><td>2.</td><td>15</td><td>Horváth Máté - Lakatos Réka</td><td>Dance Klub</td></tr>
              <tr><td></td><td></td><td></td><td></td></tr>
              <tr><td colspan="4"><i>Elődöntő</i></td></tr>
              <tr><td>7.</td><td>3</td><td>Balogh Ádám - Papp Dóra</td><td>Szeged TSE</td></tr>
            </tbody>
          </table>
        </div></body></html>
    "#;

    fn parse(html: &str) -> CompetitionResults {
        parse_competition_results(&scraper::parse_document(html)).unwrap()
    }

    #[test]
    fn test_parse_heading_and_details() {
        let results = parse(RESULTS_PAGE);
        assert_eq!(results.title, "Őszi Kupa - Felnőtt Standard");
        assert_eq!(results.date, "2024.10.12");
        assert_eq!(results.location, "Budapest, Sportcsarnok");
        assert_eq!(results.organizer, "Budapesti Tánc SE");
        assert_eq!(results.organizer_representative.as_deref(), Some("Kiss Anna"));
        assert_eq!(results.kind, "Országos bajnokság");
        assert_eq!(results.participant_count.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_judges_skips_malformed_links() {
        let results = parse(RESULTS_PAGE);
        assert_eq!(results.judges.len(), 2);
        assert_eq!(
            results.judges[0],
            Judge {
                name: "Kovács Béla".to_string(),
                location: "Budapest".to_string(),
                link: Some("biro.php?id=1".to_string()),
                id: Some("A".to_string()),
            }
        );
        assert_eq!(results.judges[1].name, "Nagy Éva");
        assert_eq!(results.judges[1].location, "Szeged");
    }

    #[test]
    fn test_parse_officials() {
        let results = parse(RESULTS_PAGE);
        assert_eq!(results.commissioner.as_deref(), Some("Szabó Péter"));
        assert_eq!(results.supervisor.as_deref(), Some("Tóth Gábor"));
        assert_eq!(results.announcer.as_deref(), Some("Varga Zsófia"));
        assert_eq!(results.counters, vec!["Molnár Ádám", "Farkas Lili"]);
        assert!(results.has_officials());
    }

    #[test]
    fn test_parse_results_with_sections() {
        let results = parse(RESULTS_PAGE);
        let entries = &results.results;
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].position, "1.");
        assert_eq!(entries[0].number, "12");
        assert_eq!(entries[0].name, "Kiss Péter - Nagy Anna");
        assert_eq!(entries[0].club, "Tánc SE");
        assert_eq!(entries[0].section, "Döntő");
        assert_eq!(entries[0].profile_link.as_deref(), Some("par.php?id=77"));

        assert_eq!(entries[1].section, "Döntő");
        assert_eq!(entries[1].profile_link, None);

        assert_eq!(entries[2].position, "7.");
        assert_eq!(entries[2].section, "Elődöntő");
    }

    #[test]
    fn test_italic_cell_in_data_row_is_not_a_header() {
        let html = r#"<table class="table">
            <thead><tr><th>Helyezés</th><th>Rajtszám</th><th>Név</th><th>Klub</th></tr></thead>
            <tbody>
              <tr><td colspan="4"><i>Döntő</i></td></tr>
              <tr><td>1.</td><td>12</td><td>Kiss Péter - Nagy Anna</td><td><i>Tánc SE</i></td></tr>
              <tr><td>2.</td><td>15</td><td>Horváth Máté - Lakatos Réka</td><td>Dance Klub</td></tr>
            </tbody></table>"#;
        let results = parse(html);
        let rows = results
            .results
            .iter()
            .map(|r| (r.position.as_str(), r.club.as_str(), r.section.as_str()))
            .collect_vec();
        assert_eq!(
            rows,
            vec![("1.", "Tánc SE", "Döntő"), ("2.", "Dance Klub", "Döntő")]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(RESULTS_PAGE), parse(RESULTS_PAGE));
    }

    #[test]
    fn test_rows_before_first_header_have_empty_section() {
        let html = r#"<table class="table"><thead><tr><th>Helyezés</th></tr></thead>
            <tbody><tr><td>1.</td><td>4</td><td>Pár</td><td>Klub</td></tr></tbody></table>"#;
        let results = parse(html);
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].section, "");
    }

    #[test]
    fn test_split_title_without_date() {
        assert_eq!(
            split_title_date("Spring Cup"),
            ("Spring Cup".to_string(), String::new())
        );
        assert_eq!(
            split_title_date("Tavaszi Kupa (2024.04.06)"),
            ("Tavaszi Kupa".to_string(), "2024.04.06".to_string())
        );
    }

    #[test]
    fn test_heading_without_date() {
        let results = parse("<h3>Spring Cup</h3>");
        assert_eq!(results.title, "Spring Cup");
        assert_eq!(results.date, "");
        assert!(results.judges.is_empty());
        assert!(results.results.is_empty());
        assert!(!results.has_officials());
    }

    #[test]
    fn test_official_value_stops_at_next_label() {
        let text = "Döntnök: Szabó Péter Számlálók: A, B";
        assert_eq!(official_value(text, "Döntnök").as_deref(), Some("Szabó Péter"));
        assert_eq!(official_value(text, "Számlálók").as_deref(), Some("A, B"));
        assert_eq!(official_value(text, "Műsorvezető"), None);
    }

    #[test]
    fn test_parse_judge_requires_pattern() {
        assert!(parse_judge("Kovács Béla", None).is_none());
        let judge = parse_judge("C - Tóth Anna (Pécs)", Some("")).unwrap();
        assert_eq!(judge.id.as_deref(), Some("C"));
        assert_eq!(judge.link, None);
    }
}
