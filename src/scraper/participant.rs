use std::sync::LazyLock;

use ::scraper::{ElementRef, Selector};
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Participant, ParticipantCompetition};
use crate::scraper::{self, cell_text, cells, first_link, select_text};

#[allow(clippy::expect_used)]
static AGE_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Korcsoport: \*\*([^*]+)\*\*").expect("age group regex is valid")
});

#[allow(clippy::expect_used)]
static STANDARD_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Standard besorolás: \*\*([^*]+)\*\*").expect("standard class regex is valid")
});

#[allow(clippy::expect_used)]
static LATIN_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Latin besorolás: \*\*([^*]+)\*\*").expect("latin class regex is valid")
});

const HISTORY_HEADER: &str = "Dátum";
const MIN_HISTORY_CELLS: usize = 5;

/// Column layout of the history table. Column 1 carries nothing we keep.
mod history_columns {
    pub(super) const DATE: usize = 0;
    pub(super) const EVENT: usize = 2;
    pub(super) const CATEGORY: usize = 3;
    pub(super) const PARTICIPANTS: usize = 4;
    pub(super) const POSITION: usize = 5;
    pub(super) const STANDARD: usize = 6;
    pub(super) const LATIN: usize = 7;
    pub(super) const POINTS: usize = 8;
}

#[instrument(skip(client))]
pub(crate) async fn get_participant(
    client: &scraper::PageClient,
    base_url: &str,
    id: &str,
) -> Result<Participant> {
    let url = format!("{base_url}/par.php?id={id}");
    let body = scraper::fetch_page(client, &url).await?;
    let participant = parse_participant(&scraper::parse_document(&body))?;
    debug!(
        name = %participant.name,
        competitions = participant.competitions.len(),
        "parsed participant"
    );
    Ok(participant)
}

pub(crate) fn parse_participant(document: &scraper::Html) -> Result<Participant> {
    let root = document.root_element();
    let name_selector = Selector::parse("h3")?;
    let club_selector = Selector::parse("p")?;
    let classification_selector = Selector::parse("h5 + p")?;

    let classification = select_text(&root, &classification_selector);

    Ok(Participant {
        name: select_text(&root, &name_selector),
        club: select_text(&root, &club_selector),
        age_group: capture(&AGE_GROUP, &classification),
        standard_class: capture(&STANDARD_CLASS, &classification),
        latin_class: capture(&LATIN_CLASS, &classification),
        competitions: parse_history(document)?,
    })
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_history(document: &scraper::Html) -> Result<Vec<ParticipantCompetition>> {
    let table_selector = Selector::parse("table.table")?;
    let first_header_selector = Selector::parse("thead th")?;
    let row_selector = Selector::parse("tbody tr")?;

    let Some(table) = document
        .select(&table_selector)
        .find(|table| select_text(table, &first_header_selector).contains(HISTORY_HEADER))
    else {
        return Ok(Vec::new());
    };

    table
        .select(&row_selector)
        .filter_map(|row| {
            let cells = cells(&row);
            (cells.len() >= MIN_HISTORY_CELLS).then(|| parse_history_row(&cells))
        })
        .collect()
}

fn parse_history_row(cells: &[ElementRef]) -> Result<ParticipantCompetition> {
    use history_columns::*;

    let link = |index: usize| -> Result<Option<String>> {
        match cells.get(index) {
            Some(cell) => first_link(cell),
            None => Ok(None),
        }
    };

    Ok(ParticipantCompetition {
        date: cell_text(cells, DATE),
        event: cell_text(cells, EVENT),
        category: cell_text(cells, CATEGORY),
        participants_count: cell_text(cells, PARTICIPANTS),
        position: cell_text(cells, POSITION),
        standard: cell_text(cells, STANDARD),
        latin: cell_text(cells, LATIN),
        points: cell_text(cells, POINTS),
        event_link: link(EVENT)?,
        category_link: link(CATEGORY)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTICIPANT_PAGE: &str = r#"
        <html><body><div class="container">
          <h3>Kiss Péter - Nagy Anna</h3>
          <p>Budapesti Tánc SE</p>
          <h5>Besorolás</h5>
          <p>Korcsoport: **Felnőtt** Standard besorolás: **A** Latin besorolás: **B**</p>
          <table class="table">
            <thead><tr><th>Dátum</th><th>#</th><th>Verseny</th><th>Kategória</th><th>Párok</th><th>Helyezés</th><th>ST</th><th>LA</th><th>Pont</th></tr></thead>
            <tbody>
              <tr>
                <td>2024.10.12</td><td>1</td>
                <td><a href="sutaz.php?sutaz_id=900">Őszi Kupa</a></td>
                <td><a href="vysledky.php?id=5">Felnőtt Standard</a></td>
                <td>12</td><td>2.</td><td>40</td><td></td><td>40</td>
              </tr>
              <tr><td>2024.09.01</td><td>2</td><td>Nyári Kupa</td><td>Felnőtt Latin</td><td>8</td></tr>
              <tr><td>hiányos</td><td>sor</td></tr>
            </tbody>
          </table>
        </div></body></html>
    "#;

    #[test]
    fn test_parse_participant_profile() {
        let participant = parse_participant(&scraper::parse_document(PARTICIPANT_PAGE)).unwrap();

        assert_eq!(participant.name, "Kiss Péter - Nagy Anna");
        assert_eq!(participant.club, "Budapesti Tánc SE");
        assert_eq!(participant.age_group.as_deref(), Some("Felnőtt"));
        assert_eq!(participant.standard_class.as_deref(), Some("A"));
        assert_eq!(participant.latin_class.as_deref(), Some("B"));
    }

    #[test]
    fn test_parse_participant_history() {
        let participant = parse_participant(&scraper::parse_document(PARTICIPANT_PAGE)).unwrap();
        let history = &participant.competitions;
        assert_eq!(history.len(), 2);

        assert_eq!(
            history[0],
            ParticipantCompetition {
                date: "2024.10.12".to_string(),
                event: "Őszi Kupa".to_string(),
                category: "Felnőtt Standard".to_string(),
                participants_count: "12".to_string(),
                position: "2.".to_string(),
                standard: "40".to_string(),
                latin: String::new(),
                points: "40".to_string(),
                event_link: Some("sutaz.php?sutaz_id=900".to_string()),
                category_link: Some("vysledky.php?id=5".to_string()),
            }
        );

        assert_eq!(history[1].event, "Nyári Kupa");
        assert_eq!(history[1].position, "");
        assert_eq!(history[1].event_link, None);
    }

    #[test]
    fn test_profile_without_classification_or_history() {
        let participant =
            parse_participant(&scraper::parse_document("<h3>Új Pár</h3><p>Klub</p>")).unwrap();
        assert_eq!(participant.name, "Új Pár");
        assert_eq!(participant.age_group, None);
        assert_eq!(participant.standard_class, None);
        assert!(participant.competitions.is_empty());
    }
}
