use ::scraper::{ElementRef, Selector};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::CompetitionInfo;
use crate::scraper::{self, element_text, inner_html_with_breaks, select_text, text_lines};

const INFO_LABEL: &str = "Információk";
const ORGANIZER_LABEL: &str = "Versenyért felelős tagszervezet";
const REPRESENTATIVE_LABEL: &str = "Tagszervezet képviselője";

/// Single-valued fields of the info page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoField {
    Title,
    Date,
    Location,
    Deadline,
    VenueCapacity,
    DanceFloorSize,
    DanceFloorSurface,
    EntranceFee,
    Awards,
    Notes,
}

/// Row label to field. Labels are matched exactly, unknown labels are ignored.
const INFO_LABELS: &[(&str, InfoField)] = &[
    ("Elnevezés", InfoField::Title),
    ("Dátum", InfoField::Date),
    ("Helyszín", InfoField::Location),
    ("Nevezés határideje", InfoField::Deadline),
    ("Befogadó képesség", InfoField::VenueCapacity),
    ("Tánctér mérete", InfoField::DanceFloorSize),
    ("Tánctér burkolata", InfoField::DanceFloorSurface),
    ("Belépőjegy", InfoField::EntranceFee),
    ("Díjazás", InfoField::Awards),
    ("Megjegyzések", InfoField::Notes),
];

impl InfoField {
    fn lookup(label: &str) -> Option<Self> {
        INFO_LABELS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, field)| *field)
    }

    fn slot(self, info: &mut CompetitionInfo) -> &mut String {
        match self {
            InfoField::Title => &mut info.title,
            InfoField::Date => &mut info.date,
            InfoField::Location => &mut info.location,
            InfoField::Deadline => &mut info.deadline,
            InfoField::VenueCapacity => &mut info.venue_capacity,
            InfoField::DanceFloorSize => &mut info.dance_floor_size,
            InfoField::DanceFloorSurface => &mut info.dance_floor_surface,
            InfoField::EntranceFee => &mut info.entrance_fee,
            InfoField::Awards => &mut info.awards,
            InfoField::Notes => &mut info.notes,
        }
    }
}

#[instrument(skip(client))]
pub(crate) async fn get_competition_info(
    client: &scraper::PageClient,
    base_url: &str,
    id: &str,
) -> Result<CompetitionInfo> {
    let url = format!("{base_url}/prop.php?lang=hu&id_prop={id}");
    let body = scraper::fetch_page(client, &url).await?;
    let info = parse_competition_info(&scraper::parse_document(&body))?;
    debug!(title = %info.title, "parsed competition info");
    Ok(info)
}

pub(crate) fn parse_competition_info(document: &scraper::Html) -> Result<CompetitionInfo> {
    let row_selector = Selector::parse(".row")?;
    let label_selector = Selector::parse(".col-md-3")?;
    let value_block_selector = Selector::parse(".col-md-9")?;
    let value_selector = Selector::parse(".col-md-9 b")?;

    let mut info = CompetitionInfo::default();

    for row in document.select(&row_selector) {
        let label = select_text(&row, &label_selector);
        match label.as_str() {
            INFO_LABEL => {
                if let Some(value) = row.select(&value_selector).next() {
                    info.info = inner_html_with_breaks(&value);
                }
            }
            ORGANIZER_LABEL => {
                let lines = row
                    .select(&value_block_selector)
                    .next()
                    .map(|block| text_lines(&block))
                    .unwrap_or_default();
                apply_organizer_lines(&mut info, &lines);
            }
            REPRESENTATIVE_LABEL => {
                info.representative = bold_text(&row, &value_selector);
            }
            other => {
                if let Some(field) = InfoField::lookup(other) {
                    *field.slot(&mut info) = bold_text(&row, &value_selector);
                }
            }
        }
    }

    Ok(info)
}

/// Text of every bold span of the value cell, joined by single spaces.
fn bold_text(row: &ElementRef, value_selector: &Selector) -> String {
    row.select(value_selector)
        .map(|b| element_text(&b))
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// The organizer block is an unlabeled list of lines, read positionally:
/// name, address, phone, email, website. Missing trailing lines leave the
/// corresponding fields empty; extra lines are ignored.
pub(crate) fn organizer_lines(lines: &[String]) -> [String; 5] {
    let mut fields: [String; 5] = Default::default();
    for (slot, line) in fields.iter_mut().zip(lines) {
        *slot = line.clone();
    }
    fields
}

fn apply_organizer_lines(info: &mut CompetitionInfo, lines: &[String]) {
    let [name, address, phone, email, website] = organizer_lines(lines);
    info.organizer = name;
    info.organizer_address = address;
    info.organizer_phone = phone;
    info.organizer_email = email;
    info.organizer_website = website;
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PAGE: &str = r#"
        <html><body><div class="container">
          <div class="row"><div class="col-md-3">Elnevezés</div><div class="col-md-9"><b>Őszi Kupa</b></div></div>
          <div class="row"><div class="col-md-3">Dátum</div><div class="col-md-9"><b>2024.10.12</b></div></div>
          <div class="row"><div class="col-md-3">Helyszín</div><div class="col-md-9"><b>Budapest, Sportcsarnok</b></div></div>
          <div class="row"><div class="col-md-3">Információk</div><div class="col-md-9"><b>Kezdés 9:00<br>Eredményhirdetés 18:00<br/>Büfé</b></div></div>
          <div class="row"><div class="col-md-3">Versenyért felelős tagszervezet</div>
            <div class="col-md-9">
              Budapesti Tánc SE
              <br>1111 Budapest, Fő utca 1.
              <br>+36 1 234 5678
              <br>info@tancse.hu
              <br>www.tancse.hu
            </div></div>
          <div class="row"><div class="col-md-3">Tagszervezet képviselője</div><div class="col-md-9"><b>Kiss Anna</b></div></div>
          <div class="row"><div class="col-md-3">Nevezés határideje</div><div class="col-md-9"><b>2024.10.05</b></div></div>
          <div class="row"><div class="col-md-3">Tánctér mérete</div><div class="col-md-9"><b>20 x 14 m</b></div></div>
          <div class="row"><div class="col-md-3">Tánctér burkolata</div><div class="col-md-9"><b>parketta</b></div></div>
          <div class="row"><div class="col-md-3">Belépőjegy</div><div class="col-md-9"><b>3000 Ft</b></div></div>
          <div class="row"><div class="col-md-3">Ismeretlen</div><div class="col-md-9"><b>figyelmen kívül</b></div></div>
        </div></body></html>
    "#;

    #[test]
    fn test_parse_competition_info() {
        let document = scraper::parse_document(INFO_PAGE);
        let info = parse_competition_info(&document).unwrap();

        assert_eq!(info.title, "Őszi Kupa");
        assert_eq!(info.date, "2024.10.12");
        assert_eq!(info.location, "Budapest, Sportcsarnok");
        assert_eq!(info.info, "Kezdés 9:00\nEredményhirdetés 18:00\nBüfé");
        assert_eq!(info.organizer, "Budapesti Tánc SE");
        assert_eq!(info.organizer_address, "1111 Budapest, Fő utca 1.");
        assert_eq!(info.organizer_phone, "+36 1 234 5678");
        assert_eq!(info.organizer_email, "info@tancse.hu");
        assert_eq!(info.organizer_website, "www.tancse.hu");
        assert_eq!(info.representative, "Kiss Anna");
        assert_eq!(info.deadline, "2024.10.05");
        assert_eq!(info.dance_floor_size, "20 x 14 m");
        assert_eq!(info.dance_floor_surface, "parketta");
        assert_eq!(info.entrance_fee, "3000 Ft");
        // absent labels stay empty
        assert_eq!(info.venue_capacity, "");
        assert_eq!(info.awards, "");
        assert_eq!(info.notes, "");
    }

    #[test]
    fn test_value_with_several_bold_spans() {
        let document = scraper::parse_document(
            r#"<div class="row"><div class="col-md-3">Nevezés határideje</div>
               <div class="col-md-9"><b>2024.10.05</b> éjfél, <b>12:00</b></div></div>
               <div class="row"><div class="col-md-3">Tagszervezet képviselője</div>
               <div class="col-md-9"><b>Kiss</b> <b>Anna</b></div></div>"#,
        );
        let info = parse_competition_info(&document).unwrap();
        assert_eq!(info.deadline, "2024.10.05 12:00");
        assert_eq!(info.representative, "Kiss Anna");
    }

    #[test]
    fn test_organizer_lines_short_block() {
        let lines = vec!["Tánc SE".to_string(), "Szeged".to_string()];
        let [name, address, phone, email, website] = organizer_lines(&lines);
        assert_eq!(name, "Tánc SE");
        assert_eq!(address, "Szeged");
        assert_eq!(phone, "");
        assert_eq!(email, "");
        assert_eq!(website, "");
    }

    #[test]
    fn test_empty_page_yields_empty_record() {
        let document = scraper::parse_document("<html><body><p>Nincs adat</p></body></html>");
        let info = parse_competition_info(&document).unwrap();
        assert_eq!(info, CompetitionInfo::default());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_competition_info(&scraper::parse_document(INFO_PAGE)).unwrap();
        let second = parse_competition_info(&scraper::parse_document(INFO_PAGE)).unwrap();
        assert_eq!(first, second);
    }
}
