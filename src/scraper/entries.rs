use ::scraper::{ElementRef, Selector};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Entrant, EntryCategory, EntryList};
use crate::scraper::{self, cell_text, cells, element_text, own_text, select_text};

const TITLE_PREFIX: &str = "Nevezések:";

#[instrument(skip(client))]
pub(crate) async fn get_entry_list(
    client: &scraper::PageClient,
    base_url: &str,
    id: &str,
) -> Result<EntryList> {
    let url = format!("{base_url}/zoznam_prihl.php?id_prop={id}");
    let body = scraper::fetch_page(client, &url).await?;
    let entries = parse_entry_list(&scraper::parse_document(&body))?;
    debug!(
        categories = entries.categories.len(),
        "parsed competition entry list"
    );
    Ok(entries)
}

pub(crate) fn parse_entry_list(document: &scraper::Html) -> Result<EntryList> {
    let jumbotron_selector = Selector::parse(".jumbotron")?;
    let heading_selector = Selector::parse("h3")?;
    let date_selector = Selector::parse("h3 small")?;
    let location_selector = Selector::parse("p")?;
    let count_selector = Selector::parse("h5")?;

    let mut entries = EntryList::default();

    if let Some(jumbotron) = document.select(&jumbotron_selector).next() {
        entries.title = jumbotron
            .select(&heading_selector)
            .next()
            .map(|h3| own_text(&h3))
            .unwrap_or_default()
            .trim_start_matches(TITLE_PREFIX)
            .trim()
            .to_string();
        entries.date = select_text(&jumbotron, &date_selector);
        entries.location = select_text(&jumbotron, &location_selector);
        entries.participant_count = select_text(&jumbotron, &count_selector);
    }

    let table_selector = Selector::parse(".container table.table")?;
    for table in document.select(&table_selector) {
        if let Some(category) = parse_category(&table)? {
            entries.categories.push(category);
        }
    }

    Ok(entries)
}

/// One category table; `None` when the table has no category caption.
fn parse_category(table: &ElementRef) -> Result<Option<EntryCategory>> {
    let name_selector = Selector::parse("thead th.titulka strong")?;
    let row_selector = Selector::parse("tbody tr")?;

    let name = table
        .select(&name_selector)
        .map(|strong| element_text(&strong))
        .collect::<String>();
    if name.is_empty() {
        return Ok(None);
    }

    let participants = table
        .select(&row_selector)
        .map(|row| {
            let cells = cells(&row);
            Entrant {
                number: cell_text(&cells, 0),
                name: cell_text(&cells, 1),
                club: cell_text(&cells, 2),
                country: Some(cell_text(&cells, 3)).filter(|c| !c.is_empty()),
            }
        })
        .collect();

    Ok(Some(EntryCategory { name, participants }))
}
