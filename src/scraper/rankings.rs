use std::collections::BTreeMap;
use std::ops::Range;

use ::scraper::{ElementRef, Selector};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Dancer, RankedCompetition, RankingEntry, RankingQuery, Rankings, ScoreCell};
use crate::scraper::{self, absolute_url, cell_text, cells, element_text, text_lines};

/// Inline style upstream uses for scores that do not count towards the total.
const GRAYED_COLOR: &str = "color:#BBBBBB";

/// Leading columns (position, dancers) and trailing columns (WDSF, national,
/// points) around the per-competition score columns.
const LEADING_COLUMNS: usize = 2;
const TRAILING_COLUMNS: usize = 3;

#[instrument(skip(client))]
pub(crate) async fn get_rankings(
    client: &scraper::PageClient,
    base_url: &str,
    query: &RankingQuery,
) -> Result<Rankings> {
    let url = format!(
        "{base_url}/slp_poradie.php?dt_od={}&evkor={}&s_l={}",
        query.date, query.age_group, query.dance_type
    );
    let body = scraper::fetch_page(client, &url).await?;
    let mut rankings = parse_rankings(&scraper::parse_document(&body), base_url)?;

    // a page without the filter form still answers the query that was asked
    for (parsed, asked) in [
        (&mut rankings.date, &query.date),
        (&mut rankings.age_group, &query.age_group),
        (&mut rankings.dance_type, &query.dance_type),
    ] {
        if parsed.is_empty() {
            parsed.clone_from(asked);
        }
    }

    debug!(
        competitions = rankings.competitions.len(),
        entries = rankings.rankings.len(),
        "parsed rankings"
    );
    Ok(rankings)
}

/// Columns holding per-competition scores in a row (or header) of `len` cells.
pub(crate) fn ranking_columns(len: usize) -> Range<usize> {
    LEADING_COLUMNS..len.saturating_sub(TRAILING_COLUMNS).max(LEADING_COLUMNS)
}

pub(crate) fn parse_rankings(document: &scraper::Html, base_url: &str) -> Result<Rankings> {
    let root = document.root_element();
    let date_selector = Selector::parse("#dt_od")?;
    let age_group_selector = Selector::parse("#evkor option[selected]")?;
    let dance_type_selector = Selector::parse("#s_l option[selected]")?;

    let date = root
        .select(&date_selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(Rankings {
        date,
        age_group: scraper::select_text(&root, &age_group_selector),
        dance_type: scraper::select_text(&root, &dance_type_selector),
        competitions: parse_competitions(document, base_url)?,
        rankings: parse_entries(document, base_url)?,
    })
}

fn parse_competitions(document: &scraper::Html, base_url: &str) -> Result<Vec<RankedCompetition>> {
    let header_selector = Selector::parse("table thead tr th")?;
    let anchor_selector = Selector::parse("a")?;

    let headers = document.select(&header_selector).collect_vec();
    let competitions = headers
        .get(ranking_columns(headers.len()))
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(index, th)| {
            let anchor = th.select(&anchor_selector).next()?;
            let mut lines = text_lines(&anchor).into_iter();
            Some(RankedCompetition {
                index,
                name: lines.next().unwrap_or_default(),
                location: lines.next().unwrap_or_default(),
                date: lines.next().unwrap_or_default(),
                url: absolute_url(base_url, anchor.value().attr("href").unwrap_or_default()),
            })
        })
        .collect();

    Ok(competitions)
}

fn parse_entries(document: &scraper::Html, base_url: &str) -> Result<Vec<RankingEntry>> {
    let row_selector = Selector::parse("table tbody tr")?;

    document
        .select(&row_selector)
        .map(|row| cells(&row))
        .filter(|cells| cells.len() >= 3)
        .map(|cells| parse_entry(&cells, base_url))
        .collect()
}

fn parse_entry(cells: &[ElementRef], base_url: &str) -> Result<RankingEntry> {
    let len = cells.len();
    let competitions = ranking_columns(len)
        .filter_map(|column| {
            let cell = cells.get(column)?;
            let value = element_text(cell);
            (!value.is_empty()).then(|| {
                (
                    column - LEADING_COLUMNS,
                    ScoreCell {
                        value,
                        grayed: is_grayed(cell),
                    },
                )
            })
        })
        .collect::<BTreeMap<_, _>>();

    let trailing = |offset: usize| {
        len.checked_sub(offset)
            .map(|i| cell_text(cells, i))
            .unwrap_or_default()
    };

    Ok(RankingEntry {
        position: cell_text(cells, 0),
        dancers: match cells.get(1) {
            Some(cell) => parse_dancer(cell, base_url)?,
            None => Dancer {
                name: String::new(),
                club: String::new(),
                url: String::new(),
            },
        },
        competitions,
        wdsf: trailing(3),
        national: trailing(2),
        points: trailing(1),
    })
}

fn parse_dancer(cell: &ElementRef, base_url: &str) -> Result<Dancer> {
    let anchor_selector = Selector::parse("a")?;
    let anchor = cell.select(&anchor_selector).next();

    let name = anchor.map(|a| element_text(&a)).unwrap_or_default();
    let url = anchor
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_url(base_url, href))
        .unwrap_or_default();

    let club = cell
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| element_text(cell).replacen(&name, "", 1).trim().to_string());

    Ok(Dancer { name, club, url })
}

/// The cell, or markup inside it, is styled with the grayed-out color.
fn is_grayed(cell: &ElementRef) -> bool {
    cell.descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|e| e.value().attr("style"))
        .any(|style| {
            style
                .split_whitespace()
                .collect::<String>()
                .to_ascii_uppercase()
                .contains(&GRAYED_COLOR.to_ascii_uppercase())
        })
}
