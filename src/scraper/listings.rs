use std::sync::LazyLock;

use ::scraper::{ElementRef, Selector};
use chrono::NaiveDate;
use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::model::{Category, Competition, CompetitionListing, Month};
use crate::scraper::{self, absolute_url, cells, element_text, select_text};

pub(crate) const LISTING_DATE_FORMAT: &str = "%Y.%m.%d";

/// Script link to a competition's info page: `javascript: ukazProp(1234)`.
#[allow(clippy::expect_used)]
static INFO_SCRIPT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ukazProp\((\d+)\)").expect("info link regex is valid")
});

/// Link captions that trail the category list.
const LINK_CAPTIONS: &[&str] = &["Nevezések", "Információk"];

const MONTHS: &[&str] = &[
    "Január",
    "Február",
    "Március",
    "Április",
    "Május",
    "Június",
    "Július",
    "Augusztus",
    "Szeptember",
    "Október",
    "November",
    "December",
];

/// Which rows of a calendar page to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListingFilter {
    All,
    /// Drop competitions dated strictly before the given day.
    NotBefore(NaiveDate),
}

/// The current season calendar, every announced competition.
#[instrument(skip(client))]
pub(crate) async fn get_calendar(
    client: &scraper::PageClient,
    base_url: &str,
    filter: ListingFilter,
) -> Result<CompetitionListing> {
    let url = format!("{base_url}/menu.php?akcia=KS");
    let body = scraper::fetch_page(client, &url).await?;
    let mut listing = parse_listing(&scraper::parse_document(&body), base_url, filter)?;
    if let ListingFilter::NotBefore(_) = filter {
        sort_months(&mut listing);
    }
    debug!(
        months = listing.months.len(),
        competitions = listing.competition_count(),
        "parsed competition calendar"
    );
    Ok(listing)
}

/// Competitions held in a past year.
#[instrument(skip(client))]
pub(crate) async fn get_previous_year(
    client: &scraper::PageClient,
    base_url: &str,
    year: &str,
) -> Result<CompetitionListing> {
    let url = format!("{base_url}/menu.php?akcia=S&rok={year}");
    let body = scraper::fetch_page(client, &url).await?;
    let listing = parse_listing(&scraper::parse_document(&body), base_url, ListingFilter::All)?;
    debug!(
        months = listing.months.len(),
        competitions = listing.competition_count(),
        "parsed previous competitions"
    );
    Ok(listing)
}

pub(crate) fn parse_listing(
    document: &scraper::Html,
    base_url: &str,
    filter: ListingFilter,
) -> Result<CompetitionListing> {
    let panel_selector = Selector::parse(".panel.panel-primary")?;
    let heading_selector = Selector::parse(".panel-heading")?;
    let row_selector = Selector::parse("table tbody tr")?;

    let mut months = Vec::new();
    for panel in document.select(&panel_selector) {
        let name = select_text(&panel, &heading_selector);
        if name.is_empty() {
            trace!("skipping panel without month heading");
            continue;
        }

        let mut competitions = Vec::new();
        for row in panel.select(&row_selector) {
            if let Some(competition) = parse_row(&row, base_url, filter)? {
                competitions.push(competition);
            }
        }

        if !competitions.is_empty() {
            months.push(Month { name, competitions });
        }
    }

    Ok(CompetitionListing { months })
}

fn parse_row(row: &ElementRef, base_url: &str, filter: ListingFilter) -> Result<Option<Competition>> {
    let strong_selector = Selector::parse("strong")?;
    let title_selector = Selector::parse("font strong")?;
    let title_link_selector = Selector::parse("font strong a")?;
    let category_link_selector = Selector::parse("a.sut_pod")?;

    let cells = cells(row);
    let (Some(date_cell), Some(content)) = (cells.first(), cells.last()) else {
        return Ok(None);
    };
    if cells.len() < 2 {
        return Ok(None);
    }

    let date = select_text(date_cell, &strong_selector);
    if date.is_empty() {
        return Ok(None);
    }
    if let ListingFilter::NotBefore(today) = filter {
        match parse_listing_date(&date) {
            Some(day) if day >= today => {}
            Some(_) => {
                trace!(date, "skipping past competition");
                return Ok(None);
            }
            None => {
                trace!(date, "skipping competition with unreadable date");
                return Ok(None);
            }
        }
    }

    let title = select_text(content, &title_selector);
    if title.is_empty() {
        return Ok(None);
    }

    let strongs = content
        .select(&strong_selector)
        .map(|s| element_text(&s))
        .collect_vec();
    let labeled = |index: usize| strongs.get(index).map(|s| strip_label(s)).unwrap_or_default();
    let location = labeled(1);
    let organizer = labeled(2);
    let deadline = labeled(3);

    let linked_categories = content
        .select(&category_link_selector)
        .map(|a| Category {
            name: element_text(&a),
            url: absolute_url(base_url, a.value().attr("href").unwrap_or_default()),
        })
        .filter(|c| !c.name.is_empty())
        .collect_vec();
    let categories = if linked_categories.is_empty() {
        let anchor = if deadline.is_empty() {
            strongs.last().cloned().unwrap_or_default()
        } else {
            deadline.clone()
        };
        text_categories(&element_text(content), &anchor)
    } else {
        linked_categories
    };

    let url = match content
        .select(&title_link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
    {
        Some(href) if !href.is_empty() => absolute_url(base_url, href),
        _ => INFO_SCRIPT_LINK
            .captures(&content.inner_html())
            .map(|caps| format!("{base_url}/prop.php?id_prop={}", &caps[1]))
            .unwrap_or_default(),
    };

    let non_empty = |s: String| Some(s).filter(|s| !s.is_empty());
    Ok(Some(Competition {
        date,
        title,
        exact_location: non_empty(location.clone()),
        location,
        categories,
        url,
        organizer: non_empty(organizer),
        deadline: non_empty(deadline),
    }))
}

/// Parse a `YYYY.MM.DD` calendar date, tolerating a trailing dot.
pub(crate) fn parse_listing_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim().trim_end_matches('.'), LISTING_DATE_FORMAT).ok()
}

/// Drop a leading `"Label: "` prefix.
fn strip_label(text: &str) -> String {
    text.split_once(": ")
        .map(|(_, value)| value)
        .unwrap_or(text)
        .trim()
        .to_string()
}

/// Categories listed as plain text: everything after `anchor` (normally the
/// deadline value) up to the trailing link captions, comma separated.
pub(crate) fn text_categories(content: &str, anchor: &str) -> Vec<Category> {
    if anchor.is_empty() {
        return Vec::new();
    }
    let Some(start) = content.find(anchor) else {
        return Vec::new();
    };
    let tail = &content[start + anchor.len()..];
    let end = LINK_CAPTIONS
        .iter()
        .filter_map(|caption| tail.find(caption))
        .min()
        .unwrap_or(tail.len());

    tail[..end]
        .split_whitespace()
        .join(" ")
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.contains("<br>"))
        .map(|name| Category {
            name: name.to_string(),
            url: String::new(),
        })
        .collect()
}

/// Order months by the year in their heading, then by calendar position of
/// the leading month name. Headings without a year sort before dated ones,
/// unknown month names first within a year; ties keep page order.
pub(crate) fn sort_months(listing: &mut CompetitionListing) {
    listing.months.sort_by_key(|month| month_key(&month.name));
}

fn month_key(heading: &str) -> (Option<i32>, usize) {
    let mut words = heading.split_whitespace();
    let name = words.next().unwrap_or_default();
    let year = words.last().and_then(|w| w.trim_end_matches('.').parse().ok());
    let position = MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i + 1)
        .unwrap_or(0);
    (year, position)
}
