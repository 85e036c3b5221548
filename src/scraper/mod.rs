pub(crate) mod competition_info;
pub(crate) mod competition_results;
pub(crate) mod entries;
pub(crate) mod listings;
pub(crate) mod participant;
pub(crate) mod rankings;
pub(crate) mod score_sheet;
pub(crate) mod sections;

use std::sync::LazyLock;

pub(crate) use ::scraper::Html;
use ::scraper::node::Node;
use ::scraper::{ElementRef, Selector};
use regex::Regex;
use reqwest::header::USER_AGENT;
use tracing::debug;

use crate::error::{MtaszError, Result};

#[allow(clippy::expect_used)]
static BR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br regex is valid"));

/// HTTP client paired with the User-Agent every page request carries.
///
/// The agent is set on each request, so a caller-supplied
/// [`reqwest::Client`] without one still gets the full pages.
#[derive(Debug, Clone)]
pub(crate) struct PageClient {
    http: reqwest::Client,
    user_agent: String,
}

impl PageClient {
    pub(crate) fn new(http: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            http,
            user_agent: user_agent.into(),
        }
    }
}

/// Fetch a URL and return the response body.
///
/// The body is returned unparsed so that callers never keep a parsed document
/// alive across an `.await`.
pub(crate) async fn fetch_page(client: &PageClient, url: &str) -> Result<String> {
    debug!(url, "fetching page");

    let response = client
        .http
        .get(url)
        .header(USER_AGENT, client.user_agent.as_str())
        .send()
        .await
        .map_err(|e| MtaszError::Http {
            url: url.to_owned(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(MtaszError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| MtaszError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

/// Parse a page body. Malformed markup is repaired, never rejected.
pub(crate) fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Extract trimmed text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}

/// All text below `element`, concatenated and trimmed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the element's direct text children only, ignoring nested markup.
pub(crate) fn own_text(element: &ElementRef) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|t| &**t)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Text split into trimmed, non-blank lines. Both newlines in text nodes and
/// `<br>` elements end a line.
pub(crate) fn text_lines(element: &ElementRef) -> Vec<String> {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inner HTML of the element with `<br>` tags turned into newlines.
pub(crate) fn inner_html_with_breaks(element: &ElementRef) -> String {
    BR_TAG
        .replace_all(&element.inner_html(), "\n")
        .into_owned()
}

/// `href` of the first anchor inside `element`, if any.
pub(crate) fn first_link(element: &ElementRef) -> Result<Option<String>> {
    let anchor_selector = Selector::parse("a")?;
    Ok(element
        .select(&anchor_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string))
}

/// Ordered `td` cells of a table row.
pub(crate) fn cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
        .collect()
}

/// Trimmed text of the `index`-th cell, empty when the row is shorter.
pub(crate) fn cell_text(cells: &[ElementRef], index: usize) -> String {
    cells.get(index).map(element_text).unwrap_or_default()
}

/// The nearest earlier sibling element matching `selector`.
pub(crate) fn closest_preceding_sibling<'a>(
    element: &ElementRef<'a>,
    selector: &Selector,
) -> Option<ElementRef<'a>> {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| selector.matches(sibling))
}

/// Make an upstream-relative link absolute.
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_text_lines_splits_on_breaks_and_newlines() {
        let document = parse_document(
            "<div id='x'>  Tánc SE<br>Budapest\n  Fő utca 1. <br/><br> <b>+36 1 234</b></div>",
        );
        let lines = text_lines(&first(&document, "#x"));
        assert_eq!(lines, vec!["Tánc SE", "Budapest", "Fő utca 1.", "+36 1 234"]);
    }

    #[test]
    fn test_inner_html_with_breaks() {
        let document = parse_document("<b id='x'>Első sor<br>Második sor<BR/>Harmadik</b>");
        assert_eq!(
            inner_html_with_breaks(&first(&document, "#x")),
            "Első sor\nMásodik sor\nHarmadik"
        );
    }

    #[test]
    fn test_own_text_skips_nested_elements() {
        let document = parse_document("<table><tr><td id='x'><a>Kiss Péter</a> Tánc SE</td></tr></table>");
        assert_eq!(own_text(&first(&document, "#x")), "Tánc SE");
    }

    #[test]
    fn test_closest_preceding_sibling() {
        let document = parse_document(
            "<div><h4>Első</h4><p>x</p><h4>Második</h4><p>y</p><table id='t'></table></div>",
        );
        let table = first(&document, "#t");
        let heading = Selector::parse("h4").unwrap();
        let found = closest_preceding_sibling(&table, &heading).unwrap();
        assert_eq!(element_text(&found), "Második");
    }

    #[test]
    fn test_cells_and_missing_cells() {
        let document = parse_document("<table><tr id='r'><td> 1 </td><td>2</td></tr></table>");
        let row_cells = cells(&first(&document, "#r"));
        assert_eq!(row_cells.len(), 2);
        assert_eq!(cell_text(&row_cells, 0), "1");
        assert_eq!(cell_text(&row_cells, 5), "");
    }

    #[test]
    fn test_absolute_url() {
        let base = "https://ksis.szts.sk/mtasz";
        assert_eq!(
            absolute_url(base, "par.php?id=1"),
            "https://ksis.szts.sk/mtasz/par.php?id=1"
        );
        assert_eq!(absolute_url(base, "https://x.hu/a"), "https://x.hu/a");
        assert_eq!(absolute_url(base, ""), "");
    }
}
