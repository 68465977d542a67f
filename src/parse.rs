use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::giveaway::{is_giveaway_url, Giveaway};
use crate::{Error, Result};

pub const NO_RESULTS: &str = "No results were found.";
pub const SIGNED_OUT: &str = "Sign in through STEAM";

const GIVEAWAY_ROW: &str = ".giveaway__row-inner-wrap";
const GIVEAWAY_HEADING_NAME: &str = ".giveaway__heading__name";
const GIVEAWAY_THUMBNAIL: &str = ".giveaway_image_thumbnail";
const GIVEAWAY_THUMBNAIL_MISSING: &str = ".giveaway_image_thumbnail_missing";
const GIVEAWAY_HEADING_THIN: &str = ".giveaway__heading__thin";
const NAV_POINTS: &str = ".nav__points";
const TABLE_ROW: &str = ".table__row-inner-wrap";
const TABLE_SECONDARY_LINK: &str = ".table__column__secondary-link";
const TABLE_HEADING: &str = ".table__column__heading";
const PAGE_NUMBER: &str = "[data-page-number]";

static NOT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());
static COPIES_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \(\d+ Copies\)").unwrap());

/// One page of the entered giveaways table.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnteredPage {
    /// Giveaways that are still open.
    pub urls: Vec<String>,
    /// Cleared once a finished giveaway closes the page or the page is empty.
    pub has_more: bool,
}

/// Runs `parse` over `html` on the blocking pool.
/// `Html` isn't `Send`, so the document never leaves that thread.
pub(crate) async fn parse_blocking<T, F>(html: String, parse: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&str) -> Result<T> + Send + 'static,
{
    spawn_blocking(move || parse(&html)).await?
}

/// Extracts every giveaway row of a search page.
/// Rows without a title or a giveaway link are skipped.
pub fn parse_giveaways(html: &str) -> Result<Vec<Giveaway>> {
    let doc = Html::parse_document(html);

    let row_selector = create_selector(GIVEAWAY_ROW)?;
    let name_selector = create_selector(GIVEAWAY_HEADING_NAME)?;
    let thumb_selector = create_selector(GIVEAWAY_THUMBNAIL)?;
    let thumb_missing_selector = create_selector(GIVEAWAY_THUMBNAIL_MISSING)?;
    let thin_selector = create_selector(GIVEAWAY_HEADING_THIN)?;

    // A full search page holds 50 rows.
    let mut giveaways = Vec::with_capacity(50);
    for row in doc.select(&row_selector) {
        let Some(name) = row.select(&name_selector).next() else {
            continue;
        };
        let title = element_text(name);

        let relative_url = first_href(row, &thumb_selector)
            .or_else(|| first_href(row, &thumb_missing_selector))
            .unwrap_or_default();
        if title.is_empty() || !is_giveaway_url(&relative_url) {
            debug!(%title, %relative_url, "skipping giveaway row");
            continue;
        }

        let point_cost = row
            .select(&thin_selector)
            .last()
            .and_then(|thin| parse_number(&element_text(thin)))
            .unwrap_or(0);

        giveaways.push(Giveaway::new(title, relative_url, point_cost));
    }
    Ok(giveaways)
}

/// Collects the links of open entries and tells whether the next page is worth fetching.
pub fn parse_entered_page(html: &str) -> Result<EnteredPage> {
    let doc = Html::parse_document(html);

    let row_selector = create_selector(TABLE_ROW)?;
    let secondary_selector = create_selector(TABLE_SECONDARY_LINK)?;
    let heading_selector = create_selector(TABLE_HEADING)?;

    let rows: Vec<ElementRef> = doc.select(&row_selector).collect();
    let mut page = EnteredPage {
        urls: Vec::with_capacity(rows.len()),
        has_more: !rows.is_empty(),
    };

    let last_idx = rows.len().saturating_sub(1);
    for (idx, row) in rows.into_iter().enumerate() {
        if row.select(&secondary_selector).next().is_some() {
            if let Some(url) = first_href(row, &heading_selector) {
                page.urls.push(url);
            }
        } else if idx == last_idx {
            page.has_more = false;
            break;
        }
    }
    Ok(page)
}

/// Highest `data-page-number` on the page.
pub fn parse_page_count(html: &str) -> Result<Option<usize>> {
    let doc = Html::parse_document(html);
    let selector = create_selector(PAGE_NUMBER)?;

    Ok(doc
        .select(&selector)
        .filter_map(|el| el.value().attr("data-page-number"))
        .filter_map(|n| n.trim().parse::<usize>().ok())
        .max())
}

/// Headings of the entered giveaways table, with the copy count suffix removed.
pub fn parse_entered_titles(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let selector = create_selector(TABLE_HEADING)?;

    Ok(doc
        .select(&selector)
        .map(|heading| strip_copies(&element_text(heading)))
        .collect())
}

/// The point balance shown in the navigation bar.
pub fn parse_points(html: &str) -> Result<Option<u32>> {
    let doc = Html::parse_document(html);
    let selector = create_selector(NAV_POINTS)?;

    Ok(doc
        .select(&selector)
        .next()
        .and_then(|points| parse_number(&element_text(points))))
}

/// `"Portal (3 Copies)"` -> `"Portal"`
pub fn strip_copies(title: &str) -> String {
    COPIES_SUFFIX.replace_all(title, "").into_owned()
}

/// Drops everything but the digits, `"(15P)"` -> `15`.
fn parse_number(text: &str) -> Option<u32> {
    NOT_NUMBER.replace_all(text, "").parse().ok()
}

fn first_href(el: ElementRef, selector: &Selector) -> Option<String> {
    el.select(selector)
        .find_map(|link| link.value().attr("href"))
        .map(str::to_string)
}

/// Text content with whitespace runs collapsed, the way it renders.
fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: Option<&str>, thumb: Option<&str>, missing: Option<&str>, thins: &[&str]) -> String {
        let name = name
            .map(|n| format!(r#"<a class="giveaway__heading__name">{n}</a>"#))
            .unwrap_or_default();
        let thins: String = thins
            .iter()
            .map(|t| format!(r#"<span class="giveaway__heading__thin">{t}</span>"#))
            .collect();
        let thumb = thumb
            .map(|h| format!(r#"<a class="global__image-outer-wrap giveaway_image_thumbnail" href="{h}"></a>"#))
            .unwrap_or_default();
        let missing = missing
            .map(|h| format!(r#"<a class="giveaway_image_thumbnail_missing" href="{h}"></a>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="giveaway__row-outer-wrap"><div class="giveaway__row-inner-wrap">
                <div class="giveaway__summary"><h2 class="giveaway__heading">{name}{thins}</h2></div>
                {thumb}{missing}
            </div></div>"#
        )
    }

    fn page(body: &str) -> String {
        format!("<html><body><div class=\"page__inner-wrap\">{body}</div></body></html>")
    }

    #[test]
    fn parses_giveaway_rows() {
        let html = page(&format!(
            "{}{}",
            row(Some("Half-Life 2"), Some("/giveaway/AAAAA/half-life-2"), None, &["(3 Copies)", "(15P)"]),
            row(Some("Portal"), None, Some("/giveaway/BBBBB/portal"), &["(5P)"]),
        ));

        let giveaways = parse_giveaways(&html).unwrap();
        assert_eq!(
            giveaways,
            vec![
                Giveaway::new("Half-Life 2", "/giveaway/AAAAA/half-life-2", 15),
                Giveaway::new("Portal", "/giveaway/BBBBB/portal", 5),
            ]
        );
    }

    #[test]
    fn skips_rows_without_title_or_link() {
        let html = page(&format!(
            "{}{}{}",
            row(None, Some("/giveaway/AAAAA/x"), None, &["(1P)"]),
            row(Some("No link"), None, None, &["(1P)"]),
            row(Some("Kept"), Some("/giveaway/CCCCC/kept"), None, &[]),
        ));

        let giveaways = parse_giveaways(&html).unwrap();
        assert_eq!(giveaways, vec![Giveaway::new("Kept", "/giveaway/CCCCC/kept", 0)]);
    }

    #[test]
    fn non_numeric_cost_is_zero() {
        let html = page(&row(Some("Odd"), Some("/giveaway/DDDDD/odd"), None, &["(Level 5+)", "(P)"]));
        assert_eq!(parse_giveaways(&html).unwrap()[0].point_cost, 0);
    }

    fn entered_row(heading: &str, open: bool) -> String {
        let secondary = if open {
            r#"<a class="table__column__secondary-link" href="/giveaway/x/">Comments</a>"#
        } else {
            ""
        };
        format!(
            r#"<div class="table__row-outer-wrap"><div class="table__row-inner-wrap">
                <div class="table__column--width-fill">
                    <p><a class="table__column__heading" href="{heading}">Title</a></p>
                    <p>{secondary}</p>
                </div>
            </div></div>"#
        )
    }

    #[test]
    fn entered_page_collects_open_rows() {
        let html = page(&format!(
            "{}{}",
            entered_row("/giveaway/AAAAA/a", true),
            entered_row("/giveaway/BBBBB/b", true),
        ));
        let parsed = parse_entered_page(&html).unwrap();
        assert_eq!(parsed.urls, vec!["/giveaway/AAAAA/a", "/giveaway/BBBBB/b"]);
        assert!(parsed.has_more);
    }

    #[test]
    fn entered_page_stops_on_finished_last_row() {
        let html = page(&format!(
            "{}{}{}",
            entered_row("/giveaway/AAAAA/a", true),
            entered_row("/giveaway/BBBBB/b", false),
            entered_row("/giveaway/CCCCC/c", false),
        ));
        let parsed = parse_entered_page(&html).unwrap();
        assert_eq!(parsed.urls, vec!["/giveaway/AAAAA/a"]);
        assert!(!parsed.has_more);
    }

    #[test]
    fn finished_row_in_the_middle_keeps_going() {
        let html = page(&format!(
            "{}{}",
            entered_row("/giveaway/AAAAA/a", false),
            entered_row("/giveaway/BBBBB/b", true),
        ));
        let parsed = parse_entered_page(&html).unwrap();
        assert_eq!(parsed.urls, vec!["/giveaway/BBBBB/b"]);
        assert!(parsed.has_more);
    }

    #[test]
    fn empty_entered_page_stops() {
        assert_eq!(parse_entered_page(&page("")).unwrap(), EnteredPage::default());
    }

    #[test]
    fn page_count_is_highest_page_number() {
        let html = page(
            r#"<div class="pagination__navigation">
                <a data-page-number="2">2</a><a data-page-number="7">Last</a><a data-page-number="3">Next</a>
            </div>"#,
        );
        assert_eq!(parse_page_count(&html).unwrap(), Some(7));
        assert_eq!(parse_page_count(&page("")).unwrap(), None);
    }

    #[test]
    fn entered_titles_drop_copy_count() {
        let html = page(
            r#"<a class="table__column__heading">Portal (3 Copies)</a>
               <a class="table__column__heading">Half-Life 2</a>"#,
        );
        assert_eq!(parse_entered_titles(&html).unwrap(), vec!["Portal", "Half-Life 2"]);
    }

    #[test]
    fn strips_only_copy_suffix() {
        assert_eq!(strip_copies("Game (12 Copies)"), "Game");
        assert_eq!(strip_copies("Game (Copies)"), "Game (Copies)");
    }

    #[test]
    fn nav_points() {
        let html = page(r#"<a class="nav__button"><span class="nav__points">1,234</span>P</a>"#);
        assert_eq!(parse_points(&html).unwrap(), Some(1234));
        assert_eq!(parse_points(&page("")).unwrap(), None);
    }

    #[tokio::test]
    async fn parses_on_blocking_pool() {
        let html = page(&row(Some("Portal"), Some("/giveaway/BBBBB/portal"), None, &["(5P)"]));
        let giveaways = parse_blocking(html, parse_giveaways).await.unwrap();
        assert_eq!(giveaways.len(), 1);
    }
}
