use std::collections::HashSet;

use chrono::Local;
use tracing::warn;

use crate::config::SiteConfig;
use crate::info_time;
use crate::parse::{parse_blocking, parse_entered_page, parse_entered_titles, parse_page_count};
use crate::request::{request_pages, HttpClient};

/// Links to the giveaways we already entered that are still open.
///
/// The entered list is newest first, so pages are walked one by one until a page ends on a
/// finished giveaway. A page that can't be fetched or parsed ends the walk early.
pub async fn entered_urls(client: &HttpClient) -> Vec<String> {
    let start_time = Local::now();
    let mut urls = Vec::new();
    let mut page_num = 1;
    let mut scraped_pages = 0;

    loop {
        let url = client.site().entered_search_url(page_num);
        let Some(page) = client.fetch_page(&url).await else {
            break;
        };

        let entered = match parse_blocking(page.into_html(), parse_entered_page).await {
            Ok(entered) => entered,
            Err(e) => {
                warn!(page_num, error = %e, "failed to parse entered page");
                break;
            }
        };
        scraped_pages += 1;
        urls.extend(entered.urls);

        if !entered.has_more {
            break;
        }
        page_num += 1;
    }

    info_time!(
        start_time,
        "Found {} entered giveaways on {} pages",
        urls.len(),
        scraped_pages
    );
    urls
}

/// Titles of every giveaway ever entered, without the copy count.
/// All pages are requested at once, their count comes from the pagination links.
pub async fn entered_titles(client: &HttpClient) -> HashSet<String> {
    let mut titles = HashSet::new();

    let Some(landing) = client.fetch_page(&client.site().entered_url()).await else {
        return titles;
    };
    let page_count = match parse_page_count(landing.html()) {
        Ok(Some(count)) => count,
        Ok(None) => return titles,
        Err(e) => {
            warn!(error = %e, "failed to read entered page count");
            return titles;
        }
    };

    let mut pages = request_pages(client, 1..=page_count, SiteConfig::entered_search_url);
    while let Some(task) = pages.join_next().await {
        let page = match task {
            Ok((_, Some(page))) => page,
            Ok((_, None)) => continue,
            Err(e) => {
                warn!(error = %e, "entered page task failed");
                continue;
            }
        };

        match parse_blocking(page.into_html(), parse_entered_titles).await {
            Ok(page_titles) => titles.extend(page_titles),
            Err(e) => warn!(error = %e, "failed to parse entered titles"),
        }
    }
    titles
}
