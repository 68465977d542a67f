use std::collections::HashMap;

use chrono::Local;
use tokio::task::JoinSet;
use tracing::warn;

use crate::config::SiteConfig;
use crate::giveaway::Giveaway;
use crate::info_time;
use crate::parse::{parse_blocking, parse_giveaways, NO_RESULTS};
use crate::request::{request_pages, HttpClient, Page};

/// Scrapes every open giveaway from the search pages.
///
/// Pages are requested `batch_width` at a time and each batch is joined before the next one goes out.
/// The listing has no page count, so the first empty page ends the scrape; at most one batch is
/// wasted on pages past the end. Giveaways are keyed by their relative URL, a later page wins.
pub async fn scrape_available(client: &HttpClient) -> Vec<Giveaway> {
    let start_time = Local::now();
    let batch_width = client.site().batch_width.max(1);

    let mut giveaways: HashMap<String, Giveaway> = HashMap::new();
    let mut next_page = 1;
    let mut scraped_pages = 0;
    let mut has_more = true;

    while has_more {
        let batch = request_pages(
            client,
            next_page..next_page + batch_width,
            SiteConfig::search_url,
        );
        next_page += batch_width;

        for (_, parsed) in parse_batch(batch).await {
            let Some(page_giveaways) = parsed else {
                has_more = false;
                continue;
            };
            scraped_pages += 1;
            for giveaway in page_giveaways {
                giveaways.insert(giveaway.relative_url.clone(), giveaway);
            }
        }

        info_time!(
            start_time,
            "Scraped {} pages, found {} giveaways",
            scraped_pages,
            giveaways.len()
        );
    }

    let mut giveaways: Vec<Giveaway> = giveaways.into_values().collect();
    giveaways.sort_unstable_by(|a, b| a.relative_url.cmp(&b.relative_url));
    giveaways
}

/// Awaits a whole batch and parses it, returning the pages in page order.
/// `None` marks the end of the listing: an empty page or one that couldn't be fetched or parsed.
async fn parse_batch(
    mut batch: JoinSet<(usize, Option<Page>)>,
) -> Vec<(usize, Option<Vec<Giveaway>>)> {
    let mut pages = Vec::with_capacity(batch.len());

    while let Some(task) = batch.join_next().await {
        let (page_num, page) = match task {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, "page task failed");
                continue;
            }
        };

        let parsed = match page {
            Some(page) if !page.contains(NO_RESULTS) => {
                match parse_blocking(page.into_html(), parse_giveaways).await {
                    Ok(giveaways) => Some(giveaways),
                    Err(e) => {
                        warn!(page_num, error = %e, "failed to parse search page");
                        None
                    }
                }
            }
            _ => {
                info_time!("Found EMPTY page: {}", page_num);
                None
            }
        };
        pages.push((page_num, parsed));
    }

    pages.sort_unstable_by_key(|(page_num, _)| *page_num);
    pages
}
