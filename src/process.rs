use std::collections::HashSet;

use chrono::Local;

use crate::classify::classify;
use crate::config::SiteConfig;
use crate::entered::entered_urls;
use crate::giveaway::Giveaway;
use crate::request::HttpClient;
use crate::rules::RulesFile;
use crate::scrape::scrape_available;
use crate::session::probe_session;
use crate::submit::{enter_giveaways, Summary};
use crate::{info_time, Result};

/// Runs the whole pipeline: rules, session check, scrape, diff, classify, enter.
pub async fn process_site(site: SiteConfig) -> Result<Summary> {
    let start_time = Local::now();

    let rules = RulesFile::load(&site.requests_path)?;
    let client = HttpClient::new(site, &rules)?;
    probe_session(&client).await?;
    info_time!("Session is valid, started scraping");

    let available = scrape_available(&client).await;
    info_time!(start_time, "Found {} open giveaways", available.len());

    let entered: HashSet<String> = entered_urls(&client).await.into_iter().collect();
    let candidates = select_candidates(available, &entered, &rules);
    info_time!("Found {} giveaways to enter", candidates.len());

    let summary = enter_giveaways(&client, &rules.xsrf_token, candidates).await;
    info_time!(start_time, "{}", summary);

    Ok(summary)
}

/// Drops the giveaways already entered and the ones the rules don't ask for.
pub fn select_candidates(
    available: Vec<Giveaway>,
    entered: &HashSet<String>,
    rules: &RulesFile,
) -> Vec<Giveaway> {
    available
        .into_iter()
        .filter(|giveaway| !entered.contains(&giveaway.relative_url))
        .filter(|giveaway| classify(&giveaway.title, rules).is_eligible())
        .collect()
}
