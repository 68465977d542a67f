use std::fmt;

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::giveaway::Giveaway;
use crate::info_time;
use crate::request::HttpClient;
use crate::session::remaining_points;

/// All of these show up in the body of a successful `entry_insert` response.
const SUCCESS_KEYWORDS: [&str; 3] = ["success", "entry_count", "points"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub entered: usize,
    pub points_spent: u64,
    pub remaining_points: u32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entered, {} points spent, {} points remaining",
            self.entered, self.points_spent, self.remaining_points
        )
    }
}

impl Summary {
    /// Counts one accepted entry. Costs come from scraped markup, so the sum is kept wide.
    pub fn record(&mut self, point_cost: u32) {
        self.entered += 1;
        self.points_spent = self.points_spent.saturating_add(u64::from(point_cost));
    }
}

#[inline]
pub fn is_success(response: &str) -> bool {
    SUCCESS_KEYWORDS.iter().all(|keyword| response.contains(keyword))
}

/// Sends one entry request, `false` if it didn't go through for whatever reason.
pub async fn enter_giveaway(client: &HttpClient, xsrf_token: &str, giveaway: &Giveaway) -> bool {
    let Some(code) = giveaway.code() else {
        warn!(url = %giveaway.relative_url, "giveaway has no code");
        return false;
    };

    let site = client.site();
    let form = [
        ("xsrf_token", xsrf_token),
        ("do", "entry_insert"),
        ("code", code),
    ];
    client
        .post_form(&site.ajax_url(), &site.giveaway_url(&giveaway.relative_url), &form)
        .await
        .is_some_and(|response| is_success(&response))
}

/// Enters every candidate concurrently and tallies the ones the site accepted.
/// The server enforces the point balance, once we're out every further entry simply fails.
pub async fn enter_giveaways(client: &HttpClient, xsrf_token: &str, candidates: Vec<Giveaway>) -> Summary {
    let start_time = Local::now();

    let handles: Vec<(Giveaway, JoinHandle<bool>)> = candidates
        .into_iter()
        .map(|giveaway| {
            let handle = tokio::spawn({
                let client = client.clone();
                let xsrf_token = xsrf_token.to_string();
                let giveaway = giveaway.clone();

                async move {
                    let entered = enter_giveaway(&client, &xsrf_token, &giveaway).await;
                    if entered {
                        info_time!("Entered giveaway: {}", giveaway.title);
                    } else {
                        info_time!("Failed to enter giveaway: {}", giveaway.title);
                    }
                    entered
                }
            });
            (giveaway, handle)
        })
        .collect();

    let mut summary = Summary::default();
    for (giveaway, handle) in handles {
        match handle.await {
            Ok(true) => summary.record(giveaway.point_cost),
            Ok(false) => {}
            Err(e) => warn!(title = %giveaway.title, error = %e, "entry task failed"),
        }
    }

    summary.remaining_points = remaining_points(client).await.unwrap_or(0);
    info_time!(start_time, "Submitted entries");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_needs_every_keyword() {
        assert!(is_success(r#"{"type":"success","entry_count":42,"points":1500}"#));
        assert!(!is_success(r#"{"type":"error","msg":"Not enough points."}"#));
        assert!(!is_success(r#"{"type":"success","points":1500}"#));
        assert!(!is_success(""));
    }

    #[test]
    fn tally_survives_huge_costs() {
        let mut summary = Summary::default();
        summary.record(u32::MAX);
        summary.record(1);
        summary.record(u32::MAX);
        assert_eq!(summary.entered, 3);
        assert_eq!(summary.points_spent, 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn summary_line() {
        let summary = Summary {
            entered: 1,
            points_spent: 15,
            remaining_points: 285,
        };
        assert_eq!(summary.to_string(), "1 entered, 15 points spent, 285 points remaining");
        assert_eq!(
            Summary::default().to_string(),
            "0 entered, 0 points spent, 0 points remaining"
        );
    }
}
