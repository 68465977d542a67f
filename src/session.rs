use tracing::warn;

use crate::parse::{parse_points, SIGNED_OUT};
use crate::request::HttpClient;
use crate::{Error, Result};

/// Fails with `NoSession` only when the landing page positively shows the logged out state.
/// An unreachable site is not proof of a dead session.
pub async fn probe_session(client: &HttpClient) -> Result<()> {
    let url = client.site().root_url();
    match client.fetch_page(&url).await {
        Some(page) if page.contains(SIGNED_OUT) => Err(Error::NoSession),
        Some(_) => Ok(()),
        None => {
            warn!("couldn't verify the session, carrying on");
            Ok(())
        }
    }
}

/// Current point balance, `None` if the landing page can't be read.
pub async fn remaining_points(client: &HttpClient) -> Option<u32> {
    let url = client.site().root_url();
    let page = client.fetch_page(&url).await?;
    match parse_points(page.html()) {
        Ok(points) => points,
        Err(e) => {
            warn!(error = %e, "failed to read point balance");
            None
        }
    }
}
