use std::sync::Arc;

use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE, REFERER},
    Client,
};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::rules::RulesFile;
use crate::{Error, Result};

/// Raw HTML of a fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    html: String,
}

impl Page {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Plain substring search over the markup, markers like "No results were found." don't need a DOM.
    pub fn contains(&self, needle: &str) -> bool {
        self.html.contains(needle)
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Cookie-bearing client for the giveaway site.
/// Failures are logged and returned as `None`, nothing is retried.
/// Cloning is cheap, all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    site: Arc<SiteConfig>,
}

impl HttpClient {
    pub fn new(site: SiteConfig, rules: &RulesFile) -> Result<Self> {
        let cookie = HeaderValue::from_str(&rules.cookie()).map_err(|_| Error::InvalidCookie)?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(site.user_agent.as_str())
            .timeout(site.timeout)
            .build()?;

        Ok(Self {
            client,
            site: Arc::new(site),
        })
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// GETs a page, `None` on transport errors and non-success statuses.
    pub async fn fetch_page(&self, url: &str) -> Option<Page> {
        match self.get_text(url).await {
            Ok(html) => Some(Page::new(html)),
            Err(e) => {
                warn!(url, error = %e, "failed to fetch page");
                None
            }
        }
    }

    /// POSTs a url-encoded form, returning the response body whatever its content type.
    pub async fn post_form(&self, url: &str, referer: &str, form: &[(&str, &str)]) -> Option<String> {
        match self.post_text(url, referer, form).await {
            Ok(body) => {
                debug!(url, referer, body = %body, "form posted");
                Some(body)
            }
            Err(e) => {
                warn!(url, referer, error = %e, "failed to post form");
                None
            }
        }
    }

    async fn get_text(&self, url: &str) -> reqwest::Result<String> {
        self.client.get(url).send().await?.error_for_status()?.text().await
    }

    async fn post_text(&self, url: &str, referer: &str, form: &[(&str, &str)]) -> reqwest::Result<String> {
        self.client
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Returns a `JoinSet` of page requests, so that they can be awaited.
/// Every task yields its page number along with the page.
pub(crate) fn request_pages<I>(
    client: &HttpClient,
    pages: I,
    url: fn(&SiteConfig, usize) -> String,
) -> JoinSet<(usize, Option<Page>)>
where
    I: IntoIterator<Item = usize>,
{
    let mut task_set = JoinSet::new();
    for page_num in pages {
        task_set.spawn({
            // Client uses Arc so we can clone cheaply
            let client = client.clone();

            async move {
                let url = url(client.site(), page_num);
                (page_num, client.fetch_page(&url).await)
            }
        });
    }
    task_set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_substring_search() {
        let page = Page::new("<p>No results were found.</p>");
        assert!(page.contains("No results were found."));
        assert!(!page.contains("giveaway__row-inner-wrap"));
        assert_eq!(page.into_html(), "<p>No results were found.</p>");
    }
}
