const GIVEAWAY_PREFIX: &str = "/giveaway/";

/// One open listing scraped from the search pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Giveaway {
    pub title: String,
    /// `/giveaway/<code>/<slug>`, unique per listing.
    pub relative_url: String,
    pub point_cost: u32,
}

impl Giveaway {
    pub fn new(title: impl Into<String>, relative_url: impl Into<String>, point_cost: u32) -> Self {
        Self {
            title: title.into(),
            relative_url: relative_url.into(),
            point_cost,
        }
    }

    /// The code the entry endpoint expects, i.e. the path segment after `/giveaway/`.
    pub fn code(&self) -> Option<&str> {
        self.relative_url
            .strip_prefix(GIVEAWAY_PREFIX)?
            .split('/')
            .next()
            .filter(|code| !code.is_empty())
    }
}

#[inline]
pub(crate) fn is_giveaway_url(url: &str) -> bool {
    url.starts_with(GIVEAWAY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_first_segment() {
        let g = Giveaway::new("Half-Life 2", "/giveaway/AAAAA/half-life-2", 15);
        assert_eq!(g.code(), Some("AAAAA"));
    }

    #[test]
    fn code_missing_for_foreign_urls() {
        assert_eq!(Giveaway::new("x", "/discussion/AAAAA/", 1).code(), None);
        assert_eq!(Giveaway::new("x", "/giveaway/", 1).code(), None);
        assert_eq!(Giveaway::new("x", "", 1).code(), None);
    }
}
