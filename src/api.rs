//! Locator construction for the upstream recipe API.
//!
//! A locator is an opaque absolute URL, or the sentinel `None` meaning
//! "issue no request". Everything downstream (tracker, hydration) treats
//! locators as opaque strings; only this module knows the endpoint shapes.

use anyhow::{anyhow, Result};
use reqwest::Url;

/// An absolute resource address, or `None` when no request should be issued.
pub type Locator = Option<String>;

/// Endpoint builder for the four upstream read operations.
#[derive(Debug, Clone)]
pub struct MealApi {
    base: Url,
}

impl MealApi {
    /// Builds an endpoint set over a validated base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| anyhow!("invalid API base URL {:?}: {}", base_url, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("API base URL {:?} cannot carry a path", base_url));
        }
        // Normalize so that join() appends instead of replacing the last segment.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self { base })
    }

    /// Address of the list-categories operation.
    pub fn categories(&self) -> String {
        self.endpoint("categories.php", &[])
    }

    /// Address listing meal summaries within one category.
    pub fn filter_by_category(&self, category: &str) -> String {
        self.endpoint("filter.php", &[("c", category)])
    }

    /// Address of the full detail of one meal id.
    pub fn lookup(&self, id: &str) -> String {
        self.endpoint("lookup.php", &[("i", id)])
    }

    /// Address of a free-text search by meal name.
    pub fn search(&self, name: &str) -> String {
        self.endpoint("search.php", &[("s", name)])
    }

    fn endpoint(&self, file: &str, query: &[(&str, &str)]) -> String {
        // The base is validated in new(), so joining a plain file name cannot fail.
        let mut url = self
            .base
            .join(file)
            .unwrap_or_else(|_| self.base.clone());
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url.to_string()
    }
}
