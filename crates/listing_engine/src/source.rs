use std::collections::HashMap;

use url::Url;

/// A page as handed to a [`crate::SnapshotSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    /// URL after redirects.
    pub url: String,
    pub html: String,
}

/// Where a snapshot surface gets its documents from.
pub trait PageSource {
    fn load(&self, url: &str) -> Result<LoadedPage, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("no page stored for {0}")]
    NotFound(String),
}

/// Saved pages keyed by URL.
///
/// Keys are normalised the way [`Url`] serialises them, so
/// `https://Jobs.test/list` and `https://jobs.test/list` name the same page.
#[derive(Debug, Clone, Default)]
pub struct FixturePages {
    pages: HashMap<String, String>,
}

impl FixturePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&mut self, url: &str, html: impl Into<String>) {
        self.pages.insert(normalize(url), html.into());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageSource for FixturePages {
    fn load(&self, url: &str) -> Result<LoadedPage, SourceError> {
        let key = normalize(url);
        self.pages
            .get(&key)
            .map(|html| LoadedPage {
                url: key.clone(),
                html: html.clone(),
            })
            .ok_or_else(|| SourceError::NotFound(key.clone()))
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url.trim())
        .map(String::from)
        .unwrap_or_else(|_| url.trim().to_string())
}
