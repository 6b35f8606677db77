use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LinkRules;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("empty selector for {0}")]
    EmptySelector(&'static str),
    #[error("invalid profile: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] ron::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Serializable description of a listing site's markup.
///
/// Site markup changes are the usual reason to touch the harvester, so every
/// selector, URL pattern and label lives here. Missing fields in a RON file
/// fall back to the built-in listing site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfileConfig {
    pub start_url: String,
    pub application_pattern: String,
    pub detail_pattern: String,
    pub card_selector: String,
    pub title_selector: String,
    /// Anchors inside a card that may carry a project link. Restricting the
    /// query keeps stray chrome links out of classification.
    pub card_anchor_selector: String,
    /// Anchors on a detail page that may lead to the application form.
    pub detail_anchor_selector: String,
    pub document_root_selector: String,
    /// Tried in order by the known-selector pagination strategy.
    pub next_selectors: Vec<String>,
    /// Exact anchor texts accepted by the text-match pagination strategy.
    pub next_labels: Vec<String>,
}

impl Default for SiteProfileConfig {
    fn default() -> Self {
        Self {
            start_url: "https://freelance-hub.jp/project/skill/7/".to_string(),
            application_pattern: r"^https://freelance-hub\.jp/entry_signup/input/project/\d+/?$"
                .to_string(),
            detail_pattern: r"^https://freelance-hub\.jp/project/\d+/?$".to_string(),
            card_selector: ".ProjectCard".to_string(),
            title_selector: "h3.ProjectCard_Title".to_string(),
            card_anchor_selector: "a.ProjectDetail_Cta, h3.ProjectCard_Title a, \
                 a[href*='/entry_signup/input/project/'], a[href^='/project/']"
                .to_string(),
            detail_anchor_selector: "a[href*='/entry_signup/input/project/']".to_string(),
            document_root_selector: "body".to_string(),
            next_selectors: [
                "a[rel='next']",
                "a[aria-label='Next']",
                "a[aria-label='次へ']",
                "button[aria-label='Next']",
                "button[aria-label='次へ']",
                ".Pagination a[rel='next']",
                ".Pagination a[aria-label='Next']",
                ".Pagination a[aria-label='次へ']",
                "a.Pagination_NextLink",
                "a.Pagination_Link.Pagination_NextLink",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            next_labels: ["次へ", "Next", "次のページ", "Next »", ">", "›"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SiteProfileConfig {
    /// Validates selectors and compiles the URL patterns.
    pub fn compile(self) -> Result<SiteProfile, ProfileError> {
        let application = compile_pattern("application", &self.application_pattern)?;
        let detail = compile_pattern("detail", &self.detail_pattern)?;
        for (field, value) in [
            ("card", &self.card_selector),
            ("title", &self.title_selector),
            ("card anchors", &self.card_anchor_selector),
            ("detail anchors", &self.detail_anchor_selector),
            ("document root", &self.document_root_selector),
        ] {
            if value.trim().is_empty() {
                return Err(ProfileError::EmptySelector(field));
            }
        }
        Ok(SiteProfile {
            rules: LinkRules::new(application, detail),
            config: self,
        })
    }

    pub fn to_ron_string(&self) -> Result<String, ProfileError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

fn compile_pattern(field: &'static str, pattern: &str) -> Result<Regex, ProfileError> {
    Regex::new(pattern).map_err(|source| ProfileError::InvalidPattern { field, source })
}

/// Compiled, ready-to-use site profile.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    config: SiteProfileConfig,
    rules: LinkRules,
}

impl SiteProfile {
    pub fn from_ron_str(text: &str) -> Result<Self, ProfileError> {
        let config: SiteProfileConfig = ron::from_str(text)?;
        config.compile()
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn rules(&self) -> &LinkRules {
        &self.rules
    }

    pub fn config(&self) -> &SiteProfileConfig {
        &self.config
    }

    pub fn start_url(&self) -> &str {
        &self.config.start_url
    }

    pub fn card_selector(&self) -> &str {
        &self.config.card_selector
    }

    pub fn title_selector(&self) -> &str {
        &self.config.title_selector
    }

    pub fn card_anchor_selector(&self) -> &str {
        &self.config.card_anchor_selector
    }

    pub fn detail_anchor_selector(&self) -> &str {
        &self.config.detail_anchor_selector
    }

    pub fn document_root_selector(&self) -> &str {
        &self.config.document_root_selector
    }

    pub fn next_selectors(&self) -> &[String] {
        &self.config.next_selectors
    }

    pub fn next_labels(&self) -> &[String] {
        &self.config.next_labels
    }

    pub fn is_next_label(&self, text: &str) -> bool {
        let text = text.trim();
        self.config.next_labels.iter().any(|label| label == text)
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        let config = SiteProfileConfig::default();
        let application = Regex::new(&config.application_pattern)
            .expect("built-in application pattern is valid");
        let detail = Regex::new(&config.detail_pattern).expect("built-in detail pattern is valid");
        Self {
            rules: LinkRules::new(application, detail),
            config,
        }
    }
}
