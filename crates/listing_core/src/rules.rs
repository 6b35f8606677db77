use regex::Regex;
use url::Url;

/// Shape of a candidate link found on a card or a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlClass {
    /// Leads straight to the application form.
    Application,
    /// Leads to a detail page that may carry the application link.
    Detail,
    Unclassified,
}

/// The two URL-shape patterns that tell application links from detail links.
#[derive(Debug, Clone)]
pub struct LinkRules {
    application: Regex,
    detail: Regex,
}

impl LinkRules {
    pub fn new(application: Regex, detail: Regex) -> Self {
        Self {
            application,
            detail,
        }
    }

    /// The application pattern is tested first, so a URL matching both
    /// patterns is an application link.
    pub fn classify(&self, url: &str) -> UrlClass {
        if self.application.is_match(url) {
            UrlClass::Application
        } else if self.detail.is_match(url) {
            UrlClass::Detail
        } else {
            UrlClass::Unclassified
        }
    }

    pub fn is_application(&self, url: &str) -> bool {
        self.application.is_match(url)
    }

    pub fn application_pattern(&self) -> &str {
        self.application.as_str()
    }

    pub fn detail_pattern(&self) -> &str {
        self.detail.as_str()
    }
}

/// Links surfaced for one card. At most one of the two fields is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardLinks {
    pub application: Option<String>,
    pub detail: Option<String>,
}

impl CardLinks {
    pub fn is_empty(&self) -> bool {
        self.application.is_none() && self.detail.is_none()
    }
}

/// Classifies the hrefs of one card, in document order.
///
/// The first application link wins and stops the scan. Otherwise the first
/// detail link is returned. Empty hrefs and hrefs that cannot be resolved
/// against `base` are skipped. The iterator is consumed lazily, so callers
/// reading hrefs from a live document stop reading at the first application
/// link.
pub fn classify_hrefs<I, S>(hrefs: I, base: Option<&Url>, rules: &LinkRules) -> CardLinks
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut detail = None;
    for raw in hrefs {
        let Some(url) = resolve_href(raw.as_ref(), base) else {
            continue;
        };
        match rules.classify(url.as_str()) {
            UrlClass::Application => {
                return CardLinks {
                    application: Some(url.into()),
                    detail: None,
                };
            }
            UrlClass::Detail if detail.is_none() => detail = Some(url.into()),
            UrlClass::Detail | UrlClass::Unclassified => {}
        }
    }
    CardLinks {
        application: None,
        detail,
    }
}

/// Resolves an `href` value to an absolute URL.
///
/// Returns `None` for empty values, fragment-only or query-only references,
/// `javascript:` pseudo links and relative references without a base.
pub fn resolve_href(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
