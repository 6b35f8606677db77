use listing_core::{classify_hrefs, CardLinks, SiteProfile};
use listing_logging::listing_trace;
use url::Url;

use crate::{ElementHandle, Scope, Surface, SurfaceError};

/// Reads a card's allowlisted anchors and picks its application or detail
/// link.
#[derive(Debug, Clone, Copy)]
pub struct LinkClassifier<'p> {
    profile: &'p SiteProfile,
}

impl<'p> LinkClassifier<'p> {
    pub fn new(profile: &'p SiteProfile) -> Self {
        Self { profile }
    }

    /// Classifies the anchors of `card`, resolving relative hrefs against
    /// `base_url`.
    ///
    /// Hrefs are read in document order and reading stops at the first
    /// application link. An anchor whose `href` cannot be read counts as an
    /// anchor without `href`.
    pub fn classify(
        &self,
        surface: &mut dyn Surface,
        card: ElementHandle,
        base_url: &str,
    ) -> Result<CardLinks, SurfaceError> {
        let anchors =
            surface.find_all(Scope::Element(card), self.profile.card_anchor_selector())?;
        let base = Url::parse(base_url).ok();
        let surface = &*surface;
        let hrefs = anchors.iter().map(|&anchor| {
            surface
                .attribute(anchor, "href")
                .unwrap_or_else(|err| {
                    listing_trace!("unreadable href on {:?}: {}", anchor, err);
                    None
                })
                .unwrap_or_default()
        });
        Ok(classify_hrefs(hrefs, base.as_ref(), self.profile.rules()))
    }
}
