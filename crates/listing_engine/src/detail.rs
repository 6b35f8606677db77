use std::time::Duration;

use listing_core::{resolve_href, SiteProfile};
use listing_logging::{listing_debug, listing_warn};
use url::Url;

use crate::{wait_for_selector, CollectSettings, ContextHandle, Scope, Surface, SurfaceError};

/// A secondary browsing context that is focused while the guard lives.
///
/// Dropping the guard closes the context and focuses the context that was
/// current when it was opened, on every exit path including unwinding.
/// Holding the guard holds the surface's mutable borrow, so the primary
/// context cannot be touched until it is released.
pub struct SecondaryContext<'s> {
    surface: &'s mut dyn Surface,
    context: ContextHandle,
    origin: ContextHandle,
}

impl<'s> SecondaryContext<'s> {
    pub fn open(surface: &'s mut dyn Surface, url: &str) -> Result<Self, SurfaceError> {
        let origin = surface.current_context();
        let context = surface.open_context(url)?;
        let guard = Self {
            surface,
            context,
            origin,
        };
        guard.surface.focus(context)?;
        Ok(guard)
    }

    pub fn handle(&self) -> ContextHandle {
        self.context
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }
}

impl Drop for SecondaryContext<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.surface.close_context(self.context) {
            listing_warn!("failed to close context {:?}: {}", self.context, err);
        }
        if let Err(err) = self.surface.focus(self.origin) {
            listing_warn!("failed to refocus context {:?}: {}", self.origin, err);
        }
    }
}

/// Looks for an application link on a project's detail page.
#[derive(Debug, Clone, Copy)]
pub struct DetailResolver<'p> {
    profile: &'p SiteProfile,
    timeout: Duration,
    poll: Duration,
}

impl<'p> DetailResolver<'p> {
    pub fn new(profile: &'p SiteProfile, timeout: Duration, poll: Duration) -> Self {
        Self {
            profile,
            timeout,
            poll,
        }
    }

    pub fn from_settings(profile: &'p SiteProfile, settings: &CollectSettings) -> Self {
        Self::new(profile, settings.wait_timeout, settings.wait_poll)
    }

    /// Opens `detail_url` in its own context and returns the first
    /// application link found there.
    ///
    /// `Ok(None)` covers both "no application link" and "the page never
    /// rendered within the timeout". Errors come from opening the context or
    /// querying it. Either way the context is closed again before returning.
    pub fn resolve(
        &self,
        surface: &mut dyn Surface,
        detail_url: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let mut context = SecondaryContext::open(surface, detail_url)?;
        listing_debug!("resolving {} in {:?}", detail_url, context.handle());

        let root = self.profile.document_root_selector();
        if let Err(err) = wait_for_selector(context.surface(), root, self.timeout, self.poll) {
            listing_debug!("detail page {} did not render: {}", detail_url, err);
            return Ok(None);
        }

        let anchors = context
            .surface()
            .find_all(Scope::Document, self.profile.detail_anchor_selector())?;
        let base = Url::parse(detail_url).ok();
        let rules = self.profile.rules();
        for anchor in anchors {
            let Some(href) = context.surface().attribute(anchor, "href")? else {
                continue;
            };
            if let Some(url) = resolve_href(&href, base.as_ref()) {
                if rules.is_application(url.as_str()) {
                    return Ok(Some(url.into()));
                }
            }
        }
        Ok(None)
    }
}
