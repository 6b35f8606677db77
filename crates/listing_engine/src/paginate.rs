use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use listing_core::{next_page_url, SiteProfile};
use listing_logging::{listing_debug, listing_trace};

use crate::{
    scripts, wait_for_selector, CollectSettings, ElementHandle, Scope, ScriptArg, Surface,
};

/// One way of reaching the next listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationStrategy {
    /// Click the first displayed element matching one of the profile's
    /// "next" selectors.
    KnownSelectors,
    /// Click the first displayed anchor whose text is a "next" label.
    TextMatch,
    /// Increment the `page` query parameter and navigate.
    UrlRewrite,
}

impl PaginationStrategy {
    /// Strategies in the order they are tried by default.
    pub const DEFAULT_CHAIN: [PaginationStrategy; 3] = [
        PaginationStrategy::KnownSelectors,
        PaginationStrategy::TextMatch,
        PaginationStrategy::UrlRewrite,
    ];
}

impl fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationStrategy::KnownSelectors => write!(f, "known selectors"),
            PaginationStrategy::TextMatch => write!(f, "text match"),
            PaginationStrategy::UrlRewrite => write!(f, "url rewrite"),
        }
    }
}

/// Result of a single strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    Advanced,
    NotApplicable,
}

/// Result of [`Paginator::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Advanced {
        strategy: PaginationStrategy,
        url: String,
    },
    /// No strategy found another page. This is the normal end of a listing.
    Exhausted,
}

impl Advance {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Advance::Advanced { .. })
    }
}

/// Advisory pause after a pagination action until the page looks settled.
#[derive(Debug, Clone)]
pub struct SettleWait {
    pub timeout: Duration,
    pub grace: Duration,
    pub poll: Duration,
    /// Bound for the fallback wait on the document root.
    pub root_timeout: Duration,
    pub root_poll: Duration,
}

impl SettleWait {
    pub fn from_settings(settings: &CollectSettings) -> Self {
        Self {
            timeout: settings.settle_timeout,
            grace: settings.settle_grace,
            poll: settings.settle_poll,
            root_timeout: settings.wait_timeout,
            root_poll: settings.wait_poll,
        }
    }

    /// Returns as soon as the URL differs from `before`. A page that never
    /// changes URL (in-place rendering) gets one wait for `root_selector`.
    /// Never fails.
    pub fn settle(&self, surface: &mut dyn Surface, before: &str, root_selector: &str) {
        thread::sleep(self.grace);
        let deadline = Instant::now() + self.timeout;
        while Instant::now() < deadline {
            thread::sleep(self.poll);
            if surface.current_url().is_ok_and(|url| url != before) {
                return;
            }
        }
        listing_trace!("url unchanged after {:?}; waiting for `{}`", self.timeout, root_selector);
        let _ = surface.run_script(scripts::NOOP, &[]);
        let _ = wait_for_selector(surface, root_selector, self.root_timeout, self.root_poll);
    }
}

/// Moves the listing to its next page through an ordered chain of
/// strategies.
#[derive(Debug, Clone)]
pub struct Paginator<'p> {
    profile: &'p SiteProfile,
    settle: SettleWait,
    strategies: Vec<PaginationStrategy>,
}

impl<'p> Paginator<'p> {
    pub fn new(profile: &'p SiteProfile, settle: SettleWait) -> Self {
        Self {
            profile,
            settle,
            strategies: PaginationStrategy::DEFAULT_CHAIN.to_vec(),
        }
    }

    pub fn from_settings(profile: &'p SiteProfile, settings: &CollectSettings) -> Self {
        Self::new(profile, SettleWait::from_settings(settings))
    }

    /// Replaces the strategy chain. Strategies run in the given order.
    pub fn with_strategies(mut self, strategies: impl Into<Vec<PaginationStrategy>>) -> Self {
        self.strategies = strategies.into();
        self
    }

    pub fn strategies(&self) -> &[PaginationStrategy] {
        &self.strategies
    }

    /// Tries each strategy in order and stops at the first that advanced.
    pub fn advance(&self, surface: &mut dyn Surface) -> Advance {
        for &strategy in &self.strategies {
            let before = surface.current_url().ok();
            if self.attempt(strategy, surface) == StrategyOutcome::Advanced {
                let url = surface
                    .current_url()
                    .ok()
                    .or(before)
                    .unwrap_or_default();
                listing_debug!("advanced via {} to {}", strategy, url);
                return Advance::Advanced { strategy, url };
            }
            listing_trace!("pagination strategy {} not applicable", strategy);
        }
        listing_debug!("no next page");
        Advance::Exhausted
    }

    pub fn attempt(
        &self,
        strategy: PaginationStrategy,
        surface: &mut dyn Surface,
    ) -> StrategyOutcome {
        match strategy {
            PaginationStrategy::KnownSelectors => self.known_selectors(surface),
            PaginationStrategy::TextMatch => self.text_match(surface),
            PaginationStrategy::UrlRewrite => self.url_rewrite(surface),
        }
    }

    fn known_selectors(&self, surface: &mut dyn Surface) -> StrategyOutcome {
        for selector in self.profile.next_selectors() {
            let candidates = match surface.find_all(Scope::Document, selector) {
                Ok(candidates) => candidates,
                Err(err) => {
                    listing_trace!("next selector `{}` failed: {}", selector, err);
                    continue;
                }
            };
            for element in candidates {
                if self.click_and_settle(surface, element) {
                    listing_debug!("next page via selector `{}`", selector);
                    return StrategyOutcome::Advanced;
                }
            }
        }
        StrategyOutcome::NotApplicable
    }

    fn text_match(&self, surface: &mut dyn Surface) -> StrategyOutcome {
        let anchors = match surface.find_all(Scope::Document, "a") {
            Ok(anchors) => anchors,
            Err(err) => {
                listing_trace!("anchor scan failed: {}", err);
                return StrategyOutcome::NotApplicable;
            }
        };
        for anchor in anchors {
            let matches_label = surface
                .text(anchor)
                .is_ok_and(|text| self.profile.is_next_label(&text));
            if matches_label && self.click_and_settle(surface, anchor) {
                listing_debug!("next page via link text");
                return StrategyOutcome::Advanced;
            }
        }
        StrategyOutcome::NotApplicable
    }

    fn url_rewrite(&self, surface: &mut dyn Surface) -> StrategyOutcome {
        let Ok(current) = surface.current_url() else {
            return StrategyOutcome::NotApplicable;
        };
        let Some(next) = next_page_url(&current) else {
            return StrategyOutcome::NotApplicable;
        };
        if let Err(err) = surface.navigate(&next) {
            listing_debug!("rewritten page url {} failed: {}", next, err);
            return StrategyOutcome::NotApplicable;
        }
        self.settle
            .settle(surface, &current, self.profile.document_root_selector());
        listing_debug!("next page via url rewrite: {}", next);
        StrategyOutcome::Advanced
    }

    /// Clicks a displayed element, falling back to a scripted click, and
    /// waits for the page to settle. Returns whether a click went through.
    fn click_and_settle(&self, surface: &mut dyn Surface, element: ElementHandle) -> bool {
        if !surface.is_displayed(element).unwrap_or(false) {
            return false;
        }
        let before = surface.current_url().unwrap_or_default();
        if !click_with_fallback(surface, element) {
            return false;
        }
        self.settle
            .settle(surface, &before, self.profile.document_root_selector());
        true
    }
}

fn click_with_fallback(surface: &mut dyn Surface, element: ElementHandle) -> bool {
    let direct = surface
        .run_script(scripts::SCROLL_INTO_VIEW, &[ScriptArg::Element(element)])
        .and_then(|_| surface.click(element));
    match direct {
        Ok(()) => true,
        Err(err) => {
            listing_trace!("direct click on {:?} failed ({}); trying script", element, err);
            surface
                .run_script(scripts::FORCE_CLICK, &[ScriptArg::Element(element)])
                .is_ok()
        }
    }
}
