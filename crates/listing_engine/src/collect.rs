use std::num::NonZeroU32;

use listing_core::{
    CollectPhase, CollectState, CollectStats, PageVerdict, Project, ResultSet, SiteProfile,
};
use listing_logging::listing_debug;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    Advance, CardWaiter, CollectEvent, CollectObserver, CollectSettings, DetailResolver,
    ElementHandle, LinkClassifier, LogObserver, PageLoader, Paginator, Scope, SkipReason,
    StopReason, Surface, SurfaceError, WaitError,
};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no cards matching `{selector}` on page {page}: {source}")]
    NoCards {
        page: u32,
        selector: String,
        #[source]
        source: WaitError,
    },
    #[error("page {page}: {source}")]
    Surface {
        page: u32,
        #[source]
        source: SurfaceError,
    },
}

/// Outcome of a successful collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectReport {
    pub projects: Vec<Project>,
    pub stats: CollectStats,
    pub stop: StopReason,
}

struct Stages<'p> {
    loader: PageLoader,
    waiter: CardWaiter,
    classifier: LinkClassifier<'p>,
    resolver: DetailResolver<'p>,
    paginator: Paginator<'p>,
}

/// Walks a listing page by page and gathers its projects.
///
/// The collector is the only user of the surface for the whole run.
pub struct Collector<'a> {
    surface: &'a mut dyn Surface,
    profile: &'a SiteProfile,
    settings: CollectSettings,
    observer: &'a dyn CollectObserver,
    cancel: CancellationToken,
    paginator: Option<Paginator<'a>>,
    results: ResultSet,
}

impl<'a> Collector<'a> {
    pub fn new(
        surface: &'a mut dyn Surface,
        profile: &'a SiteProfile,
        settings: CollectSettings,
    ) -> Self {
        Self {
            surface,
            profile,
            settings,
            observer: &LogObserver,
            cancel: CancellationToken::new(),
            paginator: None,
            results: ResultSet::new(),
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn CollectObserver) -> Self {
        self.observer = observer;
        self
    }

    /// The run stops before starting the next page once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Uses `paginator` instead of one built from the settings.
    pub fn with_paginator(mut self, paginator: Paginator<'a>) -> Self {
        self.paginator = Some(paginator);
        self
    }

    /// Navigates the primary context to the profile's start URL.
    pub fn open(&mut self) -> Result<(), CollectError> {
        let url = self.profile.start_url();
        listing_debug!("opening {}", url);
        self.surface
            .navigate(url)
            .map_err(|source| CollectError::Surface { page: 1, source })
    }

    /// Projects committed by the current or last run. Still readable after a
    /// run failed on a later page.
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Collects from the page currently shown, following pagination until
    /// `max_pages` pages were extracted or no next page exists.
    pub fn collect(&mut self, max_pages: Option<NonZeroU32>) -> Result<Vec<Project>, CollectError> {
        self.collect_report(max_pages).map(|report| report.projects)
    }

    pub fn collect_report(
        &mut self,
        max_pages: Option<NonZeroU32>,
    ) -> Result<CollectReport, CollectError> {
        self.results = ResultSet::new();
        let start_url = self
            .surface
            .current_url()
            .map_err(|source| CollectError::Surface { page: 1, source })?;
        let mut state = CollectState::new(start_url, max_pages);

        let profile = self.profile;
        let stages = Stages {
            loader: PageLoader::from_settings(&self.settings),
            waiter: CardWaiter::from_settings(&self.settings),
            classifier: LinkClassifier::new(profile),
            resolver: DetailResolver::from_settings(profile, &self.settings),
            paginator: self
                .paginator
                .clone()
                .unwrap_or_else(|| Paginator::from_settings(profile, &self.settings)),
        };

        let stop = loop {
            if self.cancel.is_cancelled() {
                state.finish();
                break StopReason::Cancelled;
            }

            enter(&mut state, CollectPhase::Scrolling);
            let page = state.cursor().index;
            self.emit(CollectEvent::PageStarted {
                page,
                url: state.cursor().url.clone(),
            });

            if let Err(err) = self.collect_page(&stages, &mut state) {
                state.finish();
                return Err(err);
            }

            if state.page_finished() == PageVerdict::Stop {
                listing_debug!("page limit {:?} reached", max_pages);
                break StopReason::PageLimit;
            }

            match stages.paginator.advance(&mut *self.surface) {
                Advance::Advanced { strategy, url } => {
                    self.emit(CollectEvent::PageAdvanced {
                        from: page,
                        strategy,
                        url: url.clone(),
                    });
                    state.advanced(url);
                }
                Advance::Exhausted => {
                    state.finish();
                    break StopReason::Exhausted;
                }
            }
        };

        let mut stats = state.stats();
        stats.committed = self.results.len();
        self.emit(CollectEvent::Finished {
            pages: stats.pages,
            projects: stats.committed,
            reason: stop,
        });
        Ok(CollectReport {
            projects: self.results.as_slice().to_vec(),
            stats,
            stop,
        })
    }

    fn collect_page(&mut self, stages: &Stages<'_>, state: &mut CollectState) -> Result<(), CollectError> {
        let page = state.cursor().index;
        stages.loader.load_all(&mut *self.surface);

        enter(state, CollectPhase::Waiting);
        let selector = self.profile.card_selector();
        stages
            .waiter
            .await_cards(&mut *self.surface, selector)
            .map_err(|source| CollectError::NoCards {
                page,
                selector: selector.to_string(),
                source,
            })?;

        enter(state, CollectPhase::Extracting);
        let cards = self
            .surface
            .find_all(Scope::Document, selector)
            .map_err(|source| CollectError::Surface { page, source })?;
        state.stats_mut().cards_found += cards.len();
        self.emit(CollectEvent::CardsFound {
            page,
            count: cards.len(),
        });

        let base_url = state.cursor().url.clone();
        for (index, card) in cards.into_iter().enumerate() {
            self.collect_card(stages, state, &base_url, index, card);
        }
        Ok(())
    }

    fn collect_card(
        &mut self,
        stages: &Stages<'_>,
        state: &mut CollectState,
        base_url: &str,
        index: usize,
        card: ElementHandle,
    ) {
        let page = state.cursor().index;
        enter(state, CollectPhase::Extracting);

        let Some(mut project) = self.read_title(card) else {
            self.skip(page, index, SkipReason::MissingTitle);
            return;
        };

        let links = match stages
            .classifier
            .classify(&mut *self.surface, card, base_url)
        {
            Ok(links) => links,
            Err(err) => {
                self.skip(page, index, SkipReason::Unreadable(err.to_string()));
                return;
            }
        };

        project.link = match (links.application, links.detail) {
            (Some(application), _) => Some(application),
            (None, Some(detail_url)) => {
                enter(state, CollectPhase::Resolving);
                state.stats_mut().details_opened += 1;
                let (link, error) = match stages.resolver.resolve(&mut *self.surface, &detail_url)
                {
                    Ok(link) => (link, None),
                    Err(err) => (None, Some(err.to_string())),
                };
                if link.is_none() {
                    state.stats_mut().details_unresolved += 1;
                }
                self.emit(CollectEvent::LinkResolved {
                    page,
                    index,
                    detail_url,
                    link: link.clone(),
                    error,
                });
                link
            }
            (None, None) => {
                self.skip(page, index, SkipReason::NoLinks);
                return;
            }
        };

        enter(state, CollectPhase::Deduping);
        let inserted = self.results.insert(project.clone());
        if !inserted {
            state.stats_mut().duplicates_dropped += 1;
        }
        self.emit(CollectEvent::ProjectCommitted {
            page,
            project,
            duplicate: !inserted,
        });
    }

    /// The card's trimmed title, or `None` when it has no readable, non-empty
    /// title.
    fn read_title(&mut self, card: ElementHandle) -> Option<Project> {
        let title = self
            .surface
            .find_one(Scope::Element(card), self.profile.title_selector())
            .ok()
            .flatten()?;
        let text = self.surface.text(title).ok()?;
        Project::from_card(&text, None)
    }

    fn skip(&self, page: u32, index: usize, reason: SkipReason) {
        self.emit(CollectEvent::CardSkipped {
            page,
            index,
            reason,
        });
    }

    fn emit(&self, event: CollectEvent) {
        self.observer.on_event(&event);
    }
}

fn enter(state: &mut CollectState, phase: CollectPhase) {
    let entered = state.enter(phase);
    debug_assert!(entered, "invalid transition from {:?} to {phase:?}", state.phase());
}
