use std::fmt;
use std::sync::mpsc;

use listing_core::Project;
use listing_logging::{listing_debug, listing_info, listing_warn};

use crate::PaginationStrategy;

/// Why a card produced no project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No title element, or an empty title.
    MissingTitle,
    /// Neither an application nor a detail link.
    NoLinks,
    /// Reading the card's anchors failed.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTitle => write!(f, "missing title"),
            SkipReason::NoLinks => write!(f, "no project links"),
            SkipReason::Unreadable(message) => write!(f, "unreadable card: {message}"),
        }
    }
}

/// Why a collection run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    PageLimit,
    Exhausted,
    Cancelled,
}

/// Checkpoints of a collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectEvent {
    PageStarted {
        page: u32,
        url: String,
    },
    CardsFound {
        page: u32,
        count: usize,
    },
    CardSkipped {
        page: u32,
        index: usize,
        reason: SkipReason,
    },
    /// A detail page was visited. `error` is set when the visit failed.
    LinkResolved {
        page: u32,
        index: usize,
        detail_url: String,
        link: Option<String>,
        error: Option<String>,
    },
    ProjectCommitted {
        page: u32,
        project: Project,
        duplicate: bool,
    },
    PageAdvanced {
        from: u32,
        strategy: PaginationStrategy,
        url: String,
    },
    Finished {
        pages: u32,
        projects: usize,
        reason: StopReason,
    },
}

pub trait CollectObserver {
    fn on_event(&self, event: &CollectEvent);
}

/// Writes every checkpoint to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl CollectObserver for LogObserver {
    fn on_event(&self, event: &CollectEvent) {
        match event {
            CollectEvent::PageStarted { page, url } => {
                listing_info!("page {} started: {}", page, url)
            }
            CollectEvent::CardsFound { page, count } => {
                listing_debug!("page {}: {} cards", page, count)
            }
            CollectEvent::CardSkipped {
                page,
                index,
                reason,
            } => listing_debug!("page {} card [{}] skipped: {}", page, index, reason),
            CollectEvent::LinkResolved {
                page,
                index,
                detail_url,
                link,
                error,
            } => match error {
                Some(error) => listing_warn!(
                    "page {} card [{}] detail {} failed: {}",
                    page,
                    index,
                    detail_url,
                    error
                ),
                None => listing_debug!(
                    "page {} card [{}] detail {} -> {:?}",
                    page,
                    index,
                    detail_url,
                    link
                ),
            },
            CollectEvent::ProjectCommitted {
                page,
                project,
                duplicate,
            } => {
                if *duplicate {
                    listing_debug!("page {} duplicate dropped: {}", page, project.title)
                } else {
                    listing_debug!("page {} project: {} {:?}", page, project.title, project.link)
                }
            }
            CollectEvent::PageAdvanced {
                from,
                strategy,
                url,
            } => listing_info!("page {} -> {} via {}", from, url, strategy),
            CollectEvent::Finished {
                pages,
                projects,
                reason,
            } => listing_info!(
                "collected {} projects over {} pages ({:?})",
                projects,
                pages,
                reason
            ),
        }
    }
}

/// Forwards checkpoints to a channel, e.g. a UI thread.
pub struct ChannelObserver {
    tx: mpsc::Sender<CollectEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<CollectEvent>) -> Self {
        Self { tx }
    }
}

impl CollectObserver for ChannelObserver {
    fn on_event(&self, event: &CollectEvent) {
        let _ = self.tx.send(event.clone());
    }
}
