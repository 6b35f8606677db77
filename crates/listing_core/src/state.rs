use std::num::NonZeroU32;

/// Phases of the page-by-page collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectPhase {
    #[default]
    Idle,
    Scrolling,
    Waiting,
    Extracting,
    Resolving,
    Deduping,
    Paginating,
    Done,
}

impl CollectPhase {
    /// Whether the loop may move from `self` to `next`.
    ///
    /// Cards are processed one at a time, so `Extracting`, `Resolving` and
    /// `Deduping` cycle once per card before the page moves on to
    /// `Paginating`. Any phase may end the run.
    pub fn can_transition_to(self, next: CollectPhase) -> bool {
        use CollectPhase::*;
        matches!(
            (self, next),
            (_, Done)
                | (Idle, Scrolling)
                | (Scrolling, Waiting)
                | (Waiting, Extracting)
                | (Extracting, Extracting | Resolving | Deduping | Paginating)
                | (Resolving, Deduping)
                | (Deduping, Extracting | Paginating)
                | (Paginating, Scrolling)
        ) && self != Done
    }
}

/// Position of the collection loop in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// 1-based index of the page being collected.
    pub index: u32,
    pub url: String,
}

/// What the loop does once a page has been fully extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    Paginate,
    Stop,
}

/// Counters describing one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectStats {
    pub pages: u32,
    pub cards_found: usize,
    pub committed: usize,
    pub duplicates_dropped: usize,
    pub details_opened: usize,
    pub details_unresolved: usize,
}

/// State of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectState {
    phase: CollectPhase,
    cursor: PageCursor,
    max_pages: Option<NonZeroU32>,
    stats: CollectStats,
}

impl CollectState {
    pub fn new(start_url: impl Into<String>, max_pages: Option<NonZeroU32>) -> Self {
        Self {
            phase: CollectPhase::Idle,
            cursor: PageCursor {
                index: 1,
                url: start_url.into(),
            },
            max_pages,
            stats: CollectStats::default(),
        }
    }

    pub fn phase(&self) -> CollectPhase {
        self.phase
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn stats(&self) -> CollectStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut CollectStats {
        &mut self.stats
    }

    pub fn is_done(&self) -> bool {
        self.phase == CollectPhase::Done
    }

    /// Moves to `next`. Returns `false` and leaves the phase unchanged when the
    /// transition is not part of the loop.
    pub fn enter(&mut self, next: CollectPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            return false;
        }
        self.phase = next;
        true
    }

    /// Records that the current page was fully extracted and decides whether
    /// to look for another one.
    pub fn page_finished(&mut self) -> PageVerdict {
        self.stats.pages += 1;
        let limit_reached = self
            .max_pages
            .is_some_and(|max| self.stats.pages >= max.get());
        if limit_reached {
            self.phase = CollectPhase::Done;
            PageVerdict::Stop
        } else {
            self.phase = CollectPhase::Paginating;
            PageVerdict::Paginate
        }
    }

    /// Moves the cursor to the next page after a successful advance. The
    /// loop re-enters `Scrolling` when it starts on that page.
    pub fn advanced(&mut self, url: impl Into<String>) {
        self.cursor.index += 1;
        self.cursor.url = url.into();
    }

    pub fn finish(&mut self) {
        self.phase = CollectPhase::Done;
    }
}
