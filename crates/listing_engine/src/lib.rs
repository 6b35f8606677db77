//! Listing engine: the collection pipeline over a browser automation surface.
//!
//! The pipeline only talks to a [`Surface`]. [`SnapshotSurface`] implements
//! it over saved documents from a [`PageSource`] such as [`FixturePages`].
mod cards;
mod classifier;
mod collect;
mod detail;
mod loader;
mod observer;
mod paginate;
pub mod scripts;
mod settings;
mod snapshot;
mod source;
mod surface;
mod wait;

pub use cards::CardWaiter;
pub use classifier::LinkClassifier;
pub use collect::{CollectError, CollectReport, Collector};
pub use detail::{DetailResolver, SecondaryContext};
pub use loader::PageLoader;
pub use observer::{
    ChannelObserver, CollectEvent, CollectObserver, LogObserver, SkipReason, StopReason,
};
pub use paginate::{Advance, PaginationStrategy, Paginator, SettleWait, StrategyOutcome};
pub use settings::CollectSettings;
pub use snapshot::SnapshotSurface;
pub use source::{FixturePages, LoadedPage, PageSource, SourceError};
pub use surface::{ContextHandle, ElementHandle, ScriptArg, Scope, Surface, SurfaceError};
pub use wait::{wait_for_selector, wait_until, WaitError};

pub use listing_core::{Project, ResultSet, SiteProfile};
