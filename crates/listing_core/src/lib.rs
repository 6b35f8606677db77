//! Listing core: project model, URL-shape rules and collection state.
//!
//! Nothing in this crate touches a browser. The engine crate feeds it raw
//! hrefs, titles and URLs and acts on the decisions it returns.
mod page_url;
mod profile;
mod project;
mod rules;
mod state;

pub use page_url::{next_page_url, PAGE_PARAM};
pub use profile::{ProfileError, SiteProfile, SiteProfileConfig};
pub use project::{Project, ProjectKey, ResultSet};
pub use rules::{classify_hrefs, resolve_href, CardLinks, LinkRules, UrlClass};
pub use state::{CollectPhase, CollectState, CollectStats, PageCursor, PageVerdict};
