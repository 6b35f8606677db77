#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, Once};
use std::time::Duration;

use listing_engine::{
    scripts, CollectEvent, CollectObserver, CollectSettings, ContextHandle, ElementHandle,
    FixturePages, Scope, ScriptArg, SnapshotSurface, Surface, SurfaceError,
};
use serde_json::Value;

pub const LISTING: &str = "https://freelance-hub.jp/project/skill/7/";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

/// Settings with every wait shrunk so tests finish quickly.
pub fn fast_settings() -> CollectSettings {
    CollectSettings {
        wait_timeout: Duration::from_millis(60),
        wait_poll: Duration::from_millis(5),
        scroll_rounds: 3,
        scroll_delay: Duration::ZERO,
        settle_timeout: Duration::from_millis(40),
        settle_grace: Duration::ZERO,
        settle_poll: Duration::from_millis(2),
    }
}

pub fn listing_url(page: u32) -> String {
    if page == 1 {
        LISTING.to_string()
    } else {
        format!("{LISTING}?page={page}")
    }
}

pub fn listing_path(page: u32) -> String {
    format!("/project/skill/7/?page={page}")
}

pub fn detail_url(id: u32) -> String {
    format!("https://freelance-hub.jp/project/{id}/")
}

pub fn apply_url(id: u32) -> String {
    format!("https://freelance-hub.jp/entry_signup/input/project/{id}/")
}

/// A card whose title links to the detail page and which carries a direct
/// application button.
pub fn applicable_card(id: u32, title: &str) -> String {
    format!(
        r#"<div class="ProjectCard">
  <h3 class="ProjectCard_Title"><a href="/project/{id}/">{title}</a></h3>
  <p class="ProjectCard_Rate">800,000 JPY</p>
  <a class="ProjectDetail_Cta" href="/entry_signup/input/project/{id}/">Apply</a>
</div>"#
    )
}

/// A card that only links to its detail page.
pub fn detail_only_card(id: u32, title: &str) -> String {
    format!(
        r#"<div class="ProjectCard">
  <h3 class="ProjectCard_Title"><a href="/project/{id}/">{title}</a></h3>
</div>"#
    )
}

pub fn listing_page(cards: &[String], next_href: Option<&str>) -> String {
    let pagination = next_href
        .map(|href| {
            format!(r#"<nav class="Pagination"><a rel="next" href="{href}">次へ</a></nav>"#)
        })
        .unwrap_or_default();
    format!(
        r#"<html><head><title>Listing</title></head><body>
<header><a href="/">Home</a><a href="/project/skill/7/">Rust</a></header>
<main>{}</main>
{pagination}
</body></html>"#,
        cards.join("\n")
    )
}

pub fn detail_page(apply_href: Option<&str>) -> String {
    let cta = apply_href
        .map(|href| format!(r#"<a class="Entry_Button" href="{href}">Apply now</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><main id="detail"><h1>Project</h1>
<a href="/project/skill/7/">Back</a>{cta}</main></body></html>"#
    )
}

pub fn snapshot(pages: FixturePages) -> SnapshotSurface<FixturePages> {
    SnapshotSurface::new(pages)
}

/// Keeps every event it sees.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CollectEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<CollectEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CollectObserver for RecordingObserver {
    fn on_event(&self, event: &CollectEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Wraps a surface to script document heights, refuse or swallow direct
/// clicks, break attribute reads and record the scripts that ran.
pub struct Instrumented<S> {
    pub inner: S,
    pub heights: VecDeque<f64>,
    pub refuse_clicks: bool,
    /// Direct clicks succeed without navigating, like an in-place render.
    pub inert_clicks: bool,
    pub broken_attributes: bool,
    pub scripts: Vec<String>,
}

impl<S: Surface> Instrumented<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            heights: VecDeque::new(),
            refuse_clicks: false,
            inert_clicks: false,
            broken_attributes: false,
            scripts: Vec::new(),
        }
    }

    pub fn script_count(&self, script: &str) -> usize {
        self.scripts.iter().filter(|ran| *ran == script).count()
    }
}

impl<S: Surface> Surface for Instrumented<S> {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.inner.navigate(url)
    }

    fn find_all(
        &mut self,
        scope: Scope,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, SurfaceError> {
        self.inner.find_all(scope, selector)
    }

    fn text(&self, element: ElementHandle) -> Result<String, SurfaceError> {
        self.inner.text(element)
    }

    fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SurfaceError> {
        if self.broken_attributes {
            return Err(SurfaceError::StaleElement(element));
        }
        self.inner.attribute(element, name)
    }

    fn is_displayed(&self, element: ElementHandle) -> Result<bool, SurfaceError> {
        self.inner.is_displayed(element)
    }

    fn click(&mut self, element: ElementHandle) -> Result<(), SurfaceError> {
        if self.refuse_clicks {
            return Err(SurfaceError::NotInteractable(element));
        }
        if self.inert_clicks {
            return Ok(());
        }
        self.inner.click(element)
    }

    fn run_script(&mut self, script: &str, args: &[ScriptArg]) -> Result<Value, SurfaceError> {
        self.scripts.push(script.to_string());
        if script == scripts::DOCUMENT_HEIGHT {
            if let Some(height) = self.heights.pop_front() {
                return Ok(Value::from(height));
            }
        }
        self.inner.run_script(script, args)
    }

    fn open_context(&mut self, url: &str) -> Result<ContextHandle, SurfaceError> {
        self.inner.open_context(url)
    }

    fn close_context(&mut self, context: ContextHandle) -> Result<(), SurfaceError> {
        self.inner.close_context(context)
    }

    fn focus(&mut self, context: ContextHandle) -> Result<(), SurfaceError> {
        self.inner.focus(context)
    }

    fn current_context(&self) -> ContextHandle {
        self.inner.current_context()
    }

    fn current_url(&self) -> Result<String, SurfaceError> {
        self.inner.current_url()
    }
}
