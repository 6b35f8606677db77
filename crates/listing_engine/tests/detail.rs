mod common;

use std::time::Duration;

use common::{
    apply_url, detail_page, detail_url, init_logging, snapshot, Instrumented, LISTING,
};
use listing_core::{SiteProfile, SiteProfileConfig};
use listing_engine::{
    DetailResolver, FixturePages, Scope, SecondaryContext, SourceError, Surface, SurfaceError,
};
use pretty_assertions::assert_eq;

fn resolver(profile: &SiteProfile) -> DetailResolver<'_> {
    DetailResolver::new(profile, Duration::from_millis(40), Duration::from_millis(5))
}

fn pages() -> FixturePages {
    FixturePages::new()
        .with_page(LISTING, "<html><body><div class=\"ProjectCard\"></div></body></html>")
        .with_page(
            &detail_url(21),
            detail_page(Some("/entry_signup/input/project/21/")),
        )
        .with_page(&detail_url(22), detail_page(None))
}

#[test]
fn finds_application_link_and_returns_to_the_listing() {
    init_logging();
    let profile = SiteProfile::default();
    let mut surface = snapshot(pages());
    surface.navigate(LISTING).unwrap();
    let primary = surface.current_context();
    let card = surface.find_one(Scope::Document, ".ProjectCard").unwrap().unwrap();

    let link = resolver(&profile).resolve(&mut surface, &detail_url(21)).unwrap();

    assert_eq!(link, Some(apply_url(21)));
    assert_eq!(surface.current_context(), primary);
    assert_eq!(surface.open_contexts(), 1);
    assert_eq!(surface.current_url().unwrap(), LISTING);
    assert!(surface.attribute(card, "class").is_ok());
}

#[test]
fn detail_page_without_application_link_yields_none() {
    init_logging();
    let profile = SiteProfile::default();
    let mut surface = snapshot(pages());
    surface.navigate(LISTING).unwrap();

    let link = resolver(&profile).resolve(&mut surface, &detail_url(22)).unwrap();

    assert_eq!(link, None);
    assert_eq!(surface.open_contexts(), 1);
}

#[test]
fn unrendered_detail_page_times_out_to_none() {
    init_logging();
    let profile = SiteProfileConfig {
        document_root_selector: "main#never".to_string(),
        ..SiteProfileConfig::default()
    }
    .compile()
    .unwrap();
    let mut surface = snapshot(pages());
    surface.navigate(LISTING).unwrap();

    let link = resolver(&profile).resolve(&mut surface, &detail_url(21)).unwrap();

    assert_eq!(link, None);
    assert_eq!(surface.open_contexts(), 1);
    assert_eq!(surface.current_url().unwrap(), LISTING);
}

#[test]
fn unreachable_detail_page_is_an_error_and_leaves_focus_alone() {
    init_logging();
    let profile = SiteProfile::default();
    let mut surface = snapshot(pages());
    surface.navigate(LISTING).unwrap();
    let primary = surface.current_context();

    let err = resolver(&profile)
        .resolve(&mut surface, &detail_url(23))
        .unwrap_err();

    assert_eq!(err, SurfaceError::Source(SourceError::NotFound(detail_url(23))));
    assert_eq!(surface.current_context(), primary);
    assert_eq!(surface.open_contexts(), 1);
}

#[test]
fn secondary_context_guard_restores_focus_on_drop() {
    init_logging();
    let mut surface = snapshot(pages());
    surface.navigate(LISTING).unwrap();
    let primary = surface.current_context();

    {
        let mut guard = SecondaryContext::open(&mut surface, &detail_url(22)).unwrap();
        let handle = guard.handle();
        assert_ne!(handle, primary);
        assert_eq!(guard.surface().current_context(), handle);
        assert_eq!(guard.surface().current_url().unwrap(), detail_url(22));
    }

    assert_eq!(surface.current_context(), primary);
    assert_eq!(surface.open_contexts(), 1);
}

#[test]
fn failed_anchor_read_still_closes_the_detail_context() {
    init_logging();
    let profile = SiteProfile::default();
    let mut inner = snapshot(pages());
    inner.navigate(LISTING).unwrap();
    let primary = inner.current_context();
    let mut surface = Instrumented::new(inner);
    surface.broken_attributes = true;

    let err = resolver(&profile)
        .resolve(&mut surface, &detail_url(21))
        .unwrap_err();

    assert!(matches!(err, SurfaceError::StaleElement(_)));
    assert_eq!(surface.current_context(), primary);
    assert_eq!(surface.inner.open_contexts(), 1);
    assert_eq!(surface.current_url().unwrap(), LISTING);
}
