mod common;

use std::time::Instant;

use common::{
    applicable_card, fast_settings, init_logging, listing_page, listing_path, listing_url,
    snapshot, Instrumented,
};
use listing_core::SiteProfile;
use listing_engine::{
    scripts, Advance, FixturePages, PaginationStrategy, Paginator, SnapshotSurface,
    StrategyOutcome, Surface,
};
use pretty_assertions::assert_eq;

fn two_pages(first_page: String) -> SnapshotSurface<FixturePages> {
    let pages = FixturePages::new()
        .with_page(&listing_url(1), first_page)
        .with_page(
            &listing_url(2),
            listing_page(&[applicable_card(2, "Second")], None),
        );
    let mut surface = snapshot(pages);
    surface.navigate(&listing_url(1)).unwrap();
    surface
}

fn advanced(strategy: PaginationStrategy) -> Advance {
    Advance::Advanced {
        strategy,
        url: listing_url(2),
    }
}

#[test]
fn rel_next_link_is_clicked_first() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let mut surface = two_pages(listing_page(
        &[applicable_card(1, "First")],
        Some(&listing_path(2)),
    ));

    let advance = paginator.advance(&mut surface);

    assert_eq!(advance, advanced(PaginationStrategy::KnownSelectors));
    assert_eq!(surface.current_url().unwrap(), listing_url(2));
}

#[test]
fn hidden_next_link_falls_through_to_text_match() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let page = format!(
        r#"<html><body>
<a rel="next" style="display:none" href="/project/skill/7/?page=9">Next</a>
<ul class="Pager"><li><a href="{}"> Next </a></li></ul>
</body></html>"#,
        listing_path(2)
    );
    let mut surface = two_pages(page);

    assert_eq!(
        paginator.advance(&mut surface),
        advanced(PaginationStrategy::TextMatch)
    );
}

#[test]
fn dead_button_falls_through_to_url_rewrite() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let page = r#"<html><body><button aria-label="Next">›</button></body></html>"#;
    let mut surface = Instrumented::new(two_pages(page.to_string()));

    assert_eq!(
        paginator.advance(&mut surface),
        advanced(PaginationStrategy::UrlRewrite)
    );
    assert_eq!(surface.script_count(scripts::FORCE_CLICK), 1);
}

#[test]
fn refused_click_is_retried_through_script() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let mut surface = Instrumented::new(two_pages(listing_page(
        &[applicable_card(1, "First")],
        Some(&listing_path(2)),
    )));
    surface.refuse_clicks = true;

    assert_eq!(
        paginator.advance(&mut surface),
        advanced(PaginationStrategy::KnownSelectors)
    );
    assert_eq!(surface.script_count(scripts::SCROLL_INTO_VIEW), 1);
    assert_eq!(surface.script_count(scripts::FORCE_CLICK), 1);
}

#[test]
fn last_page_is_exhausted() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let pages = FixturePages::new().with_page(
        &listing_url(2),
        listing_page(&[applicable_card(2, "Second")], None),
    );
    let mut surface = snapshot(pages);
    surface.navigate(&listing_url(2)).unwrap();

    assert_eq!(paginator.advance(&mut surface), Advance::Exhausted);
    assert_eq!(surface.current_url().unwrap(), listing_url(2));
}

#[test]
fn strategies_can_be_tried_individually() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings());
    let first = listing_page(&[applicable_card(1, "First")], None);

    let mut surface = two_pages(first.clone());
    assert_eq!(
        paginator.attempt(PaginationStrategy::KnownSelectors, &mut surface),
        StrategyOutcome::NotApplicable
    );
    assert_eq!(
        paginator.attempt(PaginationStrategy::TextMatch, &mut surface),
        StrategyOutcome::NotApplicable
    );
    assert_eq!(
        paginator.attempt(PaginationStrategy::UrlRewrite, &mut surface),
        StrategyOutcome::Advanced
    );
    assert_eq!(surface.current_url().unwrap(), listing_url(2));
}

#[test]
fn custom_chain_only_runs_its_strategies() {
    init_logging();
    let profile = SiteProfile::default();
    let paginator = Paginator::from_settings(&profile, &fast_settings())
        .with_strategies([PaginationStrategy::TextMatch]);
    assert_eq!(paginator.strategies(), &[PaginationStrategy::TextMatch]);

    let mut surface = two_pages(listing_page(&[], None));
    assert_eq!(paginator.advance(&mut surface), Advance::Exhausted);
    assert!(!paginator.advance(&mut surface).is_advanced());
}

#[test]
fn click_without_url_change_settles_on_the_document_root() {
    init_logging();
    let profile = SiteProfile::default();
    let settings = fast_settings();
    let paginator = Paginator::from_settings(&profile, &settings);
    let mut surface = Instrumented::new(two_pages(listing_page(
        &[applicable_card(1, "First")],
        Some(&listing_path(2)),
    )));
    surface.inert_clicks = true;

    let started = Instant::now();
    let advance = paginator.advance(&mut surface);

    assert_eq!(
        advance,
        Advance::Advanced {
            strategy: PaginationStrategy::KnownSelectors,
            url: listing_url(1),
        }
    );
    assert!(started.elapsed() >= settings.settle_timeout);
    assert_eq!(surface.script_count(scripts::NOOP), 1);
    assert_eq!(surface.script_count(scripts::FORCE_CLICK), 0);
}
