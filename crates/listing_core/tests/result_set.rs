use std::sync::Once;

use listing_core::{Project, ResultSet};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

fn project(title: &str, link: Option<&str>) -> Project {
    Project::from_card(title, link.map(String::from)).unwrap()
}

#[test]
fn duplicates_are_dropped_and_first_seen_order_kept() {
    init_logging();
    let mut set = ResultSet::new();

    assert!(set.insert(project("Rust backend", Some("https://jobs.test/apply/1"))));
    assert!(set.insert(project("Go API", Some("https://jobs.test/apply/2"))));
    assert!(!set.insert(project("Rust backend", Some("https://jobs.test/apply/1"))));
    assert!(set.insert(project("Data platform", None)));
    assert!(!set.insert(project("Data platform", None)));

    let titles: Vec<_> = set.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Rust backend", "Go API", "Data platform"]);
}

#[test]
fn same_title_with_different_link_is_distinct() {
    let mut set = ResultSet::new();

    assert!(set.insert(project("Rust backend", None)));
    assert!(set.insert(project("Rust backend", Some("https://jobs.test/apply/1"))));

    assert_eq!(set.len(), 2);
}

#[test]
fn from_card_trims_and_rejects_blank_titles() {
    assert_eq!(Project::from_card("   \n ", None), None);
    assert_eq!(
        Project::from_card("  Rust backend \n", None).map(|p| p.title),
        Some("Rust backend".to_string())
    );
}

#[test]
fn collecting_iterator_deduplicates() {
    let set: ResultSet = vec![
        project("A", Some("https://jobs.test/apply/1")),
        project("B", None),
        project("A", Some("https://jobs.test/apply/1")),
        project("B", None),
        project("A", None),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        set.into_vec(),
        vec![
            project("A", Some("https://jobs.test/apply/1")),
            project("B", None),
            project("A", None),
        ]
    );
}
