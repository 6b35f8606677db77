use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One listing entry: a card title and, when one could be found, the URL of
/// its application form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub link: Option<String>,
}

/// Deduplication identity of a [`Project`].
pub type ProjectKey = (String, Option<String>);

impl Project {
    /// Builds a project from a raw card title. Returns `None` when the title is
    /// empty after trimming.
    pub fn from_card(raw_title: &str, link: Option<String>) -> Option<Self> {
        let title = raw_title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            link,
        })
    }

    pub fn key(&self) -> ProjectKey {
        (self.title.clone(), self.link.clone())
    }
}

/// Ordered, duplicate-free accumulator of projects across pages.
///
/// Keeps first-seen order. A project whose `(title, link)` pair was already
/// committed is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    items: Vec<Project>,
    seen: HashSet<ProjectKey>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits `project` unless its key is already present. Returns whether it
    /// was inserted.
    pub fn insert(&mut self, project: Project) -> bool {
        if !self.seen.insert(project.key()) {
            return false;
        }
        self.items.push(project);
        true
    }

    pub fn contains(&self, project: &Project) -> bool {
        self.seen.contains(&project.key())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Project] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Project> {
        self.items
    }
}

impl Extend<Project> for ResultSet {
    fn extend<T: IntoIterator<Item = Project>>(&mut self, iter: T) {
        for project in iter {
            self.insert(project);
        }
    }
}

impl FromIterator<Project> for ResultSet {
    fn from_iter<T: IntoIterator<Item = Project>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
