//! Per-author commit timestamps in fetch order.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

/// Timestamp of a commit in the author's own timezone.
pub type CommitTime = DateTime<FixedOffset>;

/// Mapping from raw `Name <email>` author strings to their commit times.
///
/// Authors iterate in first-insertion order; each author's timestamps keep
/// the order they were pushed in.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use git2effort_history::authors::AuthorCommits;
///
/// let at = DateTime::parse_from_rfc3339("2020-03-01T10:00:00+01:00").unwrap();
/// let mut authors = AuthorCommits::new();
/// authors.push("Bob <bob@example.com>", at);
/// authors.push("Alice <alice@example.com>", at);
/// authors.push("Bob <bob@example.com>", at);
///
/// let order: Vec<&str> = authors.authors().collect();
/// assert_eq!(order, ["Bob <bob@example.com>", "Alice <alice@example.com>"]);
/// assert_eq!(authors.commits("Bob <bob@example.com>").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorCommits {
    entries: Vec<(String, Vec<CommitTime>)>,
    index: HashMap<String, usize>,
}

impl AuthorCommits {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one commit by `author`.
    pub fn push(&mut self, author: impl Into<String>, at: CommitTime) {
        let author = author.into();
        match self.index.get(&author) {
            Some(&i) => self.entries[i].1.push(at),
            None => {
                self.index.insert(author.clone(), self.entries.len());
                self.entries.push((author, vec![at]));
            }
        }
    }

    /// Commit times recorded for `author`, if present.
    pub fn commits(&self, author: &str) -> Option<&[CommitTime]> {
        self.index
            .get(author)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// Number of distinct author keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no commits were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Author keys in insertion order.
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(author, _)| author.as_str())
    }

    /// `(author, commit times)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CommitTime])> {
        self.entries
            .iter()
            .map(|(author, times)| (author.as_str(), times.as_slice()))
    }

    /// Total number of commits across all authors.
    pub fn commit_count(&self) -> usize {
        self.entries.iter().map(|(_, times)| times.len()).sum()
    }

    /// Earliest commit time across all authors.
    pub fn first_commit(&self) -> Option<CommitTime> {
        self.entries.iter().flat_map(|(_, t)| t).min().copied()
    }

    /// Latest commit time across all authors.
    pub fn last_commit(&self) -> Option<CommitTime> {
        self.entries.iter().flat_map(|(_, t)| t).max().copied()
    }

    /// Collapse entries into their class representatives.
    ///
    /// `roots[i]` names the entry that entry `i` merges into and must not
    /// be greater than `i`. Merged entries' times are appended onto the
    /// representative in entry order.
    pub(crate) fn collapse(&mut self, roots: &[usize]) {
        debug_assert_eq!(roots.len(), self.entries.len());
        let entries = std::mem::take(&mut self.entries);
        self.index.clear();

        let mut position: HashMap<usize, usize> = HashMap::new();
        for (i, (author, times)) in entries.into_iter().enumerate() {
            let root = roots[i];
            if root == i {
                position.insert(i, self.entries.len());
                self.index.insert(author.clone(), self.entries.len());
                self.entries.push((author, times));
            } else if let Some(&target) = position.get(&root) {
                self.entries[target].1.extend(times);
            }
        }
    }
}

impl<S: Into<String>> FromIterator<(S, CommitTime)> for AuthorCommits {
    fn from_iter<I: IntoIterator<Item = (S, CommitTime)>>(iter: I) -> Self {
        let mut authors = Self::new();
        for (author, at) in iter {
            authors.push(author, at);
        }
        authors
    }
}
