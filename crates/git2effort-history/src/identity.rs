//! Duplicate author detection and merging.
//!
//! Two author strings belong to the same person when their display names
//! match exactly or their email addresses match exactly. Matching is
//! transitive: identities are grouped into equivalence classes first and
//! each class is then merged into its first-encountered member, so the
//! grouping does not depend on the order authors were fetched in.

use std::collections::HashMap;

use git2effort_core::EffortError;
use serde::Serialize;
use tracing::debug;

use crate::authors::AuthorCommits;

/// Display name and email parsed from a `Name <email>` author string.
///
/// # Examples
///
/// ```
/// use git2effort_history::identity::AuthorIdentity;
///
/// let id = AuthorIdentity::parse("Jane Doe <jane@example.com>").unwrap();
/// assert_eq!(id.name, "Jane Doe");
/// assert_eq!(id.email, "jane@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorIdentity {
    /// Display name, without the single separating space.
    pub name: String,
    /// Email address, without angle brackets.
    pub email: String,
}

impl AuthorIdentity {
    /// Split a raw author string on its first `<`.
    ///
    /// Only the one space that separates name from `<` and the closing
    /// `>` are removed. Any other whitespace stays part of the identity,
    /// since comparison downstream is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`EffortError::Identity`] if `raw` contains no `<`.
    pub fn parse(raw: &str) -> Result<Self, EffortError> {
        let (name, email) = raw
            .split_once('<')
            .ok_or_else(|| EffortError::Identity(raw.to_string()))?;
        Ok(Self {
            name: name.strip_suffix(' ').unwrap_or(name).to_string(),
            email: email.strip_suffix('>').unwrap_or(email).to_string(),
        })
    }
}

/// An identity folded into another by [`merge`].
///
/// # Examples
///
/// ```
/// use git2effort_history::identity::DuplicatePair;
///
/// let pair = DuplicatePair {
///     surviving: "Jane Doe <jane@x.com>".into(),
///     merged_away: "Jane Doe <jane@y.com>".into(),
/// };
/// assert_ne!(pair.surviving, pair.merged_away);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePair {
    /// Author key that keeps all commits.
    pub surviving: String,
    /// Author key removed after its commits were moved.
    pub merged_away: String,
}

/// Find authors that are the same person as an earlier author.
///
/// Every identity that is not the first-encountered member of its
/// equivalence class appears exactly once as `merged_away`, paired with
/// that first member. Pairs are ordered by the position of `merged_away`.
///
/// # Errors
///
/// Returns [`EffortError::Identity`] if any author string is malformed.
///
/// # Examples
///
/// ```
/// use git2effort_history::identity::find_duplicate_pairs;
///
/// let pairs = find_duplicate_pairs([
///     "Jane Doe <jane@x.com>",
///     "J. Doe <jane@x.com>",
///     "Bob <bob@x.com>",
///     "Jane Doe <jane@y.com>",
/// ])
/// .unwrap();
/// assert_eq!(pairs.len(), 2);
/// assert!(pairs.iter().all(|p| p.surviving == "Jane Doe <jane@x.com>"));
/// ```
pub fn find_duplicate_pairs<I, S>(authors: I) -> Result<Vec<DuplicatePair>, EffortError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let authors: Vec<S> = authors.into_iter().collect();
    let keys: Vec<&str> = authors.iter().map(|a| a.as_ref()).collect();
    let roots = equivalence_roots(keys.iter().copied())?;
    Ok(pairs_from_roots(&keys, &roots))
}

fn pairs_from_roots(keys: &[&str], roots: &[usize]) -> Vec<DuplicatePair> {
    roots
        .iter()
        .enumerate()
        .filter(|(i, root)| *i != **root)
        .map(|(i, &root)| DuplicatePair {
            surviving: keys[root].to_string(),
            merged_away: keys[i].to_string(),
        })
        .collect()
}

/// Merge duplicate authors in place.
///
/// Each merged-away author's commits are appended onto the surviving
/// author's list and its key is removed. Surviving keys are unchanged.
/// On error the map is left untouched.
///
/// # Errors
///
/// Returns [`EffortError::Identity`] if any author string is malformed.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use git2effort_history::authors::AuthorCommits;
/// use git2effort_history::identity::merge;
///
/// let at = DateTime::parse_from_rfc3339("2020-03-01T10:00:00Z").unwrap();
/// let mut authors: AuthorCommits = vec![
///     ("Jane Doe <jane@x.com>", at),
///     ("Jane Doe <jane@y.com>", at),
/// ]
/// .into_iter()
/// .collect();
///
/// let pairs = merge(&mut authors).unwrap();
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(authors.len(), 1);
/// assert_eq!(authors.commits("Jane Doe <jane@x.com>").unwrap().len(), 2);
/// ```
pub fn merge(authors: &mut AuthorCommits) -> Result<Vec<DuplicatePair>, EffortError> {
    let keys: Vec<&str> = authors.authors().collect();
    let roots = equivalence_roots(keys.iter().copied())?;
    let pairs = pairs_from_roots(&keys, &roots);

    for pair in &pairs {
        debug!(surviving = %pair.surviving, merged_away = %pair.merged_away, "merging author");
    }

    if !pairs.is_empty() {
        authors.collapse(&roots);
    }
    Ok(pairs)
}

/// For each author, the index of the first-encountered member of its class.
fn equivalence_roots<'a>(
    authors: impl Iterator<Item = &'a str>,
) -> Result<Vec<usize>, EffortError> {
    let identities = authors
        .map(AuthorIdentity::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let mut classes = DisjointSet::new(identities.len());
    let mut first_by_name: HashMap<&str, usize> = HashMap::new();
    let mut first_by_email: HashMap<&str, usize> = HashMap::new();

    for (i, id) in identities.iter().enumerate() {
        let by_name = *first_by_name.entry(id.name.as_str()).or_insert(i);
        classes.union(by_name, i);
        let by_email = *first_by_email.entry(id.email.as_str()).or_insert(i);
        classes.union(by_email, i);
    }

    Ok((0..identities.len()).map(|i| classes.find(i)).collect())
}

/// Union-find whose root is always the smallest index in its set.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}
