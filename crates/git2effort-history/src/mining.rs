//! Git history extraction via git2.
//!
//! Walks the commit log of a local repository, or of a remote one cloned
//! into a temporary directory, and records every commit's author
//! signature and author date.

use chrono::{DateTime, FixedOffset};
use git2::{ErrorCode, Repository, Sort};
use git2effort_core::EffortError;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::authors::{AuthorCommits, CommitTime};

/// Options for history mining.
///
/// # Examples
///
/// ```
/// use git2effort_history::mining::MiningOptions;
///
/// let opts = MiningOptions::default();
/// assert!(opts.branch.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiningOptions {
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
}

/// Reference namespaces walked when no branch is selected.
const ALL_REFS: [&str; 3] = ["refs/heads/*", "refs/remotes/*", "refs/tags/*"];

/// A repository opened for mining.
///
/// Remote repositories are cloned into a temporary directory that is
/// removed when this value is dropped.
pub struct MinedRepository {
    repo: Repository,
    checkout: Option<TempDir>,
}

impl MinedRepository {
    /// The underlying git2 repository.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Whether the repository was cloned from a remote location.
    pub fn is_clone(&self) -> bool {
        self.checkout.is_some()
    }
}

/// Whether `location` names a remote repository rather than a local path.
///
/// # Examples
///
/// ```
/// use git2effort_history::mining::is_remote;
///
/// assert!(is_remote("https://github.com/gregoriorobles/git2effort"));
/// assert!(is_remote("git@github.com:owner/repo.git"));
/// assert!(!is_remote("."));
/// assert!(!is_remote("/home/me/project"));
/// ```
pub fn is_remote(location: &str) -> bool {
    ["http://", "https://", "ssh://", "git://", "file://", "git@"]
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

/// Open a local repository, or clone a remote one into a temporary directory.
///
/// # Errors
///
/// Returns [`EffortError::Git`] if the repository cannot be opened or
/// cloned, and [`EffortError::Io`] if the temporary directory cannot be
/// created.
pub fn open_or_clone(location: &str) -> Result<MinedRepository, EffortError> {
    if !is_remote(location) {
        let repo = Repository::discover(location).map_err(|e| {
            EffortError::Git(format!("failed to open repository at {location}: {e}"))
        })?;
        return Ok(MinedRepository {
            repo,
            checkout: None,
        });
    }

    let dir = tempfile::Builder::new().prefix("git2effort-").tempdir()?;
    debug!(url = location, path = %dir.path().display(), "cloning repository");
    let repo = git2::build::RepoBuilder::new()
        .bare(true)
        .clone(location, dir.path())
        .map_err(|e| EffortError::Git(format!("failed to clone {location}: {e}")))?;

    Ok(MinedRepository {
        repo,
        checkout: Some(dir),
    })
}

/// Mine author commit times from a local path or remote URL.
///
/// Remote repositories are cloned into a temporary directory that is
/// removed once mining finishes.
///
/// # Errors
///
/// Returns [`EffortError::Git`] if the repository cannot be opened,
/// cloned or walked.
///
/// # Examples
///
/// ```no_run
/// use git2effort_history::mining::{mine_history, MiningOptions};
///
/// let authors = mine_history(".", &MiningOptions::default()).unwrap();
/// for (author, times) in authors.iter() {
///     println!("{author}: {} commits", times.len());
/// }
/// ```
pub fn mine_history(
    location: &str,
    options: &MiningOptions,
) -> Result<AuthorCommits, EffortError> {
    let mined = open_or_clone(location)?;
    mine_repository(mined.repository(), options)
}

/// Mine author commit times from an open repository.
///
/// Without a branch, every commit reachable from HEAD, a local branch, a
/// remote-tracking branch or a tag is visited once. With a branch, only
/// that branch's history is walked. Commits are visited newest first and
/// keyed by their author signature rendered as `Name <email>`; bytes that
/// are not valid UTF-8 are replaced rather than dropped. A repository
/// without any commit yields an empty map.
///
/// # Errors
///
/// Returns [`EffortError::Git`] if the branch cannot be resolved or the
/// history cannot be walked.
pub fn mine_repository(
    repo: &Repository,
    options: &MiningOptions,
) -> Result<AuthorCommits, EffortError> {
    let mut revwalk = repo
        .revwalk()
        .map_err(|e| EffortError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk
        .set_sorting(Sort::TIME)
        .map_err(|e| EffortError::Git(format!("failed to sort revwalk: {e}")))?;

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| EffortError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
        let oid = reference
            .target()
            .ok_or_else(|| EffortError::Git("branch has no target".into()))?;
        revwalk
            .push(oid)
            .map_err(|e| EffortError::Git(format!("failed to push oid: {e}")))?;
    } else {
        match repo.head() {
            Ok(_) => revwalk
                .push_head()
                .map_err(|e| EffortError::Git(format!("failed to push HEAD: {e}")))?,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                debug!("HEAD is unborn");
            }
            Err(e) => return Err(EffortError::Git(format!("failed to resolve HEAD: {e}"))),
        }
        for glob in ALL_REFS {
            revwalk
                .push_glob(glob)
                .map_err(|e| EffortError::Git(format!("failed to push {glob}: {e}")))?;
        }
    }

    let mut authors = AuthorCommits::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| EffortError::Git(format!("revwalk error: {e}")))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| EffortError::Git(format!("failed to find commit: {e}")))?;

        let author = commit.author();
        let key = format!(
            "{} <{}>",
            String::from_utf8_lossy(author.name_bytes()),
            String::from_utf8_lossy(author.email_bytes())
        );
        let when = author.when();
        let at = commit_time(when.seconds(), when.offset_minutes())
            .ok_or_else(|| EffortError::Git(format!("commit {oid} has an invalid author date")))?;
        authors.push(key, at);
    }

    info!(
        commits = authors.commit_count(),
        authors = authors.len(),
        "mined history"
    );
    Ok(authors)
}

fn commit_time(seconds: i64, offset_minutes: i32) -> Option<CommitTime> {
    let offset = FixedOffset::east_opt(offset_minutes * 60)?;
    Some(DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset))
}
