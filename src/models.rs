//! Provides structured types representing Git data.
//!
//! Every entity here is a lightweight view over the live repository,
//! recomputed on access; git's own store is the sole source of truth.
//! Entities carry a cloned [`Repository`] handle back to the repository
//! they came from so callers can act on them without re-deriving paths or
//! names. Nothing is mutated after construction except the once-computed
//! metadata slot on [`Commit`].

use crate::cmd::GitCommand;
use crate::error::GitError;
use crate::parse::StatusSummary;
use crate::repository::Repository;
use crate::types::{BranchName, CommitHash, Result, Revspec};
use chrono::{DateTime, FixedOffset};
use once_cell::unsync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;

/// A snapshot of `git status`, partitioned by status kind.
///
/// Produced fresh on every query; every partition is present even when
/// empty. Only the six "change" partitions make a repository dirty;
/// untracked and unmerged entries do not count.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub untracked: Vec<StatusEntry>,
    pub modified: Vec<StatusEntry>,
    /// Rename entries keep the opaque `old -> new` form git prints;
    /// staging one of these values directly will not round-trip.
    pub renamed: Vec<StatusEntry>,
    pub added: Vec<StatusEntry>,
    pub deleted: Vec<StatusEntry>,
    pub copied: Vec<StatusEntry>,
    pub type_changed: Vec<StatusEntry>,
    pub unmerged: Vec<StatusEntry>,
}

impl StatusReport {
    pub(crate) fn from_summary(repo: &Repository, summary: StatusSummary) -> StatusReport {
        let bind = |paths: Vec<String>| {
            paths
                .into_iter()
                .map(|path| StatusEntry {
                    repo: repo.clone(),
                    path,
                })
                .collect()
        };
        StatusReport {
            untracked: bind(summary.untracked),
            modified: bind(summary.modified),
            renamed: bind(summary.renamed),
            added: bind(summary.added),
            deleted: bind(summary.deleted),
            copied: bind(summary.copied),
            type_changed: bind(summary.type_changed),
            unmerged: bind(summary.unmerged),
        }
    }

    /// True when any tracked content changed: modified, renamed, added,
    /// deleted, copied or type-changed. Untracked files alone are not
    /// changes until staged.
    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
            || !self.renamed.is_empty()
            || !self.added.is_empty()
            || !self.deleted.is_empty()
            || !self.copied.is_empty()
            || !self.type_changed.is_empty()
    }
}

/// A single path from a status report, bound to its repository so it can
/// be acted on directly.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    repo: Repository,
    path: String,
}

impl StatusEntry {
    /// The stored path fragment, relative to the repository root, with the
    /// status code and separator already stripped.
    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Stages this path (`git add`), e.g. to promote an untracked file.
    pub fn stage(&self) -> Result<()> {
        self.repo.add(self.path())
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// The once-fetched metadata of a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Author name, without the email part.
    pub author: String,
    /// Author email, from the last `<...>` group on the author line.
    pub email: String,
    /// Commit timestamp with its explicit UTC offset.
    pub date: DateTime<FixedOffset>,
    /// Message body, lines left-trimmed and rejoined.
    pub message: String,
}

/// A commit, identified by its hash.
///
/// Metadata is fetched on first access and cached for the lifetime of the
/// instance; hashes are content-addressed, so the cache never needs
/// invalidation. A fresh `Commit` for the same hash deterministically
/// yields the same content. Equality and hashing are by hash value only.
#[derive(Debug, Clone)]
pub struct Commit {
    repo: Repository,
    hash: CommitHash,
    info: OnceCell<CommitInfo>,
}

impl Commit {
    pub(crate) fn new(repo: Repository, hash: CommitHash) -> Commit {
        Commit {
            repo,
            hash,
            info: OnceCell::new(),
        }
    }

    pub fn hash(&self) -> &CommitHash {
        &self.hash
    }

    /// The commit's metadata, fetched once per instance and memoized.
    pub fn info(&self) -> Result<&CommitInfo> {
        self.info
            .get_or_try_init(|| GitCommand::commit_info(self.repo.path(), &self.hash).run())
    }

    pub fn author(&self) -> Result<&str> {
        Ok(&self.info()?.author)
    }

    pub fn email(&self) -> Result<&str> {
        Ok(&self.info()?.email)
    }

    pub fn date(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.info()?.date)
    }

    pub fn message(&self) -> Result<&str> {
        Ok(&self.info()?.message)
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Commit) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl Revspec for Commit {
    fn revspec(&self) -> &str {
        self.hash.as_ref()
    }
}

/// A branch: a mutable, named pointer into history.
///
/// Remote branches carry their remote-qualified name (`origin/master`);
/// local branches do not. Resolution to a [`Commit`] is never memoized,
/// since the pointer can move between calls.
#[derive(Debug, Clone)]
pub struct Branch {
    repo: Repository,
    name: String,
    is_remote: bool,
}

impl Branch {
    pub(crate) fn local(repo: Repository, name: String) -> Branch {
        Branch {
            repo,
            name,
            is_remote: false,
        }
    }

    pub(crate) fn remote(repo: Repository, name: String) -> Branch {
        Branch {
            repo,
            name,
            is_remote: true,
        }
    }

    /// The full name: remote-qualified for remote branches.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    /// The name without the remote qualifier.
    pub fn short_name(&self) -> &str {
        if self.is_remote {
            self.name.split_once('/').map_or(self.name.as_str(), |(_, short)| short)
        } else {
            &self.name
        }
    }

    /// Resolves the branch to the commit it currently points at.
    pub fn commit(&self) -> Result<Commit> {
        resolve_commit(&self.repo, &self.name)
    }

    /// Checks this branch out; remote branches are checked out with
    /// `--track` so a local tracking branch is created.
    pub fn checkout(&self) -> Result<()> {
        if self.is_remote {
            GitCommand::checkout_track(self.repo.path(), &self.name).run()
        } else {
            GitCommand::checkout_branch(self.repo.path(), &self.name).run()
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Revspec for Branch {
    fn revspec(&self) -> &str {
        &self.name
    }
}

/// The currently checked-out branch, as reported by
/// `rev-parse --abbrev-ref HEAD`.
#[derive(Debug, Clone)]
pub struct Head {
    branch: Branch,
}

impl Head {
    pub(crate) fn new(repo: Repository, name: String) -> Head {
        Head {
            branch: Branch::local(repo, name),
        }
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }
}

impl Deref for Head {
    type Target = Branch;

    fn deref(&self) -> &Branch {
        &self.branch
    }
}

impl Revspec for Head {
    fn revspec(&self) -> &str {
        self.branch.revspec()
    }
}

/// A tag; like a branch name it is a mutable pointer, so resolution is
/// re-done on every call.
#[derive(Debug, Clone)]
pub struct Tag {
    repo: Repository,
    name: String,
}

impl Tag {
    pub(crate) fn new(repo: Repository, name: String) -> Tag {
        Tag { repo, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves the tag to the commit it points at, peeling annotated
    /// tags down to their target commit.
    pub fn commit(&self) -> Result<Commit> {
        resolve_commit(&self.repo, &self.name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Revspec for Tag {
    fn revspec(&self) -> &str {
        &self.name
    }
}

// `<rev>^{commit}` peels annotated tags; for plain branches it resolves
// to the same hash rev-parse would give.
fn resolve_commit(repo: &Repository, name: &str) -> Result<Commit> {
    let peeled = format!("{name}^{{commit}}");
    let hash = GitCommand::rev_parse(repo.path(), [peeled.as_str()]).run()?;
    Ok(Commit::new(repo.clone(), CommitHash::from_str(&hash)?))
}

/// Queried view over the repository's branches.
#[derive(Debug, Clone)]
pub struct Branches {
    repo: Repository,
}

impl Branches {
    pub(crate) fn new(repo: Repository) -> Branches {
        Branches { repo }
    }

    /// Local branch names.
    pub fn names(&self) -> Result<Vec<String>> {
        GitCommand::branch_list(self.repo.path()).run()
    }

    /// Local branches.
    pub fn list(&self) -> Result<Vec<Branch>> {
        Ok(self
            .names()?
            .into_iter()
            .map(|name| Branch::local(self.repo.clone(), name))
            .collect())
    }

    /// Membership test by name.
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.names()?.iter().any(|n| n == name))
    }

    /// Creates a branch, optionally anchored at a revision (a hash, a
    /// [`Commit`], another branch...). The new branch is not checked out.
    pub fn create(&self, name: &BranchName, start: Option<&dyn Revspec>) -> Result<Branch> {
        GitCommand::branch_create(self.repo.path(), name.as_ref(), start.map(|r| r.revspec()))
            .run()?;
        Ok(Branch::local(self.repo.clone(), name.to_string()))
    }

    /// Remote branches, grouped by remote name.
    pub fn remote(&self) -> Result<RemoteBranches> {
        let groups = GitCommand::remote_branch_list(self.repo.path()).run()?;
        Ok(RemoteBranches {
            repo: self.repo.clone(),
            groups,
        })
    }
}

/// Remote branches grouped by remote: a mapping from remote name to the
/// branch short names it carries.
#[derive(Debug, Clone)]
pub struct RemoteBranches {
    repo: Repository,
    groups: BTreeMap<String, Vec<String>>,
}

impl RemoteBranches {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The remote names present in the listing.
    pub fn remotes(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Branch short names under a remote, if the remote has any.
    pub fn get(&self, remote: &str) -> Option<&[String]> {
        self.groups.get(remote).map(Vec::as_slice)
    }

    /// The branches under a remote, with their remote-qualified names.
    pub fn branches(&self, remote: &str) -> Vec<Branch> {
        self.groups
            .get(remote)
            .map(|names| {
                names
                    .iter()
                    .map(|name| Branch::remote(self.repo.clone(), format!("{remote}/{name}")))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Queried view over the repository's tags.
#[derive(Debug, Clone)]
pub struct Tags {
    repo: Repository,
}

impl Tags {
    pub(crate) fn new(repo: Repository) -> Tags {
        Tags { repo }
    }

    pub fn names(&self) -> Result<Vec<String>> {
        GitCommand::tag_list(self.repo.path()).run()
    }

    pub fn list(&self) -> Result<Vec<Tag>> {
        Ok(self
            .names()?
            .into_iter()
            .map(|name| Tag::new(self.repo.clone(), name))
            .collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.names()?.iter().any(|n| n == name))
    }

    /// Creates a lightweight tag, optionally anchored at a revision.
    pub fn create(&self, name: &str, at: Option<&dyn Revspec>) -> Result<Tag> {
        if !crate::types::is_valid_reference_name(name) {
            return Err(GitError::InvalidRefName(name.to_string()));
        }
        GitCommand::tag_create(self.repo.path(), name, at.map(|r| r.revspec())).run()?;
        Ok(Tag::new(self.repo.clone(), name.to_string()))
    }
}

/// A mapping-like view over configured remotes (name to URL).
///
/// URLs are opaque strings passed through to git's remote configuration.
#[derive(Debug, Clone)]
pub struct Remotes {
    repo: Repository,
}

impl Remotes {
    pub(crate) fn new(repo: Repository) -> Remotes {
        Remotes { repo }
    }

    /// Configured remote names.
    pub fn names(&self) -> Result<Vec<String>> {
        GitCommand::remote_list(self.repo.path()).run()
    }

    /// True when no remote is configured.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.names()?.is_empty())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.names()?.iter().any(|n| n == name))
    }

    /// The URL of a remote, or [`GitError::RemoteNotFound`] when no remote
    /// with that name is configured.
    pub fn url(&self, name: &str) -> Result<String> {
        GitCommand::remote_get_url(self.repo.path(), name)
            .run()
            .map_err(|e| match e {
                GitError::Command { .. } => GitError::RemoteNotFound(name.to_string()),
                other => other,
            })
    }

    /// Registers a new remote.
    pub fn add(&self, name: &str, url: &str) -> Result<()> {
        GitCommand::remote_add(self.repo.path(), name, url).run()
    }
}

/// Lazy, newest-first walk over the commits reachable from `HEAD`.
///
/// The hashes are captured up front (they are cheap to recompute); each
/// [`Commit`] is constructed on demand and fetches its metadata lazily.
#[derive(Debug)]
pub struct Log {
    repo: Repository,
    hashes: std::vec::IntoIter<CommitHash>,
}

impl Log {
    pub(crate) fn new(repo: Repository, hashes: Vec<CommitHash>) -> Log {
        Log {
            repo,
            hashes: hashes.into_iter(),
        }
    }
}

impl Iterator for Log {
    type Item = Commit;

    fn next(&mut self) -> Option<Commit> {
        let hash = self.hashes.next()?;
        Some(Commit::new(self.repo.clone(), hash))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hashes.size_hint()
    }
}

impl ExactSizeIterator for Log {}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new("/nonexistent/fixture")
    }

    fn summary_with(modified: &[&str], untracked: &[&str]) -> StatusSummary {
        StatusSummary {
            modified: modified.iter().map(|s| s.to_string()).collect(),
            untracked: untracked.iter().map(|s| s.to_string()).collect(),
            ..StatusSummary::default()
        }
    }

    #[test]
    fn test_report_binds_entries_to_partitions() {
        let report = StatusReport::from_summary(&repo(), summary_with(&["a.rs"], &["b.rs"]));
        assert_eq!(report.modified.len(), 1);
        assert_eq!(report.modified[0].as_str(), "a.rs");
        assert_eq!(report.untracked[0].path(), Path::new("b.rs"));
        assert!(report.renamed.is_empty());
    }

    #[test]
    fn test_untracked_alone_is_not_a_change() {
        let clean = StatusReport::from_summary(&repo(), summary_with(&[], &["new.rs"]));
        assert!(!clean.has_changes());
        let dirty = StatusReport::from_summary(&repo(), summary_with(&["a.rs"], &[]));
        assert!(dirty.has_changes());
    }

    #[test]
    fn test_commit_identity_is_the_hash() {
        let hash: CommitHash = "deadbeef".parse().unwrap();
        let a = Commit::new(repo(), hash.clone());
        let b = Commit::new(Repository::new("/somewhere/else"), hash);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "deadbeef");

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_remote_branch_short_name_drops_the_qualifier() {
        let branch = Branch::remote(repo(), "origin/feature/parser".to_string());
        assert_eq!(branch.name(), "origin/feature/parser");
        assert_eq!(branch.short_name(), "feature/parser");
        assert!(branch.is_remote());

        let local = Branch::local(repo(), "master".to_string());
        assert_eq!(local.short_name(), "master");
    }

    #[test]
    fn test_head_is_a_branch() {
        let head = Head::new(repo(), "master".to_string());
        assert_eq!(head.name(), "master");
        assert_eq!(head.branch().name(), "master");
        assert_eq!(head.revspec(), "master");
    }

    #[test]
    fn test_tag_create_rejects_invalid_names() {
        let tags = Tags::new(repo());
        assert!(matches!(
            tags.create("bad..name", None),
            Err(GitError::InvalidRefName(_))
        ));
    }
}
