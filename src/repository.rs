//! Provides the core Repository implementation.

use crate::cmd::GitCommand;
use crate::error::GitError;
use crate::models::{Branches, Commit, Head, Log, Remotes, StatusReport, Tags};
use crate::types::{CommitHash, Result};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Represents a local Git repository located at a specific path.
///
/// A `Repository` is only a handle: constructing one does not touch the
/// filesystem, and every operation is a fresh, blocking round-trip to the
/// `git` executable scoped to this path. Domain objects returned from it
/// (commits, branches, status entries) carry a clone of this handle so
/// they can issue further queries; they never own any repository state.
#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) location: PathBuf,
}

impl Repository {
    /// Creates a `Repository` instance pointing to a local path.
    ///
    /// This does *not* check if the path is actually a valid Git
    /// repository. Operations will fail later if it's not.
    ///
    /// # Arguments
    /// * `p` - The path to the local repository's root directory.
    pub fn new<P: AsRef<Path>>(p: P) -> Repository {
        Repository {
            location: PathBuf::from(p.as_ref()),
        }
    }

    /// The working-tree path this handle is scoped to.
    pub fn path(&self) -> &Path {
        &self.location
    }

    /// Whether the path holds an initialized repository.
    ///
    /// Implemented as a cheap `rev-parse` probe; any failure reads as
    /// "not initialized" and the raw process error is never surfaced.
    pub fn is_initialized(&self) -> bool {
        GitCommand::probe(&self.location).run().is_ok()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(GitError::NotInitialized(self.location.clone()))
        }
    }

    /// Initializes the repository.
    ///
    /// # Errors
    /// Returns `GitError::AlreadyInitialized` if the metadata probe
    /// succeeds; an existing repository is never reinitialized.
    pub fn init(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(GitError::AlreadyInitialized(self.location.clone()));
        }
        GitCommand::init(&self.location).run()
    }

    /// The current status, partitioned by status kind.
    ///
    /// # Errors
    /// Returns `GitError::NotInitialized` if the metadata probe fails.
    pub fn status(&self) -> Result<StatusReport> {
        self.ensure_initialized()?;
        let summary = GitCommand::status(&self.location).run()?;
        Ok(StatusReport::from_summary(self, summary))
    }

    /// Stages a path (`git add`).
    ///
    /// The path must be lexically relative to, and stay within, the
    /// repository root; it is normalized and staged root-relative so the
    /// command does not depend on the caller's working directory.
    /// [`crate::models::StatusEntry::stage`] goes through here.
    ///
    /// # Errors
    /// Returns `GitError::InvalidPath` for absolute paths and paths that
    /// escape the root. This is a logic error, rejected before any
    /// command is built.
    pub fn add<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let pathspec = self.pathspec(path.as_ref())?;
        GitCommand::add(&self.location, &pathspec).run()
    }

    /// Commits what is staged with a plain message (`commit -m`).
    pub fn commit(&self, message: &str) -> Result<()> {
        GitCommand::commit(&self.location, message).run()
    }

    /// Unstages everything, leaving the working tree alone (`reset`).
    pub fn reset(&self) -> Result<()> {
        GitCommand::reset(&self.location, false).run()
    }

    /// Discards staged and working-tree changes (`reset --hard`).
    pub fn reset_hard(&self) -> Result<()> {
        GitCommand::reset(&self.location, true).run()
    }

    /// Restores every tracked file from the index (`checkout .`),
    /// discarding working-tree modifications while leaving untracked
    /// files in place. Never a destructive clean.
    pub fn checkout(&self) -> Result<()> {
        GitCommand::checkout_path(&self.location, ".").run()
    }

    /// True when any tracked content changed; untracked files alone do
    /// not make the repository dirty.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(self.status()?.has_changes())
    }

    /// The currently checked-out branch
    /// (`rev-parse --abbrev-ref HEAD`).
    pub fn head(&self) -> Result<Head> {
        let name = GitCommand::rev_parse(&self.location, ["--abbrev-ref", "HEAD"]).run()?;
        Ok(Head::new(self.clone(), name))
    }

    /// A lazy walk over the commits reachable from `HEAD`, newest first
    /// (`rev-list HEAD`).
    pub fn log(&self) -> Result<Log> {
        let hashes = GitCommand::rev_list(&self.location, "HEAD")
            .run()?
            .iter()
            .map(|hash| CommitHash::from_str(hash))
            .collect::<Result<Vec<_>>>()?;
        Ok(Log::new(self.clone(), hashes))
    }

    /// A commit handle for a known hash. The hash is validated but not
    /// resolved; metadata is fetched lazily on first access, and two
    /// handles for the same hash always yield the same content.
    pub fn find_commit(&self, hash: &str) -> Result<Commit> {
        Ok(Commit::new(self.clone(), CommitHash::from_str(hash)?))
    }

    /// Pushes a branch to a remote, optionally with `--set-upstream`.
    ///
    /// Returns `Ok(true)` when the push succeeded and `Ok(false)` when
    /// git itself rejected it (non-fast-forward, unknown remote, ...).
    ///
    /// # Errors
    /// Only spawn/decode failures are surfaced as errors.
    pub fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<bool> {
        match GitCommand::push(&self.location, remote, branch, set_upstream).run() {
            Ok(()) => Ok(true),
            Err(GitError::Command { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// The configured remotes, as a name-to-URL mapping view.
    pub fn remote(&self) -> Remotes {
        Remotes::new(self.clone())
    }

    /// The branch collection view.
    pub fn branches(&self) -> Branches {
        Branches::new(self.clone())
    }

    /// The tag collection view.
    pub fn tags(&self) -> Tags {
        Tags::new(self.clone())
    }

    // Normalizes a pathspec to a root-relative form. Absolute paths and
    // paths escaping the root are logic errors, caught before any process
    // is spawned.
    fn pathspec(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return Err(GitError::InvalidPath(path.to_path_buf()));
        }
        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(GitError::InvalidPath(path.to_path_buf()));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(GitError::InvalidPath(path.to_path_buf()));
                }
            }
        }
        if normalized.as_os_str().is_empty() {
            return Err(GitError::InvalidPath(path.to_path_buf()));
        }
        Ok(normalized)
    }
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repository {
        Repository::new("/work/repo")
    }

    #[test]
    fn test_pathspec_rejects_absolute_paths() {
        assert!(matches!(
            repo().pathspec(Path::new("/etc/passwd")),
            Err(GitError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_pathspec_rejects_escaping_the_root() {
        assert!(matches!(
            repo().pathspec(Path::new("../sibling/file.rs")),
            Err(GitError::InvalidPath(_))
        ));
        assert!(matches!(
            repo().pathspec(Path::new("a/../../file.rs")),
            Err(GitError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_pathspec_rejects_the_empty_result() {
        assert!(matches!(
            repo().pathspec(Path::new(".")),
            Err(GitError::InvalidPath(_))
        ));
        assert!(matches!(
            repo().pathspec(Path::new("a/..")),
            Err(GitError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_pathspec_normalizes_inside_the_root() {
        assert_eq!(
            repo().pathspec(Path::new("./src/lib.rs")).unwrap(),
            PathBuf::from("src/lib.rs")
        );
        assert_eq!(
            repo().pathspec(Path::new("src/../README.md")).unwrap(),
            PathBuf::from("README.md")
        );
    }

    #[test]
    fn test_repository_is_a_plain_handle() {
        let repo = Repository::new("relative/dir");
        assert_eq!(repo.path(), Path::new("relative/dir"));
        // No filesystem access on construction; cloning is cheap and the
        // clones stay interchangeable.
        let other = repo.clone();
        assert_eq!(repo.path(), other.path());
    }
}
