//! Defines the error types used throughout the git library.
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur during Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path does not contain git metadata; the repository was never initialized.
    #[error("repository at {0:?} is not initialized")]
    NotInitialized(PathBuf),

    /// `init` was called on a path that already contains an initialized repository.
    #[error("repository at {0:?} is already initialized")]
    AlreadyInitialized(PathBuf),

    /// Failed to execute the external 'git' process, e.g., 'git' not found in PATH.
    #[error("unable to execute git process")]
    Execution,

    /// The output (stdout or stderr) from the 'git' process was not valid UTF-8.
    #[error("unable to decode output from the git executable")]
    Undecodable,

    /// A pathspec was absolute or escaped the repository root; only paths
    /// lexically inside the working tree can be staged.
    #[error("path is not a repository-relative pathspec: {0:?}")]
    InvalidPath(PathBuf),

    /// The provided string is not a valid Git reference name (e.g., branch name).
    #[error("ref name is invalid: {0}")]
    InvalidRefName(String),

    /// The provided string is not a plausible commit hash.
    #[error("commit hash is invalid: {0}")]
    InvalidCommitHash(String),

    /// A remote was looked up by name but is not configured.
    #[error("no remote named '{0}' is configured")]
    RemoteNotFound(String),

    /// The 'git' command ran but exited non-zero.
    /// Contains the captured stdout and stderr from the failed command.
    #[error("git failed with the following stdout: {stdout} stderr: {stderr}")]
    Command { stdout: String, stderr: String },

    /// Output from a git subcommand did not match the shape this library
    /// expects. Format drift in git itself is a contract break, not a
    /// transient error; no partial result is ever produced.
    #[error("unexpected output from 'git {command}': {reason}")]
    Parse {
        command: &'static str,
        reason: String,
    },
}
