//! A Rust library providing a typed, object-shaped interface to Git
//! by wrapping the `git` command-line tool.
//!
//! The `git` executable must be installed and accessible in the system's
//! PATH where the Rust program is executed. Every operation is one
//! blocking round-trip to it, scoped to the repository by explicit
//! `--git-dir`/`--work-tree` flags; the porcelain text it prints is
//! parsed into domain objects with typed accessors.
//!
//! # Examples
//!
//! ```no_run
//! use gitglass::Repository;
//! use gitglass::types::BranchName;
//! use std::str::FromStr;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::new("./my_project");
//! repo.init()?;
//!
//! // Inspect and stage the working tree
//! for entry in &repo.status()?.untracked {
//!     entry.stage()?;
//! }
//! repo.commit("first commit")?;
//!
//! // Walk history and read commit metadata
//! for commit in repo.log()? {
//!     println!("{} {}", commit.hash(), commit.message()?);
//! }
//!
//! // Branch off a historical commit and push
//! let head = repo.head()?;
//! let topic = BranchName::from_str("my-feature")?;
//! repo.branches().create(&topic, Some(&head.commit()?))?;
//! repo.push("origin", topic.as_ref(), true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables deserialization of the validated name types using
//!   the `serde` crate.

// First define all our modules
pub mod error;
pub mod types;
mod cmd;
mod parse;
pub mod models;
pub mod repository;

// Re-export key types
pub use crate::error::GitError;
pub use crate::repository::Repository;
pub use crate::types::{BranchName, CommitHash, Result, Revspec};

// Re-export all modules
pub mod prelude {
    //! Convenient import for common gitglass types and traits.
    pub use crate::error::GitError;
    pub use crate::models::*;
    pub use crate::repository::Repository;
    pub use crate::types::{BranchName, CommitHash, Result, Revspec};
}
