//! Defines core data types like commit hashes and branch names.
use super::GitError;
use once_cell::sync::Lazy;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer};
use std::str::FromStr;
use std::{
    ffi::OsStr,
    fmt,
    fmt::{Display, Formatter},
    result::Result as stdResult,
};

/// A specialized `Result` type for Git operations.
pub type Result<A> = stdResult<A, GitError>;

// Use Lazy to initialize the Regex safely and only once
static COMMIT_HASH_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Full or abbreviated SHA-1, as printed by rev-parse / rev-list
    Regex::new("^[0-9a-f]{4,40}$").expect("Invalid static commit hash regex")
});

/// Represents a validated commit hash (full or abbreviated).
///
/// Can be created from a string using `FromStr`, which validates the format.
/// Hashes are content-addressed and immutable: two values comparing equal
/// always name the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash {
    pub(crate) value: String,
}

impl FromStr for CommitHash {
    type Err = GitError;

    /// Parses a string into a `CommitHash`, returning
    /// `Err(GitError::InvalidCommitHash)` if the string is not hex of a
    /// plausible length.
    fn from_str(value: &str) -> Result<Self> {
        if COMMIT_HASH_REGEX.is_match(value) {
            Ok(CommitHash {
                value: String::from(value),
            })
        } else {
            Err(GitError::InvalidCommitHash(value.to_string()))
        }
    }
}

impl Display for CommitHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// Implement AsRef<str> and AsRef<OsStr> for convenience
impl AsRef<str> for CommitHash {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl AsRef<OsStr> for CommitHash {
    fn as_ref(&self) -> &OsStr {
        self.value.as_ref()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for CommitHash {
    /// Deserializes a string into a `CommitHash`, validating the format.
    fn deserialize<D>(deserializer: D) -> stdResult<CommitHash, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CommitHash::from_str(&s).map_err(de::Error::custom)
    }
}

/// Represents a validated Git branch name (or more generally, a reference name).
///
/// Can be created from a string using `FromStr`, which validates the format
/// according to Git's reference naming rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName {
    pub(crate) value: String,
}

impl FromStr for BranchName {
    type Err = GitError;

    /// Parses a string into a `BranchName`, returning `Err(GitError::InvalidRefName)` if
    /// the string does not conform to Git's reference naming rules.
    fn from_str(s: &str) -> Result<Self> {
        if is_valid_reference_name(s) {
            Ok(BranchName {
                value: String::from(s),
            })
        } else {
            Err(GitError::InvalidRefName(s.to_string()))
        }
    }
}

impl Display for BranchName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// Implement AsRef<str> and AsRef<OsStr> for convenience
impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl AsRef<OsStr> for BranchName {
    fn as_ref(&self) -> &OsStr {
        self.value.as_ref()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BranchName {
    /// Deserializes a string into a `BranchName`, validating the format.
    fn deserialize<D>(deserializer: D) -> stdResult<BranchName, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BranchName::from_str(&s).map_err(de::Error::custom)
    }
}

/// Anything that names a revision the git command line can resolve:
/// a raw hash, a branch or tag name, or a domain object wrapping one.
///
/// Used wherever an operation is optionally anchored at a revision,
/// e.g. creating a branch or tag at a historical commit.
pub trait Revspec {
    /// The textual revision to hand to git.
    fn revspec(&self) -> &str;
}

impl Revspec for str {
    fn revspec(&self) -> &str {
        self
    }
}

impl Revspec for String {
    fn revspec(&self) -> &str {
        self
    }
}

impl Revspec for CommitHash {
    fn revspec(&self) -> &str {
        &self.value
    }
}

// --- Internal validation logic ---

const INVALID_REFERENCE_CHARS: [char; 5] = [' ', '~', '^', ':', '\\'];
const INVALID_REFERENCE_START: &str = "-";
const INVALID_REFERENCE_END: &str = ".";

/// Checks if a string is a valid Git reference name based on common rules.
///
/// Rules approximated from `git check-ref-format`.
/// See: https://git-scm.com/docs/git-check-ref-format
pub(crate) fn is_valid_reference_name(name: &str) -> bool {
    !name.is_empty() // Cannot be empty
        && !name.starts_with(INVALID_REFERENCE_START)
        && !name.ends_with(INVALID_REFERENCE_END)
        && name.chars().all(|c| {
            !c.is_ascii_control() && INVALID_REFERENCE_CHARS.iter().all(|invalid| c != *invalid)
        })
        && !name.contains("/.")
        && !name.contains("@{")
        && !name.contains("..")
        && name != "@"
        // Further rule: Cannot contain sequences like //, /*, ?, [*] - simplified check
        && !name.contains("//") && !name.contains("/*") && !name.contains('?') && !name.contains('[') && !name.contains(']')
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_commit_hashes() {
        let valid_hashes = vec![
            "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3",
            "a94a8fe",
            "deadbeef",
            "0123",
        ];

        for hash in valid_hashes.iter() {
            assert!(CommitHash::from_str(hash).is_ok(), "Expected valid: {}", hash);
        }
    }

    #[test]
    fn test_invalid_commit_hashes() {
        let invalid_hashes = vec![
            "",
            "abc",                                        // Too short
            "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3ff", // Too long
            "A94A8FE",                                    // Uppercase
            "xyzw1234",                                   // Not hex
            "a94a8fe ",                                   // Trailing space
        ];

        for hash in invalid_hashes.iter() {
            assert!(CommitHash::from_str(hash).is_err(), "Expected invalid: {}", hash);
        }
    }

    #[test]
    fn test_commit_hash_equality_is_by_value() {
        let a = CommitHash::from_str("deadbeef").unwrap();
        let b = CommitHash::from_str("deadbeef").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "deadbeef");
    }

    #[test]
    fn test_revspec_sources() {
        let hash = CommitHash::from_str("deadbeef").unwrap();
        assert_eq!(hash.revspec(), "deadbeef");
        assert_eq!("HEAD~2".revspec(), "HEAD~2");
        assert_eq!(String::from("v1.0.0").revspec(), "v1.0.0");
    }

    #[test]
    fn test_valid_reference_names() {
        let valid_references = vec![
            "avalidreference",
            "a/valid/ref",
            "a-valid-ref",
            "v1.0.0",
            "HEAD", // Although special, it's structurally valid
            "feature/new_stuff",
            "fix_123",
        ];

        for reference_name in valid_references.iter() {
            assert!(
                is_valid_reference_name(reference_name),
                "Expected valid: {}",
                reference_name
            );
            assert!(
                BranchName::from_str(reference_name).is_ok(),
                "Expected OK: {}",
                reference_name
            );
        }
    }

    #[test]
    fn test_invalid_reference_names() {
        let invalid_references = vec![
            "", // Empty
            "double..dot",
            "inavlid^character",
            "invalid~character",
            "invalid:character",
            "invalid\\character",
            "@",
            "inavlid@{sequence",
            "end.",
            "with space",
            "with\tcontrol",
            "with//double",
            "path/./dotslash",
            "-startwithdash",
        ];

        for reference_name in invalid_references.iter() {
            assert!(
                !is_valid_reference_name(reference_name),
                "Expected invalid: {}",
                reference_name
            );
            assert!(
                BranchName::from_str(reference_name).is_err(),
                "Expected Err: {}",
                reference_name
            );
        }
    }
}
