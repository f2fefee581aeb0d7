//! Converts git's porcelain text output into structured values.
//!
//! One function per output shape. Parsing is strictly textual and
//! order-dependent on git's fixed formats: robustness comes from whitespace
//! normalization and single-pass classification, never from recovery
//! heuristics. A line that should match and doesn't is a fatal
//! [`GitError::Parse`] for that call.

use crate::error::GitError;
use crate::models::CommitInfo;
use crate::types::Result;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// The last <...> group on the Author: line is the email; everything before
// it is the name. Matched last-wins because names may contain '<'.
static AUTHOR_EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("<([^<>]*)>").expect("Invalid static author email regex"));

/// The raw partitions of a `git status -sb` run, before the entries are
/// bound to a repository. Every partition is present even when empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct StatusSummary {
    pub(crate) untracked: Vec<String>,
    pub(crate) modified: Vec<String>,
    pub(crate) renamed: Vec<String>,
    pub(crate) added: Vec<String>,
    pub(crate) deleted: Vec<String>,
    pub(crate) copied: Vec<String>,
    pub(crate) type_changed: Vec<String>,
    pub(crate) unmerged: Vec<String>,
}

/// Parses short, branch-annotated status output (`status -sb`).
///
/// The leading `## branch` summary line is discarded; every remaining line
/// is trimmed and classified into exactly one partition by its leading
/// code. Codes are tested in a fixed priority order (`??` before the
/// single-letter codes) and the first match wins. The code and the
/// following separator are stripped; only the path fragment is stored.
///
/// Rename lines keep the opaque `old -> new` form git prints; see
/// [`crate::models::StatusReport::renamed`].
pub(crate) fn status(output: &str) -> Result<StatusSummary> {
    let mut summary = StatusSummary::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("##") {
            continue;
        }

        let partition = if line.starts_with("??") {
            &mut summary.untracked
        } else if line.starts_with('M') {
            &mut summary.modified
        } else if line.starts_with('R') {
            &mut summary.renamed
        } else if line.starts_with('A') {
            &mut summary.added
        } else if line.starts_with('D') {
            &mut summary.deleted
        } else if line.starts_with('C') {
            &mut summary.copied
        } else if line.starts_with('T') {
            &mut summary.type_changed
        } else if line.starts_with('U') {
            &mut summary.unmerged
        } else {
            // Codes outside the recognized set (e.g. ignored entries) are
            // not part of the report.
            continue;
        };

        let (_, value) = line.split_once(' ').ok_or_else(|| GitError::Parse {
            command: "status",
            reason: format!("status line without a path: {line:?}"),
        })?;
        partition.push(value.trim_start().to_owned());
    }

    Ok(summary)
}

/// Trims single-line output (a hash or ref name) down to the bare token.
pub(crate) fn single_token(output: &str) -> Result<String> {
    let token = output.trim();
    if token.is_empty() {
        return Err(GitError::Parse {
            command: "rev-parse",
            reason: "expected a single token, got empty output".to_owned(),
        });
    }
    Ok(token.to_owned())
}

/// Splits list-shaped output (`rev-list`, ref listings) into trimmed,
/// non-empty lines, preserving order.
pub(crate) fn lines(output: &str) -> Result<Vec<String>> {
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Parses `log -n 1 --date=iso8601-strict <hash>` output.
///
/// The record is fixed-position: line 0 is the commit header (discarded),
/// line 1 is `Author: Name <email>`, line 2 is `Date: <ISO8601>`, line 3
/// is blank, and the rest is the message body with each line left-trimmed.
/// Anything else is a fatal parse failure; there is no partial result.
pub(crate) fn commit_info(output: &str) -> Result<CommitInfo> {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() < 4 {
        return Err(log_error(format!(
            "expected header, author, date and separator lines, got {} line(s)",
            lines.len()
        )));
    }
    if !lines[0].starts_with("commit") {
        return Err(log_error(format!("missing commit header: {:?}", lines[0])));
    }

    let author_line = lines[1]
        .strip_prefix("Author:")
        .ok_or_else(|| log_error(format!("missing author line: {:?}", lines[1])))?;
    let (email, email_start) = match AUTHOR_EMAIL_REGEX.captures_iter(author_line).last() {
        Some(caps) => match (caps.get(1), caps.get(0)) {
            (Some(email), Some(full)) => (email.as_str().to_owned(), full.start()),
            _ => return Err(log_error(format!("author line missing <email>: {:?}", lines[1]))),
        },
        None => return Err(log_error(format!("author line missing <email>: {:?}", lines[1]))),
    };
    let author = author_line[..email_start].trim().to_owned();

    let date_line = lines[2]
        .strip_prefix("Date:")
        .ok_or_else(|| log_error(format!("missing date line: {:?}", lines[2])))?;
    let date = DateTime::parse_from_rfc3339(date_line.trim())
        .map_err(|e| log_error(format!("bad iso8601 date {:?}: {e}", date_line.trim())))?;

    if !lines[3].trim().is_empty() {
        return Err(log_error(format!(
            "expected a blank separator before the message, got {:?}",
            lines[3]
        )));
    }

    let message = lines[4..]
        .iter()
        .map(|line| line.trim_start())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(CommitInfo {
        author,
        email,
        date,
        message,
    })
}

/// Groups `branch -r` short names by remote: `origin/master` contributes
/// `master` under `origin`. Symbolic `HEAD -> ...` entries are skipped.
pub(crate) fn remote_branches(output: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains(" -> ") {
            continue;
        }
        if let Some((remote, name)) = line.split_once('/') {
            groups.entry(remote.to_owned()).or_default().push(name.to_owned());
        }
    }
    Ok(groups)
}

/// Parser for commands whose output carries no information on success.
pub(crate) fn discard(_: &str) -> Result<()> {
    Ok(())
}

fn log_error(reason: String) -> GitError {
    GitError::Parse {
        command: "log",
        reason,
    }
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const STATUS_OUTPUT: &str = "\
## master...origin/master
 M src/lib.rs
A  src/new.rs
?? notes.txt
R  old.rs -> new.rs
 D gone.rs
C  base.rs -> copy.rs
 T weird.rs
UU clash.rs
";

    #[test]
    fn test_status_partitions_every_line_exactly_once() {
        let summary = status(STATUS_OUTPUT).unwrap();
        let total = summary.untracked.len()
            + summary.modified.len()
            + summary.renamed.len()
            + summary.added.len()
            + summary.deleted.len()
            + summary.copied.len()
            + summary.type_changed.len()
            + summary.unmerged.len();
        // Eight non-header, non-blank lines in the sample.
        assert_eq!(total, 8);
        assert_eq!(summary.untracked, vec!["notes.txt"]);
        assert_eq!(summary.modified, vec!["src/lib.rs"]);
        assert_eq!(summary.added, vec!["src/new.rs"]);
        assert_eq!(summary.deleted, vec!["gone.rs"]);
        assert_eq!(summary.type_changed, vec!["weird.rs"]);
        assert_eq!(summary.unmerged, vec!["clash.rs"]);
    }

    #[test]
    fn test_status_strips_code_and_separator() {
        let summary = status("## master\n M  spaced.rs\n").unwrap();
        assert_eq!(summary.modified, vec!["spaced.rs"]);
    }

    #[test]
    fn test_status_rename_value_keeps_arrow_form() {
        let summary = status(STATUS_OUTPUT).unwrap();
        assert_eq!(summary.renamed, vec!["old.rs -> new.rs"]);
        assert_eq!(summary.copied, vec!["base.rs -> copy.rs"]);
    }

    #[test]
    fn test_status_empty_partitions_are_present_not_absent() {
        let summary = status("## master...origin/master\n").unwrap();
        assert_eq!(summary, StatusSummary::default());
        assert!(summary.renamed.is_empty());
    }

    #[test]
    fn test_status_untracked_wins_over_single_letter_codes() {
        // "??" must be tested before the one-letter codes.
        let summary = status("## master\n?? Makefile\n").unwrap();
        assert_eq!(summary.untracked, vec!["Makefile"]);
        assert!(summary.modified.is_empty());
    }

    #[test]
    fn test_status_ignores_unrecognized_codes() {
        let summary = status("## master\n!! target/\n").unwrap();
        assert_eq!(summary, StatusSummary::default());
    }

    #[test]
    fn test_single_token_trims_surrounding_whitespace() {
        assert_eq!(single_token("  master\n").unwrap(), "master");
        assert_eq!(single_token("deadbeef\n").unwrap(), "deadbeef");
    }

    #[test]
    fn test_single_token_rejects_empty_output() {
        assert!(matches!(
            single_token("  \n"),
            Err(GitError::Parse { command: "rev-parse", .. })
        ));
    }

    #[test]
    fn test_lines_preserves_order_and_drops_blanks() {
        let parsed = lines("aaa\n\n bbb \nccc\n").unwrap();
        assert_eq!(parsed, vec!["aaa", "bbb", "ccc"]);
    }

    const LOG_OUTPUT: &str = "\
commit a94a8fe5ccb19ba61c4c0873d391e987982fbbd3
Author: Grace Hopper <grace@example.com>
Date:   2026-08-30T18:20:05+02:00

    fix: keep the separator out of stored paths

    second paragraph
";

    #[test]
    fn test_commit_info_fixed_position_record() {
        let info = commit_info(LOG_OUTPUT).unwrap();
        assert_eq!(info.author, "Grace Hopper");
        assert_eq!(info.email, "grace@example.com");
        assert_eq!(info.date.offset(), &FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(
            info.message,
            "fix: keep the separator out of stored paths\n\nsecond paragraph"
        );
    }

    #[test]
    fn test_commit_info_takes_last_angle_group_as_email() {
        let output = "\
commit a94a8fe5ccb19ba61c4c0873d391e987982fbbd3
Author: Odd <Name> Person <odd@example.com>
Date:   2026-08-30T18:20:05+00:00

    msg
";
        let info = commit_info(output).unwrap();
        assert_eq!(info.email, "odd@example.com");
        assert_eq!(info.author, "Odd <Name> Person");
    }

    #[test]
    fn test_commit_info_missing_author_is_fatal() {
        let output = "commit abc123\nMerge: aaa bbb\nDate: 2026-01-01T00:00:00+00:00\n\n    m\n";
        assert!(matches!(
            commit_info(output),
            Err(GitError::Parse { command: "log", .. })
        ));
    }

    #[test]
    fn test_commit_info_bad_date_is_fatal() {
        let output = "\
commit abc123
Author: A <a@b.c>
Date:   last tuesday

    m
";
        assert!(matches!(
            commit_info(output),
            Err(GitError::Parse { command: "log", .. })
        ));
    }

    #[test]
    fn test_commit_info_truncated_record_is_fatal() {
        assert!(commit_info("commit abc123\n").is_err());
    }

    #[test]
    fn test_remote_branches_groups_by_remote() {
        let output = "\
  origin/HEAD -> origin/master
  origin/master
  origin/feature/parser
  backup/master
";
        let groups = remote_branches(output).unwrap();
        assert_eq!(groups["origin"], vec!["master", "feature/parser"]);
        assert_eq!(groups["backup"], vec!["master"]);
        assert_eq!(groups.len(), 2);
    }
}
