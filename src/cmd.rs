//! Builds git invocations and runs them.
//!
//! Every command is scoped to a repository by `--git-dir`/`--work-tree`
//! flags derived from its path and placed before the subcommand, so no
//! invocation depends on the caller's working directory. A builder never
//! executes anything; it assembles the argument vector and carries the
//! parser matching the subcommand's output shape, chosen at construction.

use crate::models::CommitInfo;
use crate::parse::{self, StatusSummary};
use crate::types::{CommitHash, Result};
use crate::GitError;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str;

/// A fully-assembled git invocation together with the decoder for its
/// expected output shape.
#[derive(Debug)]
pub(crate) struct GitCommand<T> {
    workdir: PathBuf,
    args: Vec<OsString>,
    parse: fn(&str) -> Result<T>,
}

impl<T> GitCommand<T> {
    /// Starts an invocation scoped to `repo` with the location flags in
    /// front, the way every subcommand here is issued.
    fn scoped(repo: &Path, parse: fn(&str) -> Result<T>) -> GitCommand<T> {
        let mut git_dir = OsString::from("--git-dir=");
        git_dir.push(repo.join(".git"));
        let mut work_tree = OsString::from("--work-tree=");
        work_tree.push(repo);
        GitCommand {
            workdir: repo.to_path_buf(),
            args: vec![git_dir, work_tree],
            parse,
        }
    }

    fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// The complete argument vector, location flags included.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Spawns `git`, waits for it, and decodes stdout with the parser
    /// attached at construction. Blocking, no timeout, no retry; a
    /// non-zero exit surfaces both captured streams.
    pub(crate) fn run(&self) -> Result<T> {
        let output = Command::new("git")
            .current_dir(&self.workdir)
            .args(&self.args)
            .output()
            .map_err(|_| GitError::Execution)?;

        if output.status.success() {
            match str::from_utf8(&output.stdout) {
                Ok(stdout) => (self.parse)(stdout),
                Err(_) => Err(GitError::Undecodable),
            }
        } else {
            let stdout = str::from_utf8(&output.stdout)
                .map(|s| s.trim_end().to_owned())
                .unwrap_or_else(|_| String::from("[stdout: undecodable UTF-8]"));
            let stderr = str::from_utf8(&output.stderr)
                .map(|s| s.trim_end().to_owned())
                .unwrap_or_else(|_| String::from("[stderr: undecodable UTF-8]"));
            Err(GitError::Command { stdout, stderr })
        }
    }
}

impl GitCommand<String> {
    /// `rev-parse <args...>`, e.g. `--abbrev-ref HEAD` for the checked-out
    /// branch or a revision to resolve it to a hash.
    pub(crate) fn rev_parse<I, S>(repo: &Path, args: I) -> GitCommand<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = GitCommand::scoped(repo, parse::single_token).arg("rev-parse");
        for arg in args {
            cmd = cmd.arg(arg);
        }
        cmd
    }

    /// `remote get-url <name>`.
    pub(crate) fn remote_get_url(repo: &Path, name: &str) -> GitCommand<String> {
        GitCommand::scoped(repo, parse::single_token)
            .arg("remote")
            .arg("get-url")
            .arg(name)
    }
}

impl GitCommand<Vec<String>> {
    /// `rev-list <rev>`: revision hashes reachable from `rev`, newest first.
    pub(crate) fn rev_list(repo: &Path, rev: &str) -> GitCommand<Vec<String>> {
        GitCommand::scoped(repo, parse::lines).arg("rev-list").arg(rev)
    }

    /// `branch --list --format=%(refname:short)`: local branch names.
    pub(crate) fn branch_list(repo: &Path) -> GitCommand<Vec<String>> {
        GitCommand::scoped(repo, parse::lines)
            .arg("branch")
            .arg("--list")
            .arg("--format=%(refname:short)")
    }

    /// `tag --list`: tag names.
    pub(crate) fn tag_list(repo: &Path) -> GitCommand<Vec<String>> {
        GitCommand::scoped(repo, parse::lines).arg("tag").arg("--list")
    }

    /// `remote`: configured remote names.
    pub(crate) fn remote_list(repo: &Path) -> GitCommand<Vec<String>> {
        GitCommand::scoped(repo, parse::lines).arg("remote")
    }
}

impl GitCommand<BTreeMap<String, Vec<String>>> {
    /// `branch -r --format=%(refname:short)`: remote branch short names,
    /// grouped by remote.
    pub(crate) fn remote_branch_list(repo: &Path) -> GitCommand<BTreeMap<String, Vec<String>>> {
        GitCommand::scoped(repo, parse::remote_branches)
            .arg("branch")
            .arg("-r")
            .arg("--format=%(refname:short)")
    }
}

impl GitCommand<StatusSummary> {
    /// `status -sb`: always the short, branch-annotated form the status
    /// parser expects.
    pub(crate) fn status(repo: &Path) -> GitCommand<StatusSummary> {
        GitCommand::scoped(repo, parse::status).arg("status").arg("-sb")
    }
}

impl GitCommand<CommitInfo> {
    /// `log -n 1 --date=iso8601-strict <hash>`: the fixed-position record
    /// carrying a commit's author, date and message.
    pub(crate) fn commit_info(repo: &Path, hash: &CommitHash) -> GitCommand<CommitInfo> {
        GitCommand::scoped(repo, parse::commit_info)
            .arg("log")
            .arg("-n")
            .arg("1")
            .arg("--date=iso8601-strict")
            .arg(hash)
    }
}

impl GitCommand<()> {
    /// A cheap probe for repository metadata: bare `rev-parse` fails with
    /// a non-zero exit when the location flags point at nothing.
    pub(crate) fn probe(repo: &Path) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard).arg("rev-parse")
    }

    /// `init`.
    pub(crate) fn init(repo: &Path) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard).arg("init")
    }

    /// `add <pathspec>`.
    pub(crate) fn add(repo: &Path, pathspec: &Path) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard).arg("add").arg(pathspec)
    }

    /// `commit -m <message>`.
    pub(crate) fn commit(repo: &Path, message: &str) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard)
            .arg("commit")
            .arg("-m")
            .arg(message)
    }

    /// `reset [--hard]`.
    pub(crate) fn reset(repo: &Path, hard: bool) -> GitCommand<()> {
        let cmd = GitCommand::scoped(repo, parse::discard).arg("reset");
        if hard {
            cmd.arg("--hard")
        } else {
            cmd
        }
    }

    /// `checkout <pathspec>`: restore tracked paths from the index.
    pub(crate) fn checkout_path(repo: &Path, pathspec: &str) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard).arg("checkout").arg(pathspec)
    }

    /// `checkout <branch>`: switch to a local branch.
    pub(crate) fn checkout_branch(repo: &Path, name: &str) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard).arg("checkout").arg(name)
    }

    /// `checkout --track <remote>/<branch>`: check out a remote-tracking ref.
    pub(crate) fn checkout_track(repo: &Path, qualified: &str) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard)
            .arg("checkout")
            .arg("--track")
            .arg(qualified)
    }

    /// `push <remote> <branch> [--set-upstream]`; the flag comes last.
    pub(crate) fn push(repo: &Path, remote: &str, branch: &str, set_upstream: bool) -> GitCommand<()> {
        let cmd = GitCommand::scoped(repo, parse::discard)
            .arg("push")
            .arg(remote)
            .arg(branch);
        if set_upstream {
            cmd.arg("--set-upstream")
        } else {
            cmd
        }
    }

    /// `remote add <name> <url>`.
    pub(crate) fn remote_add(repo: &Path, name: &str, url: &str) -> GitCommand<()> {
        GitCommand::scoped(repo, parse::discard)
            .arg("remote")
            .arg("add")
            .arg(name)
            .arg(url)
    }

    /// `branch <name> [<start-point>]`.
    pub(crate) fn branch_create(repo: &Path, name: &str, start: Option<&str>) -> GitCommand<()> {
        let cmd = GitCommand::scoped(repo, parse::discard).arg("branch").arg(name);
        match start {
            Some(start) => cmd.arg(start),
            None => cmd,
        }
    }

    /// `tag <name> [<revision>]`.
    pub(crate) fn tag_create(repo: &Path, name: &str, rev: Option<&str>) -> GitCommand<()> {
        let cmd = GitCommand::scoped(repo, parse::discard).arg("tag").arg(name);
        match rev {
            Some(rev) => cmd.arg(rev),
            None => cmd,
        }
    }
}

// --- Tests ---
