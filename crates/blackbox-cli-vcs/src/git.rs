// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blackbox_cli_commit::{
	CommitMode, CommitQueue, CommitSink, FlushSummary, PendingCommit, SinkError,
};
use blackbox_common_backend::{BackendOptions, Result, Vcs};
use blackbox_common_makesafe::{redact_many, shell_many};
use blackbox_common_registry::append_lines;
use tracing::{debug, info, warn};

use crate::command::{git_succeeds, run_git};

pub const GIT_NAME: &str = "GIT";
pub const GIT_PRIORITY: i32 = 100;

/// Repository backend driving the `git` CLI.
pub struct GitVcs {
	queue: CommitQueue,
	sink: GitSink,
}

pub(crate) fn new_git(options: &BackendOptions) -> Box<dyn Vcs> {
	Box::new(GitVcs::new(options.commit_mode))
}

impl GitVcs {
	pub fn new(mode: CommitMode) -> Self {
		Self {
			queue: CommitQueue::new(),
			sink: GitSink {
				mode,
				header_printed: false,
			},
		}
	}
}

impl Default for GitVcs {
	fn default() -> Self {
		Self::new(CommitMode::default())
	}
}

#[async_trait]
impl Vcs for GitVcs {
	fn name(&self) -> &str {
		GIT_NAME
	}

	async fn discover(&self, dir: &Path) -> Option<PathBuf> {
		match run_git(dir, &["rev-parse", "--show-toplevel"]).await {
			Ok(out) if out.is_empty() => {
				warn!("git rev-parse --show-toplevel produced no output");
				None
			}
			Ok(out) => Some(PathBuf::from(out)),
			Err(e) => {
				debug!(dir = %dir.display(), error = %e, "not a git repository");
				None
			}
		}
	}

	fn set_file_type_unix(&mut self, repo_root: &Path, files: &[String]) -> Result<()> {
		let mut changed: BTreeSet<String> = BTreeSet::new();

		// Each file gets an entry in the .gitattributes beside it.
		for file in files {
			let rel = Path::new(file);
			let name = rel
				.file_name()
				.map(|n| n.to_string_lossy().into_owned())
				.unwrap_or_else(|| file.clone());
			let attributes = match rel.parent() {
				Some(p) if !p.as_os_str().is_empty() => p.join(".gitattributes"),
				_ => PathBuf::from(".gitattributes"),
			};
			append_lines(
				&repo_root.join(&attributes),
				&[format!("{name:?} text eol=lf")],
			)?;
			changed.insert(attributes.to_string_lossy().into_owned());
		}

		self.needs_commit(
			&format!("set gitattr=UNIX {}", redact_many(files).join(" ")),
			repo_root,
			changed.into_iter().collect(),
		);
		Ok(())
	}

	fn ignore_files(&mut self, repo_root: &Path, files: &[String]) -> Result<()> {
		let lines: Vec<String> = files
			.iter()
			.map(|f| format!("/{}", git_safe_filename(f)))
			.collect();
		append_lines(&repo_root.join(".gitignore"), &lines)?;

		self.needs_commit(
			&format!("gitignore {}", redact_many(files).join(" ")),
			repo_root,
			vec![".gitignore".to_string()],
		);
		Ok(())
	}

	fn ignore_anywhere(&mut self, repo_root: &Path, patterns: &[String]) -> Result<()> {
		append_lines(&repo_root.join(".gitignore"), patterns)?;

		self.needs_commit(
			&format!("gitignore {}", redact_many(patterns).join(" ")),
			repo_root,
			vec![".gitignore".to_string()],
		);
		Ok(())
	}

	fn commit_title(&mut self, title: &str) {
		self.queue.set_title(title);
	}

	fn needs_commit(&mut self, message: &str, repo_root: &Path, files: Vec<String>) {
		self.queue.enqueue(message, repo_root, files);
	}

	fn pending_commits(&self) -> &[PendingCommit] {
		self.queue.pending()
	}

	async fn flush_commits(&mut self) -> Result<FlushSummary> {
		Ok(self.queue.flush(&mut self.sink).await?)
	}

	async fn testing_init_repo(&self, dir: &Path) -> Result<()> {
		run_git(dir, &["init"]).await?;
		info!(dir = %dir.display(), "initialized git repository");
		Ok(())
	}
}

/// Stages files with `git add` and either commits or prints the commit
/// command, depending on the mode.
struct GitSink {
	mode: CommitMode,
	header_printed: bool,
}

#[async_trait]
impl CommitSink for GitSink {
	async fn add(&mut self, dir: &Path, files: &[String]) -> std::result::Result<(), SinkError> {
		if files.is_empty() {
			return Ok(());
		}
		let mut args: Vec<&str> = vec!["add", "--"];
		args.extend(files.iter().map(String::as_str));
		run_git(dir, &args).await?;
		debug!(dir = %dir.display(), files = files.len(), "staged files");
		Ok(())
	}

	async fn commit(
		&mut self,
		message: &str,
		dir: &Path,
		files: &[String],
	) -> std::result::Result<(), SinkError> {
		match self.mode {
			CommitMode::Suggest => {
				if !self.header_printed {
					println!("NEXT STEP: You need to manually check these in:");
					self.header_printed = true;
				}
				println!("{}", suggest_commit(message, files));
				Ok(())
			}
			CommitMode::Auto => {
				let mut quiet: Vec<&str> = vec!["diff", "--cached", "--quiet", "--"];
				quiet.extend(files.iter().map(String::as_str));
				if git_succeeds(dir, &quiet).await? {
					debug!(commit_message = message, "nothing staged; skipping commit");
					return Ok(());
				}

				let mut args: Vec<&str> = vec!["commit", "-m", message, "--"];
				args.extend(files.iter().map(String::as_str));
				run_git(dir, &args).await?;
				info!(commit_message = message, files = files.len(), "created commit");
				Ok(())
			}
		}
	}
}

/// Renders the `git commit` line shown to the user in suggest mode.
///
/// Each line of the message becomes its own single-quoted `-m` argument.
pub fn suggest_commit(message: &str, files: &[String]) -> String {
	let messages: Vec<String> = message
		.lines()
		.map(|l| format!("-m'{}'", l.replace('\'', r#"'"'"'"#)))
		.collect();
	format!(
		"     git commit {} {}",
		messages.join(" "),
		shell_many(files).join(" ")
	)
}

/// Escapes a repository-relative name for use as an anchored `.gitignore`
/// entry.
pub fn git_safe_filename(name: &str) -> String {
	if name.is_empty() {
		return "ERROR".to_string();
	}
	let mut out = String::with_capacity(name.len() + 2);
	if name.starts_with('!') || name.starts_with('#') {
		out.push('\\');
	}
	for c in name.chars() {
		if matches!(c, ' ' | '*' | '?' | '[' | ']') {
			out.push('\\');
		}
		out.push(c);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use std::process::Command as StdCommand;
	use tempfile::TempDir;

	fn init_git_repo(dir: &Path) {
		StdCommand::new("git")
			.args(["init"])
			.current_dir(dir)
			.output()
			.expect("git init failed");

		StdCommand::new("git")
			.args(["config", "user.email", "test@test.com"])
			.current_dir(dir)
			.output()
			.expect("git config failed");

		StdCommand::new("git")
			.args(["config", "user.name", "Test"])
			.current_dir(dir)
			.output()
			.expect("git config failed");
	}

	fn git_log(dir: &Path) -> String {
		let out = StdCommand::new("git")
			.args(["log", "--format=%B"])
			.current_dir(dir)
			.output()
			.unwrap();
		String::from_utf8_lossy(&out.stdout).to_string()
	}

	#[test]
	fn test_git_safe_filename() {
		assert_eq!(git_safe_filename("plain.txt"), "plain.txt");
		assert_eq!(git_safe_filename("has space.txt"), r"has\ space.txt");
		assert_eq!(git_safe_filename("a*b?[c]"), r"a\*b\?\[c\]");
		assert_eq!(git_safe_filename("!bang"), r"\!bang");
		assert_eq!(git_safe_filename("#hash"), r"\#hash");
		assert_eq!(git_safe_filename(""), "ERROR");
	}

	#[test]
	fn test_suggest_commit() {
		let line = suggest_commit(
			"T\n    * A\n    * it's",
			&["a.txt.gpg".to_string(), "has space.gpg".to_string()],
		);
		assert_eq!(
			line,
			r#"     git commit -m'T' -m'    * A' -m'    * it'"'"'s' a.txt.gpg 'has space.gpg'"#
		);
	}

	/// Test: discover reports the top level of a git repository.
	///
	/// Why this test is important: Every registry and ciphertext path is
	/// resolved against this root. Discovering from a subdirectory must still
	/// find the top.
	#[tokio::test]
	async fn test_discover_from_subdirectory() {
		let temp = TempDir::new().unwrap();
		init_git_repo(temp.path());
		let sub = temp.path().join("deep/er");
		fs::create_dir_all(&sub).unwrap();

		let vcs = GitVcs::default();
		let root = vcs.discover(&sub).await.unwrap();
		assert_eq!(
			root.canonicalize().unwrap(),
			temp.path().canonicalize().unwrap()
		);
	}

	#[tokio::test]
	async fn test_discover_outside_repository() {
		let temp = TempDir::new().unwrap();
		let vcs = GitVcs::default();
		assert!(vcs.discover(temp.path()).await.is_none());
	}

	/// Test: ignore_files anchors each name and queues a .gitignore commit.
	///
	/// Why this test is important: Plaintext secrets must never be committed.
	/// An unanchored or unescaped entry could miss the file or ignore others.
	#[test]
	fn test_ignore_files() {
		let temp = TempDir::new().unwrap();
		let mut vcs = GitVcs::default();
		vcs.ignore_files(temp.path(), &["secret.txt".to_string(), "my key".to_string()])
			.unwrap();
		vcs.ignore_files(temp.path(), &["secret.txt".to_string()])
			.unwrap();

		assert_eq!(
			fs::read_to_string(temp.path().join(".gitignore")).unwrap(),
			"/secret.txt\n/my\\ key\n"
		);
		let pending = vcs.pending_commits();
		assert_eq!(pending.len(), 2);
		assert_eq!(pending[0].message, r#"gitignore secret.txt "my key""#);
		assert_eq!(pending[0].files, vec![".gitignore".to_string()]);
	}

	#[test]
	fn test_set_file_type_unix() {
		let temp = TempDir::new().unwrap();
		fs::create_dir(temp.path().join(".blackbox")).unwrap();
		let mut vcs = GitVcs::default();
		vcs.set_file_type_unix(
			temp.path(),
			&[
				".blackbox/blackbox-admins.txt".to_string(),
				".blackbox/blackbox-files.txt".to_string(),
			],
		)
		.unwrap();

		assert_eq!(
			fs::read_to_string(temp.path().join(".blackbox/.gitattributes")).unwrap(),
			"\"blackbox-admins.txt\" text eol=lf\n\"blackbox-files.txt\" text eol=lf\n"
		);
		assert_eq!(
			vcs.pending_commits()[0].files,
			vec![".blackbox/.gitattributes".to_string()]
		);
	}

	/// Test: auto mode commits a merged batch in a single commit.
	///
	/// Why this test is important: This is the end-to-end path for
	/// `--commit=auto`; the history must show the title and each bullet.
	#[tokio::test]
	async fn test_flush_auto_merges_commits() {
		let temp = TempDir::new().unwrap();
		init_git_repo(temp.path());
		fs::write(temp.path().join("a.txt.gpg"), "A").unwrap();

		let mut vcs = GitVcs::new(CommitMode::Auto);
		vcs.ignore_files(temp.path(), &["a.txt".to_string()]).unwrap();
		vcs.needs_commit("add a", temp.path(), vec!["a.txt.gpg".to_string()]);
		vcs.commit_title("TITLE");

		let summary = vcs.flush_commits().await.unwrap();
		assert_eq!(summary.commits, 1);
		assert!(summary.merged);

		let log = git_log(temp.path());
		assert!(log.contains("TITLE\n    * gitignore a.txt\n    * add a"), "log was {log:?}");
		assert!(vcs.pending_commits().is_empty());
	}

	/// Test: auto mode skips commits whose files have no staged changes.
	///
	/// Why this test is important: Re-running `file add` style operations can
	/// queue commits for files that did not change; git would reject an empty
	/// commit and abort the whole flush.
	#[tokio::test]
	async fn test_flush_auto_skips_unchanged() {
		let temp = TempDir::new().unwrap();
		init_git_repo(temp.path());
		fs::write(temp.path().join("x"), "x").unwrap();

		let mut vcs = GitVcs::new(CommitMode::Auto);
		vcs.needs_commit("first", temp.path(), vec!["x".to_string()]);
		vcs.flush_commits().await.unwrap();

		vcs.needs_commit("again", temp.path(), vec!["x".to_string()]);
		vcs.flush_commits().await.unwrap();

		let log = git_log(temp.path());
		assert!(log.contains("first"));
		assert!(!log.contains("again"));
	}

	/// Test: suggest mode stages files without committing.
	///
	/// Why this test is important: The default mode must leave the decision to
	/// commit with the user while still staging exactly the queued files.
	#[tokio::test]
	async fn test_flush_suggest_stages_only() {
		let temp = TempDir::new().unwrap();
		init_git_repo(temp.path());
		fs::write(temp.path().join("a.txt.gpg"), "A").unwrap();

		let mut vcs = GitVcs::new(CommitMode::Suggest);
		vcs.needs_commit("add a", temp.path(), vec!["a.txt.gpg".to_string()]);
		vcs.flush_commits().await.unwrap();

		let status = StdCommand::new("git")
			.args(["status", "--porcelain"])
			.current_dir(temp.path())
			.output()
			.unwrap();
		let output = String::from_utf8_lossy(&status.stdout);
		assert!(output.contains("A  a.txt.gpg"), "status was {output:?}");
		assert!(git_log(temp.path()).is_empty());
	}

	#[tokio::test]
	async fn test_testing_init_repo() {
		let temp = TempDir::new().unwrap();
		let vcs = GitVcs::default();
		vcs.testing_init_repo(temp.path()).await.unwrap();
		assert!(temp.path().join(".git").is_dir());
	}
}
