// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;

use blackbox_common_backend::BackendError;
use tokio::process::Command;
use tracing::{trace, warn};

/// Runs a git command in `dir` and returns the trimmed stdout on success.
pub(crate) async fn run_git(dir: &Path, args: &[&str]) -> Result<String, BackendError> {
	let mut cmd = Command::new("git");
	cmd.arg("-C").arg(dir).args(args);

	trace!(
		cmd = %format!("git -C {} {}", dir.display(), args.join(" ")),
		"running git command"
	);

	let output = cmd.output().await.map_err(|e| {
		if e.kind() == std::io::ErrorKind::NotFound {
			warn!("git not found in PATH");
			BackendError::ToolNotInstalled("git".to_string())
		} else {
			BackendError::Io(e)
		}
	})?;

	if output.status.success() {
		Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
	} else {
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		Err(BackendError::CommandFailed {
			cmd: "git".to_string(),
			args: args.iter().map(|s| s.to_string()).collect(),
			stderr,
		})
	}
}

/// Runs a git command in `dir` and reports only whether it exited zero.
pub(crate) async fn git_succeeds(dir: &Path, args: &[&str]) -> Result<bool, BackendError> {
	let status = Command::new("git")
		.arg("-C")
		.arg(dir)
		.args(args)
		.stdout(std::process::Stdio::null())
		.stderr(std::process::Stdio::null())
		.status()
		.await
		.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				BackendError::ToolNotInstalled("git".to_string())
			} else {
				BackendError::Io(e)
			}
		})?;
	Ok(status.success())
}
