// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use blackbox_common_makesafe::{first_few, redact_many};

/// Commit message for a verb applied to `files`.
pub fn pretty_commit_message<S: AsRef<str>>(verb: &str, files: &[S]) -> String {
	if files.is_empty() {
		return format!("{verb} (no files)");
	}
	format!("{verb}: {}", first_few(&redact_many(files)))
}
