// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::Serialize;
use tracing::debug;

/// A file a bulk verb passed over, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
	pub name: String,
	pub reason: String,
}

impl fmt::Display for Skip {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Skipping {:?}: {}", self.name, self.reason)
	}
}

/// What a bulk verb did with each name it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
	pub processed: Vec<String>,
	pub skipped: Vec<Skip>,
}

impl Outcome {
	pub fn done(&mut self, name: impl Into<String>) {
		self.processed.push(name.into());
	}

	/// Records a skip and reports it on stderr as one line.
	pub fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
		let skip = Skip {
			name: name.into(),
			reason: reason.to_string(),
		};
		debug!(file = %skip.name, reason = %skip.reason, "skipping");
		eprintln!("{skip}");
		self.skipped.push(skip);
	}

	pub fn skipped_names(&self) -> Vec<&str> {
		self.skipped.iter().map(|s| s.name.as_str()).collect()
	}

	pub fn is_clean(&self) -> bool {
		self.skipped.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io;
	use std::sync::{Arc, Mutex};

	#[test]
	fn test_outcome_records() {
		let mut outcome = Outcome::default();
		outcome.done("a");
		outcome.skip("b", "not registered");
		assert_eq!(outcome.processed, vec!["a"]);
		assert_eq!(outcome.skipped_names(), vec!["b"]);
		assert!(!outcome.is_clean());
		assert_eq!(outcome.skipped[0].to_string(), r#"Skipping "b": not registered"#);
	}

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	/// Test: a skip produces no log output at the default `warn` level.
	///
	/// Why this test is important: The `Skipping "<name>": <reason>` line is
	/// already on stderr; a second copy from the logger doubles every skip.
	#[test]
	fn test_skip_is_not_logged_at_warn() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::WARN)
			.with_ansi(false)
			.with_writer(move || writer.clone())
			.finish();

		let mut outcome = Outcome::default();
		tracing::subscriber::with_default(subscriber, || {
			outcome.skip("a.txt", "plaintext is missing");
		});

		assert_eq!(outcome.skipped.len(), 1);
		assert!(captured.0.lock().unwrap().is_empty());
	}
}
