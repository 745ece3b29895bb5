// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommitError;

/// How queued commits are carried out when flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
	/// Stage the files and print the commit commands for the user to run.
	#[default]
	Suggest,
	/// Stage and commit directly.
	Auto,
}

impl fmt::Display for CommitMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CommitMode::Suggest => write!(f, "suggest"),
			CommitMode::Auto => write!(f, "auto"),
		}
	}
}

impl FromStr for CommitMode {
	type Err = CommitError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"suggest" => Ok(CommitMode::Suggest),
			"auto" => Ok(CommitMode::Auto),
			_ => Err(CommitError::UnknownMode(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_mode() {
		assert_eq!("suggest".parse::<CommitMode>().unwrap(), CommitMode::Suggest);
		assert_eq!("AUTO".parse::<CommitMode>().unwrap(), CommitMode::Auto);
		assert!("sometimes".parse::<CommitMode>().is_err());
		assert_eq!(CommitMode::default(), CommitMode::Suggest);
	}
}
