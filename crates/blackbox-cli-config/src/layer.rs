// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub backends: Option<BackendsLayer>,
	#[serde(default)]
	pub repo: Option<RepoLayer>,
	#[serde(default)]
	pub decrypt: Option<DecryptLayer>,
	#[serde(default)]
	pub commit: Option<CommitLayer>,
	#[serde(default)]
	pub editor: Option<EditorLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendsLayer {
	#[serde(default)]
	pub vcs: Option<String>,
	#[serde(default)]
	pub crypto: Option<String>,
	#[serde(default)]
	pub debug: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoLayer {
	#[serde(default)]
	pub config_dir: Option<PathBuf>,
	#[serde(default)]
	pub team: Option<String>,
	#[serde(default)]
	pub repo_base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecryptLayer {
	/// Accepts either a TOML integer (`0o027`) or an octal string (`"0027"`).
	#[serde(default, deserialize_with = "deserialize_umask")]
	pub umask: Option<u32>,
	#[serde(default)]
	pub group_read: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitLayer {
	#[serde(default)]
	pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorLayer {
	#[serde(default)]
	pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

/// Parse an octal umask such as `027`, `0027` or `0o027`.
pub fn parse_octal_umask(s: &str) -> Result<u32, String> {
	let trimmed = s.trim();
	let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
	u32::from_str_radix(digits, 8).map_err(|e| format!("{trimmed:?} is not an octal mode: {e}"))
}

fn deserialize_umask<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawUmask {
		Int(u32),
		Text(String),
	}

	match Option::<RawUmask>::deserialize(deserializer)? {
		None => Ok(None),
		Some(RawUmask::Int(v)) => Ok(Some(v)),
		Some(RawUmask::Text(s)) => parse_octal_umask(&s)
			.map(Some)
			.map_err(serde::de::Error::custom),
	}
}

impl ConfigLayer {
	/// Merge another layer into this one. Values present in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.backends, other.backends, BackendsLayer::merge);
		merge_option(&mut self.repo, other.repo, RepoLayer::merge);
		merge_option(&mut self.decrypt, other.decrypt, DecryptLayer::merge);
		merge_option(&mut self.commit, other.commit, |t, s| {
			if s.mode.is_some() {
				t.mode = s.mode;
			}
		});
		merge_option(&mut self.editor, other.editor, |t, s| {
			if s.command.is_some() {
				t.command = s.command;
			}
		});
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

impl BackendsLayer {
	fn merge(&mut self, other: BackendsLayer) {
		if other.vcs.is_some() {
			self.vcs = other.vcs;
		}
		if other.crypto.is_some() {
			self.crypto = other.crypto;
		}
		if other.debug.is_some() {
			self.debug = other.debug;
		}
	}
}

impl RepoLayer {
	fn merge(&mut self, other: RepoLayer) {
		if other.config_dir.is_some() {
			self.config_dir = other.config_dir;
		}
		if other.team.is_some() {
			self.team = other.team;
		}
		if other.repo_base_dir.is_some() {
			self.repo_base_dir = other.repo_base_dir;
		}
	}
}

impl DecryptLayer {
	fn merge(&mut self, other: DecryptLayer) {
		if other.umask.is_some() {
			self.umask = other.umask;
		}
		if other.group_read.is_some() {
			self.group_read = other.group_read;
		}
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}
