// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use std::path::PathBuf;

use blackbox_cli_commit::CommitMode;
use serde::{Deserialize, Serialize};

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

pub const DEFAULT_CRYPTO: &str = "GnuPG";
pub const DEFAULT_UMASK: u32 = 0o027;
pub const DEFAULT_EDITOR: &str = "vi";

/// The final, validated configuration for blackbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackboxConfig {
	pub backends: BackendsConfig,
	pub repo: RepoConfig,
	pub decrypt: DecryptConfig,
	pub commit: CommitConfig,
	pub editor: EditorConfig,
	pub logging: LoggingConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
	/// Repository backend name; auto-detected when unset.
	pub vcs: Option<String>,
	pub crypto: String,
	pub debug: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoConfig {
	pub config_dir: Option<PathBuf>,
	pub team: Option<String>,
	pub repo_base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptConfig {
	pub umask: u32,
	/// Whether `--group` also grants group read on decrypted files.
	pub group_read: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitConfig {
	pub mode: CommitMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
	pub command: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl Default for BackendsConfig {
	fn default() -> Self {
		Self {
			vcs: None,
			crypto: DEFAULT_CRYPTO.to_string(),
			debug: false,
		}
	}
}

impl Default for DecryptConfig {
	fn default() -> Self {
		Self {
			umask: DEFAULT_UMASK,
			group_read: true,
		}
	}
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			command: DEFAULT_EDITOR.to_string(),
		}
	}
}

impl BlackboxConfig {
	/// Resolve a merged layer into a complete configuration.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let backends = layer.backends.unwrap_or_default();
		let repo = layer.repo.unwrap_or_default();
		let decrypt = layer.decrypt.unwrap_or_default();
		let editor = layer.editor.unwrap_or_default();
		let logging = layer.logging.unwrap_or_default();

		let mode = match layer.commit.and_then(|c| c.mode) {
			Some(mode) => mode
				.parse::<CommitMode>()
				.map_err(|e| ConfigError::invalid_value("commit.mode", e.to_string()))?,
			None => CommitMode::default(),
		};

		Ok(Self {
			backends: BackendsConfig {
				vcs: backends.vcs,
				crypto: backends
					.crypto
					.unwrap_or_else(|| DEFAULT_CRYPTO.to_string()),
				debug: backends.debug.unwrap_or(false),
			},
			repo: RepoConfig {
				config_dir: repo.config_dir,
				team: repo.team,
				repo_base_dir: repo.repo_base_dir,
			},
			decrypt: DecryptConfig {
				umask: decrypt.umask.unwrap_or(DEFAULT_UMASK),
				group_read: decrypt.group_read.unwrap_or(true),
			},
			commit: CommitConfig { mode },
			editor: EditorConfig {
				command: editor
					.command
					.unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
			},
			logging: LoggingConfig {
				level: parse_log_level(logging.level.as_deref())?,
				format: parse_log_format(logging.format.as_deref())?,
			},
			paths,
		})
	}
}

fn parse_log_level(s: Option<&str>) -> Result<LogLevel, ConfigError> {
	match s.map(str::to_lowercase).as_deref() {
		None => Ok(LogLevel::default()),
		Some("error") => Ok(LogLevel::Error),
		Some("warn") => Ok(LogLevel::Warn),
		Some("info") => Ok(LogLevel::Info),
		Some("debug") => Ok(LogLevel::Debug),
		Some("trace") => Ok(LogLevel::Trace),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.level",
			format!("unknown level {other:?}"),
		)),
	}
}

fn parse_log_format(s: Option<&str>) -> Result<LogFormat, ConfigError> {
	match s.map(str::to_lowercase).as_deref() {
		None => Ok(LogFormat::default()),
		Some("pretty") => Ok(LogFormat::Pretty),
		Some("json") => Ok(LogFormat::Json),
		Some("compact") => Ok(LogFormat::Compact),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.format",
			format!("unknown format {other:?}"),
		)),
	}
}
