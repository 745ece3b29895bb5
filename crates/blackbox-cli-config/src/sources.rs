// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::*;
use crate::paths::{PathsConfig, SYSTEM_CONFIG_FILE};
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	ExplicitFile = 40,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied in BlackboxConfig::from_layer
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	/// System config: /etc/blackbox/config.toml
	pub fn system() -> Self {
		Self {
			path: PathBuf::from(SYSTEM_CONFIG_FILE),
			precedence: Precedence::SystemFile,
			name: "system-config",
		}
	}

	/// User config: ~/.config/blackbox/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
		}
	}

	/// Custom file path with specified precedence
	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Reads the `BLACKBOX_*` variables. The older spellings `BLACKBOXDATA`,
/// `DECRYPT_UMASK` and `EDITOR` are honored when the `BLACKBOX_*` name is
/// unset.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_vars(std::env::vars())
	}
}

/// Build a layer from an explicit set of variables.
pub fn layer_from_vars<I>(vars: I) -> Result<ConfigLayer, ConfigError>
where
	I: IntoIterator<Item = (String, String)>,
{
	let vars: HashMap<String, String> = vars
		.into_iter()
		.filter(|(_, value)| !value.is_empty())
		.collect();
	let get = |names: &[&str]| -> Option<(String, String)> {
		names
			.iter()
			.find_map(|name| vars.get(*name).map(|v| (name.to_string(), v.clone())))
	};

	let mut layer = ConfigLayer::default();

	if let Some((_, vcs)) = get(&["BLACKBOX_VCS"]) {
		layer
			.backends
			.get_or_insert_with(BackendsLayer::default)
			.vcs = Some(vcs);
	}
	if let Some((_, crypto)) = get(&["BLACKBOX_CRYPTO"]) {
		layer
			.backends
			.get_or_insert_with(BackendsLayer::default)
			.crypto = Some(crypto);
	}
	if let Some((name, value)) = get(&["BLACKBOX_DEBUG"]) {
		layer
			.backends
			.get_or_insert_with(BackendsLayer::default)
			.debug = Some(parse_bool(&name, &value)?);
	}

	if let Some((_, dir)) = get(&["BLACKBOX_CONFIGDIR", "BLACKBOXDATA"]) {
		layer
			.repo
			.get_or_insert_with(RepoLayer::default)
			.config_dir = Some(PathBuf::from(dir));
	}
	if let Some((_, team)) = get(&["BLACKBOX_TEAM"]) {
		layer.repo.get_or_insert_with(RepoLayer::default).team = Some(team);
	}
	if let Some((_, base)) = get(&["BLACKBOX_REPOBASEDIR"]) {
		layer
			.repo
			.get_or_insert_with(RepoLayer::default)
			.repo_base_dir = Some(PathBuf::from(base));
	}

	if let Some((name, value)) = get(&["BLACKBOX_UMASK", "DECRYPT_UMASK"]) {
		let umask = parse_octal_umask(&value).map_err(|msg| ConfigError::invalid_value(name, msg))?;
		layer
			.decrypt
			.get_or_insert_with(DecryptLayer::default)
			.umask = Some(umask);
	}
	if let Some((name, value)) = get(&["BLACKBOX_GROUP_READ"]) {
		layer
			.decrypt
			.get_or_insert_with(DecryptLayer::default)
			.group_read = Some(parse_bool(&name, &value)?);
	}

	if let Some((_, mode)) = get(&["BLACKBOX_COMMIT"]) {
		layer.commit.get_or_insert_with(CommitLayer::default).mode = Some(mode);
	}

	if let Some((_, editor)) = get(&["BLACKBOX_EDITOR", "EDITOR"]) {
		layer.editor.get_or_insert_with(EditorLayer::default).command = Some(editor);
	}

	if let Some((_, level)) = get(&["BLACKBOX_LOG_LEVEL"]) {
		layer
			.logging
			.get_or_insert_with(LoggingLayer::default)
			.level = Some(level);
	}
	if let Some((_, format)) = get(&["BLACKBOX_LOG_FORMAT"]) {
		layer
			.logging
			.get_or_insert_with(LoggingLayer::default)
			.format = Some(format);
	}

	Ok(layer)
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::invalid_value(
			name,
			format!("{value:?} is not a boolean"),
		)),
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub vcs: Option<String>,
	pub crypto: Option<String>,
	pub debug: bool,
	pub config_dir: Option<PathBuf>,
	pub team: Option<String>,
	pub editor: Option<String>,
	pub umask: Option<u32>,
	pub commit_mode: Option<String>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let o = &self.overrides;
		let mut layer = ConfigLayer::default();

		if o.vcs.is_some() || o.crypto.is_some() || o.debug {
			let backends = layer.backends.get_or_insert_with(BackendsLayer::default);
			backends.vcs = o.vcs.clone();
			backends.crypto = o.crypto.clone();
			if o.debug {
				backends.debug = Some(true);
			}
		}

		if o.config_dir.is_some() || o.team.is_some() {
			let repo = layer.repo.get_or_insert_with(RepoLayer::default);
			repo.config_dir = o.config_dir.clone();
			repo.team = o.team.clone();
		}

		if let Some(umask) = o.umask {
			layer
				.decrypt
				.get_or_insert_with(DecryptLayer::default)
				.umask = Some(umask);
		}

		if let Some(ref mode) = o.commit_mode {
			layer.commit.get_or_insert_with(CommitLayer::default).mode = Some(mode.clone());
		}

		if let Some(ref editor) = o.editor {
			layer.editor.get_or_insert_with(EditorLayer::default).command = Some(editor.clone());
		}

		if let Some(ref level) = o.log_level {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.level = Some(level.clone());
		}

		if let Some(ref format) = o.log_format {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.format = Some(format.clone());
		}

		Ok(layer)
	}
}
