// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG path resolution for the configuration files.

use std::path::PathBuf;

use crate::ConfigError;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/blackbox/config.toml";

/// Resolved locations of the blackbox configuration files.
#[derive(Debug, Clone)]
pub struct PathsConfig {
	/// User config file: ~/.config/blackbox/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/blackbox/config.toml
	pub system_config_file: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/blackbox/config.toml"),
			system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
		}
	}
}

/// Resolve the config paths, honoring XDG_CONFIG_HOME and falling back to
/// ~/.config.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) if !dir.is_empty() => PathBuf::from(dir),
		_ => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	tracing::debug!(config_home = %config_home.display(), "resolved XDG paths");

	Ok(PathsConfig {
		user_config_file: config_home.join("blackbox/config.toml"),
		system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
	})
}
