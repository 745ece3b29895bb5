// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use tracing::warn;

use crate::runtime::BlackboxConfig;
use crate::ConfigError;

/// Validate the configuration.
///
/// Returns Ok(()) if valid, or ConfigError::InvalidValue with details.
pub fn validate_config(config: &BlackboxConfig) -> Result<(), ConfigError> {
	validate_backends(config)?;
	validate_decrypt(config)?;
	validate_repo(config)?;

	if config.editor.command.trim().is_empty() {
		return Err(ConfigError::invalid_value(
			"editor.command",
			"editor cannot be empty",
		));
	}

	Ok(())
}

fn validate_backends(config: &BlackboxConfig) -> Result<(), ConfigError> {
	if config.backends.crypto.trim().is_empty() {
		return Err(ConfigError::invalid_value(
			"backends.crypto",
			"crypto backend name cannot be empty",
		));
	}
	if matches!(config.backends.vcs.as_deref(), Some(v) if v.trim().is_empty()) {
		return Err(ConfigError::invalid_value(
			"backends.vcs",
			"vcs backend name cannot be empty",
		));
	}
	Ok(())
}

fn validate_decrypt(config: &BlackboxConfig) -> Result<(), ConfigError> {
	if config.decrypt.umask > 0o777 {
		return Err(ConfigError::invalid_value(
			"decrypt.umask",
			format!("{:#o} is outside 0..=0o777", config.decrypt.umask),
		));
	}
	if config.decrypt.umask & 0o007 != 0o007 {
		warn!(
			umask = %format!("{:04o}", config.decrypt.umask),
			"umask leaves decrypted files readable by others"
		);
	}
	Ok(())
}

fn validate_repo(config: &BlackboxConfig) -> Result<(), ConfigError> {
	if let Some(ref team) = config.repo.team {
		if team.is_empty() || team.contains('/') {
			return Err(ConfigError::invalid_value(
				"repo.team",
				format!("{team:?} cannot be used in a directory name"),
			));
		}
	}
	Ok(())
}
