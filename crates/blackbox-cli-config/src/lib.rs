// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for blackbox.
//!
//! Settings are layered from built-in defaults, `/etc/blackbox/config.toml`,
//! the user's XDG config file, an optional explicit file, `BLACKBOX_*`
//! environment variables and command-line flags, in rising precedence.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

pub use error::ConfigError;
pub use layer::{parse_octal_umask, ConfigLayer};
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{BlackboxConfig, LogFormat, LogLevel};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with CLI overrides on top.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<BlackboxConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system()));
	registry.register(Box::new(sources::FileSource::user(&paths)));
	if let Some(ref file) = cli.config_file {
		registry.register(Box::new(sources::FileSource::custom(
			file.clone(),
			Precedence::ExplicitFile,
			"explicit-config",
		)));
	}
	registry.register(Box::new(sources::EnvSource));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}
