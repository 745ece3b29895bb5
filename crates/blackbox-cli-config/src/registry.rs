// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration registry - manages sources and merges layers.

use tracing::{debug, info};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::BlackboxConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

/// Registry that manages configuration sources and merges them.
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	/// Register a configuration source.
	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load configuration from all sources, merge, and validate.
	///
	/// Sources are merged lowest precedence first. A source that fails to
	/// load fails the whole load; missing files are not failures.
	pub fn load(&self, paths: PathsConfig) -> Result<BlackboxConfig, ConfigError> {
		let mut sorted_sources: Vec<_> = self.sources.iter().collect();
		sorted_sources.sort_by_key(|s| s.precedence());

		debug!(
			source_count = sorted_sources.len(),
			"loading configuration from sources"
		);

		let mut merged = ConfigLayer::default();
		for source in &sorted_sources {
			let layer = source.load()?;
			debug!(source = source.name(), "merging config layer");
			merged.merge(layer);
		}

		let config = BlackboxConfig::from_layer(merged, paths)?;
		validate_config(&config)?;

		info!(
			crypto = %config.backends.crypto,
			vcs = ?config.backends.vcs,
			commit_mode = %config.commit.mode,
			"configuration loaded"
		);

		Ok(config)
	}

	/// Get the number of registered sources.
	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layer::BackendsLayer;
	use crate::sources::{DefaultsSource, Precedence};

	struct MockSource {
		name: &'static str,
		precedence: Precedence,
		crypto: Option<String>,
		fail: bool,
	}

	impl ConfigSource for MockSource {
		fn name(&self) -> &'static str {
			self.name
		}
		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> Result<ConfigLayer, ConfigError> {
			if self.fail {
				return Err(ConfigError::invalid_value("mock", "broken"));
			}
			Ok(ConfigLayer {
				backends: Some(BackendsLayer {
					crypto: self.crypto.clone(),
					..Default::default()
				}),
				..Default::default()
			})
		}
	}

	#[test]
	fn test_registry_registers_sources() {
		let mut registry = ConfigRegistry::new();
		assert_eq!(registry.source_count(), 0);

		registry.register(Box::new(DefaultsSource));
		assert_eq!(registry.source_count(), 1);
	}

	/// Test: sources merge in precedence order regardless of registration order.
	///
	/// Why this test is important: The CLI flag must beat the environment
	/// even though main registers sources in whatever order is convenient.
	#[test]
	fn test_precedence_merge_order() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(MockSource {
			name: "cli",
			precedence: Precedence::Cli,
			crypto: Some("from-cli".into()),
			fail: false,
		}));
		registry.register(Box::new(MockSource {
			name: "user",
			precedence: Precedence::UserFile,
			crypto: Some("from-user".into()),
			fail: false,
		}));
		registry.register(Box::new(DefaultsSource));

		let config = registry.load(PathsConfig::default()).unwrap();
		assert_eq!(config.backends.crypto, "from-cli");
	}

	#[test]
	fn test_unset_values_fall_through() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(MockSource {
			name: "system",
			precedence: Precedence::SystemFile,
			crypto: Some("from-system".into()),
			fail: false,
		}));
		registry.register(Box::new(MockSource {
			name: "env",
			precedence: Precedence::Environment,
			crypto: None,
			fail: false,
		}));

		let config = registry.load(PathsConfig::default()).unwrap();
		assert_eq!(config.backends.crypto, "from-system");
	}

	#[test]
	fn test_failing_source_fails_load() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(MockSource {
			name: "broken",
			precedence: Precedence::Environment,
			crypto: None,
			fail: true,
		}));
		assert!(registry.load(PathsConfig::default()).is_err());
	}
}
