//! Configuration module for the dispatch system.
//!
//! This module provides structures and utilities for managing dispatch
//! configuration. It supports loading configuration from TOML files with
//! `${ENV_VAR}` interpolation and validates that every configured primary
//! implementation actually has a configuration table.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the dispatch service.
///
/// This structure contains all configuration sections required for the
/// service to operate: service identity, storage backend, identity and
/// catalog collaborators, and the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the identity collaborator.
	pub identity: IdentityConfig,
	/// Configuration for the catalog collaborator.
	pub catalog: CatalogConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the identity collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of identity implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the catalog collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of catalog implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server should be started.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to listen on.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

/// Resolves `${ENV_VAR}` references in raw configuration text.
///
/// Fails if a referenced variable is not set, so a misconfigured deployment
/// stops at startup instead of running with an empty value.
pub fn resolve_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.map_err(|e| ConfigError::Parse(e.to_string()))?;

	let mut resolved = String::with_capacity(content.len());
	let mut last_end = 0;
	for caps in re.captures_iter(content) {
		let Some(whole) = caps.get(0) else { continue };
		let name = &caps[1];
		let value = std::env::var(name).map_err(|_| {
			ConfigError::Validation(format!("Environment variable not set: {}", name))
		})?;
		resolved.push_str(&content[last_end..whole.start()]);
		resolved.push_str(&value);
		last_end = whole.end();
	}
	resolved.push_str(&content[last_end..]);
	Ok(resolved)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Loads configuration from a TOML file without blocking the runtime.
	pub async fn from_file_async(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates cross-field consistency of the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		for (section, primary, implementations) in [
			("storage", &self.storage.primary, &self.storage.implementations),
			(
				"identity",
				&self.identity.primary,
				&self.identity.implementations,
			),
			(
				"catalog",
				&self.catalog.primary,
				&self.catalog.implementations,
			),
		] {
			if !implementations.contains_key(primary) {
				return Err(ConfigError::Validation(format!(
					"{}.primary '{}' has no matching implementations entry",
					section, primary
				)));
			}
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXAMPLE: &str = r#"
		[service]
		id = "dispatch-1"

		[storage]
		primary = "memory"

		[storage.implementations.memory]

		[identity]
		primary = "memory"

		[identity.implementations.memory]
		users = [{ id = "1", role = "client" }]

		[catalog]
		primary = "memory"

		[catalog.implementations.memory]
		products = ["5"]

		[api]
		host = "0.0.0.0"
		port = 9000
	"#;

	#[test]
	fn parses_full_config() {
		let config: Config = EXAMPLE.parse().unwrap();
		assert_eq!(config.service.id, "dispatch-1");
		assert_eq!(config.storage.primary, "memory");
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.port, 9000);
	}

	#[test]
	fn missing_primary_implementation_fails() {
		let broken = EXAMPLE.replace("primary = \"memory\"", "primary = \"redis\"");
		let result: Result<Config, _> = broken.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn loads_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, EXAMPLE).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(config.service.id, "dispatch-1");
	}

	#[test]
	fn resolves_env_vars() {
		std::env::set_var("DISPATCH_TEST_ID", "from-env");
		let content = EXAMPLE.replace("dispatch-1", "${DISPATCH_TEST_ID}");
		let config: Config = content.parse().unwrap();
		assert_eq!(config.service.id, "from-env");
	}

	#[test]
	fn unset_env_var_fails() {
		let content = EXAMPLE.replace("dispatch-1", "${DISPATCH_TEST_UNSET_VAR}");
		let result: Result<Config, _> = content.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
