//! Main entry point for the dispatch service.
//!
//! This binary wires the configured storage, identity, and catalog
//! implementations into the order lifecycle manager and serves the
//! lifecycle operations over HTTP.

use clap::Parser;
use dispatch_catalog::CatalogService;
use dispatch_config::Config;
use dispatch_core::LifecycleManager;
use dispatch_identity::IdentityService;
use dispatch_storage::StorageService;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the dispatch service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the dispatch service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the lifecycle manager with the configured implementations
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started dispatch service");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("config path is not valid UTF-8")?;
	let config = Config::from_file_async(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let manager = Arc::new(build_manager(&config)?);

	let api_enabled = config.api.as_ref().is_some_and(|api| api.enabled);
	if api_enabled {
		let api_config = config.api.clone().ok_or("api config missing")?;
		server::start_server(api_config, manager).await?;
	} else {
		tracing::warn!("API server disabled in configuration; nothing to serve");
	}

	tracing::info!("Stopped dispatch service");
	Ok(())
}

/// Builds the lifecycle manager from the configured implementations.
fn build_manager(config: &Config) -> Result<LifecycleManager, Box<dyn std::error::Error>> {
	let storage_factory = primary_factory(
		"storage",
		&config.storage.primary,
		dispatch_storage::get_all_implementations(),
	)?;
	let storage_config =
		implementation_config(&config.storage.implementations, &config.storage.primary);
	let storage = Arc::new(StorageService::new(storage_factory(&storage_config)?));

	let identity_factory = primary_factory(
		"identity",
		&config.identity.primary,
		dispatch_identity::get_all_implementations(),
	)?;
	let identity_config =
		implementation_config(&config.identity.implementations, &config.identity.primary);
	let identity = Arc::new(IdentityService::new(identity_factory(&identity_config)?));

	let catalog_factory = primary_factory(
		"catalog",
		&config.catalog.primary,
		dispatch_catalog::get_all_implementations(),
	)?;
	let catalog_config =
		implementation_config(&config.catalog.implementations, &config.catalog.primary);
	let catalog = Arc::new(CatalogService::new(catalog_factory(&catalog_config)?));

	Ok(LifecycleManager::new(storage, identity, catalog))
}

/// Selects the factory registered under the configured primary name.
fn primary_factory<F>(
	section: &str,
	primary: &str,
	implementations: Vec<(&'static str, F)>,
) -> Result<F, Box<dyn std::error::Error>> {
	implementations
		.into_iter()
		.find(|(name, _)| *name == primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| format!("Unknown {} implementation: {}", section, primary).into())
}

/// Returns the configuration table for an implementation, or an empty table
/// for implementations that need none.
fn implementation_config(
	implementations: &HashMap<String, toml::Value>,
	name: &str,
) -> toml::Value {
	implementations
		.get(name)
		.cloned()
		.unwrap_or_else(|| toml::Value::Table(toml::Table::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_manager_from_memory_config() {
		let config: Config = r#"
			[service]
			id = "test"

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
		"#
		.parse()
		.unwrap();

		assert!(build_manager(&config).is_ok());
	}

	#[test]
	fn unknown_primary_fails() {
		let implementations: Vec<(&'static str, u8)> = vec![("memory", 0)];
		let result = primary_factory("storage", "redis", implementations);
		assert!(result.is_err());
	}
}
