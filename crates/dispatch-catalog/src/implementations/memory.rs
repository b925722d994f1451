//! In-memory catalog implementation seeded from configuration.

use crate::{CatalogError, CatalogFactory, CatalogInterface, CatalogRegistry};
use async_trait::async_trait;
use dispatch_types::{ImplementationRegistry, ItemKind};
use serde::Deserialize;
use std::collections::HashSet;

/// In-memory catalog holding fixed sets of product and combo ids.
pub struct MemoryCatalog {
	products: HashSet<String>,
	combos: HashSet<String>,
}

impl MemoryCatalog {
	/// Creates a catalog from lists of product and combo ids.
	pub fn with_items(products: Vec<String>, combos: Vec<String>) -> Self {
		Self {
			products: products.into_iter().collect(),
			combos: combos.into_iter().collect(),
		}
	}
}

#[async_trait]
impl CatalogInterface for MemoryCatalog {
	async fn item_exists(&self, kind: ItemKind, id: &str) -> Result<bool, CatalogError> {
		let exists = match kind {
			ItemKind::Product => self.products.contains(id),
			ItemKind::Combo => self.combos.contains(id),
		};
		Ok(exists)
	}
}

/// Configuration for the memory catalog implementation.
#[derive(Debug, Deserialize)]
struct MemoryCatalogConfig {
	/// Seed product ids.
	#[serde(default)]
	products: Vec<String>,
	/// Seed combo ids.
	#[serde(default)]
	combos: Vec<String>,
}

/// Registry for the memory catalog implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = CatalogFactory;

	fn factory() -> Self::Factory {
		create_catalog
	}
}

impl CatalogRegistry for Registry {}

/// Factory function to create a memory catalog from configuration.
///
/// Configuration parameters:
/// - `products`: array of product ids to seed
/// - `combos`: array of combo ids to seed
pub fn create_catalog(config: &toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError> {
	let config: MemoryCatalogConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| CatalogError::Configuration(e.message().to_string()))?;

	Ok(Box::new(MemoryCatalog::with_items(
		config.products,
		config.combos,
	)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_existence_check() {
		let catalog =
			MemoryCatalog::with_items(vec!["5".to_string()], vec!["12".to_string()]);

		assert!(catalog.item_exists(ItemKind::Product, "5").await.unwrap());
		assert!(catalog.item_exists(ItemKind::Combo, "12").await.unwrap());
		// Kinds are separate namespaces.
		assert!(!catalog.item_exists(ItemKind::Combo, "5").await.unwrap());
		assert!(!catalog.item_exists(ItemKind::Product, "9").await.unwrap());
	}

	#[tokio::test]
	async fn test_factory_from_toml() {
		let config: toml::Value = toml::from_str(
			r#"
			products = ["5", "6"]
			combos = ["12"]
			"#,
		)
		.unwrap();

		let catalog = create_catalog(&config).unwrap();
		assert!(catalog.item_exists(ItemKind::Product, "6").await.unwrap());
	}
}
