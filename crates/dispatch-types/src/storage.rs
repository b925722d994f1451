//! Storage-related types for the dispatch system.

/// Storage keys for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for storing order records
	Orders,
	/// Key for storing courier records
	Couriers,
	/// Key for mapping user ids to their courier record id
	CourierByUser,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Couriers => "couriers",
			StorageKey::CourierByUser => "courier_by_user",
		}
	}
}
