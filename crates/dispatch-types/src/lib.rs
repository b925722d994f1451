//! Common types module for the dispatch system.
//!
//! This module defines the core data types and structures shared by the
//! dispatch components. It provides a centralized location for domain
//! entities, API types, and storage keys to ensure consistency across
//! all crates.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Courier types describing availability and current assignment.
pub mod courier;
/// Order types including item references and status.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage keys for managing persistent data.
pub mod storage;
/// User identity types returned by the identity collaborator.
pub mod user;

// Re-export all types for convenient access
pub use api::*;
pub use courier::*;
pub use order::*;
pub use registry::*;
pub use storage::*;
pub use user::*;
