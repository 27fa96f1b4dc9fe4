//! Metadata-backed descriptors and their collaborator contracts.
//!
//! This module covers the type-system side of the crate: opaque metadata tokens, the
//! narrow read-only contract a binary metadata store must satisfy, and method descriptors
//! that memoize their derived properties behind a lock-free tiered flag cache.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout
//! - [`store`] - The external metadata store contract ([`store::MetadataStore`])
//! - [`method`] - Method descriptors and the memoized attribute cache

/// Metadata tokens (table tag + row index)
pub mod token;

/// The external metadata store collaborator contract
pub mod store;

/// Method descriptors and the tiered, memoized flag cache
pub mod method;
