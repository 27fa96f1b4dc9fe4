//! # aotlink Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the aotlink library. Import this module to get quick access to the essential types
//! for descriptor queries and native fixup resolution.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all aotlink operations
pub use crate::Error;

/// The result type used throughout aotlink
pub use crate::Result;

// ================================================================================================
// Metadata Descriptors
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// External metadata store contract and its row record
pub use crate::metadata::store::{MetadataStore, MethodDefRow};

/// Method descriptors and the tiered flag cache
pub use crate::metadata::method::{FlagTier, MethodDesc, MethodDescRc, MethodFlags};

// ================================================================================================
// Native Interop Resolution
// ================================================================================================

/// Fixup cells and search policy flags
pub use crate::interop::{MethodFixup, MethodFixupRc, ModuleFixup, ModuleFixupRc, SearchFlags};

/// Loader contract and the platform implementation
pub use crate::interop::{LibraryHandle, NativeLoader, PlatformLoader};

/// Search and resolution entry points
pub use crate::interop::{resolve_method, resolve_module, NamingConvention, SearchPolicy};

/// The process-wide fixup registry
pub use crate::interop::FixupRegistry;

// ================================================================================================
// Shared Primitives
// ================================================================================================

/// Lock-free one-time-initialization primitives
pub use crate::sync::{FixupSlot, FlagSet};
