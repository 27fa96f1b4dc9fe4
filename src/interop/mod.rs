//! Native interop resolution: fixup cells, library search, and symbol resolution.
//!
//! This module turns a call site referencing an external native function into a working
//! function pointer at runtime. The pieces, leaf-first:
//!
//! - [`cell`] - the two persistent fixup cell types (module and method) and the
//!   compile-time search-policy bitmask
//! - [`loader`] - the per-platform native loader contract and its [`libloading`]-backed
//!   implementation
//! - [`search`] - the ordered, platform-specific candidate search that loads a module
//! - [`resolve`] - the idempotent symbol resolution protocol that drives both cell kinds
//! - [`registry`] - the process-wide map of cells keyed by their mangled emission symbols
//!
//! # Examples
//!
//! ```rust,no_run
//! use aotlink::interop::{
//!     resolve_method, FixupRegistry, PlatformLoader, SearchFlags, SearchPolicy,
//! };
//!
//! let registry = FixupRegistry::new();
//! let loader = PlatformLoader::new();
//! let policy = SearchPolicy::for_host();
//!
//! let module = registry.module("sqlite3", SearchFlags::empty());
//! let cell = registry.method(&module, "sqlite3_libversion");
//! let target = resolve_method(&loader, &policy, &cell)?;
//! println!("resolved to {:#x}", target);
//! # Ok::<(), aotlink::Error>(())
//! ```

/// Fixup cell records and search-policy flags
pub mod cell;
/// Native loader contract and platform implementation
pub mod loader;
/// Process-wide fixup cell registry
pub mod registry;
/// Symbol resolution protocol
pub mod resolve;
/// Library search protocol and candidate generation
pub mod search;

pub use cell::{MethodFixup, MethodFixupRc, ModuleFixup, ModuleFixupRc, SearchFlags};
pub use loader::{LibraryHandle, NativeLoader, PlatformLoader};
pub use registry::{method_fixup_symbol, module_fixup_symbol, FixupRegistry};
pub use resolve::resolve_method;
pub use search::{host_convention, resolve_module, NamingConvention, SearchPolicy};
