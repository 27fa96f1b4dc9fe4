// Copyright 2026 The aotlink authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
// Unsafe is confined to 'interop/loader.rs': libloading calls and raw handle round-trips

//! # aotlink
//!
//! Lazy, thread-safe metadata-backed descriptors and native interop fixup resolution for
//! AOT-compiled managed binaries. Built in pure Rust, `aotlink` provides the two runtime
//! subsystems an ahead-of-time toolchain for ECMA-335-style metadata keeps reimplementing:
//! memoized method-property caches and the lazy binding of native import call sites.
//!
//! ## Features
//!
//! - **🗂 Tiered flag memoization** - Expensive derived method properties cached per cost
//!   tier behind a single atomic bitset, safe under concurrent first access
//! - **🔗 Native fixup resolution** - Module and method fixup cells resolved lazily with
//!   the documented multi-step, platform-specific library search
//! - **⚡ Lock-free by construction** - Atomic read/write and compare-exchange on single
//!   fields only, never a mutex around a critical section
//! - **🔧 Cross-platform** - Platform naming conventions are pluggable candidate
//!   strategies selected once at startup
//! - **🧩 Narrow collaborator seams** - The metadata reader and the OS loader sit behind
//!   traits, so both halves test against scripted mocks
//!
//! ## Quick Start
//!
//! Add `aotlink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! aotlink = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use aotlink::prelude::*;
//!
//! // Resolve a native import the way a compiled call site would
//! let registry = FixupRegistry::new();
//! let loader = PlatformLoader::new();
//! let policy = SearchPolicy::for_host();
//!
//! let module = registry.module("sqlite3", SearchFlags::empty());
//! let cell = registry.method(&module, "sqlite3_libversion");
//! let target = resolve_method(&loader, &policy, &cell)?;
//! println!("sqlite3_libversion at {:#x}", target);
//! # Ok::<(), aotlink::Error>(())
//! ```
//!
//! ### Descriptor Queries
//!
//! ```rust
//! use aotlink::prelude::*;
//! # struct Store;
//! # impl MetadataStore for Store {
//! #     fn method_def_row(&self, _: Token) -> MethodDefRow {
//! #         MethodDefRow { impl_flags: 0, flags: 0x0040 }
//! #     }
//! #     fn custom_attributes(&self, _: Token) -> Vec<Token> { Vec::new() }
//! #     fn attribute_type_name(&self, _: Token) -> Option<(String, String)> { None }
//! # }
//! # let store = Store;
//!
//! let method = MethodDesc::new(Token::method_def(1));
//! // First query computes the basic tier; later queries are a single atomic load
//! assert!(method.is_virtual(&store));
//! ```
//!
//! ## Architecture
//!
//! `aotlink` is organized into three modules plus a shared primitive layer:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Tokens, the metadata-store contract, and memoizing method descriptors
//! - [`interop`] - Fixup cells, library search, symbol resolution, and the cell registry
//! - [`sync`] - The two lock-free one-time-initialization primitives both halves share
//!
//! ## Concurrency
//!
//! Multiple compiler or runtime worker threads operate over the same descriptors and fixup
//! cells with no global lock. Correctness rests on two properties, both enforced by the
//! [`sync`] primitives: state transitions are monotonic (a computed tier or resolved cell
//! never reverts), and redundant work is idempotent (racing threads compute identical
//! values, and the one non-idempotent resource, a loaded library handle, is installed by
//! compare-exchange with the loser releasing its copy).
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Only native resolution
//! fails; descriptor flag queries over valid metadata always succeed:
//!
//! ```rust
//! use aotlink::Error;
//!
//! # let err = Error::ModuleNotFound("m".into());
//! match err {
//!     Error::ModuleNotFound(name) => println!("no module {}", name),
//!     Error::EntryPointNotFound { symbol, module } => {
//!         println!("no {} in {}", symbol, module);
//!     }
//! }
//! ```

pub(crate) mod error;

/// Lock-free one-time-initialization primitives shared by both halves of the crate
pub mod sync;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types from across
/// the aotlink library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use aotlink::prelude::*;
///
/// let registry = FixupRegistry::new();
/// let module = registry.module("native_lib", SearchFlags::empty());
/// assert!(module.handle.get().is_none());
/// ```
pub mod prelude;

/// Metadata tokens, the store contract, and memoizing method descriptors
///
/// This module implements the type-system side: opaque ECMA-335-style tokens, the narrow
/// read-only contract of the external metadata reader, and [`metadata::method::MethodDesc`]
/// with its tiered, lock-free flag cache.
///
/// # Key Components
///
/// - [`metadata::token::Token`] - Metadata table row references
/// - [`metadata::store::MetadataStore`] - The collaborator contract for table access
/// - [`metadata::method::MethodDesc`] - Descriptors with memoized derived properties
pub mod metadata;

/// Native interop: fixup cells, library search, and symbol resolution
///
/// This module implements the runtime side of native imports: the persistent
/// [`interop::ModuleFixup`]/[`interop::MethodFixup`] cells, the ordered platform-specific
/// library search, the idempotent resolution protocol, and the process-wide
/// [`interop::FixupRegistry`].
///
/// # Key Components
///
/// - [`interop::resolve_method`] - Call-site entry point, cell to function pointer
/// - [`interop::resolve_module`] - The multi-step library search
/// - [`interop::SearchPolicy`] - Per-platform candidate generation, chosen once
/// - [`interop::NativeLoader`] - The OS loader seam, mockable in tests
pub mod interop;

pub use sync::{FixupSlot, FlagSet};

/// `aotlink` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `aotlink` Error type
///
/// The main error type for all operations in this crate. The variant docs on [`Error`]
/// describe the exact conditions.
pub use error::Error;
