//! The two persistent fixup cell types behind native import resolution.
//!
//! A fixup cell is a pre-allocated mutable record that starts "unresolved" and is filled in
//! by the runtime on first use. The compiler emits one [`ModuleFixup`] per statically-known
//! imported native module and one [`MethodFixup`] per imported native function; both live
//! for the rest of the process once created and are mutated at most once in the happy path.
//!
//! The cells are pure data. What makes the resolution protocol race-safe is their shape:
//! the handle and target fields are [`FixupSlot`]s, which transition monotonically from
//! absent to one steady value and expose compare-exchange as a primitive, and the method
//! cell carries a back-reference to its owning module cell.
//!
//! # Emitted ABI
//!
//! When laid out into the compiled binary's data section (emission is an external
//! component), a module cell is `{ pointer-sized zero-initialized handle, pointer-sized
//! relocation to the UTF-8 module name, 4-byte attribute bitmask }`, in that field order.
//! The runtime locates cells by the mangled symbol names described in
//! [`registry`](crate::interop::registry).

use std::sync::Arc;

use bitflags::bitflags;

use crate::sync::FixupSlot;

bitflags! {
    /// Compile-time-recorded search policy for a native module, 4 bytes in the emitted cell.
    ///
    /// The directory bits mirror `System.Runtime.InteropServices.DllImportSearchPath`.
    /// [`SearchFlags::SEARCH_PATH_SPECIFIED`] records whether the import declaration named
    /// an explicit policy at all; without it, the directory bits are meaningless and the
    /// assembly directory is searched by default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SearchFlags: u32 {
        /// An explicit `DllImportSearchPath` policy was recorded at compile time
        const SEARCH_PATH_SPECIFIED = 0x0001;
        /// Search the directory of the compiled managed binary
        const ASSEMBLY_DIRECTORY = 0x0002;
        /// Dependencies of the loaded library resolve from its own directory
        const USE_DLL_DIRECTORY_FOR_DEPENDENCIES = 0x0100;
        /// Search the application directory
        const APPLICATION_DIRECTORY = 0x0200;
        /// Search directories added by the user
        const USER_DIRECTORIES = 0x0400;
        /// Search the system directory
        const SYSTEM32 = 0x0800;
        /// Search only safe, fully-qualified locations
        const SAFE_DIRECTORIES = 0x1000;
    }
}

impl SearchFlags {
    /// Whether library resolution should try the compiled binary's directory.
    ///
    /// True by default; an explicit search-path policy replaces the default with its own
    /// assembly-directory bit.
    #[must_use]
    pub fn search_assembly_directory(self) -> bool {
        if self.contains(SearchFlags::SEARCH_PATH_SPECIFIED) {
            self.contains(SearchFlags::ASSEMBLY_DIRECTORY)
        } else {
            true
        }
    }
}

/// A reference to a `ModuleFixup`
pub type ModuleFixupRc = Arc<ModuleFixup>;

/// The persistent cell representing one imported native module.
///
/// `handle` holds the loaded-library handle once some thread wins the resolution race; it
/// is the only field resolution ever mutates. `name` and `attributes` are fixed at compile
/// time.
#[derive(Debug)]
pub struct ModuleFixup {
    /// Loaded-library handle; unresolved until first use
    pub handle: FixupSlot,
    /// UTF-8 module name exactly as written in the import declaration
    pub name: String,
    /// Platform/search policy recorded at compile time
    pub attributes: SearchFlags,
}

impl ModuleFixup {
    /// Creates an unresolved module cell.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: SearchFlags) -> Self {
        ModuleFixup {
            handle: FixupSlot::new(),
            name: name.into(),
            attributes,
        }
    }
}

/// A reference to a `MethodFixup`
pub type MethodFixupRc = Arc<MethodFixup>;

/// The persistent cell representing one imported native function.
///
/// `target` holds the resolved function pointer; `module` is a shared back-reference to
/// the cell of the library that exports the symbol.
#[derive(Debug)]
pub struct MethodFixup {
    /// Resolved native function pointer; unresolved until first use
    pub target: FixupSlot,
    /// UTF-8 exported symbol name
    pub name: String,
    /// The module cell that owns the export
    pub module: ModuleFixupRc,
}

impl MethodFixup {
    /// Creates an unresolved method cell bound to its module cell.
    #[must_use]
    pub fn new(name: impl Into<String>, module: ModuleFixupRc) -> Self {
        MethodFixup {
            target: FixupSlot::new(),
            name: name.into(),
            module,
        }
    }
}
