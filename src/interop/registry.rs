//! The process-wide registry of native fixup cells.
//!
//! In the compiled binary, fixup cells live in the read/write data section and are located
//! by mangled symbol names the compiler assigns at emission time. At runtime this registry
//! plays that role explicitly: cells are registered at program load under the same mangled
//! keys, handed out as shared references, and mutated at most from unresolved to one steady
//! value for the rest of the process. There is no teardown; the process owns the registry
//! for its entire life.
//!
//! Mangled keys implement the emission naming contract: a module cell's key is derived from
//! the module name *and* its search-attribute bitmask (two imports of the same library under
//! different search policies are distinct cells), a method cell's key from the owning module
//! cell's full identity and the symbol name, so per-policy distinctness carries through to
//! the method cells.

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::interop::cell::{MethodFixup, MethodFixupRc, ModuleFixup, ModuleFixupRc, SearchFlags};

use std::sync::Arc;

/// Mangled data-section symbol for a module fixup cell.
#[must_use]
pub fn module_fixup_symbol(name: &str, attributes: SearchFlags) -> String {
    format!("__nativemodule_{:08x}_{}", attributes.bits(), name)
}

/// Mangled data-section symbol for a method fixup cell.
///
/// Carries the owning module cell's full identity (attribute bitmask included), so the
/// same symbol imported through two differently-policied module cells mangles to two
/// distinct method cells.
#[must_use]
pub fn method_fixup_symbol(module: &str, attributes: SearchFlags, symbol: &str) -> String {
    format!(
        "__nativemethod_{:08x}_{}__{}",
        attributes.bits(),
        module,
        symbol
    )
}

/// All native fixup cells of the running program.
///
/// Supports concurrent get-or-insert registration and lookup; both maps are append-only in
/// practice since cells are registered during program load and never removed.
pub struct FixupRegistry {
    // Primary storage - mangled symbol to cell mapping
    modules: SkipMap<String, ModuleFixupRc>,
    methods: SkipMap<String, MethodFixupRc>,

    // Index for grouping method cells by their owning module name
    methods_by_module: DashMap<String, Vec<String>>,
}

impl FixupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        FixupRegistry {
            modules: SkipMap::new(),
            methods: SkipMap::new(),
            methods_by_module: DashMap::new(),
        }
    }

    /// Returns the module cell for `name` under `attributes`, registering it if absent.
    ///
    /// The same name with a different attribute bitmask yields a different cell, matching
    /// the emitter's per-policy mangling.
    pub fn module(&self, name: &str, attributes: SearchFlags) -> ModuleFixupRc {
        let key = module_fixup_symbol(name, attributes);
        self.modules
            .get_or_insert_with(key, || Arc::new(ModuleFixup::new(name, attributes)))
            .value()
            .clone()
    }

    /// Returns the method cell for `symbol` in `module`, registering it if absent.
    ///
    /// The cell is keyed by the owning module cell's full identity; the same symbol
    /// registered against module cells with different attribute bitmasks yields distinct
    /// method cells, each bound to its own module.
    pub fn method(&self, module: &ModuleFixupRc, symbol: &str) -> MethodFixupRc {
        let key = method_fixup_symbol(&module.name, module.attributes, symbol);
        let entry = self.methods.get_or_insert_with(key.clone(), || {
            Arc::new(MethodFixup::new(symbol, Arc::clone(module)))
        });
        let mut keys = self.methods_by_module.entry(module.name.clone()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
        drop(keys);
        entry.value().clone()
    }

    /// Looks up a registered method cell by its mangled symbol.
    #[must_use]
    pub fn method_by_symbol(&self, mangled: &str) -> Option<MethodFixupRc> {
        self.methods.get(mangled).map(|entry| entry.value().clone())
    }

    /// All method cells imported from the module called `name`, in registration order.
    #[must_use]
    pub fn methods_for_module(&self, name: &str) -> Vec<MethodFixupRc> {
        let Some(keys) = self.methods_by_module.get(name) else {
            return Vec::new();
        };
        keys.iter()
            .filter_map(|key| self.method_by_symbol(key))
            .collect()
    }

    /// Number of registered module cells.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Number of registered method cells.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl Default for FixupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
