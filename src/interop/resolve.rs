//! The symbol resolution protocol driving module and method fixup cells.
//!
//! A call site referencing an external native function invokes [`resolve_method`] on its
//! method cell. The protocol is idempotent and safe under concurrent invocation from any
//! number of threads, for the same or different cells, using only the cells' atomic fields:
//!
//! 1. a resolved target short-circuits with a single atomic read;
//! 2. an unresolved owning module is loaded through the search protocol, and the resulting
//!    handle installed with compare-exchange. The race loser frees the handle it loaded
//!    redundantly, so exactly one live library reference remains per module cell;
//! 3. the exported symbol is looked up and plainly stored, since every racing resolver
//!    computes the same address for the same symbol from the same handle.
//!
//! On failure the cell stays unresolved and every later call retries from scratch; no
//! negative result is cached, so repeated failing calls repeat the full cost.

use std::num::NonZeroUsize;

use crate::{
    interop::{
        cell::MethodFixup,
        loader::{LibraryHandle, NativeLoader},
        search::{resolve_module, SearchPolicy},
    },
    Error, Result,
};

/// Resolves a method fixup cell to a native function pointer.
///
/// Fast path: one atomic read of the cell's target. Slow path: module load (if needed),
/// compare-exchange handle install, symbol lookup, idempotent target store. The returned
/// pointer is identical across repeated calls on a resolved cell.
///
/// # Errors
/// - [`Error::ModuleNotFound`] when the owning module cannot be loaded by any candidate.
/// - [`Error::EntryPointNotFound`] when the module loaded but does not export the symbol;
///   carries both the symbol and module names.
///
/// Both are fatal to this call and cache nothing.
pub fn resolve_method(
    loader: &dyn NativeLoader,
    policy: &SearchPolicy,
    cell: &MethodFixup,
) -> Result<NonZeroUsize> {
    if let Some(target) = cell.target.get() {
        return Ok(target);
    }

    let handle = resolve_cell_module(loader, policy, cell)?;

    match loader.symbol(handle, &cell.name) {
        Some(target) => {
            // Racing writers store the same address for the same symbol; plain overwrite
            cell.target.store(target);
            Ok(target)
        }
        None => Err(Error::EntryPointNotFound {
            symbol: cell.name.clone(),
            module: cell.module.name.clone(),
        }),
    }
}

/// Returns the module cell's library handle, resolving and installing it if absent.
fn resolve_cell_module(
    loader: &dyn NativeLoader,
    policy: &SearchPolicy,
    cell: &MethodFixup,
) -> Result<LibraryHandle> {
    let module = &cell.module;
    if let Some(handle) = module.handle.get() {
        return Ok(handle);
    }

    let loaded = resolve_module(loader, policy, &module.name, module.attributes)?;
    match module.handle.install(loaded) {
        Ok(installed) => Ok(installed),
        Err(existing) => {
            // Lost the install race; exactly one live reference may remain per cell
            loader.free(loaded);
            Ok(existing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::cell::{MethodFixup, ModuleFixup, SearchFlags};
    use crate::test::MockLoader;
    use std::sync::Arc;

    fn test_policy() -> SearchPolicy {
        SearchPolicy::new("/opt/app", None)
    }

    #[test]
    fn resolves_target_and_module_handle() {
        let loader = MockLoader::new();
        loader.provide("native_lib", 0x1);
        loader.export(0x1, "DoWork", 0x2000);

        let module = Arc::new(ModuleFixup::new("native_lib", SearchFlags::empty()));
        let cell = MethodFixup::new("DoWork", Arc::clone(&module));

        let target = resolve_method(&loader, &test_policy(), &cell).unwrap();
        assert_eq!(target.get(), 0x2000);
        assert_eq!(module.handle.get().map(NonZeroUsize::get), Some(0x1));
        assert_eq!(cell.target.get(), Some(target));
    }

    #[test]
    fn second_call_skips_the_loader() {
        let loader = MockLoader::new();
        loader.provide("native_lib", 0x1);
        loader.export(0x1, "DoWork", 0x2000);

        let module = Arc::new(ModuleFixup::new("native_lib", SearchFlags::empty()));
        let cell = MethodFixup::new("DoWork", Arc::clone(&module));
        let policy = test_policy();

        let first = resolve_method(&loader, &policy, &cell).unwrap();
        let loads_after_first = loader.load_calls();
        let second = resolve_method(&loader, &policy, &cell).unwrap();

        assert_eq!(first, second);
        assert_eq!(loader.load_calls(), loads_after_first);
    }

    #[test]
    fn missing_symbol_reports_both_names_and_caches_nothing() {
        let loader = MockLoader::new();
        loader.provide("native_lib", 0x1);

        let module = Arc::new(ModuleFixup::new("native_lib", SearchFlags::empty()));
        let cell = MethodFixup::new("Missing", Arc::clone(&module));
        let policy = test_policy();

        let err = resolve_method(&loader, &policy, &cell).unwrap_err();
        assert_eq!(
            err,
            Error::EntryPointNotFound {
                symbol: "Missing".to_string(),
                module: "native_lib".to_string(),
            }
        );
        // The module handle stays installed, the target stays unresolved
        assert!(module.handle.get().is_some());
        assert!(cell.target.get().is_none());

        // A later export makes a retry succeed; nothing negative was cached
        loader.export(0x1, "Missing", 0x3000);
        let target = resolve_method(&loader, &policy, &cell).unwrap();
        assert_eq!(target.get(), 0x3000);
    }

    #[test]
    fn missing_module_is_fatal_with_name() {
        let loader = MockLoader::new();
        let module = Arc::new(ModuleFixup::new("missing", SearchFlags::empty()));
        let cell = MethodFixup::new("DoWork", module);

        let err = resolve_method(&loader, &test_policy(), &cell).unwrap_err();
        assert_eq!(err, Error::ModuleNotFound("missing".to_string()));
    }

    #[test]
    fn shared_module_cell_is_loaded_once_for_two_methods() {
        let loader = MockLoader::new();
        loader.provide("native_lib", 0x1);
        loader.export(0x1, "First", 0x2000);
        loader.export(0x1, "Second", 0x2004);

        let module = Arc::new(ModuleFixup::new("native_lib", SearchFlags::empty()));
        let first = MethodFixup::new("First", Arc::clone(&module));
        let second = MethodFixup::new("Second", Arc::clone(&module));
        let policy = test_policy();

        resolve_method(&loader, &policy, &first).unwrap();
        resolve_method(&loader, &policy, &second).unwrap();
        assert_eq!(loader.net_live_handles(), 1);
    }
}
