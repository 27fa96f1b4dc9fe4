use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Both variants correspond to a fatal condition at the triggering call site. Neither is
/// retried internally and neither result is cached: a later, independent resolution attempt
/// for the same cell starts from scratch and is free to fail with the same error again.
///
/// # Error Categories
///
/// ## Native Resolution Errors
/// - [`Error::ModuleNotFound`] - No candidate in the library search sequence loaded
/// - [`Error::EntryPointNotFound`] - Library loaded, but the exported symbol is absent
///
/// # Examples
///
/// ```rust
/// use aotlink::{Error, interop::{MethodFixup, ModuleFixup, SearchFlags}};
/// use aotlink::interop::{resolve_method, NativeLoader, SearchPolicy};
/// # use std::num::NonZeroUsize;
/// # struct Nothing;
/// # impl NativeLoader for Nothing {
/// #     fn load(&self, _: &str) -> Option<NonZeroUsize> { None }
/// #     fn free(&self, _: NonZeroUsize) {}
/// #     fn symbol(&self, _: NonZeroUsize, _: &str) -> Option<NonZeroUsize> { None }
/// # }
/// # let module = std::sync::Arc::new(ModuleFixup::new("missing", SearchFlags::empty()));
/// # let cell = MethodFixup::new("DoWork", module);
/// # let policy = SearchPolicy::new("/opt/app", None);
/// match resolve_method(&Nothing, &policy, &cell) {
///     Err(Error::ModuleNotFound(name)) => eprintln!("no such module: {}", name),
///     Err(Error::EntryPointNotFound { symbol, module }) => {
///         eprintln!("no symbol {} in {}", symbol, module);
///     }
///     Ok(target) => println!("resolved to {:#x}", target),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No candidate in the library search sequence could be loaded.
    ///
    /// Every candidate produced for the requested module name (verbatim, assembly-directory
    /// relative, and platform-decorated forms) was tried in order and all of them failed.
    /// The attached name is the module name exactly as recorded in the fixup cell, not any
    /// of the decorated candidates.
    #[error("Unable to load native module '{0}'")]
    ModuleNotFound(String),

    /// The owning module loaded, but the exported symbol is absent.
    ///
    /// Identifies both the symbol that was requested and the module it was expected in,
    /// since the same symbol name may be imported from several modules.
    #[error("Unable to find entry point '{symbol}' in native module '{module}'")]
    EntryPointNotFound {
        /// The exported symbol name that could not be found
        symbol: String,
        /// The name of the module the lookup was performed in
        module: String,
    },
}
