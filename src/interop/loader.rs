//! The per-platform native loader contract and its libloading-backed implementation.
//!
//! Resolution code never calls the platform loader directly; it goes through the
//! [`NativeLoader`] trait so that tests can substitute a mock that counts load/free pairs
//! and scripts symbol lookups. The production implementation, [`PlatformLoader`], wraps
//! [`libloading`] and hands out pointer-sized handles.
//!
//! Handles are reference-counted by the OS loader underneath: loading the same library
//! twice yields two independently releasable handles for one mapped image. The resolution
//! protocol relies on that to let a race loser free its redundant handle without unmapping
//! the winner's.

use std::num::NonZeroUsize;

use libloading::Library;

/// A loaded native library handle. Pointer-sized, never zero.
pub type LibraryHandle = NonZeroUsize;

/// Platform loader operations consumed by the resolution protocols.
///
/// All three operations may be invoked redundantly by racing threads; implementations only
/// need the platform guarantees the protocols document: loading twice produces equivalent
/// handles, and resolving the same symbol from the same live handle yields the same
/// pointer.
pub trait NativeLoader: Send + Sync {
    /// Attempts to load the library identified by `name` (a bare name or a path).
    ///
    /// Returns `None` when the platform loader cannot find or map the candidate; callers
    /// treat this as "try the next candidate", not as an error.
    fn load(&self, name: &str) -> Option<LibraryHandle>;

    /// Releases one reference to a loaded library.
    fn free(&self, handle: LibraryHandle);

    /// Looks up an exported symbol, returning its address.
    fn symbol(&self, handle: LibraryHandle, name: &str) -> Option<NonZeroUsize>;
}

/// The production [`NativeLoader`] backed by [`libloading`].
///
/// A handle is a leaked `Box<Library>` pointer, so every successful [`load`](NativeLoader::load)
/// owns one OS-level library reference and [`free`](NativeLoader::free) releases exactly
/// that reference. Handles must only be freed through the loader that produced them.
#[derive(Debug, Default)]
pub struct PlatformLoader;

impl PlatformLoader {
    /// Creates the platform loader.
    #[must_use]
    pub fn new() -> Self {
        PlatformLoader
    }
}

impl NativeLoader for PlatformLoader {
    fn load(&self, name: &str) -> Option<LibraryHandle> {
        // SAFETY: library initializers run here; that is inherent to loading native code
        // and is the documented contract of this crate's interop layer.
        let library = unsafe { Library::new(name) }.ok()?;
        NonZeroUsize::new(Box::into_raw(Box::new(library)) as usize)
    }

    fn free(&self, handle: LibraryHandle) {
        // SAFETY: handles are only ever produced by `load` above, each one a unique
        // Box::into_raw pointer that is freed at most once by the protocol.
        drop(unsafe { Box::from_raw(handle.get() as *mut Library) });
    }

    fn symbol(&self, handle: LibraryHandle, name: &str) -> Option<NonZeroUsize> {
        let library = unsafe { &*(handle.get() as *const Library) };
        let symbol: libloading::Symbol<'_, unsafe extern "C" fn()> =
            unsafe { library.get(name.as_bytes()) }.ok()?;
        NonZeroUsize::new(*symbol as usize)
    }
}
