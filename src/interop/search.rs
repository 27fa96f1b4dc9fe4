//! The multi-step, platform-specific library search.
//!
//! Native import declarations are written portably (a bare logical name like `native_lib`);
//! this module bridges that to each platform's file-naming convention and to the common
//! deployment pattern of co-locating native dependencies with the compiled managed binary.
//!
//! Candidates are tried in a fixed order and the first successful load wins:
//!
//! 1. the name verbatim (respects explicit paths and extensions the caller provided);
//! 2. the name inside the compiled binary's directory, when the name is relative and the
//!    cell's search policy allows the assembly directory;
//! 3. on platforms with conventional shared-library naming, for each of
//!    `<prefix><name><suffix>`, `<name><suffix>` and `<prefix><name>` (relative names
//!    only): first inside the compiled binary's directory, then bare.
//!
//! Binary-relative candidates come before system-wide ones so that a co-located dependency
//! is never shadowed by an unrelated system library of the same name.

use std::path::{Path, PathBuf};

use crate::{
    interop::{
        cell::SearchFlags,
        loader::{LibraryHandle, NativeLoader},
    },
    Error, Result,
};

/// Platform shared-library name decoration, e.g. `lib` + `.so`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    /// Conventional file-name prefix (`lib` on ELF and Mach-O platforms)
    pub prefix: &'static str,
    /// Conventional file-name suffix including the dot (`.so`, `.dylib`)
    pub suffix: &'static str,
}

/// The ordered candidate-generation strategy for one target platform.
///
/// Selected once at startup; [`SearchPolicy::for_host`] picks the compiled binary's
/// directory and the host platform's naming convention. Tests construct policies directly
/// to pin down base directory and decoration.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    base_dir: PathBuf,
    convention: Option<NamingConvention>,
}

impl SearchPolicy {
    /// Creates a policy with an explicit base directory and naming convention.
    ///
    /// `convention: None` disables decorated candidates entirely, as on Windows where the
    /// platform loader appends `.dll` itself.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, convention: Option<NamingConvention>) -> Self {
        SearchPolicy {
            base_dir: base_dir.into(),
            convention,
        }
    }

    /// Creates the policy for the running process: the compiled binary's directory
    /// (resolved once, invariant thereafter) and the host platform's naming convention.
    #[must_use]
    pub fn for_host() -> Self {
        let base_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        SearchPolicy::new(base_dir, host_convention())
    }

    /// The compiled binary's directory used for co-located candidates.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Produces the full candidate sequence for `name` under `attributes`, in try-order.
    #[must_use]
    pub fn candidates(&self, name: &str, attributes: SearchFlags) -> Vec<String> {
        let mut candidates = vec![name.to_string()];

        let relative = Path::new(name).is_relative();
        let search_assembly_dir = attributes.search_assembly_directory();

        if relative && search_assembly_dir {
            candidates.push(self.in_base_dir(name));
        }

        if relative {
            if let Some(convention) = self.convention {
                let decorated = [
                    format!("{}{}{}", convention.prefix, name, convention.suffix),
                    format!("{}{}", name, convention.suffix),
                    format!("{}{}", convention.prefix, name),
                ];
                for candidate in decorated {
                    if search_assembly_dir {
                        candidates.push(self.in_base_dir(&candidate));
                    }
                    candidates.push(candidate);
                }
            }
        }

        candidates
    }

    fn in_base_dir(&self, name: &str) -> String {
        self.base_dir.join(name).to_string_lossy().into_owned()
    }
}

/// The naming convention of the platform this crate was compiled for, if it has one.
#[must_use]
pub fn host_convention() -> Option<NamingConvention> {
    if cfg!(target_os = "windows") {
        None
    } else if cfg!(target_os = "macos") {
        Some(NamingConvention {
            prefix: "lib",
            suffix: ".dylib",
        })
    } else {
        Some(NamingConvention {
            prefix: "lib",
            suffix: ".so",
        })
    }
}

/// Resolves a native module name to a loaded-library handle.
///
/// Tries the documented candidate sequence in order, short-circuiting on the first
/// successful load. The returned handle is owned by the caller; the usual caller is
/// [`resolve_method`](crate::interop::resolve::resolve_method), which installs it into the
/// module's fixup cell or frees it on race loss.
///
/// # Errors
/// Returns [`Error::ModuleNotFound`] carrying `name` verbatim when every candidate fails.
/// Nothing negative is cached; a later call repeats the whole sequence.
pub fn resolve_module(
    loader: &dyn NativeLoader,
    policy: &SearchPolicy,
    name: &str,
    attributes: SearchFlags,
) -> Result<LibraryHandle> {
    for candidate in policy.candidates(name, attributes) {
        if let Some(handle) = loader.load(&candidate) {
            return Ok(handle);
        }
    }
    Err(Error::ModuleNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_policy() -> SearchPolicy {
        SearchPolicy::new(
            "/opt/app",
            Some(NamingConvention {
                prefix: "lib",
                suffix: ".so",
            }),
        )
    }

    #[test]
    fn candidate_order_for_bare_name() {
        let candidates = unix_policy().candidates("foo", SearchFlags::empty());
        assert_eq!(
            candidates,
            vec![
                "foo",
                "/opt/app/foo",
                "/opt/app/libfoo.so",
                "libfoo.so",
                "/opt/app/foo.so",
                "foo.so",
                "/opt/app/libfoo",
                "libfoo",
            ]
        );
    }

    #[test]
    fn explicit_policy_without_assembly_directory_skips_base_dir() {
        let candidates = unix_policy().candidates(
            "foo",
            SearchFlags::SEARCH_PATH_SPECIFIED | SearchFlags::SYSTEM32,
        );
        assert_eq!(
            candidates,
            vec!["foo", "libfoo.so", "foo.so", "libfoo"]
        );
    }

    #[test]
    fn absolute_path_is_tried_verbatim_only() {
        let candidates = unix_policy().candidates("/usr/lib/libbar.so", SearchFlags::empty());
        assert_eq!(candidates, vec!["/usr/lib/libbar.so"]);
    }

    #[test]
    fn windows_style_policy_has_no_decorated_candidates() {
        let policy = SearchPolicy::new("C:\\app", None);
        let candidates = policy.candidates("bar", SearchFlags::empty());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], "bar");
        assert!(candidates[1].ends_with("bar"));
    }
}
