//! Metadata-backed method descriptors with a memoized, race-tolerant flag cache.
//!
//! A [`MethodDesc`] is logically immutable: its identity is an opaque token into an external
//! metadata store, and everything else about it is derived on demand. Derived properties are
//! expensive to extract, so they are memoized in a single atomic bitset partitioned into
//! cost tiers (see [`types`]). First access from any worker thread computes the whole tier
//! containing the requested bits and merges it in with an atomic OR; because a tier is a
//! pure function of the descriptor's identity, threads racing on first access simply redo
//! identical work and merge identical bits. No lock is ever taken.
//!
//! # Key Types
//! - [`MethodDesc`] - the descriptor itself
//! - [`MethodFlags`] - the derived property bits, tier sentinels included
//! - [`FlagTier`] - the explicit tier enumeration
//!
//! # Examples
//!
//! ```rust
//! use aotlink::metadata::method::{MethodDesc, MethodFlags};
//! use aotlink::metadata::store::{MetadataStore, MethodDefRow};
//! use aotlink::metadata::token::Token;
//! # struct Store;
//! # impl MetadataStore for Store {
//! #     fn method_def_row(&self, _: Token) -> MethodDefRow {
//! #         MethodDefRow { impl_flags: 0, flags: 0x0040 }
//! #     }
//! #     fn custom_attributes(&self, _: Token) -> Vec<Token> { Vec::new() }
//! #     fn attribute_type_name(&self, _: Token) -> Option<(String, String)> { None }
//! # }
//! # let store = Store;
//! let method = MethodDesc::new(Token::method_def(1));
//! assert!(method.is_virtual(&store));
//! // Second query hits the cached tier, no table access
//! assert!(!method.is_abstract(&store));
//! ```

mod types;

pub use types::*;

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::{
    metadata::{
        store::{MetadataStore, MethodDefRow},
        token::Token,
    },
    sync::FlagSet,
};

/// A reference to a `MethodDesc`
pub type MethodDescRc = Arc<MethodDesc>;

/// Namespace/name pairs of the custom attributes the attribute tier recognizes.
const KNOWN_ATTRIBUTES: &[(&str, &str, MethodFlags)] = &[
    (
        "System.Runtime.CompilerServices",
        "IntrinsicAttribute",
        MethodFlags::INTRINSIC,
    ),
    (
        "System.Runtime.InteropServices",
        "UnmanagedCallersOnlyAttribute",
        MethodFlags::NATIVE_CALLABLE,
    ),
    (
        "System.Runtime",
        "RuntimeExportAttribute",
        MethodFlags::RUNTIME_EXPORT,
    ),
];

/// A method descriptor backed by a row in an external metadata store.
///
/// Safe to share across worker threads; every derived-property accessor is lock-free and
/// idempotent. The descriptor owns nothing but its token and the flag cache, and lives
/// exactly as long as whoever holds the [`MethodDescRc`].
pub struct MethodDesc {
    /// The `MethodDef` token identifying this method in the metadata store
    pub token: Token,
    flags: FlagSet,
}

impl MethodDesc {
    /// Creates a descriptor for the given `MethodDef` token with an empty flag cache.
    #[must_use]
    pub fn new(token: Token) -> Self {
        MethodDesc {
            token,
            flags: FlagSet::new(),
        }
    }

    /// Returns `requested ∩ set`, computing and caching any requested-but-uncomputed tier.
    ///
    /// The fast path is a single relaxed load: when the sentinel bit of every tier touched
    /// by `requested` is already present, the intersection is returned without consulting
    /// the store. Otherwise each missing tier is recomputed *in full* from `store` and
    /// merged with an atomic OR, sentinel included, so that an all-false tier is still
    /// recorded as computed. Concurrent callers may duplicate a tier computation; the
    /// merge is commutative and the result identical.
    pub fn flags(&self, store: &dyn MetadataStore, requested: MethodFlags) -> MethodFlags {
        let cached = MethodFlags::from_bits_truncate(self.flags.load());

        let mut missing = MethodFlags::empty();
        for tier in FlagTier::iter() {
            if requested.intersects(tier.mask()) && !cached.contains(tier.sentinel()) {
                missing |= tier.mask();
            }
        }
        if missing.is_empty() {
            return cached & requested;
        }

        let mut merged = cached;
        for tier in FlagTier::iter() {
            if missing.contains(tier.mask()) {
                let computed = self.compute_tier(store, tier);
                debug_assert!(
                    computed.contains(tier.sentinel()),
                    "tier computation must record its sentinel"
                );
                merged = MethodFlags::from_bits_truncate(self.flags.merge(computed.bits()));
            }
        }

        let result = merged & requested;
        let computed_sentinels =
            missing & (MethodFlags::BASIC_CACHED | MethodFlags::ATTRIBUTE_CACHED);
        debug_assert!(
            !requested.intersects(computed_sentinels) || !result.is_empty(),
            "a request naming a computed tier's sentinel is never answered empty"
        );
        result
    }

    fn compute_tier(&self, store: &dyn MetadataStore, tier: FlagTier) -> MethodFlags {
        match tier {
            FlagTier::Basic => Self::basic_flags(store.method_def_row(self.token)),
            FlagTier::Attribute => self.attribute_flags(store),
        }
    }

    /// Derives the basic tier from the fixed-offset fields of the definition row.
    fn basic_flags(row: MethodDefRow) -> MethodFlags {
        let mut flags = MethodFlags::BASIC_CACHED;

        if row.flags & METHOD_ATTR_VIRTUAL != 0 {
            flags |= MethodFlags::VIRTUAL;
        }
        if row.flags & METHOD_ATTR_NEW_SLOT != 0 {
            flags |= MethodFlags::NEW_SLOT;
        }
        if row.flags & METHOD_ATTR_ABSTRACT != 0 {
            flags |= MethodFlags::ABSTRACT;
        }
        if row.flags & METHOD_ATTR_FINAL != 0 {
            flags |= MethodFlags::FINAL;
        }
        if row.flags & METHOD_ATTR_STATIC != 0 {
            flags |= MethodFlags::STATIC;
        }
        if row.flags & METHOD_ATTR_PINVOKE_IMPL != 0 {
            flags |= MethodFlags::PINVOKE;
        }

        if row.impl_flags & METHOD_IMPL_NO_INLINING != 0 {
            flags |= MethodFlags::NO_INLINING;
        }
        if row.impl_flags & METHOD_IMPL_AGGRESSIVE_INLINING != 0 {
            flags |= MethodFlags::AGGRESSIVE_INLINING;
        }
        if row.impl_flags & METHOD_IMPL_SYNCHRONIZED != 0 {
            flags |= MethodFlags::SYNCHRONIZED;
        }
        if row.impl_flags & METHOD_IMPL_INTERNAL_CALL != 0 {
            flags |= MethodFlags::INTERNAL_CALL;
        }
        if row.impl_flags & METHOD_IMPL_CODE_TYPE_MASK == METHOD_IMPL_CODE_TYPE_RUNTIME {
            flags |= MethodFlags::RUNTIME_IMPLEMENTED;
        }

        flags
    }

    /// Derives the attribute tier by scanning the custom-attribute list.
    fn attribute_flags(&self, store: &dyn MetadataStore) -> MethodFlags {
        let mut flags = MethodFlags::ATTRIBUTE_CACHED;

        for attribute in store.custom_attributes(self.token) {
            let Some((namespace, name)) = store.attribute_type_name(attribute) else {
                continue;
            };
            for &(known_namespace, known_name, bit) in KNOWN_ATTRIBUTES {
                if namespace == known_namespace && name == known_name {
                    flags |= bit;
                }
            }
        }

        flags
    }

    /// True if the method is virtual.
    pub fn is_virtual(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::VIRTUAL).contains(MethodFlags::VIRTUAL)
    }

    /// True if the method always gets a new vtable slot.
    pub fn is_new_slot(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::NEW_SLOT).contains(MethodFlags::NEW_SLOT)
    }

    /// True if the method provides no implementation.
    pub fn is_abstract(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::ABSTRACT).contains(MethodFlags::ABSTRACT)
    }

    /// True if the method cannot be overridden.
    pub fn is_final(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::FINAL).contains(MethodFlags::FINAL)
    }

    /// True if the method is static.
    pub fn is_static(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::STATIC).contains(MethodFlags::STATIC)
    }

    /// True if the method must not be inlined.
    pub fn is_no_inlining(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::NO_INLINING).contains(MethodFlags::NO_INLINING)
    }

    /// True if the method asks to be inlined where possible.
    pub fn is_aggressive_inlining(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::AGGRESSIVE_INLINING)
            .contains(MethodFlags::AGGRESSIVE_INLINING)
    }

    /// True if the runtime provides the implementation.
    pub fn is_runtime_implemented(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::RUNTIME_IMPLEMENTED)
            .contains(MethodFlags::RUNTIME_IMPLEMENTED)
    }

    /// True if the implementation is internal to the runtime.
    pub fn is_internal_call(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::INTERNAL_CALL).contains(MethodFlags::INTERNAL_CALL)
    }

    /// True if the method body is synchronized.
    pub fn is_synchronized(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::SYNCHRONIZED).contains(MethodFlags::SYNCHRONIZED)
    }

    /// True if the implementation is forwarded to a native import.
    pub fn is_pinvoke(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::PINVOKE).contains(MethodFlags::PINVOKE)
    }

    /// True if the method is a compiler intrinsic.
    pub fn is_intrinsic(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::INTRINSIC).contains(MethodFlags::INTRINSIC)
    }

    /// True if the method may be called directly from native code.
    pub fn is_native_callable(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::NATIVE_CALLABLE)
            .contains(MethodFlags::NATIVE_CALLABLE)
    }

    /// True if the method is exported to native code by the runtime.
    pub fn is_runtime_export(&self, store: &dyn MetadataStore) -> bool {
        self.flags(store, MethodFlags::RUNTIME_EXPORT).contains(MethodFlags::RUNTIME_EXPORT)
    }
}
