//! External metadata store contract.
//!
//! The binary metadata reader is not part of this crate; descriptors treat it as a
//! collaborator reached through the [`MetadataStore`] trait. The contract is deliberately
//! narrow: fixed-offset field access on a definition row, enumeration of a row's custom
//! attributes, and namespace/name identification of an attribute's constructor type. That
//! is exactly the surface the two flag tiers consume, nothing more.
//!
//! Implementations must be safe for concurrent read-only access; the flag cache will call
//! into the store from several worker threads at once and may call the same accessor twice
//! for the same token during a computation race.

use crate::metadata::token::Token;

/// The fixed-offset fields of a `MethodDef` row that the basic flag tier derives from.
///
/// Field meanings follow ECMA-335 §II.22.26: `impl_flags` is the `MethodImplAttributes`
/// bitmask, `flags` the `MethodAttributes` bitmask. Remaining row fields (name, signature,
/// param list) are not needed for flag derivation and are not part of this contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MethodDefRow {
    /// Bitmask of `MethodImplAttributes`, ECMA-335 §II.23.1.11
    pub impl_flags: u32,
    /// Bitmask of `MethodAttributes`, ECMA-335 §II.23.1.10
    pub flags: u32,
}

/// Read-only access to the binary metadata tables backing a descriptor.
///
/// Tier computation is defined to always succeed over valid metadata, so the accessors are
/// infallible here; a store that discovers malformed input underneath is expected to have
/// rejected it at load time, before any descriptor existed.
pub trait MetadataStore: Send + Sync {
    /// Returns the fixed-field record of the `MethodDef` row behind `method`.
    fn method_def_row(&self, method: Token) -> MethodDefRow;

    /// Returns the custom-attribute handles attached to `method`, in table order.
    fn custom_attributes(&self, method: Token) -> Vec<Token>;

    /// Identifies the constructor type of a custom attribute as a `(namespace, name)` pair.
    ///
    /// Returns `None` when the attribute's type cannot be identified (for example, an
    /// attribute constructor living in a metadata scope the store does not carry). Such
    /// attributes are skipped during the attribute-tier scan.
    fn attribute_type_name(&self, attribute: Token) -> Option<(String, String)>;
}
