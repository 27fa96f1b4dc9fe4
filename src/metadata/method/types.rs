//! Method flag bitsets, cost tiers, and the raw ECMA-335 masks they derive from.
//!
//! Derived method properties are partitioned into two cost tiers. The *basic* tier comes
//! from the fixed-offset `MethodAttributes`/`MethodImplAttributes` fields of the definition
//! row, a cheap table lookup queried on almost every method during analysis. The *attribute*
//! tier comes from scanning the method's custom-attribute list and string-comparing
//! namespace/name pairs, which is expensive and rarely needed. Each tier owns a sentinel bit
//! recording "this tier has been computed", so a tier whose every property is false is still
//! cached rather than rescanned forever.
//!
//! # Key Types
//! - [`MethodFlags`]: the cached bitset, tier sentinels included
//! - [`FlagTier`]: explicit enumeration of the tiers and their bit groups

use bitflags::bitflags;
use strum::EnumIter;

/// Bitmask for `CODE_TYPE` extraction from `MethodImplAttributes`
pub const METHOD_IMPL_CODE_TYPE_MASK: u32 = 0x0003;
/// `MethodImplAttributes` code type: implementation is provided by the runtime
pub const METHOD_IMPL_CODE_TYPE_RUNTIME: u32 = 0x0003;
/// `MethodImplAttributes` bit: method cannot be inlined
pub const METHOD_IMPL_NO_INLINING: u32 = 0x0008;
/// `MethodImplAttributes` bit: method is a synchronized method
pub const METHOD_IMPL_SYNCHRONIZED: u32 = 0x0020;
/// `MethodImplAttributes` bit: method should be inlined if possible
pub const METHOD_IMPL_AGGRESSIVE_INLINING: u32 = 0x0100;
/// `MethodImplAttributes` bit: implementation is internal to the runtime
pub const METHOD_IMPL_INTERNAL_CALL: u32 = 0x1000;

/// `MethodAttributes` bit: defined on type, else per instance
pub const METHOD_ATTR_STATIC: u32 = 0x0010;
/// `MethodAttributes` bit: method cannot be overridden
pub const METHOD_ATTR_FINAL: u32 = 0x0020;
/// `MethodAttributes` bit: method is virtual
pub const METHOD_ATTR_VIRTUAL: u32 = 0x0040;
/// `MethodAttributes` bit: method always gets a new slot in the vtable
pub const METHOD_ATTR_NEW_SLOT: u32 = 0x0100;
/// `MethodAttributes` bit: method does not provide an implementation
pub const METHOD_ATTR_ABSTRACT: u32 = 0x0400;
/// `MethodAttributes` bit: implementation is forwarded through PInvoke
pub const METHOD_ATTR_PINVOKE_IMPL: u32 = 0x2000;

bitflags! {
    /// Derived method properties, memoized per descriptor.
    ///
    /// Bits `0x0000_FFFF` belong to the basic tier, bits `0xFFFF_0000` to the attribute
    /// tier; each tier includes its own `*_CACHED` sentinel. The stored set only ever
    /// grows, so readers may cache the result of any query.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u32 {
        /// Sentinel: the basic tier has been computed for this descriptor
        const BASIC_CACHED = 0x0000_0001;
        /// Method is virtual
        const VIRTUAL = 0x0000_0002;
        /// Method gets a new vtable slot rather than reusing one
        const NEW_SLOT = 0x0000_0004;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0000_0008;
        /// Method cannot be overridden
        const FINAL = 0x0000_0010;
        /// Method is defined on the type rather than per instance
        const STATIC = 0x0000_0020;
        /// Method must not be inlined
        const NO_INLINING = 0x0000_0040;
        /// Method should be inlined if possible
        const AGGRESSIVE_INLINING = 0x0000_0080;
        /// Method implementation is provided by the runtime
        const RUNTIME_IMPLEMENTED = 0x0000_0100;
        /// Method implementation is internal to the runtime
        const INTERNAL_CALL = 0x0000_0200;
        /// Method body is synchronized
        const SYNCHRONIZED = 0x0000_0400;
        /// Method implementation is forwarded to a native import
        const PINVOKE = 0x0000_0800;

        /// Sentinel: the attribute tier has been computed for this descriptor
        const ATTRIBUTE_CACHED = 0x0001_0000;
        /// Method carries `System.Runtime.CompilerServices.IntrinsicAttribute`
        const INTRINSIC = 0x0002_0000;
        /// Method carries `System.Runtime.InteropServices.UnmanagedCallersOnlyAttribute`
        const NATIVE_CALLABLE = 0x0004_0000;
        /// Method carries `System.Runtime.RuntimeExportAttribute`
        const RUNTIME_EXPORT = 0x0008_0000;
    }
}

impl MethodFlags {
    /// All bits of the basic tier, sentinel included.
    pub const BASIC_TIER: MethodFlags = MethodFlags::from_bits_truncate(0x0000_FFFF);
    /// All bits of the attribute tier, sentinel included.
    pub const ATTRIBUTE_TIER: MethodFlags = MethodFlags::from_bits_truncate(0xFFFF_0000);
}

/// The cost tiers a descriptor's derived properties are partitioned into.
///
/// Making the tier an explicit enumeration keeps the sentinel/property distinction
/// type-safe: a tier knows its own sentinel bit and the full bit group it computes, so
/// cache code never reconstructs either through mask arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum FlagTier {
    /// Fixed-offset definition-row fields; cheap, queried constantly
    Basic,
    /// Custom-attribute scan with string comparison; expensive, queried rarely
    Attribute,
}

impl FlagTier {
    /// The sentinel bit recording that this tier has been computed.
    #[must_use]
    pub fn sentinel(self) -> MethodFlags {
        match self {
            FlagTier::Basic => MethodFlags::BASIC_CACHED,
            FlagTier::Attribute => MethodFlags::ATTRIBUTE_CACHED,
        }
    }

    /// Every bit belonging to this tier, sentinel included.
    #[must_use]
    pub fn mask(self) -> MethodFlags {
        match self {
            FlagTier::Basic => MethodFlags::BASIC_TIER,
            FlagTier::Attribute => MethodFlags::ATTRIBUTE_TIER,
        }
    }
}
