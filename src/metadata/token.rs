use std::fmt;

/// Metadata table tag for `MethodDef` rows (high byte `0x06`).
pub const TABLE_METHOD_DEF: u8 = 0x06;
/// Metadata table tag for `CustomAttribute` rows (high byte `0x0C`).
pub const TABLE_CUSTOM_ATTRIBUTE: u8 = 0x0C;

/// An opaque handle into an external metadata store.
///
/// Tokens follow the ECMA-335 coded form: the high byte (bits 24-31) selects the metadata
/// table, the low 24 bits select the row within it. The descriptor layer never dereferences
/// a token itself; it hands tokens back to the [`MetadataStore`](crate::metadata::store::MetadataStore)
/// collaborator, which owns the actual tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a token from a raw 32-bit value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a `MethodDef` token for the given row.
    #[must_use]
    pub fn method_def(row: u32) -> Self {
        Token((u32::from(TABLE_METHOD_DEF) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table tag (high byte).
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index (low 24 bits).
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true for the null token (value 0).
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
