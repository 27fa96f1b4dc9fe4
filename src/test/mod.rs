//! Shared test doubles used by unit tests across the crate.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::interop::loader::{LibraryHandle, NativeLoader};
use crate::metadata::store::{MetadataStore, MethodDefRow};
use crate::metadata::token::{Token, TABLE_CUSTOM_ATTRIBUTE};

/// An in-memory metadata store with scripted rows and attributes.
pub(crate) struct TableStore {
    rows: HashMap<u32, MethodDefRow>,
    attributes: HashMap<u32, Vec<Token>>,
    attribute_names: HashMap<u32, (String, String)>,
    next_attribute_row: u32,
}

impl TableStore {
    pub(crate) fn with_method(row: u32, def: MethodDefRow) -> Self {
        let mut rows = HashMap::new();
        rows.insert(row, def);
        TableStore {
            rows,
            attributes: HashMap::new(),
            attribute_names: HashMap::new(),
            next_attribute_row: 1,
        }
    }

    pub(crate) fn attach_attribute(&mut self, method_row: u32, namespace: &str, name: &str) {
        let attribute_row = self.next_attribute_row;
        self.next_attribute_row += 1;
        let token = Token::new((u32::from(TABLE_CUSTOM_ATTRIBUTE) << 24) | attribute_row);
        self.attribute_names
            .insert(attribute_row, (namespace.to_string(), name.to_string()));
        self.attributes.entry(method_row).or_default().push(token);
    }
}

impl MetadataStore for TableStore {
    fn method_def_row(&self, method: Token) -> MethodDefRow {
        self.rows.get(&method.row()).copied().unwrap_or_default()
    }

    fn custom_attributes(&self, method: Token) -> Vec<Token> {
        self.attributes.get(&method.row()).cloned().unwrap_or_default()
    }

    fn attribute_type_name(&self, attribute: Token) -> Option<(String, String)> {
        self.attribute_names.get(&attribute.row()).cloned()
    }
}

/// Wraps a [`TableStore`] and counts how often each tier touches the tables.
pub(crate) struct CountingStore {
    inner: TableStore,
    pub(crate) row_reads: AtomicUsize,
    pub(crate) attribute_scans: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn new(inner: TableStore) -> Self {
        CountingStore {
            inner,
            row_reads: AtomicUsize::new(0),
            attribute_scans: AtomicUsize::new(0),
        }
    }
}

impl MetadataStore for CountingStore {
    fn method_def_row(&self, method: Token) -> MethodDefRow {
        self.row_reads.fetch_add(1, Ordering::Relaxed);
        self.inner.method_def_row(method)
    }

    fn custom_attributes(&self, method: Token) -> Vec<Token> {
        self.attribute_scans.fetch_add(1, Ordering::Relaxed);
        self.inner.custom_attributes(method)
    }

    fn attribute_type_name(&self, attribute: Token) -> Option<(String, String)> {
        self.inner.attribute_type_name(attribute)
    }
}

/// A scripted native loader that records every attempt and counts net live handles.
pub(crate) struct MockLoader {
    libraries: Mutex<HashMap<String, usize>>,
    symbols: Mutex<HashMap<(usize, String), usize>>,
    attempts: Mutex<Vec<String>>,
    loads: AtomicUsize,
    frees: AtomicUsize,
}

impl MockLoader {
    pub(crate) fn new() -> Self {
        MockLoader {
            libraries: Mutex::new(HashMap::new()),
            symbols: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
            loads: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
        }
    }

    /// Makes `name` loadable, yielding `handle`.
    pub(crate) fn provide(&self, name: &str, handle: usize) {
        self.libraries
            .lock()
            .unwrap()
            .insert(name.to_string(), handle);
    }

    /// Exports `symbol` at `address` from `handle`.
    pub(crate) fn export(&self, handle: usize, symbol: &str, address: usize) {
        self.symbols
            .lock()
            .unwrap()
            .insert((handle, symbol.to_string()), address);
    }

    /// Number of `load` invocations, successful or not.
    pub(crate) fn load_calls(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Successful loads minus frees; 1 means exactly one live handle.
    pub(crate) fn net_live_handles(&self) -> usize {
        self.loads.load(Ordering::Relaxed) - self.frees.load(Ordering::Relaxed)
    }
}

impl NativeLoader for MockLoader {
    fn load(&self, name: &str) -> Option<LibraryHandle> {
        self.attempts.lock().unwrap().push(name.to_string());
        let handle = self.libraries.lock().unwrap().get(name).copied()?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        NonZeroUsize::new(handle)
    }

    fn free(&self, _handle: LibraryHandle) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    fn symbol(&self, handle: LibraryHandle, name: &str) -> Option<NonZeroUsize> {
        let address = self
            .symbols
            .lock()
            .unwrap()
            .get(&(handle.get(), name.to_string()))
            .copied()?;
        NonZeroUsize::new(address)
    }
}
