//! Integration tests for the memoized method flag cache under concurrency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aotlink::prelude::*;
use rayon::prelude::*;

/// A metadata store scripted per method row, counting table touches.
struct ScriptedStore {
    rows: HashMap<u32, MethodDefRow>,
    attributes: HashMap<u32, Vec<(String, String)>>,
    row_reads: AtomicUsize,
    attribute_scans: AtomicUsize,
}

impl ScriptedStore {
    fn new() -> Self {
        ScriptedStore {
            rows: HashMap::new(),
            attributes: HashMap::new(),
            row_reads: AtomicUsize::new(0),
            attribute_scans: AtomicUsize::new(0),
        }
    }

    fn add_method(&mut self, row: u32, def: MethodDefRow) {
        self.rows.insert(row, def);
    }

    fn add_attribute(&mut self, row: u32, namespace: &str, name: &str) {
        self.attributes
            .entry(row)
            .or_default()
            .push((namespace.to_string(), name.to_string()));
    }
}

impl MetadataStore for ScriptedStore {
    fn method_def_row(&self, method: Token) -> MethodDefRow {
        self.row_reads.fetch_add(1, Ordering::Relaxed);
        self.rows.get(&method.row()).copied().unwrap_or_default()
    }

    fn custom_attributes(&self, method: Token) -> Vec<Token> {
        self.attribute_scans.fetch_add(1, Ordering::Relaxed);
        let count = self.attributes.get(&method.row()).map_or(0, Vec::len);
        // Attribute tokens encode (method row, attribute index) for `attribute_type_name`
        (0..count as u32)
            .map(|index| Token::new(0x0C00_0000 | (method.row() << 8) | index))
            .collect()
    }

    fn attribute_type_name(&self, attribute: Token) -> Option<(String, String)> {
        let method_row = (attribute.row() >> 8) & 0xFFFF;
        let index = (attribute.row() & 0xFF) as usize;
        self.attributes
            .get(&method_row)
            .and_then(|list| list.get(index))
            .cloned()
    }
}

const ATTR_VIRTUAL: u32 = 0x0040;
const ATTR_FINAL: u32 = 0x0020;
const ATTR_STATIC: u32 = 0x0010;
const IMPL_NO_INLINING: u32 = 0x0008;

fn virtual_intrinsic_store() -> ScriptedStore {
    let mut store = ScriptedStore::new();
    store.add_method(
        1,
        MethodDefRow {
            impl_flags: IMPL_NO_INLINING,
            flags: ATTR_VIRTUAL | ATTR_FINAL,
        },
    );
    store.add_attribute(1, "System.Runtime.CompilerServices", "IntrinsicAttribute");
    store
}

#[test]
fn sequential_and_concurrent_results_agree() {
    // Sequential baseline
    let store = virtual_intrinsic_store();
    let method = MethodDesc::new(Token::method_def(1));
    let baseline = method.flags(&store, MethodFlags::all());

    // The same queries from 32 racing threads must produce exactly the baseline union
    let store = Arc::new(virtual_intrinsic_store());
    let method: MethodDescRc = Arc::new(MethodDesc::new(Token::method_def(1)));
    let masks = [
        MethodFlags::VIRTUAL,
        MethodFlags::FINAL,
        MethodFlags::NO_INLINING,
        MethodFlags::INTRINSIC,
        MethodFlags::VIRTUAL | MethodFlags::INTRINSIC,
        MethodFlags::all(),
    ];

    let union = (0..32)
        .into_par_iter()
        .map(|worker| {
            let mask = masks[worker % masks.len()];
            method.flags(store.as_ref(), mask)
        })
        .reduce(MethodFlags::empty, |a, b| a | b);

    assert_eq!(union, baseline);
    assert!(baseline.contains(
        MethodFlags::VIRTUAL
            | MethodFlags::FINAL
            | MethodFlags::NO_INLINING
            | MethodFlags::INTRINSIC
            | MethodFlags::BASIC_CACHED
            | MethodFlags::ATTRIBUTE_CACHED
    ));
}

#[test]
fn flags_are_monotonic_across_threads() {
    let store = Arc::new(virtual_intrinsic_store());
    let method: MethodDescRc = Arc::new(MethodDesc::new(Token::method_def(1)));

    // Prime the basic tier from one thread
    assert!(method
        .flags(store.as_ref(), MethodFlags::VIRTUAL)
        .contains(MethodFlags::VIRTUAL));

    // Once any thread observed the sentinel, no thread ever sees the tier unset again
    (0..64).into_par_iter().for_each(|_| {
        let flags = method.flags(store.as_ref(), MethodFlags::BASIC_TIER);
        assert!(flags.contains(MethodFlags::BASIC_CACHED));
        assert!(flags.contains(MethodFlags::VIRTUAL | MethodFlags::FINAL));
    });
}

#[test]
fn each_tier_is_computed_at_most_once_without_races() {
    let store = virtual_intrinsic_store();
    let method = MethodDesc::new(Token::method_def(1));

    for _ in 0..16 {
        method.flags(&store, MethodFlags::VIRTUAL);
    }
    assert_eq!(store.row_reads.load(Ordering::Relaxed), 1);
    assert_eq!(store.attribute_scans.load(Ordering::Relaxed), 0);

    for _ in 0..16 {
        method.flags(&store, MethodFlags::NATIVE_CALLABLE);
    }
    assert_eq!(store.attribute_scans.load(Ordering::Relaxed), 1);
}

#[test]
fn descriptors_cache_independently() {
    let mut store = ScriptedStore::new();
    store.add_method(
        1,
        MethodDefRow {
            impl_flags: 0,
            flags: ATTR_STATIC,
        },
    );
    store.add_method(
        2,
        MethodDefRow {
            impl_flags: 0,
            flags: ATTR_VIRTUAL,
        },
    );

    let first = MethodDesc::new(Token::method_def(1));
    let second = MethodDesc::new(Token::method_def(2));

    assert!(first.is_static(&store));
    assert!(!first.is_virtual(&store));
    assert!(second.is_virtual(&store));
    assert!(!second.is_static(&store));
}

#[test]
fn unknown_attributes_are_ignored() {
    let mut store = ScriptedStore::new();
    store.add_method(1, MethodDefRow::default());
    store.add_attribute(1, "System.Diagnostics", "ConditionalAttribute");
    store.add_attribute(1, "System.Runtime", "RuntimeExportAttribute");

    let method = MethodDesc::new(Token::method_def(1));
    let flags = method.flags(&store, MethodFlags::ATTRIBUTE_TIER);

    assert_eq!(
        flags,
        MethodFlags::ATTRIBUTE_CACHED | MethodFlags::RUNTIME_EXPORT
    );
}
