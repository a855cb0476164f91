//! String interning for identifier deduplication.
//!
//! The tokenizer produces identifier lexemes as source slices; the parser
//! interns them so that name lookups (block frames, the dependency map)
//! compare a 4-byte `Atom` instead of string bytes.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string handle.
///
/// Atoms are only meaningful together with the `Interner` that produced them.
/// The empty string always interns to `Atom::NONE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Atom::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != Atom::NONE
    }
}

/// Deduplicating string table.
///
/// Strings are stored as `Arc<str>` shared between the lookup map and the
/// resolve table, so cloning the interner (for deep-copied parse results) is
/// a shallow per-entry refcount bump.
#[derive(Clone, Default)]
pub struct Interner {
    map: FxHashMap<Arc<str>, u32>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Interner {
        Interner::default()
    }

    /// Intern a string, returning its atom. Idempotent for equal strings.
    pub fn intern(&mut self, text: &str) -> Atom {
        if text.is_empty() {
            return Atom::NONE;
        }
        if let Some(&id) = self.map.get(text) {
            return Atom(id);
        }
        let id = self.strings.len() as u32;
        let shared: Arc<str> = Arc::from(text);
        self.strings.push(Arc::clone(&shared));
        self.map.insert(shared, id);
        Atom(id)
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, text: &str) -> Option<Atom> {
        if text.is_empty() {
            return Some(Atom::NONE);
        }
        self.map.get(text).map(|&id| Atom(id))
    }

    /// Resolve an atom back to its string. `Atom::NONE` resolves to `""`.
    pub fn resolve(&self, atom: Atom) -> &str {
        if atom.is_none() {
            return "";
        }
        &self.strings[atom.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Drop all entries but keep the table allocations.
    pub fn clear(&mut self) {
        self.map.clear();
        self.strings.clear();
    }
}
