//! String interning for names read from GraphQL documents.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// An interned text identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text(u32);

impl Text {
    /// Creates a new text from a raw index.
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

/// Names every GraphQL document is likely to mention.
const PRELUDE: &[&str] = &[
    "Int",
    "Float",
    "String",
    "Boolean",
    "ID",
    "Query",
    "Mutation",
    "Subscription",
    "query",
    "mutation",
    "subscription",
    "fragment",
    "on",
    "__typename",
];

/// A string interner that deduplicates strings.
///
/// Documents parsed against the same interner share name handles, so an
/// operation name and a field name compare equal by [`Text`] alone.
#[derive(Debug)]
pub struct Interner {
    map: RefCell<FxHashMap<String, Text>>,
    strings: RefCell<Vec<String>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates a new interner with the prelude names pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let interner = Self {
            map: RefCell::new(FxHashMap::default()),
            strings: RefCell::new(Vec::new()),
        };
        for name in PRELUDE {
            interner.intern(name);
        }
        interner
    }

    /// Interns a string, returning its identifier.
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern(&self, s: &str) -> Text {
        let mut map = self.map.borrow_mut();
        if let Some(&id) = map.get(s) {
            return id;
        }

        let mut strings = self.strings.borrow_mut();
        let id = Text(strings.len() as u32);
        strings.push(s.to_string());
        map.insert(s.to_string(), id);
        id
    }

    /// Gets the string for an identifier.
    #[must_use]
    pub fn get(&self, id: Text) -> String {
        let strings = self.strings.borrow();
        strings.get(id.0 as usize).cloned().unwrap_or_default()
    }

    /// Returns the number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Returns true if no strings are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let interner = Interner::new();
        let id1 = interner.intern("profile");
        let id2 = interner.intern("profile");
        let id3 = interner.intern("profiles");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(interner.get(id3), "profiles");
    }

    #[test]
    fn test_prelude_is_registered() {
        let interner = Interner::new();
        let before = interner.len();
        interner.intern("Query");
        assert_eq!(interner.len(), before);
        assert_eq!(before, PRELUDE.len());
    }

    #[test]
    fn test_unknown_text_resolves_empty() {
        let interner = Interner::new();
        assert_eq!(interner.get(Text::from_raw(10_000)), "");
    }
}
