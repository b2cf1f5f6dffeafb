//! Deduplicating string table and English-name suppression.

use rustc_hash::FxHashMap;

use ti_core::SEED_MODE_NAMES;

/// Insertion-ordered map from string to dense id.
///
/// Ids start at 0 and follow first registration.  [`seeded`](Self::seeded)
/// reserves ids 0..8 for the transport mode names so that route types
/// always resolve to the same ids.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    ids:     FxHashMap<String, u32>,
    strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let mut table = Self::new();
        for name in SEED_MODE_NAMES {
            table.register(name);
        }
        table
    }

    /// Id of `s`, registering it on first use.
    pub fn register(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.ids.insert(s.to_owned(), id);
        self.strings.push(s.to_owned());
        id
    }

    pub fn get(&self, s: &str) -> Option<u32> {
        self.ids.get(s).copied()
    }

    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// All strings in id order.
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }
}

/// `name_en` unless it is just the ASCII transliteration of `name`.
pub fn english_name<'a>(name: &str, name_en: Option<&'a str>) -> Option<&'a str> {
    name_en.filter(|en| *en != deunicode::deunicode(name))
}
