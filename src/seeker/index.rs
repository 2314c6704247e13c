use std::collections::HashMap;

use crate::model::CatalogTestCase;

/// Lookup from match key to the catalog test cases declaring it.
///
/// Built once per seeker so every report unit costs one hash lookup.
/// Blocked test cases are left out and can never match.
#[derive(Debug, Default)]
pub struct KeyIndex {
    keys: HashMap<String, Vec<usize>>,
    indexed_cases: usize,
}

impl KeyIndex {
    /// Index `test_cases` by the keys found in `key_field`.
    pub fn build(test_cases: &[CatalogTestCase], key_field: &str) -> Self {
        let mut index = Self::default();
        for (position, test_case) in test_cases.iter().enumerate() {
            if test_case.is_blocked() {
                continue;
            }
            let keys = test_case.match_keys(key_field);
            if keys.is_empty() {
                continue;
            }
            index.indexed_cases += 1;
            for key in keys {
                let slot = index.keys.entry(key).or_default();
                if !slot.contains(&position) {
                    slot.push(position);
                }
            }
        }
        index
    }

    /// Positions of the test cases declaring exactly `identity`.
    pub fn lookup(&self, identity: &str) -> &[usize] {
        self.keys.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of test cases with at least one key.
    pub fn indexed_cases(&self) -> usize {
        self.indexed_cases
    }
}
