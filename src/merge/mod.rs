//! Merge engine: one [`ResultWrapper`] per catalog test case id per scan.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Attachment, CatalogTestCase, ExecutionStatus};

/// Everything a scan found for one catalog test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultWrapper {
    pub test_case: CatalogTestCase,
    /// Status contributed by each matched key, in first-match order.
    pub key_statuses: IndexMap<String, ExecutionStatus>,
    pub attachments: Vec<Attachment>,
    pub notes: String,
}

impl ResultWrapper {
    fn new(test_case: CatalogTestCase) -> Self {
        Self {
            test_case,
            key_statuses: IndexMap::new(),
            attachments: Vec::new(),
            notes: String::new(),
        }
    }

    /// Final status: any failed key fails the test case, then any pass, then
    /// any block.
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::fold(self.key_statuses.values().copied())
    }

    /// Some keys passed while others failed.
    pub fn is_ambiguous(&self) -> bool {
        let statuses = || self.key_statuses.values();
        statuses().any(|s| *s == ExecutionStatus::Failed)
            && statuses().any(|s| *s == ExecutionStatus::Passed)
    }

    fn append_notes(&mut self, notes: &str) {
        if notes.is_empty() {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(notes);
    }
}

/// Accumulates match events. The store is owned here and only mutated
/// through [`MergeEngine::record`].
#[derive(Debug, Default)]
pub struct MergeEngine {
    wrappers: IndexMap<u32, ResultWrapper>,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match of `test_case` through `key`.
    ///
    /// The first match creates the wrapper; later ones append notes and
    /// attachments and overwrite the status of that key only.
    pub fn record(
        &mut self,
        test_case: &CatalogTestCase,
        key: &str,
        status: ExecutionStatus,
        notes: &str,
        attachments: Vec<Attachment>,
    ) {
        let wrapper = self
            .wrappers
            .entry(test_case.id)
            .or_insert_with(|| ResultWrapper::new(test_case.clone()));

        if let Some(previous) = wrapper.key_statuses.insert(key.to_string(), status) {
            if previous != status {
                tracing::debug!(
                    test_case = test_case.id,
                    key,
                    %previous,
                    %status,
                    "key status replaced by later match"
                );
            }
        }
        wrapper.append_notes(notes);
        wrapper.attachments.extend(attachments);
    }

    pub fn get(&self, test_case_id: u32) -> Option<&ResultWrapper> {
        self.wrappers.get(&test_case_id)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Wrappers in first-match order.
    pub fn wrappers(&self) -> impl Iterator<Item = &ResultWrapper> {
        self.wrappers.values()
    }

    /// Finish the scan, reporting ambiguous test cases.
    pub fn finish(self) -> Vec<ResultWrapper> {
        let wrappers: Vec<ResultWrapper> = self.wrappers.into_values().collect();
        for wrapper in wrappers.iter().filter(|w| w.is_ambiguous()) {
            let failed: Vec<&str> = wrapper
                .key_statuses
                .iter()
                .filter(|(_, s)| **s == ExecutionStatus::Failed)
                .map(|(k, _)| k.as_str())
                .collect();
            tracing::warn!(
                test_case = wrapper.test_case.id,
                name = %wrapper.test_case.name,
                failed_keys = ?failed,
                "keys disagree on status; reporting failed"
            );
        }
        wrappers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: u32) -> CatalogTestCase {
        CatalogTestCase::new(id, format!("case {}", id))
    }

    fn attachment(name: &str) -> Attachment {
        Attachment::from_bytes(name, name, "", b"data")
    }

    #[test]
    fn test_first_match_creates_wrapper() {
        let mut engine = MergeEngine::new();
        let attachments = vec![attachment("a.xml")];
        engine.record(&case(1), "a.Login", ExecutionStatus::Passed, "notes", attachments);

        let wrapper = engine.get(1).unwrap();
        assert_eq!(wrapper.status(), ExecutionStatus::Passed);
        assert_eq!(wrapper.notes, "notes");
        assert_eq!(wrapper.attachments.len(), 1);
    }

    #[test]
    fn test_later_matches_append() {
        let mut engine = MergeEngine::new();
        for file in ["a.xml", "b.xml"] {
            let notes = format!("from {}", file);
            let attachments = vec![attachment(file)];
            engine.record(&case(1), "a.Login", ExecutionStatus::Passed, &notes, attachments);
        }

        assert_eq!(engine.len(), 1);
        let wrapper = engine.get(1).unwrap();
        assert_eq!(wrapper.notes, "from a.xml\nfrom b.xml");
        let names: Vec<_> = wrapper.attachments.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_same_key_last_write_wins() {
        let mut engine = MergeEngine::new();
        engine.record(&case(1), "k", ExecutionStatus::Failed, "", Vec::new());
        engine.record(&case(1), "k", ExecutionStatus::Passed, "", Vec::new());
        let wrapper = engine.get(1).unwrap();
        assert_eq!(wrapper.key_statuses.len(), 1);
        assert_eq!(wrapper.status(), ExecutionStatus::Passed);
    }

    #[test]
    fn test_distinct_keys_fold_failure_first() {
        let mut engine = MergeEngine::new();
        engine.record(&case(1), "a", ExecutionStatus::Passed, "", Vec::new());
        engine.record(&case(1), "b", ExecutionStatus::Failed, "", Vec::new());
        engine.record(&case(1), "c", ExecutionStatus::Blocked, "", Vec::new());

        let wrapper = engine.get(1).unwrap();
        assert_eq!(wrapper.status(), ExecutionStatus::Failed);
        assert!(wrapper.is_ambiguous());
    }

    #[test]
    fn test_repeated_pass_keeps_status() {
        let events = [("a", ExecutionStatus::Passed), ("b", ExecutionStatus::Blocked)];

        let mut once = MergeEngine::new();
        for (key, status) in events {
            once.record(&case(1), key, status, "", Vec::new());
        }
        let mut twice = MergeEngine::new();
        for _ in 0..2 {
            for (key, status) in events {
                twice.record(&case(1), key, status, "", Vec::new());
            }
        }
        assert_eq!(once.get(1).unwrap().status(), twice.get(1).unwrap().status());
        assert_eq!(twice.get(1).unwrap().key_statuses.len(), 2);
    }

    #[test]
    fn test_finish_keeps_first_match_order() {
        let mut engine = MergeEngine::new();
        engine.record(&case(3), "c", ExecutionStatus::Passed, "", Vec::new());
        engine.record(&case(1), "a", ExecutionStatus::Passed, "", Vec::new());
        engine.record(&case(3), "d", ExecutionStatus::Failed, "", Vec::new());

        let ids: Vec<u32> = engine.finish().iter().map(|w| w.test_case.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
