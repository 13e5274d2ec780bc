use crate::common::Result;
use crate::core::descriptor::{Descriptor, EnrolledRecord};
use crate::core::matcher::{find_closest, MatchResult, MismatchPolicy};
use parking_lot::RwLock;

/// In-memory, append-only collection of enrolled descriptors.
///
/// Appends take the write lock and every read takes the read lock, so a
/// query always scans a consistent snapshot. Contents live as long as the
/// store does; nothing is written to disk.
#[derive(Debug, Default)]
pub struct DescriptorStore {
    records: RwLock<Vec<EnrolledRecord>>,
}

impl DescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a record. On error the store is left untouched.
    pub fn enroll(&self, identity: impl Into<String>, descriptor: Descriptor) -> Result<()> {
        let record = EnrolledRecord::new(identity, descriptor)?;
        self.insert(record);
        Ok(())
    }

    /// Append a record built at the HTTP boundary.
    pub(crate) fn insert(&self, record: EnrolledRecord) {
        let mut records = self.records.write();
        tracing::debug!(
            "Enrolled '{}' ({} values, record #{})",
            record.identity(), record.descriptor().len(), records.len() + 1
        );
        records.push(record);
    }

    /// All records in insertion order.
    pub fn all(&self) -> Vec<EnrolledRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Run the matcher against the current contents without copying them.
    pub fn find_closest(
        &self,
        query: &[f32],
        threshold: f32,
        policy: MismatchPolicy,
    ) -> Result<MatchResult> {
        let records = self.records.read();
        find_closest(query, &records, threshold, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttendanceError;
    use std::sync::Arc;

    #[test]
    fn starts_empty() {
        let store = DescriptorStore::new();
        assert!(store.is_empty());
        assert!(store.all().is_empty());
    }

    #[test]
    fn lists_in_insertion_order() {
        let store = DescriptorStore::new();
        let names = ["dana", "alice", "carl", "alice"];
        for (i, name) in names.iter().enumerate() {
            store.enroll(*name, vec![i as f32, 0.0]).unwrap();
        }

        let all = store.all();
        assert_eq!(all.len(), names.len());
        for (i, (record, name)) in all.iter().zip(names).enumerate() {
            assert_eq!(record.identity(), name);
            assert_eq!(record.descriptor(), &[i as f32, 0.0]);
        }
    }

    #[test]
    fn invalid_enrollment_leaves_store_unchanged() {
        let store = DescriptorStore::new();
        store.enroll("alice", vec![0.0; 3]).unwrap();

        assert!(matches!(store.enroll("", vec![0.0; 3]), Err(AttendanceError::InvalidInput(_))));
        assert!(matches!(store.enroll("bob", vec![]), Err(AttendanceError::InvalidInput(_))));
        assert!(matches!(
            store.enroll("bob", vec![f32::NAN]),
            Err(AttendanceError::InvalidInput(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn matches_against_current_contents() {
        let store = DescriptorStore::new();
        assert_eq!(
            store.find_closest(&[0.0, 0.0, 0.0], 0.5, MismatchPolicy::Reject).unwrap(),
            MatchResult::NoMatch
        );

        store.enroll("alice", vec![0.0, 0.0, 0.0]).unwrap();
        store.enroll("bob", vec![10.0, 10.0, 10.0]).unwrap();

        let result = store.find_closest(&[0.0, 0.0, 0.0], 0.5, MismatchPolicy::Reject).unwrap();
        assert_eq!(result, MatchResult::Match { identity: "alice".into(), distance: 0.0 });
    }

    #[test]
    fn malformed_record_fails_the_query_instead_of_hiding_matches() {
        let store = DescriptorStore::new();
        store.insert(EnrolledRecord::unchecked("", vec![f32::NAN, 0.0]));
        store.enroll("alice", vec![0.0, 0.0]).unwrap();

        let err = store.find_closest(&[0.0, 0.0], 0.5, MismatchPolicy::Reject).unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[test]
    fn concurrent_enrollments_are_all_kept() {
        let store = Arc::new(DescriptorStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.enroll(format!("user-{t}-{i}"), vec![t as f32, i as f32]).unwrap();
                        store.find_closest(&[0.0, 0.0], 0.5, MismatchPolicy::Reject).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
