//! Ordered id-to-record containers.
//!
//! A [`Roster`] maps [`WorkerId`] to [`Worker`] and remembers insertion
//! order. The company model keeps one roster each for active employees,
//! active managers, past employees and past managers. Iteration follows
//! insertion order, which is what makes dataset assembly and the attrition
//! pass reproducible.
//!
//! Invariants:
//! - an id appears at most once;
//! - `order` and `records` always hold the same set of ids.

use std::collections::BTreeMap;

use firmsim_types::{Worker, WorkerId};

use crate::error::LaborError;

/// An insertion-ordered map from worker id to record.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    /// Collection name used in error messages.
    name: &'static str,
    records: BTreeMap<WorkerId, Worker>,
    order: Vec<WorkerId>,
}

impl Roster {
    /// Create an empty roster labelled `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            records: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Collection name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::Duplicate`] if the id is already present.
    pub fn insert(&mut self, worker: Worker) -> Result<(), LaborError> {
        let id = worker.id();
        if self.records.contains_key(&id) {
            return Err(LaborError::Duplicate {
                id,
                collection: self.name,
            });
        }
        self.records.insert(id, worker);
        self.order.push(id);
        Ok(())
    }

    /// Remove and return a record.
    ///
    /// # Errors
    ///
    /// Returns [`LaborError::NotFound`] if the id is absent.
    pub fn remove(&mut self, id: WorkerId) -> Result<Worker, LaborError> {
        let worker = self.records.remove(&id).ok_or(LaborError::NotFound {
            id,
            collection: self.name,
        })?;
        self.order.retain(|other| *other != id);
        Ok(worker)
    }

    /// Look up a record.
    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.records.get(&id)
    }

    /// Whether the id is present.
    pub fn contains(&self, id: WorkerId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Record at insertion position `index`.
    pub fn get_index(&self, index: usize) -> Option<&Worker> {
        self.order.get(index).and_then(|id| self.records.get(id))
    }

    /// Insertion position of `id`.
    pub fn position(&self, id: WorkerId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    /// A frozen copy of the ids in insertion order.
    ///
    /// Passes that remove records while walking the roster iterate over this
    /// snapshot, so removals never shift which members are visited.
    pub fn snapshot_ids(&self) -> Vec<WorkerId> {
        self.order.clone()
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use firmsim_types::Value;

    use super::*;

    fn worker(id: u64) -> Worker {
        Worker::candidate(WorkerId::new(id), vec![Value::Number(1.0)], Vec::new(), 1.0, 0.0)
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut roster = Roster::new("employees");
        for id in [5, 1, 3] {
            roster.insert(worker(id)).unwrap();
        }
        let ids: Vec<u64> = roster.iter().map(|w| w.id().into_inner()).collect();
        assert_eq!(ids, vec![5, 1, 3]);
        assert_eq!(roster.get_index(1).map(Worker::id), Some(WorkerId::new(1)));
        assert_eq!(roster.position(WorkerId::new(3)), Some(2));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut roster = Roster::new("managers");
        roster.insert(worker(2)).unwrap();
        let err = roster.insert(worker(2)).unwrap_err();
        assert!(matches!(err, LaborError::Duplicate { collection: "managers", .. }));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut roster = Roster::new("employees");
        for id in [1, 2, 3, 4] {
            roster.insert(worker(id)).unwrap();
        }
        let removed = roster.remove(WorkerId::new(2)).unwrap();
        assert_eq!(removed.id(), WorkerId::new(2));
        let ids: Vec<u64> = roster.iter().map(|w| w.id().into_inner()).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(!roster.contains(WorkerId::new(2)));
    }

    #[test]
    fn removing_missing_id_fails() {
        let mut roster = Roster::new("past_employees");
        let err = roster.remove(WorkerId::new(9)).unwrap_err();
        assert!(matches!(err, LaborError::NotFound { collection: "past_employees", .. }));
    }

    #[test]
    fn snapshot_is_independent_of_later_removals() {
        let mut roster = Roster::new("employees");
        for id in [1, 2, 3] {
            roster.insert(worker(id)).unwrap();
        }
        let snapshot = roster.snapshot_ids();
        roster.remove(WorkerId::new(1)).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(roster.len(), 2);
    }
}
