//! Immutable point-in-time view of queue order.

use std::sync::Arc;

use crate::models::PatientId;

/// Patient ids in queue order, captured at a single point in time.
///
/// Cheap to clone and unaffected by later index mutations. Iteration is
/// restartable: every call to [`QueueSnapshot::iter`] starts from the head.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    ids: Arc<[PatientId]>,
}

impl QueueSnapshot {
    pub(crate) fn new(ids: Vec<PatientId>) -> Self {
        Self { ids: ids.into() }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in queue order.
    pub fn iter(&self) -> std::slice::Iter<'_, PatientId> {
        self.ids.iter()
    }

    /// Ids paired with their 1-based positions.
    pub fn positioned(&self) -> impl Iterator<Item = (u32, PatientId)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| (i as u32 + 1, *id))
    }

    pub fn as_slice(&self) -> &[PatientId] {
        &self.ids
    }
}

impl<'a> IntoIterator for &'a QueueSnapshot {
    type Item = &'a PatientId;
    type IntoIter = std::slice::Iter<'a, PatientId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
