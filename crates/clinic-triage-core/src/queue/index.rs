//! Order-statistic treap keyed by [`QueueKey`].
//!
//! Each node stores its subtree size, so insert, remove and rank queries are
//! O(log n) expected. Node priorities are derived from the arrival sequence,
//! which keeps the tree shape reproducible across runs.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::PatientId;

use super::{IndexError, IndexResult, QueueKey, QueueSnapshot};

type Link = Option<Box<Node>>;

struct Node {
    key: QueueKey,
    priority: u64,
    size: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn new(key: QueueKey) -> Box<Self> {
        Box::new(Self {
            key,
            priority: node_priority(key.arrival_sequence),
            size: 1,
            left: None,
            right: None,
        })
    }

    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

fn size(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// SplitMix64 finalizer; spreads consecutive sequences across the u64 range.
fn node_priority(sequence: u64) -> u64 {
    let mut z = sequence.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Split into (keys where `goes_left` holds, the rest).
///
/// `goes_left` must be monotone over key order: true for a prefix, false after.
fn split<F>(link: Link, goes_left: &F) -> (Link, Link)
where
    F: Fn(&QueueKey) -> bool,
{
    match link {
        None => (None, None),
        Some(mut node) => {
            if goes_left(&node.key) {
                let (left, right) = split(node.right.take(), goes_left);
                node.right = left;
                node.update();
                (Some(node), right)
            } else {
                let (left, right) = split(node.left.take(), goes_left);
                node.left = right;
                node.update();
                (left, Some(node))
            }
        }
    }
}

/// Merge two treaps where every key in `left` precedes every key in `right`.
fn merge(left: Link, right: Link) -> Link {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(mut l), Some(mut r)) => {
            if l.priority >= r.priority {
                l.right = merge(l.right.take(), Some(r));
                l.update();
                Some(l)
            } else {
                r.left = merge(Some(l), r.left.take());
                r.update();
                Some(r)
            }
        }
    }
}

/// Ordered index over Waiting patients.
#[derive(Default)]
pub struct QueueIndex {
    root: Link,
    keys: HashMap<PatientId, QueueKey>,
}

impl std::fmt::Debug for QueueIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueIndex")
            .field("len", &self.len())
            .finish()
    }
}

impl QueueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn contains(&self, id: &PatientId) -> bool {
        self.keys.contains_key(id)
    }

    /// Insert a patient. Fails if the id is already queued.
    pub fn insert(
        &mut self,
        id: PatientId,
        triage_score: u8,
        arrival_sequence: u64,
    ) -> IndexResult<()> {
        if self.keys.contains_key(&id) {
            return Err(IndexError::DuplicateKey(id));
        }

        let key = QueueKey::new(id, triage_score, arrival_sequence);
        let (left, right) = split(self.root.take(), &|k: &QueueKey| *k < key);
        self.root = merge(merge(left, Some(Node::new(key))), right);
        self.keys.insert(id, key);
        Ok(())
    }

    /// Remove a patient. Fails if the id is not queued.
    pub fn remove(&mut self, id: &PatientId) -> IndexResult<QueueKey> {
        let key = self
            .keys
            .remove(id)
            .ok_or(IndexError::NotFound(*id))?;

        let (left, rest) = split(self.root.take(), &|k: &QueueKey| *k < key);
        let (removed, right) = split(rest, &|k: &QueueKey| *k <= key);
        debug_assert_eq!(size(&removed), 1);
        self.root = merge(left, right);
        Ok(key)
    }

    /// 1-based rank of a queued patient.
    pub fn position_of(&self, id: &PatientId) -> IndexResult<u32> {
        let key = self.keys.get(id).ok_or(IndexError::NotFound(*id))?;

        let mut ahead = 0usize;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            match key.cmp(&node.key) {
                Ordering::Less => cursor = node.left.as_deref(),
                Ordering::Greater => {
                    ahead += size(&node.left) + 1;
                    cursor = node.right.as_deref();
                }
                Ordering::Equal => {
                    return Ok((ahead + size(&node.left) + 1) as u32);
                }
            }
        }

        Err(IndexError::NotFound(*id))
    }

    /// Copy the current order into an immutable snapshot.
    pub fn ordered_snapshot(&self) -> QueueSnapshot {
        let mut ids = Vec::with_capacity(self.len());
        let mut stack: Vec<&Node> = Vec::new();
        let mut cursor = self.root.as_deref();

        loop {
            while let Some(node) = cursor {
                stack.push(node);
                cursor = node.left.as_deref();
            }
            match stack.pop() {
                Some(node) => {
                    ids.push(node.key.id);
                    cursor = node.right.as_deref();
                }
                None => break,
            }
        }

        QueueSnapshot::new(ids)
    }
}
