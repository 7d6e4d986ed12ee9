//! Field Registry & Readiness
//!
//! The registry is fixed at construction: one entry per configured field
//! holding its injected frame and merchant container. `Readiness` counts
//! frames down to the single ready transition.

use std::collections::{BTreeMap, HashSet};

use hf_dom::NodeId;

use crate::FieldKey;

/// Injected frame and merchant container of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    pub frame: NodeId,
    pub container: NodeId,
}

/// Configured fields
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    entries: BTreeMap<FieldKey, FieldEntry>,
}

impl FieldRegistry {
    pub(crate) fn insert(&mut self, key: FieldKey, entry: FieldEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldEntry> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn container(&self, key: FieldKey) -> Option<NodeId> {
        self.get(key).map(|e| e.container)
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of recording one frame-ready signal
#[derive(Debug)]
pub enum ReadyOutcome<R> {
    /// Still waiting on `remaining` frames
    Waiting { remaining: usize },
    /// Last frame reported; every reply slot collected so far
    Complete(Vec<R>),
    /// Duplicate, unknown, or after completion
    Ignored,
}

/// Countdown of frames that have not reported ready.
///
/// Generic over the reply slot so it can be exercised without a bus.
#[derive(Debug)]
pub struct Readiness<R> {
    expected: HashSet<FieldKey>,
    reported: HashSet<FieldKey>,
    waiting: Vec<R>,
    complete: bool,
}

impl<R> Readiness<R> {
    pub fn new(fields: impl IntoIterator<Item = FieldKey>) -> Self {
        Self {
            expected: fields.into_iter().collect(),
            reported: HashSet::new(),
            waiting: Vec::new(),
            complete: false,
        }
    }

    /// Frames still to report
    pub fn remaining(&self) -> usize {
        self.expected.len() - self.reported.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Record that `field`'s frame is ready. Each distinct configured
    /// field counts once; completion happens exactly once.
    pub fn mark_ready(&mut self, field: FieldKey, reply: Option<R>) -> ReadyOutcome<R> {
        if self.complete || !self.expected.contains(&field) || !self.reported.insert(field) {
            return ReadyOutcome::Ignored;
        }
        self.waiting.extend(reply);

        match self.remaining() {
            0 => {
                self.complete = true;
                ReadyOutcome::Complete(std::mem::take(&mut self.waiting))
            }
            remaining => ReadyOutcome::Waiting { remaining },
        }
    }
}
