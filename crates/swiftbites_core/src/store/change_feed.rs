//! Coarse change notifications for UI re-query.
//!
//! A notice means "entities of this kind changed, re-run your query"; it
//! carries no diff. Notices are published only after a write commits and
//! before the writer releases the store lock, so each receiver sees
//! sequences in commit order.

use crate::model::schema::EntityKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};

/// One committed write touched `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    /// Commit sequence; notices from the same write share it.
    pub sequence: u64,
    pub kind: EntityKind,
}

/// Kinds touched by the write in progress.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ChangeSet {
    kinds: BTreeSet<EntityKind>,
}

impl ChangeSet {
    pub(crate) fn touch(&mut self, kind: EntityKind) {
        self.kinds.insert(kind);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

struct Subscriber {
    kinds: BTreeSet<EntityKind>,
    sender: Sender<ChangeNotice>,
}

/// Fan-out of change notices to any number of subscribers.
pub struct ChangeFeed {
    subscribers: Mutex<Vec<Subscriber>>,
    sequence: Mutex<u64>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            sequence: Mutex::new(0),
        }
    }

    /// Subscribes to changes of `kinds`; an empty slice watches every kind.
    ///
    /// Dropping the receiver unsubscribes on the next publish.
    pub fn subscribe(&self, kinds: &[EntityKind]) -> Receiver<ChangeNotice> {
        let (sender, receiver) = mpsc::channel();
        let kinds = if kinds.is_empty() {
            EntityKind::ALL.into_iter().collect()
        } else {
            kinds.iter().copied().collect()
        };
        self.subscribers.lock().push(Subscriber { kinds, sender });
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Publishes one notice per touched kind; returns the commit sequence.
    pub(crate) fn publish(&self, changes: &ChangeSet) -> Option<u64> {
        if changes.is_empty() {
            return None;
        }

        let sequence = {
            let mut current = self.sequence.lock();
            *current += 1;
            *current
        };

        self.subscribers.lock().retain(|subscriber| {
            changes
                .kinds
                .iter()
                .filter(|kind| subscriber.kinds.contains(kind))
                .all(|kind| {
                    subscriber
                        .sender
                        .send(ChangeNotice {
                            sequence,
                            kind: *kind,
                        })
                        .is_ok()
                })
        });
        Some(sequence)
    }
}
