//! Mutation notifications.
//!
//! The host pushes [`MutationBatch`]es into a [`MutationSender`]; a single
//! [`MutationWatcher`] drains them in delivery order and hands each inserted
//! element to the scanner. Attribute changes are not reported here.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::flags::FlagState;
use crate::scanner::{ScanReport, TreeScanner};
use crate::tree::{ContentTree, NodeId, NodeKind};

/// Nodes inserted since the previous notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub added: Vec<NodeId>,
}

impl MutationBatch {
    pub fn new(added: Vec<NodeId>) -> Self {
        Self { added }
    }
}

impl From<Vec<NodeId>> for MutationBatch {
    fn from(added: Vec<NodeId>) -> Self {
        Self { added }
    }
}

#[derive(Debug, Clone)]
pub struct MutationSender {
    tx: UnboundedSender<MutationBatch>,
}

impl MutationSender {
    /// Queue a batch. Returns `false` once the watcher has been dropped.
    pub fn send(&self, batch: impl Into<MutationBatch>) -> bool {
        self.tx.send(batch.into()).is_ok()
    }
}

#[derive(Debug)]
pub struct MutationWatcher {
    rx: UnboundedReceiver<MutationBatch>,
}

/// Create a connected sender/watcher pair.
pub fn mutation_channel() -> (MutationSender, MutationWatcher) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MutationSender { tx }, MutationWatcher { rx })
}

impl MutationWatcher {
    /// Next queued batch without waiting. `None` when the queue is empty or
    /// every sender is gone.
    pub fn try_next(&mut self) -> Option<MutationBatch> {
        match self.rx.try_recv() {
            Ok(batch) => Some(batch),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next batch. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn next(&mut self) -> Option<MutationBatch> {
        self.rx.recv().await
    }
}

/// Scan every element in `batch`; text and comment nodes are skipped.
pub fn dispatch<T: ContentTree>(
    batch: &MutationBatch,
    tree: &mut T,
    scanner: &TreeScanner<T::Query>,
    flags: &mut FlagState,
) -> ScanReport {
    let mut report = ScanReport::default();
    for &node in &batch.added {
        match tree.node_kind(node) {
            Some(NodeKind::Element) => report += scanner.scan(tree, flags, node),
            Some(NodeKind::Text | NodeKind::Comment) | None => {}
        }
    }
    report
}
