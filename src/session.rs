//! Scan session: one content tree, its flags and its mutation queue.
//!
//! ```text
//! Init --start()--> Scanning --> Observing
//! ```
//!
//! `Observing` has no exit; it lasts until the host drops the session or
//! every [`crate::MutationSender`] is gone.

use serde::Serialize;

use crate::flags::FlagState;
use crate::scanner::{ScanReport, TreeScanner};
use crate::tree::{ContentTree, NodeId};
use crate::watcher::{self, MutationBatch, MutationWatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Init,
    Scanning,
    Observing,
}

pub struct ScanSession<T: ContentTree> {
    tree: T,
    root: Option<NodeId>,
    scanner: TreeScanner<T::Query>,
    flags: FlagState,
    watcher: Option<MutationWatcher>,
    state: SessionState,
}

impl<T: ContentTree> ScanSession<T> {
    pub fn new(tree: T, root: Option<NodeId>, scanner: TreeScanner<T::Query>) -> Self {
        Self {
            tree,
            root,
            scanner,
            flags: FlagState::new(),
            watcher: None,
            state: SessionState::Init,
        }
    }

    pub fn with_watcher(mut self, watcher: MutationWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Host-side access for inserting content between notifications.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn flags(&self) -> &FlagState {
        &self.flags
    }

    pub fn into_tree(self) -> T {
        self.tree
    }

    /// Run the initial full-tree scan and start observing. Without a root
    /// this is a no-op and the session stays in `Init`. Calling it again
    /// after the first time does nothing.
    pub fn start(&mut self) -> ScanReport {
        if self.state != SessionState::Init {
            return ScanReport::default();
        }
        let Some(root) = self.root else {
            tracing::debug!("no tree root; skipping initial scan");
            return ScanReport::default();
        };

        self.transition(SessionState::Scanning);
        let report = self.scanner.scan(&mut self.tree, &mut self.flags, root);
        self.transition(SessionState::Observing);
        report
    }

    /// Scan the nodes of one batch. Outside `Observing` the batch is
    /// dropped unscanned.
    pub fn handle_batch(&mut self, batch: &MutationBatch) -> ScanReport {
        if self.state != SessionState::Observing {
            tracing::debug!(state = ?self.state, added = batch.added.len(), "dropping batch");
            return ScanReport::default();
        }
        watcher::dispatch(batch, &mut self.tree, &self.scanner, &mut self.flags)
    }

    /// Drain every batch already queued without waiting. Before the session
    /// is observing, batches stay queued.
    pub fn process_pending(&mut self) -> ScanReport {
        let mut report = ScanReport::default();
        if self.state != SessionState::Observing {
            return report;
        }
        while let Some(batch) = self.watcher.as_mut().and_then(MutationWatcher::try_next) {
            report += self.handle_batch(&batch);
        }
        report
    }

    /// Consume batches until every sender is dropped. Starts the session
    /// first if needed and returns at once if it could not start. Returns
    /// the totals over the whole run.
    pub async fn run(&mut self) -> ScanReport {
        let mut report = self.start();
        if self.state != SessionState::Observing {
            return report;
        }
        let Some(mut watcher) = self.watcher.take() else {
            tracing::debug!("no mutation subscription; nothing to observe");
            return report;
        };
        while let Some(batch) = watcher.next().await {
            report += self.handle_batch(&batch);
        }
        self.watcher = Some(watcher);
        report
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}
