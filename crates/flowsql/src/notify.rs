//! Table change notifications.
//!
//! Mutating result factories report successful changes to the connection's [`ChangeSink`].
//! [`ChangeQueue::channel`] gives a ready-made sink that forwards changes to a [`ChangeStream`].

use crate::table::Table;
use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// The kind of change applied to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// One change applied to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChange {
    pub table: Table,
    pub action: ChangeAction,
}

impl TableChange {
    pub fn new(table: Table, action: ChangeAction) -> Self {
        Self { table, action }
    }
}

/// Receives table changes after successful mutations.
///
/// `enqueue_change` is called synchronously right after the statement completes and must not
/// block.
pub trait ChangeSink: Send + Sync {
    fn enqueue_change(&self, change: TableChange);
}

/// A [`ChangeSink`] that forwards changes over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChangeQueue {
    tx: mpsc::UnboundedSender<TableChange>,
}

impl ChangeQueue {
    /// Create a queue and the stream that receives its changes.
    pub fn channel() -> (Self, ChangeStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ChangeStream { inner: rx })
    }
}

impl ChangeSink for ChangeQueue {
    fn enqueue_change(&self, change: TableChange) {
        tracing::trace!(
            target: "flowsql.notify",
            table = change.table.name(),
            action = ?change.action,
            "enqueue change"
        );
        // A dropped stream means nobody is listening any more.
        let _ = self.tx.send(change);
    }
}

/// Stream of [`TableChange`]s from a [`ChangeQueue`].
#[must_use]
#[derive(Debug)]
pub struct ChangeStream {
    inner: mpsc::UnboundedReceiver<TableChange>,
}

impl ChangeStream {
    /// Wait for the next change. `None` once every queue handle is dropped.
    pub async fn next(&mut self) -> Option<TableChange> {
        self.inner.recv().await
    }

    /// Take a change if one is already queued.
    pub fn try_next(&mut self) -> Option<TableChange> {
        self.inner.try_recv().ok()
    }

    /// Drain every queued change without waiting.
    pub fn drain(&mut self) -> Vec<TableChange> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Stream for ChangeStream {
    type Item = TableChange;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_changes_arrive_in_order() {
        let (queue, mut stream) = ChangeQueue::channel();
        let users = Table::new("users");
        queue.enqueue_change(TableChange::new(users.clone(), ChangeAction::Insert));
        queue.enqueue_change(TableChange::new(users.clone(), ChangeAction::Delete));
        assert_eq!(
            stream.drain(),
            vec![
                TableChange::new(users.clone(), ChangeAction::Insert),
                TableChange::new(users, ChangeAction::Delete),
            ]
        );
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn enqueue_after_stream_dropped_is_silent() {
        let (queue, stream) = ChangeQueue::channel();
        drop(stream);
        queue.enqueue_change(TableChange::new(Table::new("t"), ChangeAction::Update));
    }
}
