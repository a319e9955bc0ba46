use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinHandle,
};
use tracing::debug;
use uuid::Uuid;

use super::document::Collection;
use crate::error::AppError;

const CHANGE_CAPACITY: usize = 256;
const SNAPSHOT_BUFFER: usize = 4;

/// Notification that some document of `collection` owned by `owner_id` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub owner_id: Uuid,
    pub collection: Collection,
}

#[derive(Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<Change>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(CHANGE_CAPACITY)
    }
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire and forget; nobody listening is fine.
    pub fn publish(&self, change: Change) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }

    /// Live subscriptions currently listening.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live query: yields a full snapshot immediately and a fresh one after every
/// change to the watched collection. Each item replaces the previous one.
///
/// Dropping the subscription (or calling [`Subscription::cancel`]) stops the
/// background task; no snapshot is delivered afterwards.
pub struct Subscription<T> {
    rx: mpsc::Receiver<Result<T, AppError>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Subscription<T> {
    pub(crate) fn spawn<F, Fut>(
        hub: &ChangeHub,
        owner_id: Uuid,
        collection: Collection,
        fetch: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        // subscribe before the first fetch so no change slips between the two
        let mut changes = hub.subscribe();
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);

        let task = tokio::spawn(async move {
            if tx.send(fetch().await).await.is_err() {
                return;
            }
            loop {
                match changes.recv().await {
                    Ok(change) if change.owner_id == owner_id && change.collection == collection => {}
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, collection = collection.as_str(), "subscription lagged, refetching");
                    }
                    Err(RecvError::Closed) => break,
                }
                if tx.send(fetch().await).await.is_err() {
                    break;
                }
            }
            debug!(%owner_id, collection = collection.as_str(), "subscription finished");
        });

        Self { rx, task }
    }
}

impl<T> Subscription<T> {
    /// Next snapshot, or `None` once the subscription has ended.
    pub async fn next_snapshot(&mut self) -> Option<Result<T, AppError>> {
        self.rx.recv().await
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T, AppError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
