//! Server-sent-event rendering of live subscriptions.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::store::Subscription;

pub const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// `snapshot` event carrying the full list, or `error` when a refetch failed.
/// The stream stays open after an error; the next change brings a new snapshot.
pub fn snapshot_event<T: Serialize>(snapshot: Result<Vec<T>, AppError>) -> Event {
    let event = match snapshot {
        Ok(items) => {
            debug!(count = items.len(), "snapshot");
            Event::default().event("snapshot").json_data(&items)
        }
        Err(e) => {
            warn!(error = %e, "snapshot failed");
            Event::default()
                .event("error")
                .json_data(serde_json::json!({ "message": e.to_string() }))
        }
    };
    event.unwrap_or_else(|_| Event::default().comment("unserializable snapshot"))
}

/// Dropping the response body drops the subscription, which stops its task.
pub fn snapshots<T>(
    subscription: Subscription<Vec<T>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Send + 'static,
{
    let stream = subscription.map(|snapshot| Ok(snapshot_event(snapshot)));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("heartbeat"))
}
