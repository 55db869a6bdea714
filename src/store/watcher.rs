//! File watcher behind [`FileStore`] subscriptions
//!
//! Uses the notify crate to watch the ticket document's directory. Bursts of
//! filesystem events are collapsed into one re-read, and the resulting
//! snapshot is pushed to the subscriber.

use super::{FileStore, StoreError, StoreEvent, Subscription, TicketStore};
use crate::util::publish_or_log;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;
use tokio::sync::watch;

/// How often pending filesystem events are drained
const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(200);

/// Watch the store file and stream snapshots. Must be called inside a tokio runtime.
pub fn subscribe_to_file(store: FileStore) -> Result<Subscription, StoreError> {
    let watch_dir = store
        .path()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let file_name = store.path().file_name().map(|n| n.to_os_string());

    let (event_tx, event_rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .map_err(|e| StoreError::failed("Failed to create file watcher", e))?;

    // Watch the parent directory (file might not exist yet)
    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| StoreError::failed(&format!("Failed to watch {}", watch_dir.display()), e))?;

    let (tx, rx) = watch::channel(snapshot_event(&store));
    let task = tokio::spawn(async move {
        // Keep the watcher alive for as long as the subscription is
        let _watcher = watcher;

        let mut ticker = tokio::time::interval(DEBOUNCE_INTERVAL);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            let touched = drain_events(&event_rx, file_name.as_ref());
            if touched && !publish_or_log(&tx, snapshot_event(&store), "ticket snapshot") {
                break;
            }
        }
        tracing::debug!("Stopped watching {}", store.path().display());
    });

    Ok(Subscription::new(rx, Some(task)))
}

fn snapshot_event(store: &FileStore) -> StoreEvent {
    match store.snapshot() {
        Ok(tickets) => StoreEvent::Snapshot(tickets),
        Err(e) => {
            tracing::warn!("Failed to sync tickets: {}", e);
            StoreEvent::Error(e)
        }
    }
}

/// Drain all pending events; true if any touched the store file
fn drain_events(receiver: &Receiver<notify::Result<Event>>, file_name: Option<&OsString>) -> bool {
    let mut touched = false;

    loop {
        match receiver.try_recv() {
            Ok(Ok(event)) => {
                touched |= event
                    .paths
                    .iter()
                    .any(|p| file_name.map_or(true, |name| p.file_name() == Some(name.as_os_str())));
            }
            Ok(Err(e)) => {
                tracing::debug!("File watcher error: {}", e);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }

    touched
}
