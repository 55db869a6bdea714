//! Utility functions and helpers.

use tokio::sync::watch;

/// Publish a value on a watch channel, logging if every receiver is gone.
///
/// Returns `false` once no receiver is left so loops can stop.
pub fn publish_or_log<T>(tx: &watch::Sender<T>, value: T, context: &str) -> bool {
    match tx.send(value) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!("Dropped {}: no receivers left", context);
            false
        }
    }
}
