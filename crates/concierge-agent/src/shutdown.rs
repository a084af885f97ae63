// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the gateway and the dispatch loop both watch.
//! Replies already being generated get a grace period to finish.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
                _ = token_clone.cancelled() => {
                    debug!("shutdown triggered elsewhere");
                    return;
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = ctrl_c => info!("received Ctrl+C, initiating shutdown"),
                _ = token_clone.cancelled() => return,
            }
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for in-flight message tasks, then aborts the rest.
pub async fn drain_tasks<T: 'static>(tasks: &mut JoinSet<T>, timeout: Duration) {
    if tasks.is_empty() {
        info!("no in-flight messages to drain");
        return;
    }

    info!(count = tasks.len(), "waiting for in-flight messages to complete");

    let drained = tokio::time::timeout(timeout, async {
        while tasks.join_next().await.is_some() {}
    })
    .await;

    if drained.is_ok() {
        info!("all in-flight messages completed");
    } else {
        warn!(
            remaining = tasks.len(),
            "timeout reached, aborting unfinished messages"
        );
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn drain_empty_set() {
        let mut tasks: JoinSet<()> = JoinSet::new();
        drain_tasks(&mut tasks, Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_quick_tasks() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { tokio::time::sleep(Duration::from_secs(1)).await });
        drain_tasks(&mut tasks, Duration::from_secs(5)).await;
        assert!(tasks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_aborts_slow_tasks() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { tokio::time::sleep(Duration::from_secs(3600)).await });
        drain_tasks(&mut tasks, Duration::from_secs(1)).await;
        assert!(tasks.is_empty());
    }
}
