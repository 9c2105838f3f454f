// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::world::SharedWorld;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A state change reported by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// The live feed connected to the server.
    Connected {
        /// `host:port` of the server.
        endpoint: String,
    },
    /// The live feed lost or closed its connection.
    Disconnected {
        /// Why the connection ended, if known.
        reason: Option<String>,
    },
    /// Replay of a log file started.
    PlaybackStarted {
        /// The log file being replayed.
        path: PathBuf,
    },
    /// Replay reached the end of the log file.
    PlaybackFinished {
        /// Number of messages replayed.
        messages: u64,
    },
    /// A message was applied to the world.
    StateChanged {
        /// Running count of applied messages.
        messages: u64,
    },
}

/// Observes state changes of a data source.
pub trait SourceListener: Send + Sync {
    /// Called from the ingestion actor for every state change.
    fn on_source_event(&self, event: &SourceEvent);
}

/// Errors raised while constructing a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The replay log could not be opened or read.
    #[error("failed to read replay log '{path}': {source}")]
    Log {
        /// The log file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The live feed endpoint does not resolve to a socket address.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// `host:port` of the server.
        endpoint: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The ingestion thread could not be started.
    #[error("failed to spawn ingestion thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Signals from an adapter that its asynchronous start-up has finished.
#[derive(Debug, Clone)]
pub struct ReadyNotifier {
    tx: flume::Sender<()>,
}

impl ReadyNotifier {
    /// Marks the adapter ready. Further calls are ignored.
    pub fn notify(&self) {
        // A full or disconnected channel means someone already signalled or
        // nobody is waiting; both are fine.
        let _ = self.tx.try_send(());
    }
}

/// The waiting half of a readiness channel.
#[derive(Debug)]
pub struct ReadySignal {
    rx: flume::Receiver<()>,
}

impl ReadySignal {
    /// Blocks until the adapter is ready or `timeout` elapses.
    ///
    /// Returns `false` on timeout, or immediately if the adapter dropped its
    /// notifier without signalling.
    pub fn wait(&self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}

/// Creates a one-shot readiness channel.
pub fn ready_channel() -> (ReadyNotifier, ReadySignal) {
    let (tx, rx) = flume::bounded(1);
    (ReadyNotifier { tx }, ReadySignal { rx })
}

/// A live-feed or log-replay source driving the world from its own thread.
pub trait DataSourceAdapter: Send {
    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Registers an observer of source state changes.
    fn add_change_listener(&mut self, listener: Arc<dyn SourceListener>);

    /// Drops every registered observer.
    fn clear_change_listeners(&mut self);

    /// Takes the adapter's readiness signal, if its start-up is asynchronous.
    ///
    /// The orchestrator takes it once, right after construction, and waits
    /// on it before registering listeners and calling
    /// [`start_delivery`](Self::start_delivery).
    fn take_ready_signal(&mut self) -> Option<ReadySignal> {
        None
    }

    /// Lets the ingestion actor begin delivering messages and events.
    ///
    /// Nothing reaches the world or the listeners before this call, so every
    /// listener registered beforehand sees the first event. Calling it again
    /// has no effect.
    fn start_delivery(&mut self);

    /// Points the adapter at a new world after the orchestrator re-initialized.
    fn attach_world(&mut self, world: SharedWorld);

    /// Stops the ingestion actor and releases its I/O handles.
    fn shutdown(&mut self);
}
