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

//! Data-source adapters: the ingestion actors that mutate the world.
//!
//! Each adapter runs on its own thread and only ever touches the world
//! through [`lock_world`](pitchview_core::viewer::lock_world); it never sees
//! the graphics context.

pub mod framing;
mod live;
mod replay;

pub use self::live::{LiveFeedAdapter, LiveFeedOptions};
pub use self::replay::{LogReplayAdapter, ReplayOptions};

use pitchview_core::viewer::{lock_world, SharedWorld, SourceEvent, SourceListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};

/// Observers registered on an adapter, shared with its ingestion thread.
#[derive(Clone, Default)]
struct ListenerSet {
    inner: Arc<RwLock<Vec<Arc<dyn SourceListener>>>>,
}

impl ListenerSet {
    fn add(&self, listener: Arc<dyn SourceListener>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn notify(&self, event: &SourceEvent) {
        let listeners = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_source_event(event);
        }
    }

    fn len(&self) -> usize {
        self.inner.read().map(|l| l.len()).unwrap_or(0)
    }
}

/// The owner's half of a start gate: opening it releases the ingestion thread.
struct StartGate {
    tx: Option<flume::Sender<()>>,
}

/// The ingestion thread's half of a start gate.
struct StartLatch {
    rx: flume::Receiver<()>,
}

fn start_gate() -> (StartGate, StartLatch) {
    let (tx, rx) = flume::bounded(1);
    (StartGate { tx: Some(tx) }, StartLatch { rx })
}

impl StartGate {
    /// Releases the thread. Opening twice is a no-op.
    fn open(&mut self) {
        if let Some(tx) = self.tx.take() {
            // The thread may already have exited; nothing to release then.
            let _ = tx.send(());
        }
    }

    /// Releases a thread still waiting without letting it deliver anything.
    fn close(&mut self) {
        self.tx = None;
    }
}

impl StartLatch {
    /// Blocks until the gate opens. Returns `false` if it was closed instead.
    fn wait(&self) -> bool {
        self.rx.recv().is_ok()
    }
}

/// The world an adapter currently writes into. Swapped by `attach_world`.
#[derive(Clone)]
struct WorldSlot {
    inner: Arc<Mutex<SharedWorld>>,
}

impl WorldSlot {
    fn new(world: SharedWorld) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    fn replace(&self, world: SharedWorld) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = world;
    }

    fn current(&self) -> SharedWorld {
        Arc::clone(&self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Applies one message under the frame-granularity world lock.
    fn apply(&self, message: &[u8]) {
        let world = self.current();
        lock_world(&world).apply_message(message);
    }
}

/// Sleeps for `duration` in short slices, returning early once `running` clears.
fn sleep_while_running(running: &AtomicBool, duration: Duration) {
    const SLICE: Duration = Duration::from_millis(10);
    let deadline = Instant::now() + duration;
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(SLICE.min(deadline - now));
    }
}
