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

//! Log replay: plays a recorded match back into the world.

use super::{sleep_while_running, start_gate, ListenerSet, StartGate, StartLatch, WorldSlot};
use pitchview_core::viewer::{
    ready_channel, DataSourceAdapter, ReadyNotifier, ReadySignal, SharedWorld, SourceError,
    SourceEvent, SourceListener,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Playback timing.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Delay between two consecutive messages.
    pub frame_interval: Duration,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(40),
        }
    }
}

/// Replays a line-framed log file: one message per non-empty line.
///
/// The file is opened on the caller's thread so a missing log is reported at
/// construction. The replay thread indexes the log and signals readiness,
/// then holds playback until [`start_delivery`](DataSourceAdapter::start_delivery).
pub struct LogReplayAdapter {
    path: PathBuf,
    world: WorldSlot,
    listeners: ListenerSet,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    messages: Arc<AtomicU64>,
    ready: Option<ReadySignal>,
    gate: StartGate,
    handle: Option<JoinHandle<()>>,
}

impl LogReplayAdapter {
    /// Opens `path` with default timing.
    pub fn open(path: impl AsRef<Path>, world: SharedWorld) -> Result<Self, SourceError> {
        Self::with_options(path, world, ReplayOptions::default())
    }

    /// Opens `path` and indexes it in the background.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or the thread cannot be spawned.
    pub fn with_options(
        path: impl AsRef<Path>,
        world: SharedWorld,
        options: ReplayOptions,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SourceError::Log {
            path: path.clone(),
            source,
        })?;

        let (notifier, ready) = ready_channel();
        let (gate, latch) = start_gate();
        let world = WorldSlot::new(world);
        let listeners = ListenerSet::default();
        let running = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let messages = Arc::new(AtomicU64::new(0));

        let player = Player {
            path: path.clone(),
            options,
            world: world.clone(),
            listeners: listeners.clone(),
            running: Arc::clone(&running),
            paused: Arc::clone(&paused),
            finished: Arc::clone(&finished),
            messages: Arc::clone(&messages),
        };
        let handle = thread::Builder::new()
            .name("pitchview-log-replay".to_owned())
            .spawn(move || player.run(file, notifier, latch))
            .map_err(SourceError::Spawn)?;

        log::info!("Replaying log file {}", path.display());
        Ok(Self {
            path,
            world,
            listeners,
            running,
            paused,
            finished,
            messages,
            ready: Some(ready),
            gate,
            handle: Some(handle),
        })
    }

    /// The replayed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pauses or resumes playback.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    /// Whether playback is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Whether the end of the log has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Number of messages applied so far.
    pub fn messages_played(&self) -> u64 {
        self.messages.load(Ordering::SeqCst)
    }
}

impl DataSourceAdapter for LogReplayAdapter {
    fn name(&self) -> &'static str {
        "LogReplay"
    }

    fn add_change_listener(&mut self, listener: Arc<dyn SourceListener>) {
        self.listeners.add(listener);
    }

    fn clear_change_listeners(&mut self) {
        self.listeners.clear();
    }

    fn take_ready_signal(&mut self) -> Option<ReadySignal> {
        self.ready.take()
    }

    fn start_delivery(&mut self) {
        self.gate.open();
    }

    fn attach_world(&mut self, world: SharedWorld) {
        log::debug!("Replay of {} re-anchored to a new world", self.path.display());
        self.world.replace(world);
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.gate.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Replay thread for {} panicked", self.path.display());
            }
        }
    }
}

impl Drop for LogReplayAdapter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Player {
    path: PathBuf,
    options: ReplayOptions,
    world: WorldSlot,
    listeners: ListenerSet,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    messages: Arc<AtomicU64>,
}

impl Player {
    fn run(self, file: File, notifier: ReadyNotifier, latch: StartLatch) {
        let frames = match index(file) {
            Ok(frames) => frames,
            Err(e) => {
                log::error!("Failed to read log file {}: {e}", self.path.display());
                Vec::new()
            }
        };
        log::debug!(
            "Indexed {} messages in {}",
            frames.len(),
            self.path.display()
        );
        notifier.notify();
        if !latch.wait() || !self.running.load(Ordering::Relaxed) {
            log::debug!("Replay of {} stopped before playback", self.path.display());
            return;
        }
        self.listeners.notify(&SourceEvent::PlaybackStarted {
            path: self.path.clone(),
        });

        for frame in &frames {
            while self.paused.load(Ordering::Relaxed) && self.running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(10));
            }
            if !self.running.load(Ordering::Relaxed) {
                return;
            }
            self.world.apply(frame.as_bytes());
            let messages = self.messages.fetch_add(1, Ordering::SeqCst) + 1;
            self.listeners
                .notify(&SourceEvent::StateChanged { messages });
            sleep_while_running(&self.running, self.options.frame_interval);
        }

        self.finished.store(true, Ordering::SeqCst);
        let messages = self.messages.load(Ordering::SeqCst);
        log::info!(
            "Replay of {} finished after {messages} messages",
            self.path.display()
        );
        self.listeners
            .notify(&SourceEvent::PlaybackFinished { messages });
    }
}

fn index(file: File) -> std::io::Result<Vec<String>> {
    let mut frames = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            frames.push(trimmed.to_owned());
        }
    }
    Ok(frames)
}
