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

//! The live feed: a TCP client of the simulation server's monitor port.

use super::framing::FrameDecoder;
use super::{sleep_while_running, start_gate, ListenerSet, StartGate, StartLatch, WorldSlot};
use pitchview_core::config::ServerConfig;
use pitchview_core::viewer::{
    DataSourceAdapter, SharedWorld, SourceError, SourceEvent, SourceListener,
};
use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Timing of the live feed's connection handling.
#[derive(Debug, Clone)]
pub struct LiveFeedOptions {
    /// Pause between connection attempts.
    pub reconnect_interval: Duration,
    /// Upper bound on a single connection attempt.
    pub connect_timeout: Duration,
    /// Socket read timeout; bounds how long `shutdown` waits for the thread.
    pub read_timeout: Duration,
}

impl Default for LiveFeedOptions {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_secs(1),
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Receives length-prefixed messages from the server and applies them to the world.
///
/// The adapter connects in the background and reconnects after the server
/// goes away, so construction never blocks on the network. The first
/// connection attempt waits for [`start_delivery`](DataSourceAdapter::start_delivery).
pub struct LiveFeedAdapter {
    endpoint: String,
    world: WorldSlot,
    listeners: ListenerSet,
    running: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    messages: Arc<AtomicU64>,
    gate: StartGate,
    handle: Option<JoinHandle<()>>,
}

impl LiveFeedAdapter {
    /// Creates the feed for `server` with default timing.
    pub fn start(server: &ServerConfig, world: SharedWorld) -> Result<Self, SourceError> {
        Self::with_options(server, world, LiveFeedOptions::default())
    }

    /// Creates the feed for `server`; it connects once delivery starts.
    ///
    /// # Errors
    ///
    /// Fails if the endpoint does not resolve or the thread cannot be spawned.
    pub fn with_options(
        server: &ServerConfig,
        world: SharedWorld,
        options: LiveFeedOptions,
    ) -> Result<Self, SourceError> {
        let endpoint = server.endpoint();
        let address = resolve(&endpoint)?;

        let world = WorldSlot::new(world);
        let listeners = ListenerSet::default();
        let running = Arc::new(AtomicBool::new(true));
        let connected = Arc::new(AtomicBool::new(false));
        let messages = Arc::new(AtomicU64::new(0));
        let (gate, latch) = start_gate();

        let worker = Worker {
            endpoint: endpoint.clone(),
            address,
            options,
            world: world.clone(),
            listeners: listeners.clone(),
            running: Arc::clone(&running),
            connected: Arc::clone(&connected),
            messages: Arc::clone(&messages),
        };
        let handle = thread::Builder::new()
            .name("pitchview-live-feed".to_owned())
            .spawn(move || worker.run(latch))
            .map_err(SourceError::Spawn)?;

        log::info!("Live feed started for {endpoint}");
        Ok(Self {
            endpoint,
            world,
            listeners,
            running,
            connected,
            messages,
            gate,
            handle: Some(handle),
        })
    }

    /// `host:port` of the server.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of messages applied since start.
    pub fn messages_received(&self) -> u64 {
        self.messages.load(Ordering::SeqCst)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl DataSourceAdapter for LiveFeedAdapter {
    fn name(&self) -> &'static str {
        "LiveFeed"
    }

    fn add_change_listener(&mut self, listener: Arc<dyn SourceListener>) {
        self.listeners.add(listener);
    }

    fn clear_change_listeners(&mut self) {
        self.listeners.clear();
    }

    fn start_delivery(&mut self) {
        self.gate.open();
    }

    fn attach_world(&mut self, world: SharedWorld) {
        self.world.replace(world);
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.gate.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Live feed thread for {} panicked", self.endpoint);
            } else {
                log::info!("Live feed for {} stopped", self.endpoint);
            }
        }
    }
}

impl Drop for LiveFeedAdapter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn resolve(endpoint: &str) -> Result<SocketAddr, SourceError> {
    let mut addresses = endpoint
        .to_socket_addrs()
        .map_err(|source| SourceError::Resolve {
            endpoint: endpoint.to_owned(),
            source,
        })?;
    addresses.next().ok_or_else(|| SourceError::Resolve {
        endpoint: endpoint.to_owned(),
        source: std::io::Error::new(ErrorKind::NotFound, "no addresses"),
    })
}

struct Worker {
    endpoint: String,
    address: SocketAddr,
    options: LiveFeedOptions,
    world: WorldSlot,
    listeners: ListenerSet,
    running: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    messages: Arc<AtomicU64>,
}

impl Worker {
    fn run(self, latch: StartLatch) {
        if !latch.wait() {
            return;
        }
        log::debug!("Live feed thread started.");
        while self.running.load(Ordering::Relaxed) {
            match TcpStream::connect_timeout(&self.address, self.options.connect_timeout) {
                Ok(stream) => {
                    self.connected.store(true, Ordering::SeqCst);
                    log::info!("Connected to {}", self.endpoint);
                    self.listeners.notify(&SourceEvent::Connected {
                        endpoint: self.endpoint.clone(),
                    });

                    let reason = self.pump(stream);

                    self.connected.store(false, Ordering::SeqCst);
                    if let Some(reason) = &reason {
                        log::warn!("Disconnected from {}: {reason}", self.endpoint);
                    }
                    self.listeners.notify(&SourceEvent::Disconnected { reason });
                }
                Err(e) => log::trace!("Connection to {} failed: {e}", self.endpoint),
            }
            sleep_while_running(&self.running, self.options.reconnect_interval);
        }
        log::debug!("Live feed thread stopped.");
    }

    /// Reads frames until the connection ends. Returns why it ended, or `None`
    /// if the adapter was shut down.
    fn pump(&self, mut stream: TcpStream) -> Option<String> {
        if let Err(e) = stream.set_read_timeout(Some(self.options.read_timeout)) {
            return Some(e.to_string());
        }
        let mut decoder = FrameDecoder::new();
        let mut chunk = [0u8; 8192];

        while self.running.load(Ordering::Relaxed) {
            match stream.read(&mut chunk) {
                Ok(0) => return Some("connection closed by server".to_owned()),
                Ok(n) => {
                    decoder.push(&chunk[..n]);
                    loop {
                        match decoder.next_frame() {
                            Ok(Some(frame)) => self.apply(&frame),
                            Ok(None) => break,
                            Err(e) => return Some(e.to_string()),
                        }
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Some(e.to_string()),
            }
        }
        None
    }

    fn apply(&self, frame: &[u8]) {
        self.world.apply(frame);
        let messages = self.messages.fetch_add(1, Ordering::SeqCst) + 1;
        self.listeners
            .notify(&SourceEvent::StateChanged { messages });
    }
}
