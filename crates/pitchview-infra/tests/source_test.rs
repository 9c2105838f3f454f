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

//! Integration tests for the live-feed and log-replay adapters.

use pitchview_core::config::ServerConfig;
use pitchview_core::renderer::GraphicsContext;
use pitchview_core::viewer::{
    share_world, DataSourceAdapter, SceneGraphListener, SceneGraphRef, ScenePass,
    SharedWorld, SourceEvent, SourceListener, WorldState,
};
use pitchview_infra::source::framing::encode_frame;
use pitchview_infra::source::{LiveFeedOptions, ReplayOptions};
use pitchview_infra::{LiveFeedAdapter, LogReplayAdapter};
use std::io::Write;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MessageLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WorldState for MessageLog {
    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>, _elapsed_ms: f64) {}
    fn render(&self, _ctx: &mut dyn GraphicsContext, _pass: &ScenePass) {}
    fn scene_graph(&self) -> Option<SceneGraphRef> {
        None
    }
    fn set_scene_graph(&mut self, _graph: SceneGraphRef) {}
    fn add_scene_graph_listener(&mut self, _listener: Arc<dyn SceneGraphListener>) {}
    fn apply_message(&mut self, message: &[u8]) {
        self.messages
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(message).into_owned());
    }
}

fn message_world() -> (SharedWorld, Arc<Mutex<Vec<String>>>) {
    let log = MessageLog::default();
    let messages = Arc::clone(&log.messages);
    (share_world(Box::new(log)), messages)
}

#[derive(Default)]
struct EventLog(Mutex<Vec<SourceEvent>>);

impl SourceListener for EventLog {
    fn on_source_event(&self, event: &SourceEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl EventLog {
    fn contains(&self, predicate: impl Fn(&SourceEvent) -> bool) -> bool {
        self.0.lock().unwrap().iter().any(predicate)
    }
}

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

// ─────────────────────────────────────────────────────────────────────
// Log replay
// ─────────────────────────────────────────────────────────────────────

#[test]
fn replay_signals_ready_and_plays_every_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(time (now 0.0))").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "(time (now 0.2))").unwrap();
    writeln!(file, "(time (now 0.4))").unwrap();

    let (world, messages) = message_world();
    let options = ReplayOptions {
        frame_interval: Duration::from_millis(10),
    };
    let mut adapter = LogReplayAdapter::with_options(file.path(), world, options).unwrap();

    let ready = adapter.take_ready_signal().expect("replay exposes a ready signal");
    assert!(adapter.take_ready_signal().is_none());
    assert!(ready.wait(Duration::from_secs(5)));

    let events = Arc::new(EventLog::default());
    adapter.add_change_listener(events.clone());
    adapter.start_delivery();

    assert!(wait_until(Duration::from_secs(5), || adapter.is_finished()));
    assert_eq!(
        *messages.lock().unwrap(),
        vec!["(time (now 0.0))", "(time (now 0.2))", "(time (now 0.4))"]
    );
    assert_eq!(adapter.messages_played(), 3);
    assert!(events.contains(|e| matches!(e, SourceEvent::PlaybackStarted { .. })));
    assert!(events.contains(|e| matches!(e, SourceEvent::StateChanged { messages: 1 })));
    assert!(events.contains(|e| matches!(e, SourceEvent::PlaybackFinished { messages: 3 })));

    adapter.shutdown();
}

#[test]
fn replay_reports_missing_log() {
    let dir = tempfile::tempdir().unwrap();
    let (world, _) = message_world();
    let result = LogReplayAdapter::open(dir.path().join("missing.log"), world);
    assert!(result.is_err());
}

#[test]
fn replay_writes_into_reattached_world() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..50 {
        writeln!(file, "(frame {i})").unwrap();
    }

    let (first, first_messages) = message_world();
    let options = ReplayOptions {
        frame_interval: Duration::from_millis(2),
    };
    let mut adapter = LogReplayAdapter::with_options(file.path(), first, options).unwrap();
    adapter.start_delivery();
    adapter.set_paused(true);
    assert!(adapter.is_paused());

    let (second, second_messages) = message_world();
    adapter.attach_world(second);
    adapter.set_paused(false);

    assert!(wait_until(Duration::from_secs(5), || adapter.is_finished()));
    let total = first_messages.lock().unwrap().len() + second_messages.lock().unwrap().len();
    assert_eq!(total, 50);
    assert!(!second_messages.lock().unwrap().is_empty());
    adapter.shutdown();
}

#[test]
fn replay_shutdown_stops_playback_early() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..1000 {
        writeln!(file, "(frame {i})").unwrap();
    }
    let (world, _) = message_world();
    let options = ReplayOptions {
        frame_interval: Duration::from_millis(50),
    };
    let mut adapter = LogReplayAdapter::with_options(file.path(), world, options).unwrap();
    adapter.start_delivery();
    adapter.shutdown();
    assert!(!adapter.is_finished());
    assert!(adapter.messages_played() < 1000);
}

#[test]
fn replay_holds_playback_until_delivery_starts() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(frame 0)").unwrap();
    writeln!(file, "(frame 1)").unwrap();
    let (world, messages) = message_world();
    let options = ReplayOptions {
        frame_interval: Duration::from_millis(1),
    };
    let mut adapter = LogReplayAdapter::with_options(file.path(), world, options).unwrap();
    let ready = adapter.take_ready_signal().unwrap();
    assert!(ready.wait(Duration::from_secs(5)));

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(adapter.messages_played(), 0);
    assert!(messages.lock().unwrap().is_empty());

    // Registered after readiness, yet still sees the whole playback.
    let events = Arc::new(EventLog::default());
    adapter.add_change_listener(events.clone());
    adapter.start_delivery();
    adapter.start_delivery();

    assert!(wait_until(Duration::from_secs(5), || adapter.is_finished()));
    assert!(events.contains(|e| matches!(e, SourceEvent::PlaybackStarted { .. })));
    assert!(events.contains(|e| matches!(e, SourceEvent::StateChanged { messages: 1 })));
    assert_eq!(adapter.messages_played(), 2);
    adapter.shutdown();
}

#[test]
fn replay_shutdown_before_delivery_plays_nothing() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(frame 0)").unwrap();
    let (world, messages) = message_world();
    let mut adapter = LogReplayAdapter::open(file.path(), world).unwrap();
    let events = Arc::new(EventLog::default());
    adapter.add_change_listener(events.clone());

    adapter.shutdown();
    assert_eq!(adapter.messages_played(), 0);
    assert!(messages.lock().unwrap().is_empty());
    assert!(!events.contains(|_| true));
}

// ─────────────────────────────────────────────────────────────────────
// Live feed
// ─────────────────────────────────────────────────────────────────────

#[test]
fn live_feed_applies_framed_messages() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut wire = encode_frame(b"(GS (t 1.0))").unwrap();
        wire.extend(encode_frame(b"(GS (t 1.1))").unwrap());
        stream.write_all(&wire).unwrap();
        stream.flush().unwrap();
        std::thread::sleep(Duration::from_millis(200));
    });

    let (world, messages) = message_world();
    let config = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port,
    };
    let options = LiveFeedOptions {
        reconnect_interval: Duration::from_millis(20),
        ..Default::default()
    };
    let mut adapter = LiveFeedAdapter::with_options(&config, world, options).unwrap();
    let events = Arc::new(EventLog::default());
    adapter.add_change_listener(events.clone());
    assert_eq!(adapter.listener_count(), 1);
    adapter.start_delivery();

    assert!(wait_until(Duration::from_secs(5), || adapter.messages_received() == 2));
    assert_eq!(
        *messages.lock().unwrap(),
        vec!["(GS (t 1.0))", "(GS (t 1.1))"]
    );

    assert!(events.contains(|e| matches!(e, SourceEvent::Connected { .. })));

    server.join().unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        events.contains(|e| matches!(e, SourceEvent::Disconnected { .. }))
    }));

    adapter.shutdown();
    assert!(!adapter.is_connected());
}

#[test]
fn live_feed_rejects_unresolvable_endpoint() {
    let (world, _) = message_world();
    let config = ServerConfig {
        host: "not a host name".to_owned(),
        port: 3200,
    };
    assert!(LiveFeedAdapter::start(&config, world).is_err());
}
