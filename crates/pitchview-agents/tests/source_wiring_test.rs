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

//! Integration tests for how the orchestrator wires data sources across
//! init, re-init and dispose.

mod common;

use common::{FactoryOptions, Trace, RecordingSourceListener, TestFactory};
use pitchview_agents::RenderOrchestrator;
use pitchview_core::config::ViewerConfig;
use pitchview_core::renderer::{VersionedSettings, Viewport};
use pitchview_core::viewer::RunMode;
use pitchview_infra::HeadlessContext;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn replay_config(path: Option<std::path::PathBuf>) -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.general.log_replay_file = path;
    config.general.replay_ready_timeout_ms = 2_000;
    config
}

// ─────────────────────────────────────────────────────────────────────
// Live
// ─────────────────────────────────────────────────────────────────────

#[test]
fn live_reinit_replaces_the_feed() {
    common::init_logging();
    let trace = Trace::new();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Live,
        ViewerConfig::default(),
        Box::new(TestFactory::new(trace.clone(), FactoryOptions::default())),
        Viewport::new(640, 480),
    );
    let mut first = HeadlessContext::default();
    orchestrator.init(Some(&mut first), &VersionedSettings::default());
    let mut second = HeadlessContext::default();
    orchestrator.init(Some(&mut second), &VersionedSettings::default());

    assert_eq!(trace.count("create live source"), 2);
    assert_eq!(trace.count("live.shutdown"), 1);
    let shutdown = trace.position("live.shutdown").unwrap();
    let lines = trace.lines();
    let second_create = lines
        .iter()
        .rposition(|l| l == "create live source")
        .unwrap();
    assert!(shutdown < second_create);
    assert_eq!(orchestrator.data_source().unwrap().name(), "live");
}

#[test]
fn delivery_starts_after_every_listener_is_registered() {
    common::init_logging();
    let trace = Trace::new();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Live,
        ViewerConfig::default(),
        Box::new(TestFactory::new(trace.clone(), FactoryOptions::default())),
        Viewport::new(640, 480),
    )
    .with_source_listener(Arc::new(RecordingSourceListener::new(trace.clone(), "host")));
    let mut ctx = HeadlessContext::default();
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());

    assert_eq!(trace.count("live.listener"), 3);
    assert_eq!(trace.count("live.start"), 1);
    let start = trace.position("live.start").unwrap();
    let lines = trace.lines();
    let last_listener = lines.iter().rposition(|l| l == "live.listener").unwrap();
    assert!(last_listener < start, "{lines:?}");
}

#[test]
fn unreachable_live_feed_leaves_the_viewer_running() {
    common::init_logging();
    let trace = Trace::new();
    let options = FactoryOptions {
        live_fails: true,
        ..Default::default()
    };
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Live,
        ViewerConfig::default(),
        Box::new(TestFactory::new(trace, options)),
        Viewport::new(640, 480),
    );
    let mut ctx = HeadlessContext::default();
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());

    assert!(orchestrator.is_initialized());
    assert!(orchestrator.data_source().is_none());
    orchestrator.render(Some(&mut ctx), &VersionedSettings::default());
    assert_eq!(orchestrator.frame_count(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────────────

#[test]
fn replay_reinit_reanchors_the_existing_adapter() {
    common::init_logging();
    let trace = Trace::new();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Replay,
        replay_config(Some("match.log".into())),
        Box::new(TestFactory::new(trace.clone(), FactoryOptions::default())),
        Viewport::new(640, 480),
    );
    let mut first = HeadlessContext::default();
    orchestrator.init(Some(&mut first), &VersionedSettings::default());
    let mut second = HeadlessContext::default();
    orchestrator.init(Some(&mut second), &VersionedSettings::default());

    assert_eq!(trace.count("create replay source"), 1);
    assert_eq!(trace.count("replay.attach world"), 1);
    assert_eq!(trace.count("replay.clear listeners"), 1);
    assert_eq!(trace.count("replay.shutdown"), 0);
    // Listeners of the second world and screen are registered after the reset.
    assert_eq!(trace.count("world#3.event connected"), 1);
    assert_eq!(trace.count("screen#4.event connected"), 1);
}

#[test]
fn replay_after_dispose_opens_a_new_adapter() {
    common::init_logging();
    let trace = Trace::new();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Replay,
        replay_config(Some("match.log".into())),
        Box::new(TestFactory::new(trace.clone(), FactoryOptions::default())),
        Viewport::new(640, 480),
    );
    let mut ctx = HeadlessContext::default();
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());
    orchestrator.dispose(Some(&mut ctx));
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());

    assert_eq!(trace.count("replay.shutdown"), 1);
    assert_eq!(trace.count("create replay source"), 2);
    assert!(orchestrator.data_source().is_some());
}

#[test]
fn replay_without_a_log_file_starts_no_source() {
    common::init_logging();
    let trace = Trace::new();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Replay,
        replay_config(None),
        Box::new(TestFactory::new(trace.clone(), FactoryOptions::default())),
        Viewport::new(640, 480),
    );
    let mut ctx = HeadlessContext::default();
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());

    assert!(orchestrator.is_initialized());
    assert!(orchestrator.data_source().is_none());
    assert_eq!(trace.count("create replay source"), 0);
}

#[test]
fn replay_plays_the_log_into_the_world() {
    let mut log = tempfile::NamedTempFile::new().unwrap();
    writeln!(log, "(time: 0.0)").unwrap();
    writeln!(log, "(time: 0.1)").unwrap();
    writeln!(log, "(time: 0.2)").unwrap();
    log.flush().unwrap();

    common::init_logging();
    let trace = Trace::new();
    let factory = TestFactory::new(
        trace.clone(),
        FactoryOptions {
            real_replay: true,
            ..Default::default()
        },
    );
    let messages = factory.messages.clone();
    let mut orchestrator = RenderOrchestrator::new(
        RunMode::Replay,
        replay_config(Some(log.path().to_path_buf())),
        Box::new(factory),
        Viewport::new(640, 480),
    );
    let mut ctx = HeadlessContext::default();
    orchestrator.init(Some(&mut ctx), &VersionedSettings::default());
    assert_eq!(orchestrator.data_source().unwrap().name(), "LogReplay");

    let deadline = Instant::now() + Duration::from_secs(5);
    while trace.count("screen#2.event playback finished") == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(messages.load(Ordering::Relaxed), 3);

    // Every listener is in place before playback begins, so none misses an event.
    for owner in ["world#1", "screen#2"] {
        assert_eq!(trace.count(&format!("{owner}.event playback started")), 1);
        assert_eq!(trace.count(&format!("{owner}.event state changed")), 3);
        assert_eq!(trace.count(&format!("{owner}.event playback finished")), 1);
    }
    let started = trace.position("world#1.event playback started").unwrap();
    let first_change = trace.position("world#1.event state changed").unwrap();
    assert!(started < first_change);

    orchestrator.dispose(Some(&mut ctx));
    assert!(orchestrator.data_source().is_none());
}
