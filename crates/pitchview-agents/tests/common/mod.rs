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

//! Test doubles shared by the orchestrator integration tests.
//!
//! Every double writes a short line into a shared [`Trace`] so tests can
//! assert on call order across subsystems.

#![allow(dead_code)]

use pitchview_core::config::{ServerConfig, ViewerConfig};
use pitchview_core::renderer::{
    Eye, GpuCapabilities, GraphicsContext, GraphicsSettings, ResourceError, ShaderSource,
    VersionedSettings, Viewport,
};
use pitchview_core::viewer::{
    CameraController, DataSourceAdapter, DrawingStore, OverlayFrame, ResourceProvider, RunMode,
    SceneGraphListener, SceneGraphRef, ScenePass, Screen, SharedWorld, SourceError, SourceEvent,
    SourceListener, SubsystemFactory, WorldState,
};
use pitchview_infra::LogReplayAdapter;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────
// Trace
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Trace {
    lines: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl Trace {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, line: impl Into<String>) {
        self.lines.lock().unwrap().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }

    pub fn count(&self, line: &str) -> usize {
        self.lines.lock().unwrap().iter().filter(|l| *l == line).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    /// Position of the first line equal to `line`.
    pub fn position(&self, line: &str) -> Option<usize> {
        self.lines.lock().unwrap().iter().position(|l| l == line)
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// ─────────────────────────────────────────────────────────────────────
// Subsystem doubles
// ─────────────────────────────────────────────────────────────────────

pub struct TestContent {
    trace: Arc<Trace>,
    init_succeeds: bool,
    missing_shaders: Vec<String>,
    graph_listener: Arc<RecordingGraphListener>,
}

impl ResourceProvider for TestContent {
    fn init(&mut self, _ctx: &mut dyn GraphicsContext, _caps: &GpuCapabilities) -> bool {
        self.trace.record("content.init");
        self.init_succeeds
    }

    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>) {
        self.trace.record("content.update");
    }

    fn dispose(&mut self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        self.trace.record("content.dispose");
        ctx.map(|_| ()).ok_or(ResourceError::ContextLost)
    }

    fn shader_source(&self, name: &str) -> Option<ShaderSource> {
        if self.missing_shaders.iter().any(|s| s == name) {
            return None;
        }
        Some(ShaderSource::new(
            format!("// {name}.vs"),
            format!("// {name}.fs"),
        ))
    }

    fn scene_graph_listener(&self) -> Option<Arc<dyn SceneGraphListener>> {
        Some(self.graph_listener.clone())
    }
}

#[derive(Default)]
pub struct RecordingGraphListener {
    pub notified: AtomicUsize,
}

impl SceneGraphListener for RecordingGraphListener {
    fn scene_graph_changed(&self, _graph: &SceneGraphRef) {
        self.notified.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct RecordingSourceListener {
    trace: Arc<Trace>,
    owner: String,
}

impl RecordingSourceListener {
    pub fn new(trace: Arc<Trace>, owner: impl Into<String>) -> Self {
        Self {
            trace,
            owner: owner.into(),
        }
    }
}

impl SourceListener for RecordingSourceListener {
    fn on_source_event(&self, event: &SourceEvent) {
        let kind = match event {
            SourceEvent::Connected { .. } => "connected",
            SourceEvent::Disconnected { .. } => "disconnected",
            SourceEvent::PlaybackStarted { .. } => "playback started",
            SourceEvent::PlaybackFinished { .. } => "playback finished",
            SourceEvent::StateChanged { .. } => "state changed",
        };
        self.trace.record(format!("{}.event {kind}", self.owner));
    }
}

pub struct TestWorld {
    trace: Arc<Trace>,
    id: usize,
    scene_graph: Option<SceneGraphRef>,
    graph_listeners: Vec<Arc<dyn SceneGraphListener>>,
    messages: Arc<AtomicUsize>,
}

impl TestWorld {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl WorldState for TestWorld {
    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>, _elapsed_ms: f64) {
        self.trace.record("world.update");
    }

    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!("world {:?} {:?}", pass.shading, pass.eye));
    }

    fn scene_graph(&self) -> Option<SceneGraphRef> {
        self.scene_graph.clone()
    }

    fn set_scene_graph(&mut self, graph: SceneGraphRef) {
        for listener in &self.graph_listeners {
            listener.scene_graph_changed(&graph);
        }
        self.scene_graph = Some(graph);
    }

    fn add_scene_graph_listener(&mut self, listener: Arc<dyn SceneGraphListener>) {
        if let Some(graph) = &self.scene_graph {
            listener.scene_graph_changed(graph);
        }
        self.graph_listeners.push(listener);
    }

    fn source_listener(&self) -> Option<Arc<dyn SourceListener>> {
        Some(Arc::new(RecordingSourceListener {
            trace: self.trace.clone(),
            owner: format!("world#{}", self.id),
        }))
    }

    fn apply_message(&mut self, _message: &[u8]) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        self.trace.record("world.dispose");
        Ok(())
    }
}

pub struct TestDrawings {
    trace: Arc<Trace>,
}

impl DrawingStore for TestDrawings {
    fn update(&self) {
        self.trace.record("drawings.update");
    }

    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!("drawings {:?}", pass.eye));
    }
}

pub struct TestCamera {
    trace: Arc<Trace>,
}

impl CameraController for TestCamera {
    fn update(&mut self, _elapsed_ms: f64) {
        self.trace.record("camera.update");
    }

    fn apply(&self, ctx: &mut dyn GraphicsContext, eye: Eye, _viewport: Viewport) {
        ctx.insert_debug_marker(&format!("camera {eye:?}"));
    }

    fn window_resized(&mut self, viewport: Viewport) {
        self.trace.record(format!(
            "camera.resized {}x{}",
            viewport.width, viewport.height
        ));
    }
}

pub struct TestScreen {
    trace: Arc<Trace>,
    id: usize,
}

impl Screen for TestScreen {
    fn set_enabled(&mut self, enabled: bool) {
        self.trace
            .record(format!("screen#{}.enabled {enabled}", self.id));
    }

    fn window_resized(&mut self, viewport: Viewport) {
        self.trace.record(format!(
            "screen#{}.resized {}x{}",
            self.id, viewport.width, viewport.height
        ));
    }

    fn render(&mut self, ctx: &mut dyn GraphicsContext, frame: &OverlayFrame<'_>) {
        ctx.insert_debug_marker(&format!(
            "screen#{} {}x{}",
            self.id, frame.viewport.width, frame.viewport.height
        ));
    }

    fn source_listener(&self) -> Option<Arc<dyn SourceListener>> {
        Some(Arc::new(RecordingSourceListener {
            trace: self.trace.clone(),
            owner: format!("screen#{}", self.id),
        }))
    }
}

pub struct StubSource {
    trace: Arc<Trace>,
    name: &'static str,
    listeners: Vec<Arc<dyn SourceListener>>,
}

impl DataSourceAdapter for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn add_change_listener(&mut self, listener: Arc<dyn SourceListener>) {
        self.trace.record(format!("{}.listener", self.name));
        listener.on_source_event(&SourceEvent::Connected {
            endpoint: "stub".to_owned(),
        });
        self.listeners.push(listener);
    }

    fn clear_change_listeners(&mut self) {
        self.trace.record(format!("{}.clear listeners", self.name));
        self.listeners.clear();
    }

    fn start_delivery(&mut self) {
        self.trace.record(format!("{}.start", self.name));
    }

    fn attach_world(&mut self, _world: SharedWorld) {
        self.trace.record(format!("{}.attach world", self.name));
    }

    fn shutdown(&mut self) {
        self.trace.record(format!("{}.shutdown", self.name));
    }
}

// ─────────────────────────────────────────────────────────────────────
// Factory
// ─────────────────────────────────────────────────────────────────────

/// Knobs for the subsystems the factory builds.
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
    pub content_init_fails: bool,
    pub missing_shaders: Vec<String>,
    /// Seed every new world with this scene subtree.
    pub initial_scene: bool,
    /// Replay through the real log adapter instead of a stub.
    pub real_replay: bool,
    pub live_fails: bool,
}

pub struct TestFactory {
    trace: Arc<Trace>,
    options: FactoryOptions,
    pub graph_listener: Arc<RecordingGraphListener>,
    pub messages: Arc<AtomicUsize>,
}

impl TestFactory {
    pub fn new(trace: Arc<Trace>, options: FactoryOptions) -> Self {
        Self {
            trace,
            options,
            graph_listener: Arc::new(RecordingGraphListener::default()),
            messages: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SubsystemFactory for TestFactory {
    fn create_resource_provider(&mut self) -> Box<dyn ResourceProvider> {
        Box::new(TestContent {
            trace: self.trace.clone(),
            init_succeeds: !self.options.content_init_fails,
            missing_shaders: self.options.missing_shaders.clone(),
            graph_listener: self.graph_listener.clone(),
        })
    }

    fn create_world(
        &mut self,
        mode: RunMode,
        _content: &dyn ResourceProvider,
    ) -> Box<dyn WorldState> {
        let id = self.trace.next_id();
        self.trace.record(format!("create world#{id} {mode}"));
        Box::new(TestWorld {
            trace: self.trace.clone(),
            id,
            scene_graph: self
                .options
                .initial_scene
                .then(|| SceneGraphRef::new(format!("scene of world#{id}"))),
            graph_listeners: Vec::new(),
            messages: self.messages.clone(),
        })
    }

    fn create_drawings(&mut self) -> Arc<dyn DrawingStore> {
        Arc::new(TestDrawings {
            trace: self.trace.clone(),
        })
    }

    fn create_camera(&mut self, viewport: Viewport) -> Box<dyn CameraController> {
        self.trace.record(format!(
            "create camera {}x{}",
            viewport.width, viewport.height
        ));
        Box::new(TestCamera {
            trace: self.trace.clone(),
        })
    }

    fn create_live_source(
        &mut self,
        server: &ServerConfig,
        _world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError> {
        if self.options.live_fails {
            return Err(SourceError::Resolve {
                endpoint: server.endpoint(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such host"),
            });
        }
        self.trace.record("create live source");
        Ok(Box::new(StubSource {
            trace: self.trace.clone(),
            name: "live",
            listeners: Vec::new(),
        }))
    }

    fn create_replay_source(
        &mut self,
        path: &Path,
        world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError> {
        self.trace.record("create replay source");
        if self.options.real_replay {
            return Ok(Box::new(LogReplayAdapter::open(path, world)?));
        }
        Ok(Box::new(StubSource {
            trace: self.trace.clone(),
            name: "replay",
            listeners: Vec::new(),
        }))
    }

    fn create_screen(&mut self, mode: RunMode) -> Box<dyn Screen> {
        let id = self.trace.next_id();
        self.trace.record(format!("create screen#{id} {mode}"));
        Box::new(TestScreen {
            trace: self.trace.clone(),
            id,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

pub fn init_logging() {
    pitchview_infra::init_test_logging();
}

pub fn config() -> ViewerConfig {
    ViewerConfig::default()
}

pub fn settings(version: u64, edit: impl FnOnce(&mut GraphicsSettings)) -> VersionedSettings {
    let mut settings = VersionedSettings::default();
    settings.version = version;
    edit(&mut settings.settings);
    settings
}
