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

//! Minimal subsystems for running the orchestrator without a real field scene.

use pitchview_core::config::ServerConfig;
use pitchview_core::math::{LinearRgba, Mat4};
use pitchview_core::renderer::{
    Eye, GpuCapabilities, GraphicsContext, ResourceError, ShaderSource, Viewport,
};
use pitchview_core::viewer::{
    CameraController, DataSourceAdapter, DrawingStore, OverlayFrame, ResourceProvider, RunMode,
    SceneGraphListener, SceneGraphRef, ScenePass, Screen, SharedWorld, SourceError, SourceEvent,
    SourceListener, SubsystemFactory, TextRenderer, WorldState,
};
use pitchview_infra::{LiveFeedAdapter, LogReplayAdapter};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Half the distance between the eyes, in view units.
const EYE_SEPARATION: f32 = 0.03;

/// Placeholder program sources, keyed by the names the lanes ask for.
const SHADERS: &[(&str, &str, &str)] = &[
    ("phong", "// phong.vert", "// phong.frag"),
    ("vsm_phong", "// vsm_phong.vert", "// vsm_phong.frag"),
    ("shadow_depth", "// shadow_depth.vert", "// shadow_depth.frag"),
    ("bloom_bright_pass", "// fullscreen.vert", "// bloom_bright_pass.frag"),
    ("bloom_blur", "// fullscreen.vert", "// bloom_blur.frag"),
];

#[derive(Debug, Default)]
struct MonospaceText;

impl TextRenderer for MonospaceText {
    fn draw_text(&self, ctx: &mut dyn GraphicsContext, text: &str, x: f32, y: f32, _color: LinearRgba) {
        ctx.insert_debug_marker(&format!("text @({x}, {y}): {text}"));
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }
}

#[derive(Debug, Default)]
struct DemoContent {
    loaded: bool,
}

impl ResourceProvider for DemoContent {
    fn init(&mut self, _ctx: &mut dyn GraphicsContext, capabilities: &GpuCapabilities) -> bool {
        log::debug!("Loading demo content for {}", capabilities.renderer);
        self.loaded = true;
        true
    }

    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>) {}

    fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        self.loaded = false;
        Ok(())
    }

    fn shader_source(&self, name: &str) -> Option<ShaderSource> {
        if !self.loaded {
            return None;
        }
        SHADERS
            .iter()
            .find(|(shader, _, _)| *shader == name)
            .map(|(_, vertex, fragment)| ShaderSource::new(*vertex, *fragment))
    }

    fn text_renderer(&self) -> Option<Arc<dyn TextRenderer>> {
        Some(Arc::new(MonospaceText))
    }
}

/// Counts the messages the data source delivers.
#[derive(Default)]
struct DemoWorld {
    messages: u64,
    last_message: String,
    scene_graph: Option<SceneGraphRef>,
    graph_listeners: Vec<Arc<dyn SceneGraphListener>>,
}

impl WorldState for DemoWorld {
    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>, _elapsed_ms: f64) {}

    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!(
            "field {:?} {:?} after {} messages",
            pass.shading, pass.eye, self.messages
        ));
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
        self.graph_listeners.push(listener);
    }

    fn apply_message(&mut self, message: &[u8]) {
        self.messages += 1;
        self.last_message = String::from_utf8_lossy(message).into_owned();
        log::trace!("Message {}: {}", self.messages, self.last_message);
    }
}

#[derive(Debug, Default)]
struct DemoDrawings;

impl DrawingStore for DemoDrawings {
    fn update(&self) {}

    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!("drawings {:?}", pass.eye));
    }
}

/// Slowly orbits the field.
#[derive(Debug, Default)]
struct OrbitCamera {
    angle: f32,
}

impl CameraController for OrbitCamera {
    fn update(&mut self, elapsed_ms: f64) {
        self.angle = (self.angle + elapsed_ms as f32 * 0.0005) % std::f32::consts::TAU;
    }

    fn apply(&self, ctx: &mut dyn GraphicsContext, eye: Eye, viewport: Viewport) {
        let shift = match eye {
            Eye::Mono => 0.0,
            Eye::Left => -EYE_SEPARATION,
            Eye::Right => EYE_SEPARATION,
        };
        let aspect = viewport.aspect();
        ctx.set_projection(Mat4::orthographic_rh_gl(
            -aspect + shift,
            aspect + shift,
            -1.0,
            1.0,
            0.1,
            100.0,
        ));
        let (sin, cos) = self.angle.sin_cos();
        ctx.set_modelview(Mat4::from_cols(
            [cos, 0.0, -sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [sin, 0.0, cos, 0.0],
            [0.0, 0.0, -10.0, 1.0],
        ));
    }
}

/// The latest data source status, shared between the screen and its listener.
#[derive(Debug, Default)]
struct SourceStatus {
    line: Mutex<String>,
}

impl SourceListener for SourceStatus {
    fn on_source_event(&self, event: &SourceEvent) {
        let line = match event {
            SourceEvent::Connected { endpoint } => format!("connected to {endpoint}"),
            SourceEvent::Disconnected { reason } => {
                format!("disconnected ({})", reason.as_deref().unwrap_or("closed"))
            }
            SourceEvent::PlaybackStarted { path } => format!("replaying {}", path.display()),
            SourceEvent::PlaybackFinished { messages } => {
                format!("replay finished, {messages} messages")
            }
            SourceEvent::StateChanged { messages } => format!("{messages} messages"),
        };
        *self.line.lock().unwrap_or_else(PoisonError::into_inner) = line;
    }
}

/// A one-line HUD showing the data source status.
struct StatusScreen {
    mode: RunMode,
    enabled: bool,
    status: Arc<SourceStatus>,
}

impl Screen for StatusScreen {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn window_resized(&mut self, _viewport: Viewport) {}

    fn render(&mut self, ctx: &mut dyn GraphicsContext, frame: &OverlayFrame<'_>) {
        if !self.enabled {
            return;
        }
        let Some(text) = frame.text else {
            return;
        };
        let status = self
            .status
            .line
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let line = format!("[{}] {status}", self.mode);
        let x = (frame.viewport.width as f32 - text.text_width(&line)).max(0.0) / 2.0;
        text.draw_text(ctx, &line, x, 16.0, LinearRgba::WHITE);
    }

    fn source_listener(&self) -> Option<Arc<dyn SourceListener>> {
        Some(self.status.clone())
    }
}

/// Builds the demo subsystems and the real data sources.
#[derive(Debug, Default)]
pub struct DemoFactory;

impl SubsystemFactory for DemoFactory {
    fn create_resource_provider(&mut self) -> Box<dyn ResourceProvider> {
        Box::new(DemoContent::default())
    }

    fn create_world(&mut self, _mode: RunMode, _content: &dyn ResourceProvider) -> Box<dyn WorldState> {
        Box::new(DemoWorld::default())
    }

    fn create_drawings(&mut self) -> Arc<dyn DrawingStore> {
        Arc::new(DemoDrawings)
    }

    fn create_camera(&mut self, _viewport: Viewport) -> Box<dyn CameraController> {
        Box::new(OrbitCamera::default())
    }

    fn create_live_source(
        &mut self,
        server: &ServerConfig,
        world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError> {
        Ok(Box::new(LiveFeedAdapter::start(server, world)?))
    }

    fn create_replay_source(
        &mut self,
        path: &Path,
        world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError> {
        Ok(Box::new(LogReplayAdapter::open(path, world)?))
    }

    fn create_screen(&mut self, mode: RunMode) -> Box<dyn Screen> {
        Box::new(StatusScreen {
            mode,
            enabled: false,
            status: Arc::new(SourceStatus::default()),
        })
    }
}
