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

//! Defines the RenderOrchestrator, the owner of the viewer's render pipeline.

use super::composition::{compose_frame, FrameInputs};
use super::selection::select_strategy;
use super::{FrameStats, LifecycleState, SceneTargets};
use pitchview_core::config::ViewerConfig;
use pitchview_core::lane::Lane;
use pitchview_core::math::LinearRgba;
use pitchview_core::renderer::{
    reborrow_context, GraphicsContext, MultisamplePlan, RenderError, VersionedSettings, Viewport,
};
use pitchview_core::viewer::{
    lock_world, share_world, CameraController, DataSourceAdapter, DrawingStore, ResourceProvider,
    RunMode, SceneGraphRef, Screen, SharedWorld, SourceListener, SubsystemFactory,
};
use pitchview_lanes::{EffectPipeline, SceneLane};
use std::sync::Arc;
use std::time::{Duration, Instant};

// The subsystems rebuilt on every init.
struct Subsystems {
    content: Box<dyn ResourceProvider>,
    world: SharedWorld,
    drawings: Arc<dyn DrawingStore>,
    camera: Box<dyn CameraController>,
}

/// Owns the viewer's subsystems and renders frames from them.
///
/// The host shell drives it with the lifecycle calls `init`, `dispose`,
/// `reshape`, `update` and `render`, lending a [`GraphicsContext`] that may
/// be absent or invalid. Such calls are ignored instead of failing; errors
/// inside a call are logged and the remaining steps still run.
pub struct RenderOrchestrator {
    // Selects live or replay wiring for the data source and the screen.
    mode: RunMode,
    // Server endpoint, replay log and start-up timeouts.
    config: ViewerConfig,
    // Creates the subsystems on every init.
    factory: Box<dyn SubsystemFactory>,
    state: LifecycleState,
    // Drawing surface size, kept current by `reshape`.
    viewport: Viewport,
    // The settings the GPU resources were last built for.
    applied: VersionedSettings,
    multisample: MultisamplePlan,
    // Set when the viewport changed without a context to resize GPU resources in.
    resize_pending: bool,
    subsystems: Option<Subsystems>,
    // Replaced on every init in live mode, re-anchored in replay mode.
    source: Option<Box<dyn DataSourceAdapter>>,
    screen: Option<Box<dyn Screen>>,
    // Host shell observer of source events.
    host_listener: Option<Arc<dyn SourceListener>>,
    // Scene subtree carried from a disposed world into the next one.
    preserved_scene: Option<SceneGraphRef>,
    effects: EffectPipeline,
    targets: SceneTargets,
    strategy: Option<Box<dyn SceneLane>>,
    gpu_info_logged: bool,
    stats: FrameStats,
}

impl RenderOrchestrator {
    /// Creates an orchestrator that builds its subsystems with `factory`.
    ///
    /// Nothing is created until the first [`init`](Self::init).
    pub fn new(
        mode: RunMode,
        config: ViewerConfig,
        factory: Box<dyn SubsystemFactory>,
        viewport: Viewport,
    ) -> Self {
        let applied = VersionedSettings::new(config.graphics.clone());
        Self {
            mode,
            config,
            factory,
            state: LifecycleState::Uninitialized,
            viewport,
            applied,
            multisample: MultisamplePlan::default(),
            resize_pending: false,
            subsystems: None,
            source: None,
            screen: None,
            host_listener: None,
            preserved_scene: None,
            effects: EffectPipeline::new(),
            targets: SceneTargets::new(),
            strategy: None,
            gpu_info_logged: false,
            stats: FrameStats::default(),
        }
    }

    /// Registers the host shell as an observer of data source events.
    pub fn with_source_listener(mut self, listener: Arc<dyn SourceListener>) -> Self {
        self.host_listener = Some(listener);
        self
    }

    /// Builds every subsystem and the GPU resources for `settings`.
    ///
    /// Also called when the host recreated its context while the orchestrator
    /// was ready; resources of the lost context are abandoned, the scene
    /// subtree of the current world carries over into the new one.
    pub fn init(&mut self, ctx: Option<&mut dyn GraphicsContext>, settings: &VersionedSettings) {
        let Some(ctx) = ctx.filter(|c| c.is_valid()) else {
            log::warn!("Render init skipped: no valid graphics context");
            return;
        };
        if !self.state.can_transition_to(LifecycleState::Initializing) {
            log::warn!("Render init ignored while {}", self.state);
            return;
        }
        let reinit = self.state.is_ready();
        self.state = LifecycleState::Initializing;

        let mut preserved = self.preserved_scene.take();
        if reinit {
            if let Some(previous) = self.subsystems.take() {
                preserved = lock_world(&previous.world).scene_graph().or(preserved);
            }
            self.abandon_gpu_resources();
        }

        let capabilities = ctx.capabilities().clone();
        if !self.gpu_info_logged {
            log::info!("GPU: {}", capabilities.summary());
            self.gpu_info_logged = true;
        }

        let mut content = self.factory.create_resource_provider();
        if !content.init(ctx, &capabilities) {
            log::error!("Failed to load viewer resources; continuing with what is available");
        }
        let world = share_world(self.factory.create_world(self.mode, content.as_ref()));
        let drawings = self.factory.create_drawings();
        let camera = self.factory.create_camera(self.viewport);

        self.connect_source(&world);
        let mut screen = self.factory.create_screen(self.mode);
        self.register_listeners(&world, screen.as_ref());
        if let Some(source) = self.source.as_mut() {
            source.start_delivery();
        }
        screen.window_resized(self.viewport);
        screen.set_enabled(true);
        if let Some(mut previous) = self.screen.replace(screen) {
            previous.set_enabled(false);
        }

        self.applied = settings.clone();
        self.subsystems = Some(Subsystems {
            content,
            world,
            drawings,
            camera,
        });
        self.init_effects(ctx);

        if let Some(subsystems) = &self.subsystems {
            let mut world = lock_world(&subsystems.world);
            if let Some(graph) = preserved {
                world.set_scene_graph(graph);
            }
            if let Some(listener) = subsystems.content.scene_graph_listener() {
                world.add_scene_graph_listener(listener);
            }
        }

        ctx.set_clear_color(LinearRgba::BLACK);
        self.state = LifecycleState::Ready;
        log::info!("Initialization successful");
    }

    /// Releases the data source, the world, the effect stages, the content,
    /// the scene targets and the strategy, in that order.
    ///
    /// Every step runs even if an earlier one failed. Without a context the
    /// GPU-side releases fail and are logged; the subsystems are dropped anyway.
    pub fn dispose(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) {
        if !self.state.can_transition_to(LifecycleState::Disposing) {
            log::debug!("Render dispose ignored while {}", self.state);
            return;
        }
        self.state = LifecycleState::Disposing;

        if let Some(mut source) = self.source.take() {
            source.shutdown();
        }

        let subsystems = self.subsystems.take();
        if let Some(subsystems) = &subsystems {
            let mut world = lock_world(&subsystems.world);
            self.preserved_scene = world.scene_graph();
            if let Err(e) = world.dispose(reborrow_context(&mut ctx)) {
                log::error!("Failed to release the world: {e}");
            }
        }

        if let Err(e) = self.effects.dispose(reborrow_context(&mut ctx)) {
            log::error!("Failed to release effect stages: {e}");
        }

        if let Some(mut subsystems) = subsystems {
            if let Err(e) = subsystems.content.dispose(reborrow_context(&mut ctx)) {
                log::error!("Failed to release viewer resources: {e}");
            }
        }

        if let Err(e) = self.targets.dispose(reborrow_context(&mut ctx)) {
            log::error!("Failed to release scene targets: {e}");
        }

        if let Some(mut strategy) = self.strategy.take() {
            if let Err(e) = strategy.dispose(ctx) {
                log::error!(
                    "Failed to release the {} scene strategy: {e}",
                    strategy.strategy_name()
                );
            }
        }

        if let Some(mut screen) = self.screen.take() {
            screen.set_enabled(false);
        }
        self.state = LifecycleState::Disposed;
        log::info!("Render resources released");
    }

    /// Records the new surface size and resizes everything that depends on it.
    pub fn reshape(&mut self, ctx: Option<&mut dyn GraphicsContext>, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        self.viewport = viewport;
        if !self.state.is_ready() {
            return;
        }

        if let Some(subsystems) = self.subsystems.as_mut() {
            subsystems.camera.window_resized(viewport);
        }
        if let Some(screen) = self.screen.as_mut() {
            screen.window_resized(viewport);
        }

        let Some(ctx) = ctx.filter(|c| c.is_valid()) else {
            log::debug!("Reshape to {width}x{height} without a valid context; resizing on the next frame");
            self.resize_pending = true;
            return;
        };
        self.resize_gpu_resources(ctx);
        log::debug!("Reshaped to {width}x{height}");
    }

    /// Advances the content, the camera, the world and the drawings, in that order.
    pub fn update(&mut self, mut ctx: Option<&mut dyn GraphicsContext>, elapsed_ms: f64) {
        if !self.state.is_ready() {
            return;
        }
        let Some(subsystems) = self.subsystems.as_mut() else {
            return;
        };
        subsystems.content.update(reborrow_context(&mut ctx));
        subsystems.camera.update(elapsed_ms);
        lock_world(&subsystems.world).update(ctx, elapsed_ms);
        subsystems.drawings.update();
    }

    /// Renders one frame.
    ///
    /// If `settings` carries a different version than the one the resources
    /// were built for, they are rebuilt first, exactly once. The world stays
    /// locked for the whole frame.
    pub fn render(&mut self, ctx: Option<&mut dyn GraphicsContext>, settings: &VersionedSettings) {
        let Some(ctx) = ctx.filter(|c| c.is_valid()) else {
            return;
        };
        if !self.state.is_ready() {
            return;
        }
        let start = Instant::now();
        if settings.version != self.applied.version {
            self.reconfigure(ctx, settings);
        }
        if self.resize_pending {
            self.resize_gpu_resources(ctx);
        }

        let (Some(subsystems), Some(strategy)) = (self.subsystems.as_ref(), self.strategy.as_deref())
        else {
            return;
        };
        let strategy_name = strategy.strategy_name();
        let text = subsystems.content.text_renderer();
        let screen: Option<&mut dyn Screen> = match self.screen.as_mut() {
            Some(screen) => Some(&mut **screen),
            None => None,
        };

        let world = lock_world(&subsystems.world);
        let report = compose_frame(
            ctx,
            FrameInputs {
                world: &**world,
                drawings: subsystems.drawings.as_ref(),
                camera: subsystems.camera.as_ref(),
                strategy,
                effects: &self.effects,
                targets: &self.targets,
                settings: &self.applied.settings,
                viewport: self.viewport,
                screen,
                text: text.as_deref(),
            },
        );
        drop(world);

        self.stats.record(start.elapsed(), strategy_name, report);
    }

    // Rebuilds the GPU resources for a new settings version.
    fn reconfigure(&mut self, ctx: &mut dyn GraphicsContext, settings: &VersionedSettings) {
        log::info!(
            "Graphics settings changed (version {} -> {}); rebuilding render resources",
            self.applied.version,
            settings.version
        );
        self.release_effects(Some(&mut *ctx));
        self.applied = settings.clone();
        self.init_effects(ctx);

        // A bloom stage that failed during the rebuild gets one more attempt.
        if self.applied.settings.use_bloom && self.effects.bloom().is_none() {
            let retried = match &self.subsystems {
                Some(subsystems) => {
                    self.effects
                        .init_bloom(ctx, subsystems.content.as_ref(), self.viewport)
                }
                None => false,
            };
            if retried {
                if let Err(e) =
                    self.targets
                        .regenerate(ctx, self.multisample.scene_samples, self.viewport)
                {
                    log::error!("Failed to create scene targets: {e}");
                }
            }
        }
        self.stats.reconfigurations += 1;
    }

    // Multisampling, swap interval, effect stages, scene targets and strategy.
    fn init_effects(&mut self, ctx: &mut dyn GraphicsContext) {
        let Some(subsystems) = &self.subsystems else {
            return;
        };
        let settings = &self.applied.settings;

        let plan = settings.multisample_plan(ctx.capabilities());
        if plan.unsupported_with_bloom && settings.use_bloom {
            log::warn!(
                "FSAA with bloom needs resolvable multisampled framebuffers, which this device lacks; FSAA disabled"
            );
        }
        ctx.set_multisample(plan.enabled);
        // Everything below is built at the current viewport.
        self.resize_pending = false;
        ctx.set_swap_interval(u32::from(settings.use_vsync));

        self.effects = EffectPipeline::init(ctx, subsystems.content.as_ref(), settings, self.viewport);
        if settings.uses_scene_targets() && self.effects.bloom().is_some() {
            if let Err(e) = self.targets.regenerate(ctx, plan.scene_samples, self.viewport) {
                log::error!("Failed to create scene targets: {e}");
            }
        }
        self.strategy = Some(select_strategy(
            ctx,
            subsystems.content.as_ref(),
            settings,
            self.effects.shadow_map(),
        ));
        self.multisample = plan;
    }

    // Brings the viewport-sized GPU resources to the current viewport.
    fn resize_gpu_resources(&mut self, ctx: &mut dyn GraphicsContext) {
        self.resize_pending = false;
        ctx.set_viewport(self.viewport);
        if self.wants_scene_targets() {
            if let Err(e) = self
                .targets
                .regenerate(ctx, self.multisample.scene_samples, self.viewport)
            {
                log::error!("Failed to regenerate scene targets: {e}");
            }
        }
        self.effects.window_resized(ctx, self.viewport);
    }

    // Only the bloom stage reads the offscreen scene.
    fn wants_scene_targets(&self) -> bool {
        self.applied.settings.uses_scene_targets() && self.effects.bloom().is_some()
    }

    // Releases what `init_effects` built.
    fn release_effects(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) {
        if let Err(e) = self.effects.dispose(reborrow_context(&mut ctx)) {
            log::error!("Failed to release effect stages: {e}");
        }
        if let Err(e) = self.targets.dispose(reborrow_context(&mut ctx)) {
            log::error!("Failed to release scene targets: {e}");
        }
        if let Some(mut strategy) = self.strategy.take() {
            if let Err(e) = strategy.dispose(ctx) {
                log::error!(
                    "Failed to release the {} scene strategy: {e}",
                    strategy.strategy_name()
                );
            }
        }
    }

    // The context these handles belonged to is gone; forget them without releasing.
    fn abandon_gpu_resources(&mut self) {
        log::debug!("Discarding GPU resources of the previous graphics context");
        self.effects = EffectPipeline::new();
        self.targets = SceneTargets::new();
        self.strategy = None;
    }

    fn connect_source(&mut self, world: &SharedWorld) {
        match self.mode {
            RunMode::Live => {
                if let Some(mut previous) = self.source.take() {
                    previous.shutdown();
                }
                match self
                    .factory
                    .create_live_source(&self.config.server, world.clone())
                {
                    Ok(source) => {
                        log::info!(
                            "{} connecting to {}",
                            source.name(),
                            self.config.server.endpoint()
                        );
                        self.source = Some(source);
                    }
                    Err(e) => log::error!("Failed to start the live feed: {e}"),
                }
            }
            RunMode::Replay => {
                if let Some(source) = self.source.as_mut() {
                    source.clear_change_listeners();
                    source.attach_world(world.clone());
                    return;
                }
                let Some(path) = self.config.general.log_replay_file.clone() else {
                    log::error!("Replay mode needs a log file; no data source started");
                    return;
                };
                match self.factory.create_replay_source(&path, world.clone()) {
                    Ok(mut source) => {
                        if let Some(ready) = source.take_ready_signal() {
                            let timeout =
                                Duration::from_millis(self.config.general.replay_ready_timeout_ms);
                            if !ready.wait(timeout) {
                                log::warn!(
                                    "{} not ready after {timeout:?}; continuing",
                                    source.name()
                                );
                            }
                        }
                        self.source = Some(source);
                    }
                    Err(e) => log::error!("Failed to open replay log {}: {e}", path.display()),
                }
            }
        }
    }

    fn register_listeners(&mut self, world: &SharedWorld, screen: &dyn Screen) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let listeners = [
            lock_world(world).source_listener(),
            screen.source_listener(),
            self.host_listener.clone(),
        ];
        for listener in listeners.into_iter().flatten() {
            source.add_change_listener(listener);
        }
    }

    /// The run mode chosen at construction.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// The current lifecycle phase.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether frames can be rendered.
    pub fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    /// The current drawing surface size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The settings the GPU resources were last built for.
    pub fn applied_settings(&self) -> &VersionedSettings {
        &self.applied
    }

    /// How multisampling was applied for the current settings.
    pub fn multisample_plan(&self) -> MultisamplePlan {
        self.multisample
    }

    /// Returns the world model.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before `init` or after `dispose`.
    pub fn world(&self) -> Result<&SharedWorld, RenderError> {
        self.subsystems
            .as_ref()
            .map(|s| &s.world)
            .ok_or(RenderError::NotInitialized("world"))
    }

    /// Returns the resource provider.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before `init` or after `dispose`.
    pub fn content(&self) -> Result<&dyn ResourceProvider, RenderError> {
        self.subsystems
            .as_ref()
            .map(|s| s.content.as_ref())
            .ok_or(RenderError::NotInitialized("resource provider"))
    }

    /// Returns the camera controller.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before `init` or after `dispose`.
    pub fn camera(&self) -> Result<&dyn CameraController, RenderError> {
        self.subsystems
            .as_ref()
            .map(|s| s.camera.as_ref())
            .ok_or(RenderError::NotInitialized("camera"))
    }

    /// Returns the drawing store.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before `init` or after `dispose`.
    pub fn drawings(&self) -> Result<&Arc<dyn DrawingStore>, RenderError> {
        self.subsystems
            .as_ref()
            .map(|s| &s.drawings)
            .ok_or(RenderError::NotInitialized("drawing store"))
    }

    /// Returns the active scene strategy.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotInitialized`] before `init` or after `dispose`.
    pub fn strategy(&self) -> Result<&dyn SceneLane, RenderError> {
        self.strategy
            .as_deref()
            .ok_or(RenderError::NotInitialized("scene strategy"))
    }

    /// The active data source, if one is running.
    pub fn data_source(&self) -> Option<&dyn DataSourceAdapter> {
        self.source.as_deref()
    }

    /// The active screen.
    pub fn screen(&self) -> Option<&dyn Screen> {
        self.screen.as_deref()
    }

    /// The effect stages of the current configuration.
    pub fn effects(&self) -> &EffectPipeline {
        &self.effects
    }

    /// The offscreen scene targets.
    pub fn targets(&self) -> &SceneTargets {
        &self.targets
    }

    /// Rendering statistics.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Returns the CPU time spent composing the last frame.
    pub fn last_frame_time(&self) -> Duration {
        self.stats.last_frame_time
    }

    /// Returns the number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.stats.frame_count
    }
}
