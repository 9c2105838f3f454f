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

//! Integration tests for the scene strategies and effect stages, driven
//! through the headless context.

use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{
    CapabilityError, Eye, FramebufferBinding, GpuCapabilities, GraphicsContext, GraphicsSettings,
    ResourceError, ShaderSource, Viewport,
};
use pitchview_core::viewer::{
    DrawingStore, ResourceProvider, SceneGraphListener, SceneGraphRef, ScenePass, WorldState,
};
use pitchview_infra::{GpuCommand, HeadlessContext};
use pitchview_lanes::effect_lane::{
    BloomCompositor, ShadowMapGenerator, BLOOM_BLUR_SHADER, BLOOM_BRIGHT_PASS_SHADER,
    SHADOW_DEPTH_SHADER,
};
use pitchview_lanes::render_lane::{PHONG_SHADER, SHADOWED_PHONG_SHADER};
use pitchview_lanes::{EffectPipeline, SceneFrame, SceneLane, SceneLaneInit, StrategyKind};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────

struct ShaderLibrary {
    names: Vec<&'static str>,
}

impl ShaderLibrary {
    fn complete() -> Self {
        Self {
            names: vec![
                PHONG_SHADER,
                SHADOWED_PHONG_SHADER,
                SHADOW_DEPTH_SHADER,
                BLOOM_BRIGHT_PASS_SHADER,
                BLOOM_BLUR_SHADER,
            ],
        }
    }

    fn empty() -> Self {
        Self { names: Vec::new() }
    }
}

impl ResourceProvider for ShaderLibrary {
    fn init(&mut self, _ctx: &mut dyn GraphicsContext, _caps: &GpuCapabilities) -> bool {
        true
    }
    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>) {}
    fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        Ok(())
    }
    fn shader_source(&self, name: &str) -> Option<ShaderSource> {
        self.names
            .contains(&name)
            .then(|| ShaderSource::new(format!("// {name}.vs"), format!("// {name}.fs")))
    }
}

struct MarkerWorld;

impl WorldState for MarkerWorld {
    fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>, _elapsed_ms: f64) {}
    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!("world {:?} {:?}", pass.shading, pass.eye));
    }
    fn scene_graph(&self) -> Option<SceneGraphRef> {
        None
    }
    fn set_scene_graph(&mut self, _graph: SceneGraphRef) {}
    fn add_scene_graph_listener(&mut self, _listener: Arc<dyn SceneGraphListener>) {}
    fn apply_message(&mut self, _message: &[u8]) {}
}

struct MarkerDrawings;

impl DrawingStore for MarkerDrawings {
    fn update(&self) {}
    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass) {
        ctx.insert_debug_marker(&format!("drawings {:?}", pass.eye));
    }
}

fn frame<'a>(eye: Eye, shadow_map: Option<pitchview_core::renderer::TextureId>) -> SceneFrame<'a> {
    SceneFrame {
        world: &MarkerWorld,
        drawings: &MarkerDrawings,
        eye,
        shadow_map,
    }
}

// ─────────────────────────────────────────────────────────────────────
// Scene strategies
// ─────────────────────────────────────────────────────────────────────

#[test]
fn basic_lane_draws_world_then_drawings() {
    let mut ctx = HeadlessContext::new(HeadlessContext::minimal_capabilities());
    let content = ShaderLibrary::empty();
    let mut lane = StrategyKind::Basic.create_lane();
    lane.on_initialize(
        &mut ctx,
        &SceneLaneInit {
            content: &content,
            shadow_map: None,
        },
    )
    .unwrap();

    lane.render(&mut ctx, &frame(Eye::Left, None));
    assert_eq!(ctx.markers(), vec!["world Basic Left", "drawings Left"]);
    assert_eq!(lane.lane_kind(), LaneKind::Scene);
}

#[test]
fn lit_lane_requires_programmable_shaders() {
    let mut ctx = HeadlessContext::new(HeadlessContext::minimal_capabilities());
    let content = ShaderLibrary::complete();
    let mut lane = StrategyKind::Lit.create_lane();
    let err = lane
        .on_initialize(
            &mut ctx,
            &SceneLaneInit {
                content: &content,
                shadow_map: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LaneError::InitializationFailed(CapabilityError::Unsupported {
            component: "Lit",
            ..
        })
    ));
}

#[test]
fn lit_lane_reports_missing_shader() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::empty();
    let mut lane = StrategyKind::Lit.create_lane();
    let err = lane
        .on_initialize(
            &mut ctx,
            &SceneLaneInit {
                content: &content,
                shadow_map: None,
            },
        )
        .unwrap_err();
    match err {
        LaneError::InitializationFailed(CapabilityError::Resource { source, .. }) => {
            assert_eq!(source, ResourceError::MissingShader(PHONG_SHADER.to_owned()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lit_lane_binds_and_releases_its_program() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut lane = StrategyKind::Lit.create_lane();
    lane.on_initialize(
        &mut ctx,
        &SceneLaneInit {
            content: &content,
            shadow_map: None,
        },
    )
    .unwrap();
    assert_eq!(ctx.live_programs(), vec![PHONG_SHADER]);

    lane.render(&mut ctx, &frame(Eye::Mono, None));
    assert!(ctx
        .journal()
        .iter()
        .any(|c| matches!(c, GpuCommand::UseProgram(Some(_)))));
    assert_eq!(ctx.journal().last(), Some(&GpuCommand::UseProgram(None)));

    lane.dispose(Some(&mut ctx)).unwrap();
    assert!(ctx.live_programs().is_empty());
}

#[test]
fn shadow_mapped_lane_needs_a_shadow_map() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut lane = StrategyKind::ShadowMapped.create_lane();
    let err = lane
        .on_initialize(
            &mut ctx,
            &SceneLaneInit {
                content: &content,
                shadow_map: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LaneError::InitializationFailed(CapabilityError::MissingInput { .. })
    ));
    assert!(ctx.live_programs().is_empty());
}

#[test]
fn shadow_mapped_lane_samples_the_shadow_map() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut shadows = ShadowMapGenerator::new(512);
    shadows.on_initialize(&mut ctx, &content).unwrap();
    let shadow_map = shadows.shadow_map();

    let mut lane = StrategyKind::ShadowMapped.create_lane();
    lane.on_initialize(
        &mut ctx,
        &SceneLaneInit {
            content: &content,
            shadow_map,
        },
    )
    .unwrap();

    ctx.take_journal();
    lane.render(&mut ctx, &frame(Eye::Right, shadow_map));
    assert!(ctx.journal().contains(&GpuCommand::BindTexture(shadow_map)));
    assert_eq!(ctx.markers(), vec!["world PhongShadowed Right", "drawings Right"]);
}

// ─────────────────────────────────────────────────────────────────────
// Effect stages
// ─────────────────────────────────────────────────────────────────────

#[test]
fn shadow_pre_pass_renders_casters_into_its_own_target() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut shadows = ShadowMapGenerator::new(256);
    shadows.on_initialize(&mut ctx, &content).unwrap();
    let target = ctx.live_targets()[0].clone();
    assert_eq!((target.width, target.height), (256, 256));

    let map = shadows.render(&mut ctx, &MarkerWorld);
    assert_eq!(map, Some(target.allocation.color));
    assert_eq!(ctx.markers(), vec!["world ShadowCasters Mono"]);
    assert!(ctx.journal().contains(&GpuCommand::BindFramebuffer(
        FramebufferBinding::Offscreen(target.allocation.framebuffer)
    )));
    assert_eq!(ctx.framebuffer(), FramebufferBinding::Default);

    shadows.dispose(Some(&mut ctx)).unwrap();
    assert!(ctx.live_targets().is_empty());
    assert!(ctx.live_programs().is_empty());
}

#[test]
fn bloom_composites_into_a_full_size_target() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut bloom = BloomCompositor::new();
    bloom
        .on_initialize(&mut ctx, &content, Viewport::new(640, 480))
        .unwrap();

    let sizes: Vec<(u32, u32)> = ctx
        .live_targets()
        .iter()
        .map(|t| (t.width, t.height))
        .collect();
    assert_eq!(sizes, vec![(320, 240), (320, 240), (640, 480)]);
    let composite = ctx.live_targets()[2].allocation.color;

    let scene = pitchview_core::renderer::TextureId(999);
    ctx.take_journal();
    let out = bloom.process(&mut ctx, scene).unwrap();
    assert_eq!(out, composite);
    assert_eq!(
        ctx.count(|c| matches!(c, GpuCommand::DrawFullscreenQuad { .. })),
        4
    );
    assert_eq!(ctx.framebuffer(), FramebufferBinding::Default);
}

#[test]
fn bloom_rebuilds_targets_on_resize() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let mut bloom = BloomCompositor::new();
    bloom
        .on_initialize(&mut ctx, &content, Viewport::new(640, 480))
        .unwrap();

    bloom.window_resized(&mut ctx, Viewport::new(800, 600)).unwrap();
    let sizes: Vec<(u32, u32)> = ctx
        .live_targets()
        .iter()
        .map(|t| (t.width, t.height))
        .collect();
    assert_eq!(sizes, vec![(400, 300), (400, 300), (800, 600)]);
    assert_eq!(bloom.viewport(), Viewport::new(800, 600));
}

#[test]
fn bloom_process_before_initialization_fails() {
    let mut ctx = HeadlessContext::default();
    let bloom = BloomCompositor::new();
    assert!(matches!(
        bloom.process(&mut ctx, pitchview_core::renderer::TextureId(1)),
        Err(LaneError::NotInitialized(_))
    ));
}

#[test]
fn pipeline_builds_enabled_stages_and_disposes_everything() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let settings = GraphicsSettings {
        use_shadows: true,
        use_bloom: true,
        ..Default::default()
    };
    let mut pipeline = EffectPipeline::init(&mut ctx, &content, &settings, Viewport::new(64, 64));
    assert!(pipeline.shadow().is_some());
    assert!(pipeline.bloom().is_some());
    assert!(pipeline.shadow_map().is_some());

    pipeline.dispose(Some(&mut ctx)).unwrap();
    assert!(pipeline.shadow().is_none());
    assert!(pipeline.bloom().is_none());
    assert!(ctx.live_targets().is_empty());
    assert!(ctx.live_programs().is_empty());
}

#[test]
fn pipeline_leaves_out_stages_the_device_cannot_build() {
    let mut ctx = HeadlessContext::new(HeadlessContext::minimal_capabilities());
    let content = ShaderLibrary::complete();
    let settings = GraphicsSettings {
        use_shadows: true,
        use_bloom: true,
        ..Default::default()
    };
    let pipeline = EffectPipeline::init(&mut ctx, &content, &settings, Viewport::new(64, 64));
    assert!(pipeline.shadow().is_none());
    assert!(pipeline.bloom().is_none());
    assert!(ctx.live_targets().is_empty());
}

#[test]
fn pipeline_dispose_without_context_still_clears_stages() {
    let mut ctx = HeadlessContext::default();
    let content = ShaderLibrary::complete();
    let settings = GraphicsSettings {
        use_bloom: true,
        ..Default::default()
    };
    let mut pipeline = EffectPipeline::init(&mut ctx, &content, &settings, Viewport::new(64, 64));
    assert_eq!(pipeline.dispose(None), Err(ResourceError::ContextLost));
    assert!(pipeline.bloom().is_none());
}
