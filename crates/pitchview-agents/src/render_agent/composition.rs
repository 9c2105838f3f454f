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

//! Composition of a single frame from the active lanes.

use super::SceneTargets;
use pitchview_core::math::Mat4;
use pitchview_core::renderer::{
    ClearFlags, DrawBuffer, Eye, FramebufferBinding, GraphicsContext, GraphicsSettings,
    RenderState, TextureId, Viewport,
};
use pitchview_core::viewer::{
    CameraController, DrawingStore, OverlayFrame, Screen, TextRenderer, WorldState,
};
use pitchview_lanes::effect_lane::BloomCompositor;
use pitchview_lanes::{EffectPipeline, RenderTarget, SceneFrame, SceneLane};

/// Everything one frame is drawn from, borrowed for the duration of the frame.
pub(crate) struct FrameInputs<'a> {
    pub world: &'a dyn WorldState,
    pub drawings: &'a dyn DrawingStore,
    pub camera: &'a dyn CameraController,
    pub strategy: &'a dyn SceneLane,
    pub effects: &'a EffectPipeline,
    pub targets: &'a SceneTargets,
    pub settings: &'a GraphicsSettings,
    pub viewport: Viewport,
    pub screen: Option<&'a mut dyn Screen>,
    pub text: Option<&'a dyn TextRenderer>,
}

/// What a composed frame actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FrameReport {
    pub views: usize,
    pub shadow_pass: bool,
    pub post_processed: bool,
}

/// Draws the shadow pre-pass, the scene for every eye, and the overlay.
pub(crate) fn compose_frame(ctx: &mut dyn GraphicsContext, inputs: FrameInputs<'_>) -> FrameReport {
    let mut report = FrameReport::default();

    let shadow_map = if inputs.settings.use_shadows {
        inputs.effects.render_shadow_map(ctx, inputs.world)
    } else {
        None
    };
    report.shadow_pass = shadow_map.is_some();

    // Offscreen only when both the stage and its input exist.
    let offscreen = inputs
        .effects
        .bloom()
        .filter(|_| inputs.settings.use_bloom)
        .zip(inputs.targets.draw_target());

    for &eye in Eye::views(inputs.settings.use_stereo) {
        match offscreen {
            Some((_, draw_target)) => draw_target.bind_and_clear(ctx),
            None => bind_visible(ctx, eye.draw_buffer(), inputs.viewport),
        }

        inputs.camera.apply(ctx, eye, inputs.viewport);
        ctx.set_render_state(RenderState::SCENE);
        inputs.strategy.render(
            ctx,
            &SceneFrame {
                world: inputs.world,
                drawings: inputs.drawings,
                eye,
                shadow_map,
            },
        );

        if let Some((bloom, _)) = offscreen {
            report.post_processed |= post_process(ctx, bloom, inputs.targets, eye, inputs.viewport);
        }
        report.views += 1;
    }

    if let Some(screen) = inputs.screen {
        draw_overlay(ctx, screen, inputs.text, inputs.viewport);
    }
    report
}

fn bind_visible(ctx: &mut dyn GraphicsContext, draw_buffer: DrawBuffer, viewport: Viewport) {
    RenderTarget::unbind(ctx);
    ctx.set_draw_buffer(draw_buffer);
    ctx.set_viewport(viewport);
    ctx.clear(ClearFlags::COLOR_DEPTH);
}

/// Resolves the scene, runs bloom over it and presents the result for `eye`.
///
/// Returns whether bloom ran; on failure the raw scene color is presented.
fn post_process(
    ctx: &mut dyn GraphicsContext,
    bloom: &BloomCompositor,
    targets: &SceneTargets,
    eye: Eye,
    viewport: Viewport,
) -> bool {
    if let Err(e) = targets.resolve(ctx) {
        log::error!("Failed to resolve the multisampled scene: {e}");
    }
    RenderTarget::unbind(ctx);
    let Some(scene) = targets.scene() else {
        return false;
    };

    let (image, bloomed) = match bloom.process(ctx, scene.color_texture()) {
        Ok(composite) => (composite, true),
        Err(e) => {
            log::error!("Bloom stage failed: {e}");
            (scene.color_texture(), false)
        }
    };
    present(ctx, image, eye.draw_buffer(), viewport);
    bloomed
}

fn present(ctx: &mut dyn GraphicsContext, image: TextureId, draw_buffer: DrawBuffer, viewport: Viewport) {
    ctx.bind_framebuffer(FramebufferBinding::Default);
    ctx.set_draw_buffer(draw_buffer);
    ctx.set_viewport(viewport);
    ctx.set_render_state(RenderState::PRESENT);
    ctx.use_program(None);
    ctx.bind_texture(Some(image));
    ctx.draw_fullscreen_quad();
    ctx.bind_texture(None);
}

/// Draws the 2D interface over the whole surface, then restores the prior state.
fn draw_overlay(
    ctx: &mut dyn GraphicsContext,
    screen: &mut dyn Screen,
    text: Option<&dyn TextRenderer>,
    viewport: Viewport,
) {
    ctx.bind_framebuffer(FramebufferBinding::Default);
    ctx.set_draw_buffer(DrawBuffer::Back);
    ctx.set_viewport(viewport);

    let previous = ctx.render_state();
    ctx.set_render_state(RenderState::OVERLAY);
    let projection = Mat4::orthographic_2d(viewport.width as f32, viewport.height as f32);
    ctx.set_projection(projection);
    ctx.set_modelview(Mat4::IDENTITY);
    screen.render(
        ctx,
        &OverlayFrame {
            projection,
            text,
            viewport,
        },
    );
    ctx.set_render_state(previous);
}
