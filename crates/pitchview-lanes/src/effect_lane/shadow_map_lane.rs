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

//! The shadow pre-pass.

use crate::render_lane::{build_program, release_program, require_feature};
use crate::RenderTarget;
use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{
    features, reborrow_context, CapabilityError, ColorFormat, GraphicsContext, ProgramId,
    RenderState, RenderTargetDescriptor, ResourceError, TextureId,
};
use pitchview_core::viewer::{ResourceProvider, ScenePass, WorldState};

/// The shader that writes depth moments for the variance shadow map.
pub const SHADOW_DEPTH_SHADER: &str = "shadow_depth";

const NAME: &str = "ShadowMap";

/// Renders shadow casters from the light into a square target it owns.
///
/// The color attachment stores depth moments (RGBA float), which is what the
/// shadow-mapped scene strategy samples.
#[derive(Debug)]
pub struct ShadowMapGenerator {
    resolution: u32,
    target: Option<RenderTarget>,
    program: Option<ProgramId>,
}

impl ShadowMapGenerator {
    /// Creates an uninitialized generator for a `resolution`² shadow map.
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution: resolution.max(1),
            target: None,
            program: None,
        }
    }

    /// Edge length of the shadow map.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// The shadow map texture, once initialized.
    pub fn shadow_map(&self) -> Option<TextureId> {
        self.target.as_ref().map(RenderTarget::color_texture)
    }

    /// Allocates the shadow map and compiles the depth program.
    ///
    /// # Errors
    ///
    /// Fails if offscreen float targets or shaders are unsupported, or if the
    /// resources cannot be created.
    pub fn on_initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        content: &dyn ResourceProvider,
    ) -> Result<(), LaneError> {
        require_feature(ctx, NAME, features::FRAMEBUFFER_OBJECT)?;
        require_feature(ctx, NAME, features::FLOAT_TEXTURES)?;
        require_feature(ctx, NAME, features::PROGRAMMABLE_SHADERS)?;

        let program = build_program(ctx, content, NAME, SHADOW_DEPTH_SHADER)?;
        let descriptor = RenderTargetDescriptor::single_sample(
            "shadow map",
            self.resolution,
            self.resolution,
            ColorFormat::Rgba,
        );
        match RenderTarget::create(ctx, &descriptor) {
            Ok(target) => {
                self.target = Some(target);
                self.program = Some(program);
                Ok(())
            }
            Err(source) => {
                if let Err(e) = ctx.destroy_program(program) {
                    log::warn!("Failed to release {SHADOW_DEPTH_SHADER} program: {e}");
                }
                Err(CapabilityError::Resource {
                    component: NAME,
                    source,
                }
                .into())
            }
        }
    }

    /// Renders the world's shadow casters and returns the shadow map.
    ///
    /// Leaves the visible framebuffer bound; the caller restores its viewport.
    pub fn render(
        &self,
        ctx: &mut dyn GraphicsContext,
        world: &dyn WorldState,
    ) -> Option<TextureId> {
        let target = self.target.as_ref()?;
        target.bind_and_clear(ctx);
        ctx.use_program(self.program);
        ctx.set_render_state(RenderState::SCENE);
        world.render(ctx, &ScenePass::shadow_casters());
        ctx.use_program(None);
        RenderTarget::unbind(ctx);
        Some(target.color_texture())
    }

    /// Releases the shadow map and the program. Both are attempted.
    pub fn dispose(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        let target = self
            .target
            .take()
            .map_or(Ok(()), |t| t.dispose(reborrow_context(&mut ctx)));
        let program = release_program(ctx, self.program.take());
        target.and(program)
    }
}

impl Lane for ShadowMapGenerator {
    fn strategy_name(&self) -> &'static str {
        NAME
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }
}
