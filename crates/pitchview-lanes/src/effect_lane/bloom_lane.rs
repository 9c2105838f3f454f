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

//! The bloom post-processing stage.

use crate::render_lane::{build_program, release_program, require_feature};
use crate::RenderTarget;
use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{
    features, reborrow_context, CapabilityError, ColorFormat, GraphicsContext, ProgramId,
    RenderState, RenderTargetDescriptor, ResourceError, TextureId, Viewport,
};
use pitchview_core::viewer::ResourceProvider;

/// Extracts the bright regions of the scene.
pub const BLOOM_BRIGHT_PASS_SHADER: &str = "bloom_bright_pass";
/// Blurs the extracted regions.
pub const BLOOM_BLUR_SHADER: &str = "bloom_blur";

const NAME: &str = "Bloom";

#[derive(Debug)]
struct BloomTargets {
    bright: RenderTarget,
    blurred: RenderTarget,
    composite: RenderTarget,
}

impl BloomTargets {
    fn create(ctx: &mut dyn GraphicsContext, viewport: Viewport) -> Result<Self, ResourceError> {
        let (width, height) = (viewport.width.max(1), viewport.height.max(1));
        let (half_w, half_h) = ((width / 2).max(1), (height / 2).max(1));
        let bright = RenderTarget::create(
            ctx,
            &RenderTargetDescriptor::no_depth("bloom bright pass", half_w, half_h, ColorFormat::Rgb),
        )?;
        let blurred = match RenderTarget::create(
            ctx,
            &RenderTargetDescriptor::no_depth("bloom blur", half_w, half_h, ColorFormat::Rgb),
        ) {
            Ok(t) => t,
            Err(e) => {
                let _ = bright.dispose(Some(ctx));
                return Err(e);
            }
        };
        let composite = match RenderTarget::create(
            ctx,
            &RenderTargetDescriptor::no_depth("bloom composite", width, height, ColorFormat::Rgb),
        ) {
            Ok(t) => t,
            Err(e) => {
                let _ = bright.dispose(Some(&mut *ctx));
                let _ = blurred.dispose(Some(ctx));
                return Err(e);
            }
        };
        Ok(Self {
            bright,
            blurred,
            composite,
        })
    }

    fn dispose(self, mut ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        let bright = self.bright.dispose(reborrow_context(&mut ctx));
        let blurred = self.blurred.dispose(reborrow_context(&mut ctx));
        let composite = self.composite.dispose(ctx);
        bright.and(blurred).and(composite)
    }
}

/// Adds a blurred glow around the bright regions of the scene.
///
/// [`process`](Self::process) consumes a single-sample scene color texture
/// and returns a texture holding the composited image, ready to be presented
/// on a full-screen quad.
#[derive(Debug, Default)]
pub struct BloomCompositor {
    bright_pass: Option<ProgramId>,
    blur: Option<ProgramId>,
    targets: Option<BloomTargets>,
    viewport: Viewport,
}

impl BloomCompositor {
    /// Creates an uninitialized compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The surface size the intermediate targets were built for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether [`on_initialize`](Self::on_initialize) succeeded.
    pub fn is_initialized(&self) -> bool {
        self.targets.is_some()
    }

    /// Compiles the programs and allocates the intermediate targets.
    ///
    /// # Errors
    ///
    /// Fails if offscreen targets or shaders are unsupported, or if a resource
    /// cannot be created.
    pub fn on_initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        content: &dyn ResourceProvider,
        viewport: Viewport,
    ) -> Result<(), LaneError> {
        require_feature(ctx, NAME, features::FRAMEBUFFER_OBJECT)?;
        require_feature(ctx, NAME, features::PROGRAMMABLE_SHADERS)?;

        let bright_pass = build_program(ctx, content, NAME, BLOOM_BRIGHT_PASS_SHADER)?;
        let blur = match build_program(ctx, content, NAME, BLOOM_BLUR_SHADER) {
            Ok(p) => p,
            Err(e) => {
                let _ = ctx.destroy_program(bright_pass);
                return Err(e.into());
            }
        };
        match BloomTargets::create(ctx, viewport) {
            Ok(targets) => {
                self.bright_pass = Some(bright_pass);
                self.blur = Some(blur);
                self.targets = Some(targets);
                self.viewport = viewport;
                Ok(())
            }
            Err(source) => {
                let _ = ctx.destroy_program(bright_pass);
                let _ = ctx.destroy_program(blur);
                Err(CapabilityError::Resource {
                    component: NAME,
                    source,
                }
                .into())
            }
        }
    }

    /// Runs bright pass, blur and additive composite over `scene`.
    ///
    /// Leaves the visible framebuffer bound and returns the composited texture.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::NotInitialized`] before initialization.
    pub fn process(
        &self,
        ctx: &mut dyn GraphicsContext,
        scene: TextureId,
    ) -> Result<TextureId, LaneError> {
        let targets = self.targets.as_ref().ok_or(LaneError::NotInitialized(NAME))?;
        ctx.set_render_state(RenderState::PRESENT);

        targets.bright.bind_and_clear(ctx);
        ctx.use_program(self.bright_pass);
        ctx.bind_texture(Some(scene));
        ctx.draw_fullscreen_quad();

        targets.blurred.bind_and_clear(ctx);
        ctx.use_program(self.blur);
        ctx.bind_texture(Some(targets.bright.color_texture()));
        ctx.draw_fullscreen_quad();

        targets.composite.bind_and_clear(ctx);
        ctx.use_program(None);
        ctx.bind_texture(Some(scene));
        ctx.draw_fullscreen_quad();
        ctx.set_render_state(RenderState {
            blend: true,
            ..RenderState::PRESENT
        });
        ctx.bind_texture(Some(targets.blurred.color_texture()));
        ctx.draw_fullscreen_quad();

        ctx.bind_texture(None);
        RenderTarget::unbind(ctx);
        Ok(targets.composite.color_texture())
    }

    /// Rebuilds the intermediate targets for a new surface size.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the new targets cannot be created; the
    /// stage is left uninitialized in that case.
    pub fn window_resized(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        viewport: Viewport,
    ) -> Result<(), ResourceError> {
        self.viewport = viewport;
        let Some(old) = self.targets.take() else {
            return Ok(());
        };
        if let Err(e) = old.dispose(Some(&mut *ctx)) {
            log::warn!("Failed to release bloom targets: {e}");
        }
        self.targets = Some(BloomTargets::create(ctx, viewport)?);
        Ok(())
    }

    /// Releases the targets and programs. Every release is attempted.
    pub fn dispose(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        let targets = self
            .targets
            .take()
            .map_or(Ok(()), |t| t.dispose(reborrow_context(&mut ctx)));
        let bright = release_program(reborrow_context(&mut ctx), self.bright_pass.take());
        let blur = release_program(ctx, self.blur.take());
        targets.and(bright).and(blur)
    }
}

impl Lane for BloomCompositor {
    fn strategy_name(&self) -> &'static str {
        NAME
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::PostProcess
    }
}
