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

//! Post-processing and pre-pass stages, and the pipeline that owns them.

mod bloom_lane;
mod shadow_map_lane;

pub use self::bloom_lane::{BloomCompositor, BLOOM_BLUR_SHADER, BLOOM_BRIGHT_PASS_SHADER};
pub use self::shadow_map_lane::{ShadowMapGenerator, SHADOW_DEPTH_SHADER};

use pitchview_core::lane::Lane;
use pitchview_core::renderer::{
    reborrow_context, GraphicsContext, GraphicsSettings, ResourceError, TextureId, Viewport,
};
use pitchview_core::viewer::{ResourceProvider, WorldState};

/// The optional effect stages of the current configuration.
///
/// A stage that fails to build is logged and left out; the frame is then
/// drawn without that effect.
#[derive(Debug, Default)]
pub struct EffectPipeline {
    shadow: Option<ShadowMapGenerator>,
    bloom: Option<BloomCompositor>,
}

impl EffectPipeline {
    /// An empty pipeline with no stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every stage the settings enable.
    pub fn init(
        ctx: &mut dyn GraphicsContext,
        content: &dyn ResourceProvider,
        settings: &GraphicsSettings,
        viewport: Viewport,
    ) -> Self {
        let mut pipeline = Self::new();
        if settings.use_shadows {
            pipeline.init_shadows(ctx, content, settings.shadow_resolution);
        }
        if settings.use_bloom {
            pipeline.init_bloom(ctx, content, viewport);
        }
        pipeline
    }

    /// Builds the shadow stage. Returns `false` if it could not be built.
    pub fn init_shadows(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        content: &dyn ResourceProvider,
        resolution: u32,
    ) -> bool {
        let mut stage = ShadowMapGenerator::new(resolution);
        match stage.on_initialize(ctx, content) {
            Ok(()) => {
                log::debug!("{} stage ready ({resolution}x{resolution})", stage.strategy_name());
                self.shadow = Some(stage);
                true
            }
            Err(e) => {
                log::error!("Failed to initialize the shadow stage: {e}");
                false
            }
        }
    }

    /// Builds the bloom stage. Returns `false` if it could not be built.
    pub fn init_bloom(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        content: &dyn ResourceProvider,
        viewport: Viewport,
    ) -> bool {
        let mut stage = BloomCompositor::new();
        match stage.on_initialize(ctx, content, viewport) {
            Ok(()) => {
                log::debug!("{} stage ready", stage.strategy_name());
                self.bloom = Some(stage);
                true
            }
            Err(e) => {
                log::error!("Failed to initialize the bloom stage: {e}");
                false
            }
        }
    }

    /// The shadow stage, if built.
    pub fn shadow(&self) -> Option<&ShadowMapGenerator> {
        self.shadow.as_ref()
    }

    /// The bloom stage, if built.
    pub fn bloom(&self) -> Option<&BloomCompositor> {
        self.bloom.as_ref()
    }

    /// The texture the shadow stage renders into.
    pub fn shadow_map(&self) -> Option<TextureId> {
        self.shadow.as_ref().and_then(ShadowMapGenerator::shadow_map)
    }

    /// Runs the shadow pre-pass if a shadow stage exists.
    pub fn render_shadow_map(
        &self,
        ctx: &mut dyn GraphicsContext,
        world: &dyn WorldState,
    ) -> Option<TextureId> {
        self.shadow.as_ref()?.render(ctx, world)
    }

    /// Propagates a surface resize to the stages that depend on its size.
    pub fn window_resized(&mut self, ctx: &mut dyn GraphicsContext, viewport: Viewport) {
        if let Some(bloom) = self.bloom.as_mut() {
            if let Err(e) = bloom.window_resized(ctx, viewport) {
                log::error!("Failed to resize the bloom stage: {e}");
            }
        }
    }

    /// Releases every stage. All releases are attempted; the first error is returned.
    pub fn dispose(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        let shadow = self
            .shadow
            .take()
            .map_or(Ok(()), |mut s| s.dispose(reborrow_context(&mut ctx)));
        let bloom = self.bloom.take().map_or(Ok(()), |mut b| b.dispose(ctx));
        shadow.and(bloom)
    }
}
