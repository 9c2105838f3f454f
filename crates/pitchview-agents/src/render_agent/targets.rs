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

//! The offscreen scene targets the bloom stage reads from.

use pitchview_core::renderer::{
    reborrow_context, ColorFormat, GraphicsContext, RenderTargetDescriptor, ResourceError,
    Viewport,
};
use pitchview_lanes::RenderTarget;

/// The scene render targets for the current surface size.
///
/// With a sample count above zero the scene is drawn into a multisampled
/// target and resolved into a single-sample one; otherwise a single target
/// with depth is used. [`regenerate`](Self::regenerate) always releases the
/// previous targets before allocating new ones.
#[derive(Debug, Default)]
pub struct SceneTargets {
    // Multisampled draw target, present only when `sample_count > 0`.
    multisample: Option<RenderTarget>,
    // Single-sample target holding the scene color read by post-processing.
    scene: Option<RenderTarget>,
    sample_count: u32,
}

impl SceneTargets {
    /// No targets allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the current targets and allocates new ones for `viewport`.
    ///
    /// On failure no targets are left allocated.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if a target cannot be created.
    pub fn regenerate(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        sample_count: u32,
        viewport: Viewport,
    ) -> Result<(), ResourceError> {
        if let Err(e) = self.dispose(Some(&mut *ctx)) {
            log::warn!("Failed to release previous scene targets: {e}");
        }
        let (width, height) = (viewport.width.max(1), viewport.height.max(1));

        if sample_count > 0 {
            let multisample = RenderTarget::create(
                ctx,
                &RenderTargetDescriptor::multisample(
                    "multisampled scene",
                    width,
                    height,
                    ColorFormat::Rgba,
                    sample_count,
                ),
            )?;
            let resolved = match RenderTarget::create(
                ctx,
                &RenderTargetDescriptor::no_depth("resolved scene", width, height, ColorFormat::Rgb8),
            ) {
                Ok(t) => t,
                Err(e) => {
                    let _ = multisample.dispose(Some(ctx));
                    return Err(e);
                }
            };
            self.multisample = Some(multisample);
            self.scene = Some(resolved);
        } else {
            self.scene = Some(RenderTarget::create(
                ctx,
                &RenderTargetDescriptor::single_sample("scene", width, height, ColorFormat::Rgb),
            )?);
        }
        self.sample_count = sample_count;
        log::debug!(
            "Scene targets regenerated at {width}x{height} ({} samples)",
            sample_count
        );
        Ok(())
    }

    /// The target the scene pass draws into.
    pub fn draw_target(&self) -> Option<&RenderTarget> {
        self.multisample.as_ref().or(self.scene.as_ref())
    }

    /// The single-sample target holding the final scene color.
    pub fn scene(&self) -> Option<&RenderTarget> {
        self.scene.as_ref()
    }

    /// The multisampled draw target, if multisampling is in use.
    pub fn multisample(&self) -> Option<&RenderTarget> {
        self.multisample.as_ref()
    }

    /// The sample count the targets were generated with.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Number of allocated targets.
    pub fn len(&self) -> usize {
        usize::from(self.multisample.is_some()) + usize::from(self.scene.is_some())
    }

    /// Whether no target is allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blits the multisampled target into the scene target. No-op without multisampling.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the blit fails.
    pub fn resolve(&self, ctx: &mut dyn GraphicsContext) -> Result<(), ResourceError> {
        match (&self.multisample, &self.scene) {
            (Some(source), Some(destination)) => source.resolve_into(ctx, destination),
            _ => Ok(()),
        }
    }

    /// Releases both targets. Both releases are attempted; the first error is returned.
    pub fn dispose(&mut self, mut ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        self.sample_count = 0;
        let multisample = self
            .multisample
            .take()
            .map_or(Ok(()), |t| t.dispose(reborrow_context(&mut ctx)));
        let scene = self.scene.take().map_or(Ok(()), |t| t.dispose(ctx));
        multisample.and(scene)
    }
}
