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

//! Offscreen render targets.

use pitchview_core::renderer::{
    ClearFlags, FramebufferBinding, FramebufferId, GraphicsContext, RenderTargetAllocation,
    RenderTargetDescriptor, ResourceError, TextureId, Viewport,
};

/// An offscreen surface with a color attachment and an optional depth attachment.
///
/// A target is a plain handle: it does not release its GPU objects on drop,
/// because the context may no longer exist by then. Owners call
/// [`RenderTarget::dispose`] while a context is lent to them.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTarget {
    label: String,
    allocation: RenderTargetAllocation,
    width: u32,
    height: u32,
    sample_count: u32,
}

impl RenderTarget {
    /// Allocates a target described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the attachments cannot be created.
    pub fn create(
        ctx: &mut dyn GraphicsContext,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> Result<Self, ResourceError> {
        let allocation = ctx.create_render_target(descriptor)?;
        let label = descriptor
            .label
            .as_deref()
            .unwrap_or("render target")
            .to_owned();
        log::debug!(
            "Created {label} {}x{} ({} samples, depth: {})",
            descriptor.width,
            descriptor.height,
            descriptor.sample_count,
            allocation.depth.is_some()
        );
        Ok(Self {
            label,
            allocation,
            width: descriptor.width,
            height: descriptor.height,
            sample_count: descriptor.sample_count.max(1),
        })
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The framebuffer handle.
    pub fn framebuffer(&self) -> FramebufferId {
        self.allocation.framebuffer
    }

    /// The color attachment.
    pub fn color_texture(&self) -> TextureId {
        self.allocation.color
    }

    /// The depth attachment, if the target has one.
    pub fn depth_texture(&self) -> Option<TextureId> {
        self.allocation.depth
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Samples per pixel.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether the target stores more than one sample per pixel.
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    /// The viewport covering the whole target.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Directs subsequent draws into this target and fits the viewport to it.
    pub fn bind(&self, ctx: &mut dyn GraphicsContext) {
        ctx.bind_framebuffer(FramebufferBinding::Offscreen(self.allocation.framebuffer));
        ctx.set_viewport(self.viewport());
    }

    /// Restores drawing into the visible framebuffer.
    pub fn unbind(ctx: &mut dyn GraphicsContext) {
        ctx.bind_framebuffer(FramebufferBinding::Default);
    }

    /// Binds the target and clears color and depth.
    pub fn bind_and_clear(&self, ctx: &mut dyn GraphicsContext) {
        self.bind(ctx);
        ctx.clear(if self.allocation.depth.is_some() {
            ClearFlags::COLOR_DEPTH
        } else {
            ClearFlags {
                color: true,
                depth: false,
            }
        });
    }

    /// Copies this target's color into `destination`, resolving samples.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if either framebuffer is gone.
    pub fn resolve_into(
        &self,
        ctx: &mut dyn GraphicsContext,
        destination: &RenderTarget,
    ) -> Result<(), ResourceError> {
        ctx.blit_framebuffer(
            self.allocation.framebuffer,
            destination.allocation.framebuffer,
            self.width.min(destination.width),
            self.height.min(destination.height),
        )
    }

    /// Releases the target's GPU objects.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ContextLost`] without a context, or the
    /// backend's error if the release fails.
    pub fn dispose(self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        let ctx = ctx.ok_or(ResourceError::ContextLost)?;
        ctx.destroy_render_target(self.allocation.framebuffer)?;
        log::debug!("Disposed {}", self.label);
        Ok(())
    }
}
