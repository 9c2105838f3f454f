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

use crate::math::{LinearRgba, Mat4};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The live handle to the GPU device and its current surface.
///
/// The host shell owns the context exclusively and lends it to the orchestrator
/// for one callback at a time. Implementations must never be stored across
/// frames; every resource they hand out is identified by an opaque id.
pub trait GraphicsContext: Debug {
    /// Returns the identity and feature set of the device.
    fn capabilities(&self) -> &GpuCapabilities;

    /// Returns `false` once the underlying context has been lost.
    fn is_valid(&self) -> bool {
        true
    }

    /// Creates an offscreen render target.
    /// ## Errors
    /// * `ResourceError` - If the backend cannot allocate the attachments.
    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> Result<RenderTargetAllocation, ResourceError>;

    /// Destroys a render target and all of its attachments.
    /// ## Errors
    /// * `ResourceError` - If the handle is unknown or the context is gone.
    fn destroy_render_target(&mut self, framebuffer: FramebufferId) -> Result<(), ResourceError>;

    /// Selects the framebuffer that subsequent clears and draws write into.
    fn bind_framebuffer(&mut self, binding: FramebufferBinding);

    /// Selects which buffer of the visible framebuffer receives draws.
    fn set_draw_buffer(&mut self, buffer: DrawBuffer);

    /// Sets the rasterization viewport.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears the attachments of the bound framebuffer.
    fn clear(&mut self, flags: ClearFlags);

    /// Copies the color of one framebuffer into another. Used to resolve
    /// multisampled targets into single-sample ones.
    /// ## Errors
    /// * `ResourceError` - If either handle is unknown.
    fn blit_framebuffer(
        &mut self,
        source: FramebufferId,
        destination: FramebufferId,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError>;

    /// Compiles and links a shader program.
    /// ## Errors
    /// * `ResourceError` - If compilation or linking fails.
    fn create_program(&mut self, descriptor: &ProgramDescriptor<'_>)
        -> Result<ProgramId, ResourceError>;

    /// Destroys a shader program.
    fn destroy_program(&mut self, program: ProgramId) -> Result<(), ResourceError>;

    /// Makes a program current, or restores fixed-function shading with `None`.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Binds a texture to the first texture unit, or unbinds with `None`.
    fn bind_texture(&mut self, texture: Option<TextureId>);

    /// Draws a quad covering the whole viewport with the bound program/texture.
    fn draw_fullscreen_quad(&mut self);

    /// Returns the current fixed-function state.
    fn render_state(&self) -> RenderState;

    /// Replaces the current fixed-function state.
    fn set_render_state(&mut self, state: RenderState);

    /// Loads a projection matrix.
    fn set_projection(&mut self, projection: Mat4);

    /// Loads a model-view matrix.
    fn set_modelview(&mut self, modelview: Mat4);

    /// Enables or disables multisample rasterization.
    fn set_multisample(&mut self, enabled: bool);

    /// Sets the number of vertical blanks between buffer swaps (0 disables vsync).
    fn set_swap_interval(&mut self, interval: u32);

    /// Sets the color used by subsequent color clears.
    fn set_clear_color(&mut self, color: LinearRgba);

    /// Inserts a label into the command stream for debugging tools.
    fn insert_debug_marker(&mut self, _label: &str) {}
}
