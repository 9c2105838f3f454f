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

use pitchview_core::math::{LinearRgba, Mat4};
use pitchview_core::renderer::{
    ClearFlags, DrawBuffer, FramebufferBinding, FramebufferId, ProgramId, RenderState, TextureId,
    Viewport,
};

/// One command recorded by a [`HeadlessContext`](super::HeadlessContext).
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    /// A render target was allocated.
    CreateRenderTarget {
        /// The new framebuffer.
        framebuffer: FramebufferId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Samples per pixel.
        sample_count: u32,
        /// Whether a depth attachment was created.
        depth: bool,
    },
    /// A render target was released.
    DestroyRenderTarget(FramebufferId),
    /// The draw destination changed.
    BindFramebuffer(FramebufferBinding),
    /// The visible-framebuffer draw buffer changed.
    SetDrawBuffer(DrawBuffer),
    /// The viewport changed.
    SetViewport(Viewport),
    /// A clear was issued.
    Clear {
        /// The framebuffer bound at the time.
        target: FramebufferBinding,
        /// The draw buffer selected at the time.
        draw_buffer: DrawBuffer,
        /// The cleared attachments.
        flags: ClearFlags,
    },
    /// A framebuffer copy (multisample resolve).
    Blit {
        /// Copied from.
        source: FramebufferId,
        /// Copied into.
        destination: FramebufferId,
        /// Copied width.
        width: u32,
        /// Copied height.
        height: u32,
    },
    /// A program was linked.
    CreateProgram {
        /// The new program.
        program: ProgramId,
        /// Its label.
        label: String,
    },
    /// A program was released.
    DestroyProgram(ProgramId),
    /// The current program changed.
    UseProgram(Option<ProgramId>),
    /// The bound texture changed.
    BindTexture(Option<TextureId>),
    /// A full-screen quad was drawn.
    DrawFullscreenQuad {
        /// The framebuffer bound at the time.
        target: FramebufferBinding,
        /// The draw buffer selected at the time.
        draw_buffer: DrawBuffer,
    },
    /// The fixed-function state changed.
    SetRenderState(RenderState),
    /// A projection matrix was loaded.
    SetProjection(Mat4),
    /// A model-view matrix was loaded.
    SetModelview(Mat4),
    /// Multisampling was toggled.
    SetMultisample(bool),
    /// The swap interval changed.
    SetSwapInterval(u32),
    /// The clear color changed.
    SetClearColor(LinearRgba),
    /// A debug label inserted by a caller.
    DebugMarker(String),
}

impl GpuCommand {
    /// Returns `true` for commands that write pixels.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GpuCommand::Clear { .. } | GpuCommand::DrawFullscreenQuad { .. } | GpuCommand::Blit { .. }
        )
    }
}
