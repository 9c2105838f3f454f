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

//! A [`GraphicsContext`] that executes nothing and records everything.
//!
//! `HeadlessContext` stands in for a real GPU context wherever none exists:
//! the sandbox binary, CI, and every orchestrator test. It journals each
//! command it receives, tracks which render targets and programs are alive,
//! and lets callers inject capability sets and failures.

mod command;

pub use self::command::GpuCommand;

use pitchview_core::math::{LinearRgba, Mat4};
use pitchview_core::renderer::{
    features, ClearFlags, DrawBuffer, FramebufferBinding, FramebufferId, GpuCapabilities,
    GraphicsContext, ProgramDescriptor, ProgramId, RenderState, RenderTargetAllocation,
    RenderTargetDescriptor, ResourceError, TextureId, Viewport,
};
use std::collections::{BTreeMap, HashSet};

/// A render target currently allocated in a [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTarget {
    /// The target's debug label, if any.
    pub label: Option<String>,
    /// The GPU objects handed out for it.
    pub allocation: RenderTargetAllocation,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Samples per pixel.
    pub sample_count: u32,
    /// Whether a depth attachment exists.
    pub depth: bool,
}

/// An in-memory graphics context.
#[derive(Debug)]
pub struct HeadlessContext {
    capabilities: GpuCapabilities,
    valid: bool,
    next_handle: usize,
    targets: BTreeMap<FramebufferId, LiveTarget>,
    programs: BTreeMap<ProgramId, String>,
    failing_programs: HashSet<String>,
    fail_render_targets: bool,
    journal: Vec<GpuCommand>,
    framebuffer: FramebufferBinding,
    draw_buffer: DrawBuffer,
    viewport: Viewport,
    state: RenderState,
    multisample: bool,
    swap_interval: u32,
    clear_color: LinearRgba,
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new(Self::full_capabilities())
    }
}

impl HeadlessContext {
    /// Creates a context reporting the given capabilities.
    pub fn new(capabilities: GpuCapabilities) -> Self {
        Self {
            capabilities,
            valid: true,
            next_handle: 1,
            targets: BTreeMap::new(),
            programs: BTreeMap::new(),
            failing_programs: HashSet::new(),
            fail_render_targets: false,
            journal: Vec::new(),
            framebuffer: FramebufferBinding::Default,
            draw_buffer: DrawBuffer::Back,
            viewport: Viewport::default(),
            state: RenderState::default(),
            multisample: false,
            swap_interval: 0,
            clear_color: LinearRgba::BLACK,
        }
    }

    /// A device supporting every feature the renderer knows about, with 8x MSAA.
    pub fn full_capabilities() -> GpuCapabilities {
        GpuCapabilities {
            vendor: "Pitchview".to_owned(),
            renderer: "Headless".to_owned(),
            version: "1.0".to_owned(),
            max_samples: 8,
            ..Default::default()
        }
        .with_feature(features::FRAMEBUFFER_OBJECT)
        .with_feature(features::FRAMEBUFFER_MULTISAMPLE)
        .with_feature(features::FRAMEBUFFER_BLIT)
        .with_feature(features::PROGRAMMABLE_SHADERS)
        .with_feature(features::FLOAT_TEXTURES)
        .with_feature(features::STEREO)
    }

    /// A fixed-function device without offscreen rendering or shaders.
    pub fn minimal_capabilities() -> GpuCapabilities {
        GpuCapabilities {
            vendor: "Pitchview".to_owned(),
            renderer: "Headless (fixed function)".to_owned(),
            version: "1.1".to_owned(),
            max_samples: 0,
            ..Default::default()
        }
    }

    /// Marks the context as lost; every later resource call fails.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Makes compilation of programs with this label fail.
    pub fn fail_program(&mut self, label: impl Into<String>) {
        self.failing_programs.insert(label.into());
    }

    /// Makes every render target allocation fail while `fail` is set.
    pub fn fail_render_targets(&mut self, fail: bool) {
        self.fail_render_targets = fail;
    }

    /// The commands recorded since creation or the last [`take_journal`](Self::take_journal).
    pub fn journal(&self) -> &[GpuCommand] {
        &self.journal
    }

    /// Returns and clears the recorded commands.
    pub fn take_journal(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.journal)
    }

    /// Counts recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.journal.iter().filter(|c| predicate(c)).count()
    }

    /// The debug markers recorded so far, in order.
    pub fn markers(&self) -> Vec<&str> {
        self.journal
            .iter()
            .filter_map(|c| match c {
                GpuCommand::DebugMarker(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The render targets currently alive, in creation order.
    pub fn live_targets(&self) -> Vec<&LiveTarget> {
        self.targets.values().collect()
    }

    /// Looks up a live render target.
    pub fn target(&self, framebuffer: FramebufferId) -> Option<&LiveTarget> {
        self.targets.get(&framebuffer)
    }

    /// The labels of the programs currently alive, in creation order.
    pub fn live_programs(&self) -> Vec<&str> {
        self.programs.values().map(String::as_str).collect()
    }

    /// The currently bound framebuffer.
    pub fn framebuffer(&self) -> FramebufferBinding {
        self.framebuffer
    }

    /// The current draw buffer of the visible framebuffer.
    pub fn draw_buffer(&self) -> DrawBuffer {
        self.draw_buffer
    }

    /// The current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether multisample rasterization is enabled.
    pub fn multisample_enabled(&self) -> bool {
        self.multisample
    }

    /// The current swap interval.
    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    /// The current clear color.
    pub fn clear_color(&self) -> LinearRgba {
        self.clear_color
    }

    fn next_handle(&mut self) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn ensure_valid(&self) -> Result<(), ResourceError> {
        if self.valid {
            Ok(())
        } else {
            Err(ResourceError::ContextLost)
        }
    }
}

impl GraphicsContext for HeadlessContext {
    fn capabilities(&self) -> &GpuCapabilities {
        &self.capabilities
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> Result<RenderTargetAllocation, ResourceError> {
        self.ensure_valid()?;
        if self.fail_render_targets {
            return Err(ResourceError::BackendError(
                "render target allocation disabled".to_owned(),
            ));
        }
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::BackendError(format!(
                "zero-sized render target {}x{}",
                descriptor.width, descriptor.height
            )));
        }
        if descriptor.is_multisampled()
            && !self
                .capabilities
                .supports(features::FRAMEBUFFER_MULTISAMPLE)
        {
            return Err(ResourceError::BackendError(
                "multisampled framebuffers are not supported".to_owned(),
            ));
        }

        let framebuffer = FramebufferId(self.next_handle());
        let color = TextureId(self.next_handle());
        let depth = if descriptor.depth {
            Some(TextureId(self.next_handle()))
        } else {
            None
        };
        let allocation = RenderTargetAllocation {
            framebuffer,
            color,
            depth,
        };
        self.targets.insert(
            framebuffer,
            LiveTarget {
                label: descriptor.label.as_ref().map(|l| l.to_string()),
                allocation,
                width: descriptor.width,
                height: descriptor.height,
                sample_count: descriptor.sample_count,
                depth: descriptor.depth,
            },
        );
        self.journal.push(GpuCommand::CreateRenderTarget {
            framebuffer,
            width: descriptor.width,
            height: descriptor.height,
            sample_count: descriptor.sample_count,
            depth: descriptor.depth,
        });
        log::trace!(
            "Headless: created render target {:?} ({}x{}, {} samples)",
            framebuffer,
            descriptor.width,
            descriptor.height,
            descriptor.sample_count
        );
        Ok(allocation)
    }

    fn destroy_render_target(&mut self, framebuffer: FramebufferId) -> Result<(), ResourceError> {
        self.ensure_valid()?;
        self.targets
            .remove(&framebuffer)
            .ok_or(ResourceError::InvalidFramebuffer(framebuffer))?;
        if self.framebuffer == FramebufferBinding::Offscreen(framebuffer) {
            self.framebuffer = FramebufferBinding::Default;
        }
        self.journal.push(GpuCommand::DestroyRenderTarget(framebuffer));
        Ok(())
    }

    fn bind_framebuffer(&mut self, binding: FramebufferBinding) {
        self.framebuffer = binding;
        self.journal.push(GpuCommand::BindFramebuffer(binding));
    }

    fn set_draw_buffer(&mut self, buffer: DrawBuffer) {
        self.draw_buffer = buffer;
        self.journal.push(GpuCommand::SetDrawBuffer(buffer));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.journal.push(GpuCommand::SetViewport(viewport));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.journal.push(GpuCommand::Clear {
            target: self.framebuffer,
            draw_buffer: self.draw_buffer,
            flags,
        });
    }

    fn blit_framebuffer(
        &mut self,
        source: FramebufferId,
        destination: FramebufferId,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        self.ensure_valid()?;
        for id in [source, destination] {
            if !self.targets.contains_key(&id) {
                return Err(ResourceError::InvalidFramebuffer(id));
            }
        }
        self.journal.push(GpuCommand::Blit {
            source,
            destination,
            width,
            height,
        });
        Ok(())
    }

    fn create_program(
        &mut self,
        descriptor: &ProgramDescriptor<'_>,
    ) -> Result<ProgramId, ResourceError> {
        self.ensure_valid()?;
        if self.failing_programs.contains(descriptor.label.as_ref()) {
            return Err(ResourceError::BackendError(format!(
                "failed to link program '{}'",
                descriptor.label
            )));
        }
        let program = ProgramId(self.next_handle());
        self.programs.insert(program, descriptor.label.to_string());
        self.journal.push(GpuCommand::CreateProgram {
            program,
            label: descriptor.label.to_string(),
        });
        Ok(program)
    }

    fn destroy_program(&mut self, program: ProgramId) -> Result<(), ResourceError> {
        self.ensure_valid()?;
        self.programs
            .remove(&program)
            .ok_or(ResourceError::InvalidProgram(program))?;
        self.journal.push(GpuCommand::DestroyProgram(program));
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.journal.push(GpuCommand::UseProgram(program));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.journal.push(GpuCommand::BindTexture(texture));
    }

    fn draw_fullscreen_quad(&mut self) {
        self.journal.push(GpuCommand::DrawFullscreenQuad {
            target: self.framebuffer,
            draw_buffer: self.draw_buffer,
        });
    }

    fn render_state(&self) -> RenderState {
        self.state
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
        self.journal.push(GpuCommand::SetRenderState(state));
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.journal.push(GpuCommand::SetProjection(projection));
    }

    fn set_modelview(&mut self, modelview: Mat4) {
        self.journal.push(GpuCommand::SetModelview(modelview));
    }

    fn set_multisample(&mut self, enabled: bool) {
        self.multisample = enabled;
        self.journal.push(GpuCommand::SetMultisample(enabled));
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
        self.journal.push(GpuCommand::SetSwapInterval(interval));
    }

    fn set_clear_color(&mut self, color: LinearRgba) {
        self.clear_color = color;
        self.journal.push(GpuCommand::SetClearColor(color));
    }

    fn insert_debug_marker(&mut self, label: &str) {
        self.journal.push(GpuCommand::DebugMarker(label.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchview_core::renderer::{ColorFormat, ShaderSource};

    #[test]
    fn tracks_live_targets_until_destroyed() {
        let mut ctx = HeadlessContext::default();
        let desc = RenderTargetDescriptor::multisample("scene", 640, 480, ColorFormat::Rgba, 4);
        let allocation = ctx.create_render_target(&desc).unwrap();

        let live = ctx.target(allocation.framebuffer).unwrap();
        assert_eq!((live.width, live.height, live.sample_count), (640, 480, 4));
        assert!(allocation.depth.is_some());

        ctx.destroy_render_target(allocation.framebuffer).unwrap();
        assert!(ctx.live_targets().is_empty());
        assert_eq!(
            ctx.destroy_render_target(allocation.framebuffer),
            Err(ResourceError::InvalidFramebuffer(allocation.framebuffer))
        );
    }

    #[test]
    fn multisample_requires_the_feature() {
        let mut ctx = HeadlessContext::new(HeadlessContext::minimal_capabilities());
        let desc = RenderTargetDescriptor::multisample("scene", 64, 64, ColorFormat::Rgba, 4);
        assert!(ctx.create_render_target(&desc).is_err());
    }

    #[test]
    fn lost_context_rejects_resource_calls() {
        let mut ctx = HeadlessContext::default();
        let desc = RenderTargetDescriptor::single_sample("scene", 64, 64, ColorFormat::Rgb);
        let allocation = ctx.create_render_target(&desc).unwrap();
        ctx.invalidate();

        assert!(!ctx.is_valid());
        assert_eq!(
            ctx.destroy_render_target(allocation.framebuffer),
            Err(ResourceError::ContextLost)
        );
    }

    #[test]
    fn injected_program_failure_is_reported() {
        let mut ctx = HeadlessContext::default();
        ctx.fail_program("phong");
        let source = ShaderSource::new("v", "f");
        let err = ctx
            .create_program(&ProgramDescriptor {
                label: "phong".into(),
                source: &source,
            })
            .unwrap_err();
        assert!(matches!(err, ResourceError::BackendError(_)));
        assert!(ctx.live_programs().is_empty());
    }

    #[test]
    fn clears_record_the_bound_destination() {
        let mut ctx = HeadlessContext::default();
        ctx.set_draw_buffer(DrawBuffer::BackRight);
        ctx.clear(ClearFlags::COLOR_DEPTH);
        assert_eq!(
            ctx.journal().last(),
            Some(&GpuCommand::Clear {
                target: FramebufferBinding::Default,
                draw_buffer: DrawBuffer::BackRight,
                flags: ClearFlags::COLOR_DEPTH,
            })
        );
    }
}
