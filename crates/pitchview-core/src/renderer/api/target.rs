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

//! Defines data structures related to offscreen render targets.

use std::borrow::Cow;

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to an offscreen framebuffer and its attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FramebufferId(pub usize);

/// The texel format of a render target's color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// 8-bit RGB, unspecified internal precision.
    #[default]
    Rgb,
    /// 8-bit RGB with explicit sized storage, used for resolve targets.
    Rgb8,
    /// 8-bit RGBA.
    Rgba,
}

/// A descriptor used to create an offscreen render target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width of the attachments, in pixels.
    pub width: u32,
    /// Height of the attachments, in pixels.
    pub height: u32,
    /// Format of the single color attachment.
    pub color_format: ColorFormat,
    /// Samples per pixel. `1` creates a regular single-sample target.
    pub sample_count: u32,
    /// Whether a depth attachment is created alongside the color attachment.
    pub depth: bool,
}

impl<'a> RenderTargetDescriptor<'a> {
    /// A single-sample target with color and depth attachments.
    pub fn single_sample(label: &'a str, width: u32, height: u32, format: ColorFormat) -> Self {
        Self {
            label: Some(Cow::Borrowed(label)),
            width,
            height,
            color_format: format,
            sample_count: 1,
            depth: true,
        }
    }

    /// A multisampled target with color and depth attachments.
    pub fn multisample(
        label: &'a str,
        width: u32,
        height: u32,
        format: ColorFormat,
        sample_count: u32,
    ) -> Self {
        Self {
            sample_count: sample_count.max(1),
            ..Self::single_sample(label, width, height, format)
        }
    }

    /// A single-sample target with a color attachment only, used as a resolve destination.
    pub fn no_depth(label: &'a str, width: u32, height: u32, format: ColorFormat) -> Self {
        Self {
            depth: false,
            ..Self::single_sample(label, width, height, format)
        }
    }

    /// Returns `true` if the target stores more than one sample per pixel.
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }
}

/// The GPU objects a backend created for a [`RenderTargetDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetAllocation {
    /// The framebuffer object binding all attachments.
    pub framebuffer: FramebufferId,
    /// The color attachment texture.
    pub color: TextureId,
    /// The depth attachment, if one was requested.
    pub depth: Option<TextureId>,
}

/// Selects which buffer of the default (visible) framebuffer receives draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawBuffer {
    /// The back buffer of a monoscopic surface.
    #[default]
    Back,
    /// The left-eye back buffer of a stereo surface.
    BackLeft,
    /// The right-eye back buffer of a stereo surface.
    BackRight,
}

/// The framebuffer that subsequent draw and clear calls write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FramebufferBinding {
    /// The visible framebuffer owned by the host surface.
    #[default]
    Default,
    /// An offscreen render target.
    Offscreen(FramebufferId),
}
