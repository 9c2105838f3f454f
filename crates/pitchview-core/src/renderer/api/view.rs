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

//! Viewport and per-view types.

use crate::renderer::api::DrawBuffer;

/// The drawable area of the host surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport anchored at the origin.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Width over height; `1.0` for a degenerate surface.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Returns `true` if the viewport covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which eye a scene pass is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Eye {
    /// A single monoscopic view.
    #[default]
    Mono,
    /// The left view of a stereo pair.
    Left,
    /// The right view of a stereo pair.
    Right,
}

impl Eye {
    /// The views drawn per frame for the given stereo setting, in draw order.
    pub fn views(stereo: bool) -> &'static [Eye] {
        if stereo {
            &[Eye::Left, Eye::Right]
        } else {
            &[Eye::Mono]
        }
    }

    /// The visible-framebuffer buffer this eye is presented into.
    pub fn draw_buffer(self) -> DrawBuffer {
        match self {
            Eye::Mono => DrawBuffer::Back,
            Eye::Left => DrawBuffer::BackLeft,
            Eye::Right => DrawBuffer::BackRight,
        }
    }
}
