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

//! Fixed-function render state toggled between passes.

/// The subset of pipeline state the orchestrator and strategies switch between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    /// Depth testing.
    pub depth_test: bool,
    /// Alpha blending.
    pub blend: bool,
    /// Fixed-function lighting.
    pub lighting: bool,
    /// 2D texturing.
    pub texture_2d: bool,
}

impl RenderState {
    /// The state expected by 3D scene passes.
    pub const SCENE: Self = Self {
        depth_test: true,
        blend: false,
        lighting: true,
        texture_2d: false,
    };

    /// The state expected by screen-space overlay passes.
    pub const OVERLAY: Self = Self {
        depth_test: false,
        blend: true,
        lighting: false,
        texture_2d: false,
    };

    /// The state used to present a post-processed texture on a full-screen quad.
    pub const PRESENT: Self = Self {
        depth_test: false,
        blend: false,
        lighting: false,
        texture_2d: true,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::SCENE
    }
}

/// Which attachments a clear call resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearFlags {
    /// Clear the color attachment.
    pub color: bool,
    /// Clear the depth attachment.
    pub depth: bool,
}

impl ClearFlags {
    /// Clear both color and depth.
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
    /// Clear depth only.
    pub const DEPTH: Self = Self {
        color: false,
        depth: true,
    };
}
