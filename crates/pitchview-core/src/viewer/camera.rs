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

use crate::renderer::{Eye, GraphicsContext, Viewport};

/// Owns the viewing camera and its interpolation.
pub trait CameraController: Send {
    /// Advances camera interpolation.
    fn update(&mut self, elapsed_ms: f64);

    /// Loads the projection and view transforms for `eye` into the context.
    fn apply(&self, ctx: &mut dyn GraphicsContext, eye: Eye, viewport: Viewport);

    /// Called when the drawable surface changes size.
    fn window_resized(&mut self, _viewport: Viewport) {}
}
