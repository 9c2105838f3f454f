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

use super::world::SceneGraphListener;
use crate::math::LinearRgba;
use crate::renderer::{GpuCapabilities, GraphicsContext, ResourceError, ShaderSource};
use std::sync::Arc;

/// Draws text in screen space for overlay screens.
pub trait TextRenderer: Send + Sync {
    /// Draws `text` with its baseline starting at `(x, y)` in pixels.
    fn draw_text(&self, ctx: &mut dyn GraphicsContext, text: &str, x: f32, y: f32, color: LinearRgba);

    /// Width of `text` in pixels.
    fn text_width(&self, text: &str) -> f32;
}

/// Loads and owns textures, models and shader sources.
pub trait ResourceProvider: Send {
    /// Loads the required resources. Returns `false` if some failed to load;
    /// initialization continues in a degraded state either way.
    fn init(&mut self, ctx: &mut dyn GraphicsContext, capabilities: &GpuCapabilities) -> bool;

    /// Advances background streaming of models and textures.
    fn update(&mut self, ctx: Option<&mut dyn GraphicsContext>);

    /// Releases every GPU resource the provider owns.
    fn dispose(&mut self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError>;

    /// Returns the sources of a named shader program.
    fn shader_source(&self, name: &str) -> Option<ShaderSource>;

    /// The listener that streams models when the world's scene graph changes.
    fn scene_graph_listener(&self) -> Option<Arc<dyn SceneGraphListener>> {
        None
    }

    /// The text helper handed to overlay screens.
    fn text_renderer(&self) -> Option<Arc<dyn TextRenderer>> {
        None
    }
}
