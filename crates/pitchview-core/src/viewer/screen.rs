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

use super::content::TextRenderer;
use super::source::SourceListener;
use crate::math::Mat4;
use crate::renderer::{GraphicsContext, Viewport};
use std::sync::Arc;

/// The helpers an overlay screen receives once the 2D projection is in place.
pub struct OverlayFrame<'a> {
    /// The screen-space projection currently loaded in the context.
    pub projection: Mat4,
    /// Text drawing, if the resource provider supplies it.
    pub text: Option<&'a dyn TextRenderer>,
    /// The drawable area.
    pub viewport: Viewport,
}

/// The UI layer drawn after the scene: HUD, menus, replay controls.
pub trait Screen: Send {
    /// Attaches or detaches the screen's input handling.
    fn set_enabled(&mut self, enabled: bool);

    /// Called when the drawable surface changes size.
    fn window_resized(&mut self, viewport: Viewport);

    /// Draws the screen in 2D.
    fn render(&mut self, ctx: &mut dyn GraphicsContext, frame: &OverlayFrame<'_>);

    /// The listener through which this screen follows the data source.
    fn source_listener(&self) -> Option<Arc<dyn SourceListener>> {
        None
    }
}
