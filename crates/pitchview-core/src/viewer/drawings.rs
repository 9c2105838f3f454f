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

use super::world::ScenePass;
use crate::renderer::GraphicsContext;

/// Auxiliary annotations (debug shapes, labels) drawn on top of the world.
///
/// Annotations arrive from the data source on the ingestion thread, so the
/// store synchronizes internally and is shared by `Arc`.
pub trait DrawingStore: Send + Sync {
    /// Swaps completed annotation sets in and drops expired ones.
    fn update(&self);

    /// Draws the visible annotations for one pass.
    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass);
}
