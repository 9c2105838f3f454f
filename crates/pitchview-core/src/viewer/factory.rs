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

use super::camera::CameraController;
use super::content::ResourceProvider;
use super::drawings::DrawingStore;
use super::screen::Screen;
use super::source::{DataSourceAdapter, SourceError};
use super::world::{SharedWorld, WorldState};
use super::RunMode;
use crate::config::ServerConfig;
use crate::renderer::Viewport;
use std::path::Path;
use std::sync::Arc;

/// Builds the subsystems the orchestrator owns between `init` and `dispose`.
///
/// The host shell supplies the factory once; the orchestrator calls it on every
/// (re-)initialization.
pub trait SubsystemFactory: Send {
    /// Creates a fresh resource provider.
    fn create_resource_provider(&mut self) -> Box<dyn ResourceProvider>;

    /// Creates a fresh world for `mode`.
    fn create_world(&mut self, mode: RunMode, content: &dyn ResourceProvider)
        -> Box<dyn WorldState>;

    /// Creates the annotation store.
    fn create_drawings(&mut self) -> Arc<dyn DrawingStore>;

    /// Creates the camera controller for the given surface.
    fn create_camera(&mut self, viewport: Viewport) -> Box<dyn CameraController>;

    /// Creates the live-feed adapter.
    fn create_live_source(
        &mut self,
        server: &ServerConfig,
        world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError>;

    /// Creates the log-replay adapter.
    fn create_replay_source(
        &mut self,
        path: &Path,
        world: SharedWorld,
    ) -> Result<Box<dyn DataSourceAdapter>, SourceError>;

    /// Creates the UI screen for `mode`.
    fn create_screen(&mut self, mode: RunMode) -> Box<dyn Screen>;
}
