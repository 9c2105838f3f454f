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

//! Contracts for the collaborators the render orchestrator drives but does not implement.
//!
//! The world state, the data source (live feed or log replay), the resource
//! provider, the camera, the drawing overlay store and the UI screen are all
//! owned by the orchestrator once constructed, yet their content is out of its
//! scope. This module pins down exactly what the orchestrator calls on them.

mod camera;
mod content;
mod drawings;
mod factory;
mod screen;
mod source;
mod world;

pub use self::camera::CameraController;
pub use self::content::{ResourceProvider, TextRenderer};
pub use self::drawings::DrawingStore;
pub use self::factory::SubsystemFactory;
pub use self::screen::{OverlayFrame, Screen};
pub use self::source::{
    ready_channel, DataSourceAdapter, ReadyNotifier, ReadySignal, SourceError, SourceEvent,
    SourceListener,
};
pub use self::world::{
    lock_world, share_world, SceneGraphListener, SceneGraphRef, ScenePass, ShadingModel,
    SharedWorld, WorldState,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the match data comes from. Fixed for one initialization cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// A live feed from a simulation server.
    #[default]
    Live,
    /// A recorded log file played back locally.
    Replay,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => write!(f, "live"),
            RunMode::Replay => write!(f, "replay"),
        }
    }
}
