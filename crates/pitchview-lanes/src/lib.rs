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

//! # Pitchview Lanes
//!
//! The swappable pieces the render orchestrator composes a frame from: the
//! offscreen [`RenderTarget`], the scene strategies in [`render_lane`], and the
//! shadow and bloom stages in [`effect_lane`].

#![warn(missing_docs)]

pub mod effect_lane;
pub mod render_lane;
mod target;

pub use effect_lane::EffectPipeline;
pub use render_lane::{SceneFrame, SceneLane, SceneLaneInit, StrategyKind};
pub use target::RenderTarget;
