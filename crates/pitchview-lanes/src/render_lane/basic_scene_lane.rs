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

//! Implements the fixed-function scene strategy.
//!
//! `BasicSceneLane` needs nothing beyond the context itself, so it always
//! initializes. It terminates the fallback chain: when no better strategy
//! can be built on a device, this one still draws the scene.

use super::{draw_pass, SceneFrame, SceneLane, SceneLaneInit, StrategyKind};
use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{GraphicsContext, RenderState, ResourceError};
use pitchview_core::viewer::{ScenePass, ShadingModel};

/// Draws the scene with fixed-function lighting.
#[derive(Debug, Default)]
pub struct BasicSceneLane;

impl BasicSceneLane {
    /// Creates a new `BasicSceneLane`.
    pub fn new() -> Self {
        Self
    }
}

impl Lane for BasicSceneLane {
    fn strategy_name(&self) -> &'static str {
        "Basic"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Scene
    }
}

impl SceneLane for BasicSceneLane {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Basic
    }

    fn on_initialize(
        &mut self,
        _ctx: &mut dyn GraphicsContext,
        _init: &SceneLaneInit<'_>,
    ) -> Result<(), LaneError> {
        Ok(())
    }

    fn render(&self, ctx: &mut dyn GraphicsContext, frame: &SceneFrame<'_>) {
        ctx.use_program(None);
        ctx.set_render_state(RenderState::SCENE);
        let pass = ScenePass::main(ShadingModel::Basic, frame.eye, None);
        draw_pass(ctx, frame, &pass);
    }

    fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        Ok(())
    }
}
