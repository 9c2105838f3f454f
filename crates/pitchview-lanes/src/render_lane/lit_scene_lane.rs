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

//! Implements the per-pixel lit scene strategy.

use super::{
    build_program, draw_pass, release_program, require_feature, SceneFrame, SceneLane,
    SceneLaneInit, StrategyKind,
};
use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{features, GraphicsContext, ProgramId, RenderState, ResourceError};
use pitchview_core::viewer::{ScenePass, ShadingModel};

/// The shader the lit strategy is built from.
pub const PHONG_SHADER: &str = "phong";

/// Draws the scene with a per-pixel Phong program.
///
/// Requires programmable shaders and a `phong` shader from the resource provider.
#[derive(Debug, Default)]
pub struct LitSceneLane {
    program: Option<ProgramId>,
}

impl LitSceneLane {
    /// Creates a new, uninitialized `LitSceneLane`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The linked program, once initialized.
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }
}

impl Lane for LitSceneLane {
    fn strategy_name(&self) -> &'static str {
        "Lit"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Scene
    }
}

impl SceneLane for LitSceneLane {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Lit
    }

    fn on_initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        init: &SceneLaneInit<'_>,
    ) -> Result<(), LaneError> {
        require_feature(ctx, "Lit", features::PROGRAMMABLE_SHADERS)?;
        self.program = Some(build_program(ctx, init.content, "Lit", PHONG_SHADER)?);
        Ok(())
    }

    fn render(&self, ctx: &mut dyn GraphicsContext, frame: &SceneFrame<'_>) {
        ctx.use_program(self.program);
        ctx.set_render_state(RenderState::SCENE);
        let pass = ScenePass::main(ShadingModel::Phong, frame.eye, None);
        draw_pass(ctx, frame, &pass);
        ctx.use_program(None);
    }

    fn dispose(&mut self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        release_program(ctx, self.program.take())
    }
}
