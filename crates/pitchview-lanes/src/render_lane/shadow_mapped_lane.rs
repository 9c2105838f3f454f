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

//! Implements the shadow-mapped scene strategy.
//!
//! The lane samples the shadow map produced by the pre-pass of the effect
//! pipeline's shadow stage. It refuses to build when no shadow stage exists,
//! which sends the orchestrator down its fallback chain.

use super::{
    build_program, draw_pass, release_program, require_feature, SceneFrame, SceneLane,
    SceneLaneInit, StrategyKind,
};
use pitchview_core::lane::{Lane, LaneError, LaneKind};
use pitchview_core::renderer::{
    features, CapabilityError, GraphicsContext, ProgramId, RenderState, ResourceError,
};
use pitchview_core::viewer::{ScenePass, ShadingModel};

/// The shader the shadow-mapped strategy is built from.
pub const SHADOWED_PHONG_SHADER: &str = "vsm_phong";

const NAME: &str = "ShadowMapped";

/// Draws the scene with per-pixel lighting attenuated by a variance shadow map.
#[derive(Debug, Default)]
pub struct ShadowMappedLane {
    program: Option<ProgramId>,
}

impl ShadowMappedLane {
    /// Creates a new, uninitialized `ShadowMappedLane`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lane for ShadowMappedLane {
    fn strategy_name(&self) -> &'static str {
        NAME
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Scene
    }
}

impl SceneLane for ShadowMappedLane {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ShadowMapped
    }

    fn on_initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        init: &SceneLaneInit<'_>,
    ) -> Result<(), LaneError> {
        require_feature(ctx, NAME, features::PROGRAMMABLE_SHADERS)?;
        require_feature(ctx, NAME, features::FLOAT_TEXTURES)?;
        if init.shadow_map.is_none() {
            return Err(CapabilityError::MissingInput {
                component: NAME,
                input: "shadow map",
            }
            .into());
        }
        self.program = Some(build_program(ctx, init.content, NAME, SHADOWED_PHONG_SHADER)?);
        Ok(())
    }

    fn render(&self, ctx: &mut dyn GraphicsContext, frame: &SceneFrame<'_>) {
        ctx.use_program(self.program);
        ctx.set_render_state(RenderState::SCENE);
        ctx.bind_texture(frame.shadow_map);
        let pass = ScenePass::main(ShadingModel::PhongShadowed, frame.eye, frame.shadow_map);
        draw_pass(ctx, frame, &pass);
        ctx.bind_texture(None);
        ctx.use_program(None);
    }

    fn dispose(&mut self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        release_program(ctx, self.program.take())
    }
}
