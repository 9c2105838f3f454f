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

//! Scene rendering strategies.
//!
//! A scene lane draws the world and the drawing overlays for one view. The
//! orchestrator picks exactly one lane from the active graphics settings,
//! binds the destination, loads the camera and then calls
//! [`SceneLane::render`] once per eye.

mod basic_scene_lane;
mod lit_scene_lane;
mod shadow_mapped_lane;

pub use self::basic_scene_lane::BasicSceneLane;
pub use self::lit_scene_lane::{LitSceneLane, PHONG_SHADER};
pub use self::shadow_mapped_lane::{ShadowMappedLane, SHADOWED_PHONG_SHADER};

use pitchview_core::lane::{Lane, LaneError};
use pitchview_core::renderer::{
    CapabilityError, Eye, GraphicsContext, GraphicsSettings, ProgramDescriptor, ProgramId,
    ResourceError, TextureId,
};
use pitchview_core::viewer::{DrawingStore, ResourceProvider, ScenePass, WorldState};
use std::fmt;

/// The scene strategy variants, in decreasing order of visual quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Fixed-function shading.
    Basic,
    /// Per-pixel lighting.
    Lit,
    /// Per-pixel lighting with shadows from the shadow pre-pass.
    ShadowMapped,
}

impl StrategyKind {
    /// The variant the settings ask for: shadows win over lighting, which wins over basic.
    pub fn preferred(settings: &GraphicsSettings) -> Self {
        if settings.use_shadows {
            StrategyKind::ShadowMapped
        } else if settings.use_phong {
            StrategyKind::Lit
        } else {
            StrategyKind::Basic
        }
    }

    /// The next variant to try when this one cannot be built. `Basic` is last.
    pub fn fallback(self) -> Option<Self> {
        match self {
            StrategyKind::ShadowMapped => Some(StrategyKind::Lit),
            StrategyKind::Lit => Some(StrategyKind::Basic),
            StrategyKind::Basic => None,
        }
    }

    /// Instantiates an uninitialized lane of this variant.
    pub fn create_lane(self) -> Box<dyn SceneLane> {
        match self {
            StrategyKind::Basic => Box::new(BasicSceneLane::new()),
            StrategyKind::Lit => Box::new(LitSceneLane::new()),
            StrategyKind::ShadowMapped => Box::new(ShadowMappedLane::new()),
        }
    }

    /// The strategy name used in logs and statistics.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Basic => "Basic",
            StrategyKind::Lit => "Lit",
            StrategyKind::ShadowMapped => "ShadowMapped",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a scene lane may depend on when it is built.
pub struct SceneLaneInit<'a> {
    /// Supplies shader sources.
    pub content: &'a dyn ResourceProvider,
    /// The shadow map the pre-pass will produce, if a shadow stage exists.
    pub shadow_map: Option<TextureId>,
}

/// The inputs of one scene pass.
pub struct SceneFrame<'a> {
    /// The world, locked by the caller for the whole frame.
    pub world: &'a dyn WorldState,
    /// The overlay annotations.
    pub drawings: &'a dyn DrawingStore,
    /// The eye being drawn.
    pub eye: Eye,
    /// This frame's shadow map, if the pre-pass ran.
    pub shadow_map: Option<TextureId>,
}

/// A swappable scene drawing strategy.
pub trait SceneLane: Lane {
    /// Which variant this lane implements.
    fn kind(&self) -> StrategyKind;

    /// Builds the lane's GPU resources.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::InitializationFailed`] if the device or the
    /// available resources cannot support this strategy.
    fn on_initialize(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        init: &SceneLaneInit<'_>,
    ) -> Result<(), LaneError>;

    /// Draws the scene for one eye into the currently bound destination.
    fn render(&self, ctx: &mut dyn GraphicsContext, frame: &SceneFrame<'_>);

    /// Releases the lane's GPU resources.
    fn dispose(&mut self, ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError>;
}

/// Fails with [`CapabilityError::Unsupported`] unless the device has `feature`.
pub(crate) fn require_feature(
    ctx: &dyn GraphicsContext,
    component: &'static str,
    feature: &'static str,
) -> Result<(), CapabilityError> {
    if ctx.capabilities().supports(feature) {
        Ok(())
    } else {
        Err(CapabilityError::Unsupported { component, feature })
    }
}

/// Compiles the named shader program from the resource provider's sources.
pub(crate) fn build_program(
    ctx: &mut dyn GraphicsContext,
    content: &dyn ResourceProvider,
    component: &'static str,
    shader: &str,
) -> Result<ProgramId, CapabilityError> {
    let source = content
        .shader_source(shader)
        .ok_or_else(|| CapabilityError::Resource {
            component,
            source: ResourceError::MissingShader(shader.to_owned()),
        })?;
    ctx.create_program(&ProgramDescriptor {
        label: shader.into(),
        source: &source,
    })
    .map_err(|source| CapabilityError::Resource { component, source })
}

/// Draws the world, then the overlay annotations, for one pass.
pub(crate) fn draw_pass(ctx: &mut dyn GraphicsContext, frame: &SceneFrame<'_>, pass: &ScenePass) {
    frame.world.render(ctx, pass);
    frame.drawings.render(ctx, pass);
}

/// Releases an optional program handle.
pub(crate) fn release_program(
    ctx: Option<&mut dyn GraphicsContext>,
    program: Option<ProgramId>,
) -> Result<(), ResourceError> {
    match program {
        None => Ok(()),
        Some(program) => ctx
            .ok_or(ResourceError::ContextLost)?
            .destroy_program(program),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_follows_setting_precedence() {
        let mut settings = GraphicsSettings {
            use_shadows: true,
            use_phong: true,
            ..Default::default()
        };
        assert_eq!(StrategyKind::preferred(&settings), StrategyKind::ShadowMapped);

        settings.use_shadows = false;
        assert_eq!(StrategyKind::preferred(&settings), StrategyKind::Lit);

        settings.use_phong = false;
        assert_eq!(StrategyKind::preferred(&settings), StrategyKind::Basic);

        settings.use_shadows = true;
        assert_eq!(StrategyKind::preferred(&settings), StrategyKind::ShadowMapped);
    }

    #[test]
    fn fallback_chain_is_finite_and_ends_at_basic() {
        let mut chain = vec![StrategyKind::ShadowMapped];
        while let Some(next) = chain.last().and_then(|k| k.fallback()) {
            chain.push(next);
        }
        assert_eq!(
            chain,
            vec![
                StrategyKind::ShadowMapped,
                StrategyKind::Lit,
                StrategyKind::Basic
            ]
        );
    }

    #[test]
    fn created_lanes_report_their_kind() {
        for kind in [
            StrategyKind::Basic,
            StrategyKind::Lit,
            StrategyKind::ShadowMapped,
        ] {
            let lane = kind.create_lane();
            assert_eq!(lane.kind(), kind);
            assert_eq!(lane.strategy_name(), kind.name());
        }
    }
}
