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

//! Scene strategy selection with graceful fallback.

use pitchview_core::lane::{Lane, LaneError};
use pitchview_core::renderer::{GraphicsContext, GraphicsSettings, TextureId};
use pitchview_core::viewer::ResourceProvider;
use pitchview_lanes::render_lane::BasicSceneLane;
use pitchview_lanes::{SceneLane, SceneLaneInit, StrategyKind};

/// Builds a single scene strategy variant.
///
/// # Errors
///
/// Returns the lane's initialization error; the partially built lane is
/// released before returning.
pub fn build_strategy(
    ctx: &mut dyn GraphicsContext,
    kind: StrategyKind,
    init: &SceneLaneInit<'_>,
) -> Result<Box<dyn SceneLane>, LaneError> {
    let mut lane = kind.create_lane();
    if let Err(e) = lane.on_initialize(ctx, init) {
        if let Err(release) = lane.dispose(Some(ctx)) {
            log::warn!("Failed to release the {kind} strategy after a failed build: {release}");
        }
        return Err(e);
    }
    Ok(lane)
}

/// Picks the best scene strategy the settings ask for and the device supports.
///
/// The preferred variant is tried first, then each fallback in turn; every
/// failure is logged. The chain ends with the basic strategy, which needs
/// no GPU resources, so a strategy is always returned.
pub fn select_strategy(
    ctx: &mut dyn GraphicsContext,
    content: &dyn ResourceProvider,
    settings: &GraphicsSettings,
    shadow_map: Option<TextureId>,
) -> Box<dyn SceneLane> {
    let init = SceneLaneInit {
        content,
        shadow_map,
    };
    let mut next = Some(StrategyKind::preferred(settings));
    while let Some(kind) = next {
        match build_strategy(ctx, kind, &init) {
            Ok(lane) => {
                log::info!("Scene strategy: {}", lane.strategy_name());
                return lane;
            }
            Err(e) => {
                log::error!("Failed to initialize the {kind} scene strategy: {e}");
                next = kind.fallback();
            }
        }
    }
    log::warn!("No scene strategy could be built; drawing without GPU programs");
    Box::new(BasicSceneLane::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchview_core::renderer::{GpuCapabilities, ResourceError, ShaderSource};
    use pitchview_infra::HeadlessContext;

    struct Shaders;

    impl ResourceProvider for Shaders {
        fn init(&mut self, _ctx: &mut dyn GraphicsContext, _caps: &GpuCapabilities) -> bool {
            true
        }

        fn update(&mut self, _ctx: Option<&mut dyn GraphicsContext>) {}

        fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
            Ok(())
        }

        fn shader_source(&self, name: &str) -> Option<ShaderSource> {
            Some(ShaderSource::new(
                format!("// {name}.vert"),
                format!("// {name}.frag"),
            ))
        }
    }

    fn settings(use_shadows: bool, use_phong: bool) -> GraphicsSettings {
        GraphicsSettings {
            use_shadows,
            use_phong,
            ..GraphicsSettings::default()
        }
    }

    #[test]
    fn preferred_strategy_is_used_when_supported() {
        let mut ctx = HeadlessContext::default();
        let lane = select_strategy(&mut ctx, &Shaders, &settings(false, true), None);
        assert_eq!(lane.kind(), StrategyKind::Lit);
    }

    #[test]
    fn shadows_without_a_shadow_map_fall_back_to_lit() {
        let mut ctx = HeadlessContext::default();
        let lane = select_strategy(&mut ctx, &Shaders, &settings(true, true), None);
        assert_eq!(lane.kind(), StrategyKind::Lit);
    }

    #[test]
    fn fixed_function_device_falls_back_to_basic() {
        let mut ctx = HeadlessContext::new(HeadlessContext::minimal_capabilities());
        let lane = select_strategy(&mut ctx, &Shaders, &settings(false, true), None);
        assert_eq!(lane.kind(), StrategyKind::Basic);
    }

    #[test]
    fn failed_builds_release_their_programs() {
        let mut ctx = HeadlessContext::default();
        ctx.fail_program("phong");
        let lane = select_strategy(&mut ctx, &Shaders, &settings(false, true), None);
        assert_eq!(lane.kind(), StrategyKind::Basic);
        assert!(ctx.live_programs().is_empty());
    }
}
