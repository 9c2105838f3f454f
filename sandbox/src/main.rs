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

//! Pitchview sandbox.
//!
//! Runs a short headless session: init, a few hundred frames with settings
//! edits and a resize in between, then dispose. Pass a RON viewer config as
//! the first argument; a config naming a replay log runs in replay mode.

mod demo;

use anyhow::{Context, Result};
use pitchview_agents::RenderOrchestrator;
use pitchview_core::config::ViewerConfig;
use pitchview_core::renderer::{SettingsStore, Viewport};
use pitchview_core::viewer::RunMode;
use pitchview_infra::{init_logging, HeadlessContext};
use std::thread;
use std::time::Duration;

const FRAMES: u32 = 240;
const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(&path)
            .with_context(|| format!("Failed to load viewer config from {path}"))?,
        None => ViewerConfig::default(),
    };
    let mode = if config.general.log_replay_file.is_some() {
        RunMode::Replay
    } else {
        RunMode::Live
    };
    log::info!("Starting pitchview sandbox in {mode} mode");

    let settings = SettingsStore::new(config.graphics.clone());
    let mut ctx = HeadlessContext::default();
    let mut orchestrator = RenderOrchestrator::new(
        mode,
        config,
        Box::new(demo::DemoFactory),
        Viewport::new(1024, 768),
    );
    orchestrator.init(Some(&mut ctx), &settings.snapshot());

    for frame in 0..FRAMES {
        match frame {
            60 => {
                settings.edit(|s| s.use_bloom = true);
            }
            120 => orchestrator.reshape(Some(&mut ctx), 1280, 720),
            180 => {
                settings.edit(|s| {
                    s.use_shadows = true;
                    s.use_stereo = true;
                });
            }
            _ => {}
        }

        orchestrator.update(Some(&mut ctx), FRAME_TIME.as_secs_f64() * 1000.0);
        orchestrator.render(Some(&mut ctx), &settings.snapshot());
        let commands = ctx.take_journal().len();
        log::trace!("Frame {frame}: {commands} GPU commands");
        thread::sleep(FRAME_TIME);
    }

    let stats = orchestrator.stats().clone();
    log::info!(
        "Rendered {} frames with {} reconfigurations; last frame {:?} using {}",
        stats.frame_count,
        stats.reconfigurations,
        stats.last_frame_time,
        stats.strategy.unwrap_or("no strategy")
    );

    orchestrator.dispose(Some(&mut ctx));
    log::info!(
        "{} render targets and {} programs left after dispose",
        ctx.live_targets().len(),
        ctx.live_programs().len()
    );
    Ok(())
}
