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

//! Per-frame counters exposed by the orchestrator.

use super::composition::FrameReport;
use std::time::Duration;

/// Rendering statistics, updated once per composed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames composed since construction.
    pub frame_count: u64,
    /// CPU time spent composing the last frame.
    pub last_frame_time: Duration,
    /// The scene strategy that drew the last frame.
    pub strategy: Option<&'static str>,
    /// Views drawn in the last frame: one, or two in stereo.
    pub views_last_frame: usize,
    /// Frames that ran the shadow pre-pass.
    pub shadow_passes: u64,
    /// Frames presented through the bloom stage.
    pub post_processed_frames: u64,
    /// Times the GPU resources were rebuilt for new settings.
    pub reconfigurations: u64,
}

impl FrameStats {
    pub(crate) fn record(&mut self, elapsed: Duration, strategy: &'static str, report: FrameReport) {
        self.frame_count += 1;
        self.last_frame_time = elapsed;
        self.strategy = Some(strategy);
        self.views_last_frame = report.views;
        self.shadow_passes += u64::from(report.shadow_pass);
        self.post_processed_frames += u64::from(report.post_processed);
    }
}
