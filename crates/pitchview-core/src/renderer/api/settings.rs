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

//! Graphics settings and the versioned store UI components edit them through.

use crate::renderer::api::GpuCapabilities;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// User-facing graphics toggles, persisted as part of the viewer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    /// Render a shadow pre-pass and use the shadow-mapped scene strategy.
    pub use_shadows: bool,
    /// Use per-pixel lighting when shadows are off.
    pub use_phong: bool,
    /// Composite the scene through the bloom post-processing stage.
    pub use_bloom: bool,
    /// Full-scene anti-aliasing.
    pub use_fsaa: bool,
    /// Samples per pixel when FSAA is active.
    pub fsaa_samples: u32,
    /// Quad-buffered stereo output.
    pub use_stereo: bool,
    /// Synchronize buffer swaps with the display refresh.
    pub use_vsync: bool,
    /// Edge length of the square shadow map, in texels.
    pub shadow_resolution: u32,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            use_shadows: false,
            use_phong: true,
            use_bloom: false,
            use_fsaa: true,
            fsaa_samples: 4,
            use_stereo: false,
            use_vsync: true,
            shadow_resolution: 1024,
        }
    }
}

/// How multisampling is applied for a given settings/device combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultisamplePlan {
    /// Whether the context's multisample rasterization flag is enabled.
    pub enabled: bool,
    /// Samples per pixel for the offscreen scene target; `0` means single-sample.
    pub scene_samples: u32,
    /// FSAA was requested but cannot be combined with bloom on this device.
    pub unsupported_with_bloom: bool,
}

impl GraphicsSettings {
    /// Whether the scene pass is rendered offscreen for post-processing.
    ///
    /// Bloom is the only stage that consumes the scene color buffer; the shadow
    /// stage renders into a target it owns.
    pub fn uses_scene_targets(&self) -> bool {
        self.use_bloom
    }

    /// Decides whether and how multisampling is used.
    ///
    /// FSAA combined with bloom requires multisampled framebuffers that can be
    /// resolved by a blit. Without bloom the visible framebuffer is multisampled
    /// directly and no offscreen samples are needed.
    pub fn multisample_plan(&self, caps: &GpuCapabilities) -> MultisamplePlan {
        let resolvable = caps.supports_multisample_resolve();
        let enabled = self.use_fsaa && (!self.use_bloom || resolvable);
        let mut scene_samples = if enabled && self.use_bloom {
            self.fsaa_samples
        } else {
            0
        };
        if caps.max_samples > 0 {
            scene_samples = scene_samples.min(caps.max_samples);
        }
        if scene_samples == 1 {
            scene_samples = 0;
        }
        MultisamplePlan {
            enabled,
            scene_samples,
            unsupported_with_bloom: self.use_fsaa && !resolvable,
        }
    }
}

/// A settings value tagged with the store version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionedSettings {
    /// Monotonic edit counter; bumped once per [`SettingsStore::edit`] call.
    pub version: u64,
    /// The settings at that version.
    pub settings: GraphicsSettings,
}

impl VersionedSettings {
    /// Wraps settings at version zero.
    pub fn new(settings: GraphicsSettings) -> Self {
        Self {
            version: 0,
            settings,
        }
    }
}

/// A cloneable handle to the live graphics settings.
///
/// Any UI or config component may edit the settings at any time. The render
/// thread reads a [`VersionedSettings`] snapshot at the frame boundary and
/// reconfigures once if the version moved, no matter how many edits happened
/// in between.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<VersionedSettings>>,
}

impl SettingsStore {
    /// Creates a store holding `settings` at version zero.
    pub fn new(settings: GraphicsSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(VersionedSettings::new(settings))),
        }
    }

    /// Returns a copy of the current settings and their version.
    pub fn snapshot(&self) -> VersionedSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the current version.
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Applies an edit and bumps the version. Returns the new version.
    pub fn edit<F>(&self, f: F) -> u64
    where
        F: FnOnce(&mut GraphicsSettings),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard.settings);
        guard.version += 1;
        log::debug!("Graphics settings edited (version {})", guard.version);
        guard.version
    }

    /// Replaces the settings wholesale and bumps the version.
    pub fn replace(&self, settings: GraphicsSettings) -> u64 {
        self.edit(|s| *s = settings)
    }
}
