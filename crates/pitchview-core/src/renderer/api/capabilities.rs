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

//! Describes what the current graphics device can do.

use std::collections::BTreeSet;

/// Well-known feature names reported in [`GpuCapabilities::features`].
pub mod features {
    /// Offscreen framebuffer objects.
    pub const FRAMEBUFFER_OBJECT: &str = "framebuffer_object";
    /// Multisampled framebuffer objects.
    pub const FRAMEBUFFER_MULTISAMPLE: &str = "framebuffer_multisample";
    /// Framebuffer-to-framebuffer blits (multisample resolve).
    pub const FRAMEBUFFER_BLIT: &str = "framebuffer_blit";
    /// Programmable vertex and fragment stages.
    pub const PROGRAMMABLE_SHADERS: &str = "programmable_shaders";
    /// Floating-point color attachments, required by variance shadow maps.
    pub const FLOAT_TEXTURES: &str = "float_textures";
    /// Quad-buffered stereo output.
    pub const STEREO: &str = "stereo";
}

/// A snapshot of the graphics device's identity and supported features.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GpuCapabilities {
    /// The driver vendor string.
    pub vendor: String,
    /// The device/renderer string.
    pub renderer: String,
    /// The API version string.
    pub version: String,
    /// Maximum samples per pixel for multisampled targets.
    pub max_samples: u32,
    /// Supported feature names, see [`features`].
    pub features: BTreeSet<String>,
}

impl GpuCapabilities {
    /// Indicates if a specific feature is supported.
    pub fn supports(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Multisampled offscreen rendering that can be resolved with a blit.
    pub fn supports_multisample_resolve(&self) -> bool {
        self.supports(features::FRAMEBUFFER_MULTISAMPLE) && self.supports(features::FRAMEBUFFER_BLIT)
    }

    /// Adds a feature to the set; used by backends while probing the device.
    pub fn with_feature(mut self, feature: &str) -> Self {
        self.features.insert(feature.to_owned());
        self
    }

    /// A one-line description suitable for a startup diagnostic.
    pub fn summary(&self) -> String {
        let features: Vec<&str> = self.features.iter().map(String::as_str).collect();
        format!(
            "{} / {} ({}), max samples {}, features [{}]",
            self.vendor,
            self.renderer,
            self.version,
            self.max_samples,
            features.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multisample_resolve_needs_both_features() {
        let caps = GpuCapabilities::default().with_feature(features::FRAMEBUFFER_MULTISAMPLE);
        assert!(!caps.supports_multisample_resolve());

        let caps = caps.with_feature(features::FRAMEBUFFER_BLIT);
        assert!(caps.supports_multisample_resolve());
    }
}
