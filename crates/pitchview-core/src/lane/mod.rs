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

//! # Lane Abstraction
//!
//! A **Lane** is a reusable, swappable processing strategy owned by the render
//! orchestrator. Scene strategies (basic, lit, shadow-mapped) and effect stages
//! (shadow map generation, bloom) are all lanes: each has a name, a kind, and a
//! fallible initialization against the current graphics context.
//!
//! Domain-specific traits extend this base in `pitchview-lanes`.

use crate::renderer::CapabilityError;
use std::fmt;

/// Error type for lane operations.
#[derive(Debug)]
pub enum LaneError {
    /// The lane has not been initialized yet.
    NotInitialized(&'static str),
    /// The lane cannot be built on this device or with the available resources.
    InitializationFailed(CapabilityError),
}

impl fmt::Display for LaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneError::NotInitialized(name) => write!(f, "Lane {name} not initialized"),
            LaneError::InitializationFailed(e) => write!(f, "Lane initialization failed: {e}"),
        }
    }
}

impl std::error::Error for LaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaneError::InitializationFailed(e) => Some(e),
            LaneError::NotInitialized(_) => None,
        }
    }
}

impl From<CapabilityError> for LaneError {
    fn from(err: CapabilityError) -> Self {
        LaneError::InitializationFailed(err)
    }
}

/// Classification of lane types, used for logging and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Main scene rendering.
    Scene,
    /// Shadow map generation.
    Shadow,
    /// Post-processing of the scene color buffer.
    PostProcess,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Scene => write!(f, "Scene"),
            LaneKind::Shadow => write!(f, "Shadow"),
            LaneKind::PostProcess => write!(f, "PostProcess"),
        }
    }
}

/// The common interface shared by every lane.
pub trait Lane: Send {
    /// Returns a human-readable identifier for this strategy.
    fn strategy_name(&self) -> &'static str;

    /// Returns the classification of this lane.
    fn lane_kind(&self) -> LaneKind;
}
