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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::{FramebufferId, ProgramId};
use std::fmt;

/// An error related to the creation or use of a GPU resource (targets, programs, textures).
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// A generic resource could not be found.
    NotFound,
    /// The framebuffer handle does not reference a live render target.
    InvalidFramebuffer(FramebufferId),
    /// The program handle does not reference a live shader program.
    InvalidProgram(ProgramId),
    /// The resource provider has no shader source registered under this name.
    MissingShader(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// The graphics context was lost or is no longer current.
    ContextLost,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found."),
            ResourceError::InvalidFramebuffer(id) => {
                write!(f, "Invalid framebuffer handle: {id:?}")
            }
            ResourceError::InvalidProgram(id) => write!(f, "Invalid program handle: {id:?}"),
            ResourceError::MissingShader(name) => {
                write!(f, "No shader source available for '{name}'")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::ContextLost => write!(f, "The graphics context is no longer valid."),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Raised when a scene strategy or effect stage cannot be built on the current GPU.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// A device feature the component depends on is not supported.
    Unsupported {
        /// The strategy or stage that required the feature.
        component: &'static str,
        /// The name of the missing feature.
        feature: &'static str,
    },
    /// A dependent input (for instance the shadow map) was not produced.
    MissingInput {
        /// The strategy or stage that required the input.
        component: &'static str,
        /// A description of the missing input.
        input: &'static str,
    },
    /// A GPU resource needed by the component could not be created.
    Resource {
        /// The strategy or stage whose resource failed.
        component: &'static str,
        /// The underlying resource error.
        source: ResourceError,
    },
}

impl CapabilityError {
    /// Returns the name of the component that failed to build.
    pub fn component(&self) -> &'static str {
        match self {
            CapabilityError::Unsupported { component, .. }
            | CapabilityError::MissingInput { component, .. }
            | CapabilityError::Resource { component, .. } => component,
        }
    }
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::Unsupported { component, feature } => {
                write!(f, "{component} requires unsupported feature '{feature}'")
            }
            CapabilityError::MissingInput { component, input } => {
                write!(f, "{component} is missing its input: {input}")
            }
            CapabilityError::Resource { component, source } => {
                write!(f, "{component} could not create a GPU resource: {source}")
            }
        }
    }
}

impl std::error::Error for CapabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CapabilityError::Resource { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A high-level error surfaced by the orchestrator's accessors.
///
/// Lifecycle calls never return these; they are absorbed and logged at the
/// orchestrator boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A subsystem was accessed before the orchestrator finished initializing.
    NotInitialized(&'static str),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized(subsystem) => {
                write!(f, "The {subsystem} is not initialized.")
            }
        }
    }
}

impl std::error::Error for RenderError {}
