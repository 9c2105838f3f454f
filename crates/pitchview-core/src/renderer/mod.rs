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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" for all rendering operations: the
//! abstract [`GraphicsContext`] handle the host shell lends to the orchestrator,
//! the descriptors for offscreen targets and shader programs, the graphics
//! settings, and the error types that form the stable rendering API.
//!
//! The strategies in `pitchview-lanes` and the orchestrator in `pitchview-agents`
//! only ever talk to the GPU through these traits; a concrete backend lives in
//! `pitchview-infra`.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{CapabilityError, RenderError, ResourceError};
pub use self::traits::GraphicsContext;
