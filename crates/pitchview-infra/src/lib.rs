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

//! # Pitchview Infra
//!
//! Concrete implementations of the contracts defined in `pitchview-core`: an
//! in-memory graphics context and the live-feed and log-replay data sources.

#![warn(missing_docs)]

#[cfg(feature = "graphics")]
pub mod graphics;
pub mod logging;
#[cfg(feature = "network")]
pub mod source;

#[cfg(feature = "graphics")]
pub use graphics::{GpuCommand, HeadlessContext};
pub use logging::{init_logging, init_test_logging};
#[cfg(feature = "network")]
pub use source::{LiveFeedAdapter, LogReplayAdapter};
