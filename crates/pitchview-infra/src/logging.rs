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

//! Logging bootstrap for binaries and tests.

use env_logger::{Builder, Env};

/// Installs the `env_logger` backend, filtering at `info` unless `RUST_LOG` says otherwise.
///
/// Returns `false` if a logger was already installed; calling this more than
/// once is harmless.
pub fn init_logging() -> bool {
    Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}

/// Installs a logger that writes through the test harness's captured output.
pub fn init_test_logging() -> bool {
    Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init()
        .is_ok()
}
