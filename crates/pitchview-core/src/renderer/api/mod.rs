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

//! Backend-agnostic data types shared across the rendering subsystem.

use crate::renderer::traits::GraphicsContext;

pub mod capabilities;
pub mod program;
pub mod settings;
pub mod state;
pub mod target;
pub mod view;

pub use self::capabilities::*;
pub use self::program::*;
pub use self::settings::*;
pub use self::state::*;
pub use self::target::*;
pub use self::view::*;

/// Reborrows an optional context handle for a nested call.
///
/// Teardown paths pass the host's possibly-absent context through several
/// release steps in a row; each step gets its own short-lived borrow.
pub fn reborrow_context<'a, 'b: 'a>(
    ctx: &'a mut Option<&'b mut (dyn GraphicsContext + 'b)>,
) -> Option<&'a mut (dyn GraphicsContext + 'a)> {
    match ctx {
        Some(c) => Some(&mut **c),
        None => None,
    }
}
