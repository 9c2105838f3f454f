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

//! Lifecycle phases of the render orchestrator.

use std::fmt;

/// Where the orchestrator is in its init/dispose cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Constructed; no context has been seen yet.
    #[default]
    Uninitialized,
    /// `init` is building subsystems and GPU resources.
    Initializing,
    /// Subsystems exist and frames can be rendered.
    Ready,
    /// `dispose` is releasing resources.
    Disposing,
    /// Resources were released; `init` may run again.
    Disposed,
}

impl LifecycleState {
    /// Whether the orchestrator may move from `self` to `next`.
    ///
    /// `init` is accepted from every resting state, including `Ready` when the
    /// host recreated its context. `dispose` only makes sense once something
    /// was built.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Uninitialized | Ready | Disposed, Initializing)
                | (Initializing, Ready)
                | (Ready | Initializing, Disposing)
                | (Disposing, Disposed)
        )
    }

    /// Whether frames can be rendered.
    pub fn is_ready(self) -> bool {
        self == LifecycleState::Ready
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Ready => "ready",
            LifecycleState::Disposing => "disposing",
            LifecycleState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_allowed_from_resting_states() {
        assert!(LifecycleState::Uninitialized.can_transition_to(LifecycleState::Initializing));
        assert!(LifecycleState::Ready.can_transition_to(LifecycleState::Initializing));
        assert!(LifecycleState::Disposed.can_transition_to(LifecycleState::Initializing));
        assert!(!LifecycleState::Disposing.can_transition_to(LifecycleState::Initializing));
    }

    #[test]
    fn dispose_requires_something_built() {
        assert!(!LifecycleState::Uninitialized.can_transition_to(LifecycleState::Disposing));
        assert!(!LifecycleState::Disposed.can_transition_to(LifecycleState::Disposing));
        assert!(LifecycleState::Ready.can_transition_to(LifecycleState::Disposing));
    }

    #[test]
    fn only_ready_renders() {
        assert!(LifecycleState::Ready.is_ready());
        assert!(!LifecycleState::Initializing.is_ready());
        assert_eq!(LifecycleState::default(), LifecycleState::Uninitialized);
    }
}
