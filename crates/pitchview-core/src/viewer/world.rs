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

use super::source::SourceListener;
use crate::renderer::{Eye, GraphicsContext, ResourceError, TextureId};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A shared reference to the world's scene graph.
///
/// The world owns the graph; the orchestrator only carries the reference across
/// a re-initialization and hands it back to the freshly built world, so the
/// graph content survives a context recreation without being rebuilt.
#[derive(Clone)]
pub struct SceneGraphRef(Arc<dyn Any + Send + Sync>);

impl SceneGraphRef {
    /// Wraps a scene graph value.
    pub fn new<T: Any + Send + Sync>(graph: T) -> Self {
        Self(Arc::new(graph))
    }

    /// Returns `true` if both references point at the same graph.
    pub fn ptr_eq(&self, other: &SceneGraphRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the graph as `T` if it has that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for SceneGraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SceneGraphRef")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

/// Observes replacements of the world's scene graph (e.g. to stream its models).
pub trait SceneGraphListener: Send + Sync {
    /// Called after the world's scene graph was replaced.
    fn scene_graph_changed(&self, graph: &SceneGraphRef);
}

/// The lighting model a scene pass is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    /// Unlit or fixed-function lighting.
    Basic,
    /// Per-pixel lighting.
    Phong,
    /// Per-pixel lighting attenuated by a shadow map.
    PhongShadowed,
    /// Depth-only rendering of shadow casters from the light's point of view.
    ShadowCasters,
}

/// Everything a world or drawing store needs to draw itself for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePass {
    /// Lighting model.
    pub shading: ShadingModel,
    /// The eye the pass is rendered for.
    pub eye: Eye,
    /// The shadow map produced by the pre-pass, if any.
    pub shadow_map: Option<TextureId>,
}

impl ScenePass {
    /// A main pass for `eye`.
    pub fn main(shading: ShadingModel, eye: Eye, shadow_map: Option<TextureId>) -> Self {
        Self {
            shading,
            eye,
            shadow_map,
        }
    }

    /// The shadow-caster pre-pass.
    pub fn shadow_casters() -> Self {
        Self {
            shading: ShadingModel::ShadowCasters,
            eye: Eye::Mono,
            shadow_map: None,
        }
    }
}

/// The mutable scene graph and simulation state.
///
/// Two actors touch it: the render thread reads it under the frame lock, and
/// the ingestion actor (network receiver or log replay driver) mutates it
/// through [`WorldState::apply_message`]. No GPU calls happen on the ingestion
/// side, so `apply_message` takes no context.
pub trait WorldState: Send {
    /// Advances animation and interpolation.
    fn update(&mut self, ctx: Option<&mut dyn GraphicsContext>, elapsed_ms: f64);

    /// Draws the world's geometry for one pass.
    fn render(&self, ctx: &mut dyn GraphicsContext, pass: &ScenePass);

    /// Returns the current scene graph, if one has been built.
    fn scene_graph(&self) -> Option<SceneGraphRef>;

    /// Re-anchors a scene graph preserved from a previous world instance.
    fn set_scene_graph(&mut self, graph: SceneGraphRef);

    /// Registers an observer of scene graph replacements.
    fn add_scene_graph_listener(&mut self, listener: Arc<dyn SceneGraphListener>);

    /// The listener through which the data source reports feed state to the world.
    fn source_listener(&self) -> Option<Arc<dyn SourceListener>> {
        None
    }

    /// Applies one framed message from the data source.
    fn apply_message(&mut self, message: &[u8]);

    /// Releases GPU resources held by the world.
    fn dispose(&mut self, _ctx: Option<&mut dyn GraphicsContext>) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// The world shared between the render thread and the ingestion actor.
///
/// A single coarse mutex guards the whole world. The render thread holds it for
/// an entire frame so the state cannot change mid-draw; ingestion waits at most
/// one frame.
pub type SharedWorld = Arc<Mutex<Box<dyn WorldState>>>;

/// Wraps a world for sharing with the ingestion actor.
pub fn share_world(world: Box<dyn WorldState>) -> SharedWorld {
    Arc::new(Mutex::new(world))
}

/// Locks the world, recovering the guard if a previous holder panicked.
pub fn lock_world(world: &SharedWorld) -> MutexGuard<'_, Box<dyn WorldState>> {
    world.lock().unwrap_or_else(|poisoned| {
        log::warn!("World lock was poisoned; continuing with the last written state");
        PoisonError::into_inner(poisoned)
    })
}
