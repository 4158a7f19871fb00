pub mod audio;
pub mod config;
pub mod input;
pub mod node;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod update;

slotmap::new_key_type! {
    /// Generational handle to a node in a [`SceneGraph`](scene::SceneGraph).
    ///
    /// A handle outlives its node: once the node is destroyed, lookups through the handle fail
    /// with [`SceneError::StaleNode`](scene::SceneError::StaleNode) instead of reaching whatever
    /// node later reuses the slot.
    pub struct NodeId;
}
