#[allow(unused_imports)]
pub use itertools::Itertools;
#[allow(unused_imports)]
pub use num_traits;

#[allow(unused_imports)]
pub use anyhow::{anyhow, bail, Context, Result};
#[allow(unused_imports)]
pub use tracing::{error, info, warn};

#[allow(unused_imports)]
pub use crate::{
    core::{
        config::*,
        input::KeyCode,
        node::TransformNode,
        scene::{SceneError, SceneGraph},
        update::{
            collision::{Collision, CollisionResponse},
            SceneObject, UpdateContext,
        },
        NodeId,
    },
    resource::{ResourceHandler, SoundId, Texture},
    util::{
        assert::*,
        colour::Colour,
        linalg,
        linalg::{Mat3x3, Vec2, Vec3},
    },
};
