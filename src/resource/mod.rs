use crate::core::prelude::*;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(u32);

/// An opaque texture handle plus the unscaled pixel size of the image behind it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Texture {
    id: TextureId,
    extent: Vec2,
}

impl Texture {
    pub fn id(&self) -> TextureId {
        self.id
    }
    pub fn extent(&self) -> Vec2 {
        self.extent
    }
}

impl Display for Texture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Texture#{}[{}x{}]", self.id.0, self.extent.x, self.extent.y)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SoundId(u32);

/// Maps asset names onto opaque handles. Loading the bytes behind a name belongs to whatever
/// backend consumes the handles.
#[derive(Clone, Debug, Default)]
pub struct ResourceHandler {
    textures: BTreeMap<String, Texture>,
    sounds: BTreeMap<String, SoundId>,
}

impl ResourceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture, or returns the existing handle if `name` is already known.
    pub fn register_texture(&mut self, name: impl AsRef<str>, extent: Vec2) -> Result<Texture> {
        let name = name.as_ref();
        if let Some(existing) = self.textures.get(name) {
            if existing.extent != extent {
                bail!(
                    "texture {name} already registered with extent {}, not {}",
                    existing.extent,
                    extent
                );
            }
            return Ok(*existing);
        }
        let id = TextureId(u32::try_from(self.textures.len()).context("too many textures")?);
        let texture = Texture { id, extent };
        info!("registered {name} as {texture}");
        self.textures.insert(name.to_string(), texture);
        Ok(texture)
    }
    pub fn texture(&self, name: impl AsRef<str>) -> Result<Texture> {
        let name = name.as_ref();
        self.textures
            .get(name)
            .copied()
            .with_context(|| format!("unknown texture: {name}"))
    }

    pub fn register_sound(&mut self, name: impl AsRef<str>) -> Result<SoundId> {
        let name = name.as_ref();
        if let Some(existing) = self.sounds.get(name) {
            return Ok(*existing);
        }
        let id = SoundId(u32::try_from(self.sounds.len()).context("too many sounds")?);
        info!("registered {name} as sound #{}", id.0);
        self.sounds.insert(name.to_string(), id);
        Ok(id)
    }
    pub fn sound(&self, name: impl AsRef<str>) -> Result<SoundId> {
        let name = name.as_ref();
        self.sounds
            .get(name)
            .copied()
            .with_context(|| format!("unknown sound: {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_are_registered_once() {
        let mut resources = ResourceHandler::new();
        let body = resources
            .register_texture("tankBlue_outline.png", Vec2 { x: 75.0, y: 70.0 })
            .unwrap();
        let barrel = resources
            .register_texture("barrelBlue.png", Vec2 { x: 16.0, y: 50.0 })
            .unwrap();
        assert_ne!(body.id(), barrel.id());
        assert_eq!(
            resources
                .register_texture("tankBlue_outline.png", Vec2 { x: 75.0, y: 70.0 })
                .unwrap(),
            body
        );
        assert!(resources
            .register_texture("tankBlue_outline.png", Vec2::one())
            .is_err());
        assert_eq!(resources.texture("barrelBlue.png").unwrap(), barrel);
        assert!(resources.texture("missing.png").is_err());
    }

    #[test]
    fn sounds_lookup() {
        let mut resources = ResourceHandler::new();
        let fire = resources.register_sound("tankFiring.wav").unwrap();
        assert_eq!(resources.register_sound("tankFiring.wav").unwrap(), fire);
        assert_eq!(resources.sound("tankFiring.wav").unwrap(), fire);
        assert!(resources.sound("explosion.wav").is_err());
    }
}
