use std::borrow::Cow;

use crate::resources::image::Image;

/// Texture filtering applied when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// A sampled 2D texture backed by an RGBA8 sRGB [`Image`].
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: Cow<'static, str>,
    pub image: Image,
    pub filter: FilterMode,
    /// Bumped whenever `image` is replaced; the renderer re-uploads on change.
    pub version: u64,
}

impl Texture {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, image: Image) -> Self {
        Self {
            name: name.into(),
            image,
            filter: FilterMode::Linear,
            version: 0,
        }
    }

    /// Replaces the pixels, keeping the key (and every material using it) valid.
    pub fn set_image(&mut self, image: Image) {
        self.image = image;
        self.version += 1;
    }
}
