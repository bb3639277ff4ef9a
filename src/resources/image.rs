use crate::errors::Result;

/// Largest texture side guaranteed by the WebGL2 downlevel limits.
pub const MAX_TEXTURE_SIZE: u32 = 2048;

/// Owned RGBA8 pixel data (sRGB encoded, row-major, top row first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    /// Creates an image from raw RGBA8 bytes.
    ///
    /// The buffer is truncated or zero-padded to `width * height * 4` bytes.
    #[must_use]
    pub fn new(width: u32, height: u32, mut data: Vec<u8>) -> Self {
        data.resize((width as usize) * (height as usize) * 4, 0);
        Self {
            width,
            height,
            data,
        }
    }

    /// A fully transparent image.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(width, height, Vec::new())
    }

    /// A single-color image.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }

    /// Decodes an encoded image (PNG, JPEG, WebP) into RGBA8.
    ///
    /// Images larger than [`MAX_TEXTURE_SIZE`] on either side are scaled down,
    /// keeping the aspect ratio.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dynamic = image::load_from_memory(bytes)?;
        if dynamic.width() > MAX_TEXTURE_SIZE || dynamic.height() > MAX_TEXTURE_SIZE {
            dynamic = dynamic.resize(
                MAX_TEXTURE_SIZE,
                MAX_TEXTURE_SIZE,
                image::imageops::FilterType::Triangle,
            );
        }
        let decoded = dynamic.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self {
            width,
            height,
            data: decoded.into_raw(),
        })
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = self.data.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
