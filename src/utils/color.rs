//! Color helpers.
//!
//! Scene colors are authored as sRGB hex literals (`0xffb6c1`) and stored as
//! linear RGB, which is what the lighting shader expects.

use glam::Vec3;

#[inline]
fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a packed `0xRRGGBB` sRGB color to linear RGB.
#[must_use]
pub fn hex(rgb: u32) -> Vec3 {
    let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
    let b = (rgb & 0xff) as f32 / 255.0;
    Vec3::new(
        srgb_channel_to_linear(r),
        srgb_channel_to_linear(g),
        srgb_channel_to_linear(b),
    )
}

/// Converts a packed `0xRRGGBB` sRGB color to 8-bit RGBA bytes (no conversion).
#[must_use]
pub fn hex_rgba8(rgb: u32, alpha: u8) -> [u8; 4] {
    [
        ((rgb >> 16) & 0xff) as u8,
        ((rgb >> 8) & 0xff) as u8,
        (rgb & 0xff) as u8,
        alpha,
    ]
}

/// HSL (all components in `[0, 1]`) to linear RGB.
#[must_use]
pub fn hsl(h: f32, s: f32, l: f32) -> Vec3 {
    let hue_to_rgb = |p: f32, q: f32, mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    let h = h.rem_euclid(1.0);
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    Vec3::new(
        srgb_channel_to_linear(r),
        srgb_channel_to_linear(g),
        srgb_channel_to_linear(b),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_extremes() {
        assert_eq!(hex(0x000000), Vec3::ZERO);
        assert!((hex(0xffffff) - Vec3::ONE).abs().max_element() < 1e-6);
    }

    #[test]
    fn hex_is_linearized() {
        // sRGB mid-grey is roughly 0.214 in linear space
        let grey = hex(0x808080);
        assert!((grey.x - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn hsl_primary_hues() {
        let red = hsl(0.0, 1.0, 0.5);
        assert!((red - Vec3::new(1.0, 0.0, 0.0)).abs().max_element() < 1e-5);
        let green = hsl(1.0 / 3.0, 1.0, 0.5);
        assert!((green - Vec3::new(0.0, 1.0, 0.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn rgba8_unpacks_channels() {
        assert_eq!(hex_rgba8(0xff6b9d, 255), [0xff, 0x6b, 0x9d, 255]);
    }
}
