//! Caption rasterization
//!
//! Renders short strings into RGBA [`Image`]s that are mapped onto transparent
//! planes: the cake captions, balloon labels, the wall banner, the gift
//! countdown and the wish overlay. Glyphs come from a font found through
//! `fontdb` (a configured file, or the system fonts) and are rasterized with
//! `swash`.
//!
//! Without a usable font every caption is a fully transparent image of the
//! requested size, so the scene keeps its layout and only loses the text.

use std::path::Path;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use swash::FontRef;

use crate::errors::{FeteError, Result};
use crate::resources::Image;
use crate::utils::color::hex_rgba8;

/// Fill paint of the glyphs.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(u32),
    /// Horizontal gradient across the whole canvas: `(offset, 0xRRGGBB)` stops.
    Gradient(Vec<(f32, u32)>),
}

impl Fill {
    fn color_at(&self, x: f32) -> [u8; 3] {
        match self {
            Fill::Solid(rgb) => {
                let [r, g, b, _] = hex_rgba8(*rgb, 255);
                [r, g, b]
            }
            Fill::Gradient(stops) => gradient_color(stops, x),
        }
    }
}

fn gradient_color(stops: &[(f32, u32)], x: f32) -> [u8; 3] {
    let rgb = |c: u32| {
        let [r, g, b, _] = hex_rgba8(c, 255);
        [f32::from(r), f32::from(g), f32::from(b)]
    };
    let Some(&(first_at, first)) = stops.first() else {
        return [0, 0, 0];
    };
    if x <= first_at {
        let [r, g, b] = rgb(first);
        return [r as u8, g as u8, b as u8];
    }
    for pair in stops.windows(2) {
        let (a_at, a) = pair[0];
        let (b_at, b) = pair[1];
        if x <= b_at {
            let t = if b_at > a_at { (x - a_at) / (b_at - a_at) } else { 1.0 };
            let (ca, cb) = (rgb(a), rgb(b));
            let mix = |i: usize| (ca[i] + (cb[i] - ca[i]) * t).round() as u8;
            return [mix(0), mix(1), mix(2)];
        }
    }
    let [r, g, b] = rgb(stops[stops.len() - 1].1);
    [r as u8, g as u8, b as u8]
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub width: u32,
    pub height: u32,
    /// Nominal font size in pixels; reduced when a line would not fit.
    pub font_px: f32,
    pub fill: Fill,
    /// Outline color and width in pixels.
    pub stroke: Option<(u32, f32)>,
    /// Soft drop shadow below and right of the text.
    pub shadow: bool,
    /// Canvas background, fully transparent when `None`.
    pub background: Option<[u8; 4]>,
    /// Break text into several lines at word boundaries.
    pub wrap: bool,
}

impl CaptionStyle {
    /// Gradient title text on a 1024x256 canvas.
    #[must_use]
    pub fn title(font_px: f32) -> Self {
        Self {
            width: 1024,
            height: 256,
            font_px,
            fill: Fill::Gradient(vec![(0.0, 0xff6b9d), (0.5, 0xff8eb4), (1.0, 0xff6b9d)]),
            stroke: None,
            shadow: false,
            background: None,
            wrap: false,
        }
    }

    /// Wall banner: four-stop gradient with a drop shadow.
    #[must_use]
    pub fn banner(font_px: f32) -> Self {
        Self {
            fill: Fill::Gradient(vec![
                (0.0, 0xff6b9d),
                (0.3, 0xff8eb4),
                (0.7, 0xff6b9d),
                (1.0, 0xff8eb4),
            ]),
            shadow: true,
            ..Self::title(font_px)
        }
    }

    /// Balloon label: colored text with a white outline on 256x128.
    #[must_use]
    pub fn balloon(color: u32) -> Self {
        Self {
            width: 256,
            height: 128,
            font_px: 24.0,
            fill: Fill::Solid(color),
            stroke: Some((0xffffff, 3.0)),
            shadow: false,
            background: None,
            wrap: false,
        }
    }

    /// Multi-line message card.
    #[must_use]
    pub fn card() -> Self {
        Self {
            width: 1024,
            height: 512,
            font_px: 44.0,
            fill: Fill::Solid(0x8b2252),
            stroke: None,
            shadow: false,
            background: Some([255, 245, 250, 235]),
            wrap: true,
        }
    }
}

struct LoadedFont {
    data: Vec<u8>,
    index: u32,
}

pub struct CaptionRasterizer {
    font: Option<LoadedFont>,
    context: ScaleContext,
}

impl Default for CaptionRasterizer {
    fn default() -> Self {
        Self::empty()
    }
}

impl CaptionRasterizer {
    /// A rasterizer without a font. Every caption comes out blank.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            font: None,
            context: ScaleContext::new(),
        }
    }

    /// Loads the configured font file, or searches the system fonts for a
    /// bold rounded face. Failing both gives blank captions.
    #[must_use]
    pub fn new(font_path: Option<&str>) -> Self {
        match Self::try_new(font_path) {
            Ok(rasterizer) => rasterizer,
            Err(e) => {
                log::warn!("Captions will be blank: {e}");
                Self::empty()
            }
        }
    }

    pub fn try_new(font_path: Option<&str>) -> Result<Self> {
        let mut db = Database::new();
        match font_path {
            Some(path) => db.load_font_file(Path::new(path))?,
            None => {
                #[cfg(not(target_arch = "wasm32"))]
                db.load_system_fonts();
            }
        }

        let query = Query {
            families: &[
                Family::Name("Comic Sans MS"),
                Family::Cursive,
                Family::SansSerif,
            ],
            weight: Weight::BOLD,
            style: Style::Normal,
            stretch: Stretch::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or_else(|| FeteError::FontUnavailable("no font faces found".to_string()))?;

        let font = db
            .with_face_data(id, |data, index| LoadedFont {
                data: data.to_vec(),
                index,
            })
            .ok_or_else(|| FeteError::FontUnavailable("font data unreadable".to_string()))?;

        if FontRef::from_index(&font.data, font.index as usize).is_none() {
            return Err(FeteError::FontUnavailable("unsupported font format".to_string()));
        }
        log::info!("Caption font loaded ({} bytes)", font.data.len());

        Ok(Self {
            font: Some(font),
            context: ScaleContext::new(),
        })
    }

    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Renders `text` centered on a canvas of `style.width` x `style.height`.
    pub fn render(&mut self, text: &str, style: &CaptionStyle) -> Image {
        let (w, h) = (style.width.max(1), style.height.max(1));
        let mut image = match style.background {
            Some(bg) => Image::solid(w, h, bg),
            None => Image::transparent(w, h),
        };

        let Some(font) = &self.font else {
            return image;
        };
        let Some(font_ref) = FontRef::from_index(&font.data, font.index as usize) else {
            return image;
        };

        let mut coverage = Coverage::new(w, h);
        let mut colors = Vec::new();
        layout_and_draw(&mut self.context, font_ref, text, style, &mut coverage, &mut colors);

        compose(&mut image, &coverage, &colors, style);
        image
    }
}

/// Glyph coverage of the whole canvas, plus per-pixel color for color glyphs.
struct Coverage {
    width: u32,
    height: u32,
    alpha: Vec<f32>,
}

impl Coverage {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0.0; (width * height) as usize],
        }
    }

    fn get(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0.0;
        }
        self.alpha[(y as u32 * self.width + x as u32) as usize]
    }

    fn add(&mut self, x: i64, y: i64, a: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as u32 * self.width + x as u32) as usize;
        self.alpha[i] = (self.alpha[i] + a).min(1.0);
    }

    /// Max filter over a disk of `radius` pixels.
    fn dilate(&self, radius: f32) -> Self {
        let r = radius.ceil() as i64;
        let mut out = Self::new(self.width, self.height);
        for y in 0..i64::from(self.height) {
            for x in 0..i64::from(self.width) {
                let mut best: f32 = 0.0;
                for dy in -r..=r {
                    for dx in -r..=r {
                        if ((dx * dx + dy * dy) as f32) <= radius * radius {
                            best = best.max(self.get(x + dx, y + dy));
                        }
                    }
                }
                out.alpha[(y as u32 * self.width + x as u32) as usize] = best;
            }
        }
        out
    }

    /// Separable box blur.
    fn blur(&self, radius: i64) -> Self {
        let mut tmp = Self::new(self.width, self.height);
        let mut out = Self::new(self.width, self.height);
        let n = (2 * radius + 1) as f32;
        for y in 0..i64::from(self.height) {
            for x in 0..i64::from(self.width) {
                let sum: f32 = (-radius..=radius).map(|d| self.get(x + d, y)).sum();
                tmp.alpha[(y as u32 * self.width + x as u32) as usize] = sum / n;
            }
        }
        for y in 0..i64::from(self.height) {
            for x in 0..i64::from(self.width) {
                let sum: f32 = (-radius..=radius).map(|d| tmp.get(x, y + d)).sum();
                out.alpha[(y as u32 * self.width + x as u32) as usize] = sum / n;
            }
        }
        out
    }
}

/// A color glyph pixel (emoji) drawn over the fill.
struct ColorPixel {
    x: i64,
    y: i64,
    rgba: [u8; 4],
}

struct LineMetrics {
    text: String,
    width: f32,
}

fn measure(font: FontRef<'_>, text: &str, size: f32) -> f32 {
    let metrics = font.metrics(&[]);
    let glyph_metrics = font.glyph_metrics(&[]);
    let scale = size / f32::from(metrics.units_per_em.max(1));
    let charmap = font.charmap();
    text.chars()
        .map(|c| glyph_metrics.advance_width(charmap.map(c)) * scale)
        .sum()
}

/// Splits `text` into lines no wider than `max_width` at `size`.
fn wrap_lines(font: FontRef<'_>, text: &str, size: f32, max_width: f32) -> Vec<LineMetrics> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && measure(font, &candidate, size) > max_width {
                let width = measure(font, &current, size);
                lines.push(LineMetrics {
                    text: std::mem::take(&mut current),
                    width,
                });
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        let width = measure(font, &current, size);
        lines.push(LineMetrics {
            text: current,
            width,
        });
    }
    lines
}

fn layout_and_draw(
    context: &mut ScaleContext,
    font: FontRef<'_>,
    text: &str,
    style: &CaptionStyle,
    coverage: &mut Coverage,
    colors: &mut Vec<ColorPixel>,
) {
    let (w, h) = (style.width as f32, style.height as f32);
    let max_width = w * 0.92;

    let mut size = style.font_px.max(1.0);
    let mut lines = if style.wrap {
        wrap_lines(font, text, size, max_width)
    } else {
        let width = measure(font, text, size);
        vec![LineMetrics {
            text: text.to_string(),
            width,
        }]
    };

    // Shrink single lines that overflow the canvas.
    if !style.wrap
        && let Some(line) = lines.first_mut()
        && line.width > max_width
    {
        size *= max_width / line.width;
        line.width = measure(font, &line.text, size);
    }

    let metrics = font.metrics(&[]).scale(size);
    let line_height = (metrics.ascent + metrics.descent.abs()) * 1.2;
    let block_height = line_height * lines.len() as f32;
    let first_baseline =
        (h - block_height) / 2.0 + (line_height + metrics.ascent - metrics.descent.abs()) / 2.0;

    let glyph_metrics = font.glyph_metrics(&[]).scale(size);
    let charmap = font.charmap();
    let mut scaler = context.builder(font).size(size).hint(true).build();
    let mut render = Render::new(&[
        Source::ColorOutline(0),
        Source::ColorBitmap(StrikeWith::BestFit),
        Source::Outline,
    ]);
    render.format(Format::Alpha);

    for (row, line) in lines.iter().enumerate() {
        let baseline = first_baseline + row as f32 * line_height;
        let mut pen_x = (w - line.width) / 2.0;
        for c in line.text.chars() {
            let glyph = charmap.map(c);
            let advance = glyph_metrics.advance_width(glyph);
            if let Some(img) = render.render(&mut scaler, glyph) {
                let left = pen_x.round() as i64 + i64::from(img.placement.left);
                let top = baseline.round() as i64 - i64::from(img.placement.top);
                let (gw, gh) = (img.placement.width, img.placement.height);
                for gy in 0..gh {
                    for gx in 0..gw {
                        let (px, py) = (left + i64::from(gx), top + i64::from(gy));
                        match img.content {
                            Content::Color => {
                                let i = ((gy * gw + gx) * 4) as usize;
                                if let Some(p) = img.data.get(i..i + 4)
                                    && p[3] > 0
                                {
                                    colors.push(ColorPixel {
                                        x: px,
                                        y: py,
                                        rgba: [p[0], p[1], p[2], p[3]],
                                    });
                                }
                            }
                            _ => {
                                let i = (gy * gw + gx) as usize;
                                if let Some(&a) = img.data.get(i) {
                                    coverage.add(px, py, f32::from(a) / 255.0);
                                }
                            }
                        }
                    }
                }
            }
            pen_x += advance;
        }
    }
}

fn blend(dst: &mut [u8], src: [u8; 3], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    for c in 0..3 {
        let s = f32::from(src[c]);
        let d = f32::from(dst[c]);
        let v = if out_a > 0.0 {
            (s * alpha + d * da * (1.0 - alpha)) / out_a
        } else {
            0.0
        };
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn compose(image: &mut Image, coverage: &Coverage, colors: &[ColorPixel], style: &CaptionStyle) {
    let (w, h) = (image.width, image.height);
    let pixel = |x: u32, y: u32| ((y * w + x) * 4) as usize;

    if style.shadow {
        let shadow = coverage.blur(4);
        for y in 0..h {
            for x in 0..w {
                let a = shadow.get(i64::from(x) - 2, i64::from(y) - 2) * 0.3;
                let i = pixel(x, y);
                blend(&mut image.data[i..i + 4], [0, 0, 0], a);
            }
        }
    }

    if let Some((color, width)) = style.stroke {
        let outline = coverage.dilate(width);
        let [r, g, b, _] = hex_rgba8(color, 255);
        for y in 0..h {
            for x in 0..w {
                let a = outline.get(i64::from(x), i64::from(y));
                let i = pixel(x, y);
                blend(&mut image.data[i..i + 4], [r, g, b], a);
            }
        }
    }

    for y in 0..h {
        for x in 0..w {
            let a = coverage.get(i64::from(x), i64::from(y));
            if a <= 0.0 {
                continue;
            }
            let color = style.fill.color_at(x as f32 / w.max(1) as f32);
            let i = pixel(x, y);
            blend(&mut image.data[i..i + 4], color, a);
        }
    }

    for p in colors {
        if p.x < 0 || p.y < 0 || p.x >= i64::from(w) || p.y >= i64::from(h) {
            continue;
        }
        let i = pixel(p.x as u32, p.y as u32);
        blend(
            &mut image.data[i..i + 4],
            [p.rgba[0], p.rgba[1], p.rgba[2]],
            f32::from(p.rgba[3]) / 255.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_caption_keeps_requested_size() {
        let mut captions = CaptionRasterizer::empty();
        let image = captions.render("Happy birthday", &CaptionStyle::title(150.0));
        assert_eq!((image.width, image.height), (1024, 256));
        assert!(image.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn card_background_is_painted_without_font() {
        let mut captions = CaptionRasterizer::empty();
        let image = captions.render("wish", &CaptionStyle::card());
        assert_eq!(image.pixel(0, 0), Some([255, 245, 250, 235]));
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [(0.0, 0x000000), (1.0, 0xff0000)];
        assert_eq!(gradient_color(&stops, 0.0), [0, 0, 0]);
        assert_eq!(gradient_color(&stops, 1.0), [255, 0, 0]);
        assert_eq!(gradient_color(&stops, 0.5), [128, 0, 0]);
        assert_eq!(gradient_color(&stops, 2.0), [255, 0, 0]);
    }

    #[test]
    fn dilate_grows_coverage() {
        let mut c = Coverage::new(9, 9);
        c.add(4, 4, 1.0);
        let grown = c.dilate(2.0);
        assert!((grown.get(4, 6) - 1.0).abs() < f32::EPSILON);
        assert!((grown.get(6, 6)).abs() < f32::EPSILON);
    }

    #[test]
    fn blend_over_transparent_takes_source() {
        let mut px = [0, 0, 0, 0];
        blend(&mut px, [10, 20, 30], 1.0);
        assert_eq!(px, [10, 20, 30, 255]);
    }
}
