use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use super::scene::{LabelScene, Paint, Shape};
use super::{Color, LabelError};

const GLYPH_SIZE: u32 = 8;

/// Reusable pixel buffer a label is drawn onto.
///
/// Every [`draw`](LabelCanvas::draw) starts from a cleared buffer, so drawing
/// a different barcode into the same canvas leaves nothing of the previous one.
pub struct LabelCanvas {
    image: RgbImage,
}

impl LabelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn draw(&mut self, scene: &LabelScene) {
        if self.image.dimensions() != (scene.width, scene.height) {
            self.image = RgbImage::new(scene.width, scene.height);
        }
        let background = Rgb(scene.background.rgb());
        for pixel in self.image.pixels_mut() {
            *pixel = background;
        }

        for shape in &scene.shapes {
            match shape {
                Shape::Rect { x, y, width, height, paint } => {
                    let color = match paint {
                        Paint::Foreground => scene.foreground,
                        Paint::Background => scene.background,
                    };
                    self.fill_rect(*x, *y, *width, *height, color);
                }
                Shape::Text { center_x, top, size, content } => {
                    self.draw_text(*center_x, *top, *size, content, scene.foreground);
                }
            }
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color) {
        let (canvas_width, canvas_height) = self.image.dimensions();
        let pixel = Rgb(color.rgb());
        for py in y..y.saturating_add(height).min(canvas_height) {
            for px in x..x.saturating_add(width).min(canvas_width) {
                self.image.put_pixel(px, py, pixel);
            }
        }
    }

    fn draw_text(&mut self, center_x: u32, top: u32, size: u32, content: &str, color: Color) {
        let (canvas_width, canvas_height) = self.image.dimensions();
        let (canvas_width, canvas_height) = (i64::from(canvas_width), i64::from(canvas_height));
        let scale = i64::from((size / GLYPH_SIZE).max(1));
        let advance = i64::from(GLYPH_SIZE) * scale;
        let text_width = content.chars().count() as i64 * advance;
        let mut left = i64::from(center_x) - text_width / 2;
        let top = i64::from(top);
        let pixel = Rgb(color.rgb());

        for ch in content.chars() {
            if left >= canvas_width || top >= canvas_height {
                break;
            }
            if left + advance > 0 {
                let glyph = glyph_for(ch);
                for (row, bits) in glyph.iter().enumerate() {
                    let cell_top = top + row as i64 * scale;
                    for col in 0..GLYPH_SIZE {
                        if bits & (1 << col) == 0 {
                            continue;
                        }
                        let cell_left = left + i64::from(col) * scale;
                        // Clip the scaled glyph cell to the canvas.
                        for py in cell_top.max(0)..(cell_top + scale).min(canvas_height) {
                            for px in cell_left.max(0)..(cell_left + scale).min(canvas_width) {
                                self.image.put_pixel(px as u32, py as u32, pixel);
                            }
                        }
                    }
                }
            }
            left += advance;
        }
    }
}

fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
