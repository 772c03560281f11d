//! Barcode label rendering.
//!
//! A label is composed once into a [`LabelScene`] and then drawn twice: as
//! SVG markup for display and printing, and onto a [`LabelCanvas`] for the
//! downloadable PNG. Both outputs read the same geometry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::barcode::code128::EncodeError;

pub mod raster;
pub mod scene;
pub mod vector;

pub use raster::LabelCanvas;
pub use scene::{LabelScene, Shape};

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Barcode encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Barcode needs {modules} modules but only {available}px are available")]
    TooWide { modules: usize, available: u32 },
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| format!("Invalid color '{s}', expected #rrggbb"))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("Invalid color '{s}', expected #rrggbb"))
        };
        Ok(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Rendering parameters, configurable through the `[label]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Pixels per Code 128 module.
    pub module_width: u32,
    pub bar_height: u32,
    pub font_size: u32,
    pub margin: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub foreground: Color,
    pub background: Color,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            module_width: 2,
            bar_height: 100,
            font_size: 16,
            margin: 10,
            canvas_width: 720,
            canvas_height: 400,
            foreground: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

const MAX_CANVAS_SIDE: u32 = 4096;
const MAX_MODULE_WIDTH: u32 = 16;
const MAX_FONT_SIZE: u32 = 128;

impl LabelOptions {
    /// Checks that the options describe a label that can be rendered.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("canvas_width", self.canvas_width), ("canvas_height", self.canvas_height)] {
            if value == 0 || value > MAX_CANVAS_SIDE {
                return Err(format!("{name} must be between 1 and {MAX_CANVAS_SIDE}, got {value}"));
            }
        }
        if self.module_width == 0 || self.module_width > MAX_MODULE_WIDTH {
            return Err(format!(
                "module_width must be between 1 and {MAX_MODULE_WIDTH}, got {}",
                self.module_width
            ));
        }
        if self.font_size > MAX_FONT_SIZE {
            return Err(format!("font_size must be at most {MAX_FONT_SIZE}, got {}", self.font_size));
        }
        if self.bar_height == 0 || self.bar_height > self.canvas_height {
            return Err(format!(
                "bar_height must be between 1 and canvas_height ({}), got {}",
                self.canvas_height, self.bar_height
            ));
        }
        if self.margin.saturating_mul(2) >= self.canvas_width {
            return Err(format!("margin {} leaves no room on a {}px canvas", self.margin, self.canvas_width));
        }
        Ok(())
    }
}

/// Tool metadata printed around the bars.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelFields {
    pub name: String,
    pub category: String,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub svg: String,
    pub png: Vec<u8>,
    pub filename: String,
}

/// Download name of the raster label.
pub fn png_filename(barcode: &str) -> String {
    format!("barcode-{barcode}.png")
}

/// Renders both label forms for `barcode`.
pub fn render_label(
    barcode: &str,
    fields: &LabelFields,
    options: &LabelOptions,
) -> Result<RenderedLabel, LabelError> {
    let scene = LabelScene::compose(barcode, fields, options)?;
    let mut canvas = LabelCanvas::new(scene.width, scene.height);
    canvas.draw(&scene);
    Ok(RenderedLabel {
        svg: scene.to_svg(),
        png: canvas.to_png()?,
        filename: png_filename(barcode),
    })
}
