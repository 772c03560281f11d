use super::{Color, LabelError, LabelFields, LabelOptions};
use crate::barcode::code128;

pub const TITLE: &str = "TOOL INSPECTION";
pub const FOOTER: &str = "Scan or enter this barcode to verify";

/// Vertical gaps between label rows, in pixels.
const TITLE_GAP: u32 = 12;
const BARS_GAP: u32 = 20;
const VALUE_GAP: u32 = 6;
const CAPTION_GAP: u32 = 20;
const LINE_GAP: u32 = 8;
const FOOTER_GAP: u32 = 16;

/// Minimum light margin on each side of the symbol, in modules.
pub const QUIET_MODULES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Foreground,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        paint: Paint,
    },
    /// Single line of text centered on `center_x`, `top` is the top of the glyph cell.
    Text {
        center_x: u32,
        top: u32,
        size: u32,
        content: String,
    },
}

/// Label geometry shared by the SVG and PNG outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScene {
    pub width: u32,
    pub height: u32,
    pub foreground: Color,
    pub background: Color,
    pub shapes: Vec<Shape>,
}

impl LabelScene {
    pub fn compose(
        barcode: &str,
        fields: &LabelFields,
        options: &LabelOptions,
    ) -> Result<Self, LabelError> {
        let symbol = code128::encode(barcode)?;

        let width = options.canvas_width;
        let center_x = width / 2;
        let available = width.saturating_sub(options.margin.saturating_mul(2));
        let modules = symbol.module_count() as u32;
        let quiet_modules = modules + 2 * QUIET_MODULES;
        let module_width = options.module_width.min(available / quiet_modules);
        if module_width == 0 {
            return Err(LabelError::TooWide {
                modules: quiet_modules as usize,
                available,
            });
        }

        let body_size = options.font_size.max(8);
        let name_size = body_size.saturating_mul(3) / 2;
        let footer_size = (body_size / 2).max(8);

        let mut shapes = vec![Shape::Rect {
            x: 0,
            y: 0,
            width,
            height: options.canvas_height,
            paint: Paint::Background,
        }];
        let text = |shapes: &mut Vec<Shape>, top: u32, size: u32, content: String| {
            shapes.push(Shape::Text { center_x, top, size, content });
            top.saturating_add(size)
        };

        let mut y = options.margin.saturating_add(8);
        y = text(&mut shapes, y, body_size, TITLE.to_string());
        y = text(&mut shapes, y.saturating_add(TITLE_GAP), name_size, fields.name.clone());

        let bars_top = y.saturating_add(BARS_GAP);
        let symbol_width = modules * module_width;
        let bars_left = (width - symbol_width) / 2;
        let mut start = None;
        for (index, &bar) in symbol.modules().iter().chain(std::iter::once(&false)).enumerate() {
            match (bar, start) {
                (true, None) => start = Some(index),
                (false, Some(first)) => {
                    shapes.push(Shape::Rect {
                        x: bars_left + first as u32 * module_width,
                        y: bars_top,
                        width: (index - first) as u32 * module_width,
                        height: options.bar_height,
                        paint: Paint::Foreground,
                    });
                    start = None;
                }
                _ => {}
            }
        }
        y = bars_top.saturating_add(options.bar_height);
        y = text(&mut shapes, y.saturating_add(VALUE_GAP), body_size, barcode.to_string());

        y = text(
            &mut shapes,
            y.saturating_add(CAPTION_GAP),
            body_size,
            format!("Category: {}", fields.category),
        );
        if let Some(serial) = fields.serial_number.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            y = text(&mut shapes, y.saturating_add(LINE_GAP), body_size, format!("S/N: {serial}"));
        }
        text(&mut shapes, y.saturating_add(FOOTER_GAP), footer_size, FOOTER.to_string());

        Ok(Self {
            width,
            height: options.canvas_height,
            foreground: options.foreground,
            background: options.background,
            shapes,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Foreground rectangles, i.e. the bars.
    pub fn bars(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape, Shape::Rect { paint: Paint::Foreground, .. }))
    }
}
