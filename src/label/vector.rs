use svg::node::element::{Element, Rectangle};
use svg::node::Text as TextNode;
use svg::{Document, Node};

use super::scene::{LabelScene, Paint, Shape};

impl LabelScene {
    /// SVG markup of the label, used for on-screen display and printing.
    pub fn to_svg(&self) -> String {
        let mut document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));

        for shape in &self.shapes {
            match shape {
                Shape::Rect { x, y, width, height, paint } => {
                    let fill = match paint {
                        Paint::Foreground => self.foreground,
                        Paint::Background => self.background,
                    };
                    document = document.add(
                        Rectangle::new()
                            .set("x", *x)
                            .set("y", *y)
                            .set("width", *width)
                            .set("height", *height)
                            .set("fill", fill.to_string()),
                    );
                }
                Shape::Text { center_x, top, size, content } => {
                    let mut text = Element::new("text");
                    text.assign("x", *center_x);
                    text.assign("y", *top);
                    text.assign("font-size", *size);
                    text.assign("font-family", "monospace");
                    text.assign("text-anchor", "middle");
                    text.assign("dominant-baseline", "hanging");
                    text.assign("fill", self.foreground.to_string());
                    text.append(TextNode::new(content.as_str()));
                    document = document.add(text);
                }
            }
        }

        document.to_string()
    }
}
