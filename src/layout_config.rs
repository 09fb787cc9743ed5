//! Layout config – the intermediate representation between page layout and
//! PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "DocumentLayout::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    /// Placed blocks in the order they were composed.
    pub boxes: Vec<LayoutBox>,
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            boxes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sum of the heights of the top-level boxes on this page.
    pub fn content_height(&self) -> f32 {
        self.boxes.iter().map(|b| b.height).sum()
    }
}

/// Which block a box was framed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxKind {
    Text,
    Image,
    Spacer,
    Container,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub kind: BoxKind,
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 4]>,

    /// Content (mutually exclusive in practice)
    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,

    /// Children (nested boxes)
    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    /// Base font size of the style; places the baseline of every line.
    pub font_size: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub runs: Vec<TextRun>,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the text content area
    pub y_offset: f32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A stretch of a line drawn with a single font setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// X offset from the start of the line.
    pub x_offset: f32,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// File path or base64 data URI.
    pub src: String,
    pub width: f32,
    pub height: f32,
}

impl DocumentLayout {
    /// Create an empty A4 layout.
    pub fn a4() -> Self {
        Self {
            title: Self::default_title(),
            // A4: 210mm × 297mm = 595.28 × 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "chat-book".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LayoutBox {
    pub fn new(kind: BoxKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
            background_color: None,
            text: None,
            image: None,
            children: Vec::new(),
        }
    }

    /// Shift this box and all of its descendants.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    /// Depth-first visit of this box and its descendants.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a LayoutBox)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_moves_descendants() {
        let mut outer = LayoutBox::new(BoxKind::Container, 0.0, 0.0, 100.0, 20.0);
        outer
            .children
            .push(LayoutBox::new(BoxKind::Text, 6.0, 4.0, 88.0, 12.0));
        outer.translate(20.0, 40.0);
        assert_eq!((outer.x, outer.y), (20.0, 40.0));
        assert_eq!((outer.children[0].x, outer.children[0].y), (26.0, 44.0));
    }

    #[test]
    fn json_roundtrip() {
        let mut layout = DocumentLayout::a4();
        let mut page = PageLayout::new(0);
        page.boxes
            .push(LayoutBox::new(BoxKind::Spacer, 20.0, 40.0, 555.28, 60.0));
        layout.pages.push(page);
        let parsed = DocumentLayout::from_json(&layout.to_json().unwrap()).unwrap();
        assert_eq!(parsed, layout);
    }
}
