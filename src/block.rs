//! Block model – the units of content the composers emit and the layout
//! engine flows onto pages.
//!
//! Every block except [`Block::PageBreak`] can be framed at a given maximum
//! width, producing a [`LayoutBox`] anchored at the origin whose height is the
//! block's natural height.

use crate::fonts::{wrap_spans, TextMeasure};
use crate::layout_config::{BoxKind, ImageContent, LayoutBox, TextContent, TextLine, TextRun};
use crate::style::{Color, StyleName, StyleRegistry, TextAlign};

/// Everything a block needs to measure itself.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub styles: &'a StyleRegistry,
    pub fonts: &'a dyn TextMeasure,
}

impl<'a> LayoutContext<'a> {
    pub fn new(styles: &'a StyleRegistry, fonts: &'a dyn TextMeasure) -> Self {
        Self { styles, fonts }
    }
}

/// A slice of text with inline overrides on top of the block's style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn sized(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Text wrapped to the available width with a registered style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub spans: Vec<Span>,
    pub style: StyleName,
}

impl TextBlock {
    pub fn plain(text: impl Into<String>, style: StyleName) -> Self {
        Self {
            spans: vec![Span::new(text)],
            style,
        }
    }

    pub fn rich(spans: Vec<Span>, style: StyleName) -> Self {
        Self { spans, style }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A fixed-size image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    /// File path or base64 data URI.
    pub source: String,
    pub width: f32,
    pub height: f32,
    pub alignment: TextAlign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerBlock {
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// A child block drawn over a background fill, inset by padding.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerBlock {
    pub child: Box<Block>,
    pub background: Color,
    pub padding: Padding,
    /// Outer width; clamped to the available width. `None` fills it.
    pub width: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    Spacer(SpacerBlock),
    PageBreak,
    Container(ContainerBlock),
}

impl Block {
    pub fn spacer(height: f32) -> Self {
        Block::Spacer(SpacerBlock { height })
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, Block::PageBreak)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Block::Text(_) => "text",
            Block::Image(_) => "image",
            Block::Spacer(_) => "spacer",
            Block::PageBreak => "page-break",
            Block::Container(_) => "container",
        }
    }

    /// Natural height of the block at `max_width`.
    pub fn measure(&self, max_width: f32, ctx: &LayoutContext<'_>) -> f32 {
        self.frame(max_width, ctx).map(|b| b.height).unwrap_or(0.0)
    }

    /// Frame the block at the origin. Page breaks have no frame.
    pub fn frame(&self, max_width: f32, ctx: &LayoutContext<'_>) -> Option<LayoutBox> {
        match self {
            Block::Text(text) => Some(frame_text(text, max_width, ctx)),
            Block::Image(img) => {
                let x = img.alignment.offset(max_width, img.width);
                let mut lb = LayoutBox::new(BoxKind::Image, x, 0.0, img.width, img.height);
                lb.image = Some(ImageContent {
                    src: img.source.clone(),
                    width: img.width,
                    height: img.height,
                });
                Some(lb)
            }
            Block::Spacer(spacer) => Some(LayoutBox::new(
                BoxKind::Spacer,
                0.0,
                0.0,
                max_width,
                spacer.height.max(0.0),
            )),
            Block::PageBreak => None,
            Block::Container(container) => Some(frame_container(container, max_width, ctx)),
        }
    }
}

fn frame_text(block: &TextBlock, max_width: f32, ctx: &LayoutContext<'_>) -> LayoutBox {
    let style = ctx.styles.get(block.style);
    let lines = wrap_spans(&block.spans, style.font_size, style.bold, max_width, ctx.fonts);

    let text_lines: Vec<TextLine> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut x = 0.0;
            let runs = line
                .runs
                .iter()
                .map(|run| {
                    let span = &block.spans[run.span];
                    let text_run = TextRun {
                        text: run.text.clone(),
                        x_offset: x,
                        font_size: span.font_size.unwrap_or(style.font_size),
                        bold: span.bold || style.bold,
                        color: span.color.unwrap_or(style.color).to_array(),
                    };
                    x += run.width;
                    text_run
                })
                .collect();
            TextLine {
                runs,
                x_offset: style.alignment.offset(max_width, line.width),
                y_offset: i as f32 * style.leading,
            }
        })
        .collect();

    let height = text_lines.len() as f32 * style.leading;
    let mut lb = LayoutBox::new(BoxKind::Text, 0.0, 0.0, max_width, height);
    lb.text = Some(TextContent {
        lines: text_lines,
        font_size: style.font_size,
        line_height: style.leading,
    });
    lb
}

fn frame_container(block: &ContainerBlock, max_width: f32, ctx: &LayoutContext<'_>) -> LayoutBox {
    let pad = block.padding;
    let outer_width = block.width.map_or(max_width, |w| w.min(max_width));
    let inner_width = (outer_width - pad.left - pad.right).max(0.0);

    let child = block.child.frame(inner_width, ctx);
    let child_height = child.as_ref().map_or(0.0, |c| c.height);

    let mut lb = LayoutBox::new(
        BoxKind::Container,
        0.0,
        0.0,
        outer_width,
        child_height + pad.top + pad.bottom,
    );
    if !block.background.is_transparent() {
        lb.background_color = Some(block.background.to_array());
    }
    if let Some(mut child) = child {
        child.translate(pad.left, pad.top);
        lb.children.push(child);
    }
    lb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;

    fn measure(block: &Block, width: f32) -> f32 {
        let fonts = FontManager::default();
        let ctx = LayoutContext::new(StyleRegistry::global(), &fonts);
        block.measure(width, &ctx)
    }

    #[test]
    fn text_height_is_lines_times_leading() {
        let block = Block::Text(TextBlock::plain("Hello", StyleName::Message));
        assert_eq!(measure(&block, 500.0), 12.0);

        // 40 chars × 5 pt = 200 pt, wraps into several lines at 60 pt.
        let long = Block::Text(TextBlock::plain(
            "aaaa bbbb cccc dddd eeee ffff gggg hhhh",
            StyleName::Message,
        ));
        let h = measure(&long, 60.0);
        assert!(h >= 36.0 && (h / 12.0).fract() == 0.0, "height {h}");
    }

    #[test]
    fn centred_text_is_offset() {
        let fonts = FontManager::default();
        let ctx = LayoutContext::new(StyleRegistry::global(), &fonts);
        let block = Block::Text(TextBlock::plain("Hi", StyleName::CoverSubTitle));
        let lb = block.frame(200.0, &ctx).unwrap();
        let line = &lb.text.as_ref().unwrap().lines[0];
        let width = fonts.text_width("Hi", 24.0, true);
        assert!(width > 0.0);
        assert!((line.x_offset - (200.0 - width) / 2.0).abs() < 0.01);
        assert_eq!(lb.height, 26.0);
    }

    #[test]
    fn image_and_spacer_have_fixed_height() {
        let img = Block::Image(ImageBlock {
            source: "cover.png".into(),
            width: 70.0,
            height: 70.0,
            alignment: TextAlign::Right,
        });
        assert_eq!(measure(&img, 555.0), 70.0);
        assert_eq!(measure(&Block::spacer(40.0), 555.0), 40.0);
        assert_eq!(measure(&Block::PageBreak, 555.0), 0.0);

        let fonts = FontManager::default();
        let ctx = LayoutContext::new(StyleRegistry::global(), &fonts);
        assert_eq!(img.frame(555.0, &ctx).unwrap().x, 485.0);
    }

    #[test]
    fn container_adds_padding_around_child() {
        let fonts = FontManager::default();
        let ctx = LayoutContext::new(StyleRegistry::global(), &fonts);
        let block = Block::Container(ContainerBlock {
            child: Box::new(Block::Text(TextBlock::plain("Hi", StyleName::Message))),
            background: Color::WHITESMOKE,
            padding: Padding::symmetric(4.0, 6.0),
            width: Some(400.0),
        });
        let lb = block.frame(555.0, &ctx).unwrap();
        assert_eq!(lb.height, 20.0);
        assert_eq!(lb.width, 400.0);
        assert!(lb.background_color.is_some());
        assert_eq!(lb.children[0].width, 388.0);
        assert_eq!((lb.children[0].x, lb.children[0].y), (6.0, 4.0));

        // Narrow pages clamp the bubble.
        assert_eq!(block.frame(300.0, &ctx).unwrap().width, 300.0);
    }
}
