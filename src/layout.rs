//! Page layout engine – flows blocks onto fixed-size pages.
//!
//! Single forward pass, greedy, no block splitting:
//! - a page break closes the current page;
//! - a block that does not fit the remaining space starts a new page unless
//!   the current page is still empty;
//! - a block taller than the usable height sits alone on its page.

use serde::{Deserialize, Serialize};

use crate::block::{Block, LayoutContext};
use crate::layout_config::PageLayout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Page size and margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    /// A4 with the book's margins.
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margins: Margins {
                top: 40.0,
                right: 20.0,
                bottom: 60.0,
                left: 20.0,
            },
        }
    }

    pub fn usable_width(&self) -> f32 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn usable_height(&self) -> f32 {
        (self.height - self.margins.top - self.margins.bottom).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

struct PageCursor {
    pages: Vec<PageLayout>,
    current: PageLayout,
    used: f32,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::new(0),
            used: 0.0,
        }
    }

    fn close_page(&mut self) {
        let next = PageLayout::new(self.pages.len() + 1);
        let page = std::mem::replace(&mut self.current, next);
        log::debug!(
            "Closing page {} with {} block(s), {:.1}pt used",
            page.page_index,
            page.boxes.len(),
            self.used
        );
        self.pages.push(page);
        self.used = 0.0;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.current.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lay `blocks` out onto pages of the given geometry.
///
/// Box coordinates in the result are page-absolute (origin at the top-left
/// corner of the physical page). The output never ends with an empty page.
pub fn layout(
    blocks: &[Block],
    geometry: &PageGeometry,
    ctx: &LayoutContext<'_>,
) -> Vec<PageLayout> {
    let usable_width = geometry.usable_width();
    let usable_height = geometry.usable_height();
    let mut cursor = PageCursor::new();

    for block in blocks {
        let Some(mut frame) = block.frame(usable_width, ctx) else {
            // Only page breaks have no frame.
            cursor.close_page();
            continue;
        };

        if cursor.used + frame.height > usable_height && !cursor.current.is_empty() {
            cursor.close_page();
        }

        frame.translate(geometry.margins.left, geometry.margins.top + cursor.used);
        let height = frame.height;
        cursor.current.boxes.push(frame);
        cursor.used += height;

        if height > usable_height {
            log::debug!(
                "{} block of {:.1}pt exceeds usable height {:.1}pt; isolating it",
                block.kind(),
                height,
                usable_height
            );
            cursor.close_page();
        }
    }

    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{ImageBlock, TextBlock};
    use crate::fonts::FontManager;
    use crate::style::{StyleName, StyleRegistry, TextAlign};

    fn geometry(height: f32) -> PageGeometry {
        PageGeometry {
            width: 200.0,
            height,
            margins: Margins {
                top: 10.0,
                right: 10.0,
                bottom: 10.0,
                left: 10.0,
            },
        }
    }

    fn run(blocks: &[Block], geometry: &PageGeometry) -> Vec<PageLayout> {
        let fonts = FontManager::default();
        let ctx = LayoutContext::new(StyleRegistry::global(), &fonts);
        layout(blocks, geometry, &ctx)
    }

    fn heights(pages: &[PageLayout]) -> Vec<Vec<f32>> {
        pages
            .iter()
            .map(|p| p.boxes.iter().map(|b| b.height).collect())
            .collect()
    }

    #[test]
    fn usable_area_of_a4() {
        let g = PageGeometry::a4();
        assert!((g.usable_width() - 555.28).abs() < 0.01);
        assert!((g.usable_height() - 741.89).abs() < 0.01);
    }

    #[test]
    fn empty_input_yields_no_pages() {
        assert!(run(&[], &geometry(100.0)).is_empty());
        // An explicit break is literal, even on a blank page.
        let pages = run(&[Block::PageBreak], &geometry(100.0));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn overflow_starts_new_page() {
        // Usable height 80.
        let blocks = vec![Block::spacer(50.0), Block::spacer(30.0), Block::spacer(1.0)];
        let pages = run(&blocks, &geometry(100.0));
        assert_eq!(heights(&pages), vec![vec![50.0, 30.0], vec![1.0]]);
        assert_eq!(pages[1].page_index, 1);
        assert_eq!(pages[1].boxes[0].y, 10.0);
        assert_eq!(pages[0].boxes[1].y, 60.0);
        assert_eq!(pages[0].boxes[1].x, 10.0);
    }

    #[test]
    fn page_break_closes_page_even_when_empty() {
        let blocks = vec![
            Block::spacer(10.0),
            Block::PageBreak,
            Block::PageBreak,
            Block::spacer(20.0),
            Block::PageBreak,
        ];
        let pages = run(&blocks, &geometry(100.0));
        assert_eq!(heights(&pages), vec![vec![10.0], vec![], vec![20.0]]);
    }

    #[test]
    fn oversized_block_is_isolated() {
        let tall = Block::Image(ImageBlock {
            source: "big.png".into(),
            width: 50.0,
            height: 500.0,
            alignment: TextAlign::Left,
        });
        let blocks = vec![Block::spacer(10.0), tall, Block::spacer(10.0)];
        let pages = run(&blocks, &geometry(100.0));
        assert_eq!(heights(&pages), vec![vec![10.0], vec![500.0], vec![10.0]]);
    }

    #[test]
    fn pages_never_exceed_usable_height() {
        let g = geometry(120.0);
        let blocks: Vec<Block> = (0..40)
            .map(|i| {
                if i % 3 == 0 {
                    Block::Text(TextBlock::plain(
                        "some words that wrap over a few lines",
                        StyleName::Message,
                    ))
                } else {
                    Block::spacer(7.0 + i as f32)
                }
            })
            .collect();
        let pages = run(&blocks, &g);
        let placed: usize = pages.iter().map(|p| p.boxes.len()).sum();
        assert_eq!(placed, blocks.len());
        for page in &pages {
            assert!(page.content_height() <= g.usable_height() + 1e-3);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let blocks: Vec<Block> = (0..25).map(|i| Block::spacer(3.0 * i as f32)).collect();
        let g = geometry(150.0);
        assert_eq!(run(&blocks, &g), run(&blocks, &g));
    }
}
