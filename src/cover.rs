//! Cover composer – the fixed block sequence of the title page.

use crate::block::{Block, ImageBlock, TextBlock};
use crate::render::probe_image;
use crate::style::{StyleName, TextAlign};

pub const COVER_IMAGE_SIZE: f32 = 400.0;
pub const FOOTER_IMAGE_SIZE: f32 = 70.0;

const TOP_SPACE: f32 = 60.0;
const TITLE_GAP: f32 = 20.0;
const SUBTITLE_GAP: f32 = 40.0;
const AFTER_COVER_IMAGE: f32 = 20.0;
const FOOTER_GAP: f32 = 40.0;

/// Build the title page: titles, the cover image (or an equally tall
/// placeholder), an optional right-aligned footer image, then a page break.
///
/// Image sources that are missing or do not decode are left out.
pub fn build_cover_page(
    main_title: &str,
    sub_title: &str,
    cover_image_path: Option<&str>,
    footer_image_path: Option<&str>,
) -> Vec<Block> {
    let mut blocks = vec![
        Block::spacer(TOP_SPACE),
        Block::Text(TextBlock::plain(main_title, StyleName::CoverTitle)),
        Block::spacer(TITLE_GAP),
        Block::Text(TextBlock::plain(sub_title, StyleName::CoverSubTitle)),
        Block::spacer(SUBTITLE_GAP),
    ];

    match resolve(cover_image_path) {
        Some(source) => blocks.push(Block::Image(ImageBlock {
            source,
            width: COVER_IMAGE_SIZE,
            height: COVER_IMAGE_SIZE,
            alignment: TextAlign::Center,
        })),
        None => blocks.push(Block::spacer(COVER_IMAGE_SIZE)),
    }
    blocks.push(Block::spacer(AFTER_COVER_IMAGE));

    if let Some(source) = resolve(footer_image_path) {
        blocks.push(Block::spacer(FOOTER_GAP));
        blocks.push(Block::Image(ImageBlock {
            source,
            width: FOOTER_IMAGE_SIZE,
            height: FOOTER_IMAGE_SIZE,
            alignment: TextAlign::Right,
        }));
    }

    blocks.push(Block::PageBreak);
    blocks
}

fn resolve(path: Option<&str>) -> Option<String> {
    let src = path.map(str::trim).filter(|p| !p.is_empty())?;
    match probe_image(src) {
        Ok(()) => Some(src.to_string()),
        Err(e) => {
            log::warn!("Skipping cover image: {e}");
            None
        }
    }
}
