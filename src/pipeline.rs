//! Pipeline – ties together composition, layout, and serialisation into a
//! single function call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::{Block, LayoutContext};
use crate::cover::build_cover_page;
use crate::error::Result;
use crate::fonts::{FontManager, TextMeasure};
use crate::layout::{layout, PageGeometry};
use crate::layout_config::DocumentLayout;
use crate::message::{build_message_blocks, Message};
use crate::render::{render_pdf, serialize};
use crate::style::StyleRegistry;

/// Longest file stem kept from the titles, in bytes. Leaves room for the
/// `.pdf` extension and the `.<name>.part` temporary within the usual
/// 255-byte file name limit.
const MAX_STEM_BYTES: usize = 240;

/// Everything needed to produce one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(default = "DocumentRequest::default_main_title")]
    pub main_title: String,
    #[serde(default = "DocumentRequest::default_sub_title")]
    pub sub_title: String,
    #[serde(default)]
    pub cover_image_path: Option<String>,
    #[serde(default)]
    pub footer_image_path: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl DocumentRequest {
    pub fn new(main_title: impl Into<String>, sub_title: impl Into<String>) -> Self {
        Self {
            main_title: main_title.into(),
            sub_title: sub_title.into(),
            cover_image_path: None,
            footer_image_path: None,
            messages: Vec::new(),
        }
    }

    fn default_main_title() -> String {
        "Toi & Moi".to_string()
    }

    fn default_sub_title() -> String {
        "Notre histoire d'amour".to_string()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `<main_title>_<sub_title>.pdf`, with characters that would escape
    /// the output directory replaced by `_` and the stem cut to
    /// `MAX_STEM_BYTES` on a character boundary.
    pub fn file_name(&self) -> String {
        let raw = format!("{}_{}", self.main_title, self.sub_title);
        let mut name: String = raw
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '\0' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        if name.starts_with('.') {
            name.replace_range(..1, "_");
        }
        if name.len() > MAX_STEM_BYTES {
            let mut cut = MAX_STEM_BYTES;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        name.push_str(".pdf");
        name
    }
}

impl Default for DocumentRequest {
    fn default() -> Self {
        Self::new(Self::default_main_title(), Self::default_sub_title())
    }
}

/// Configuration for the generation pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Title embedded in the PDF metadata; `None` uses the main title.
    pub title: Option<String>,
    pub geometry: PageGeometry,
}

/// Cover blocks followed by message blocks.
pub fn compose_blocks(request: &DocumentRequest) -> Vec<Block> {
    let mut blocks = build_cover_page(
        &request.main_title,
        &request.sub_title,
        request.cover_image_path.as_deref(),
        request.footer_image_path.as_deref(),
    );
    blocks.extend(build_message_blocks(&request.messages));
    blocks
}

/// Compose and lay out the book without rendering it.
pub fn compute_layout(
    request: &DocumentRequest,
    config: &PipelineConfig,
    fonts: &dyn TextMeasure,
) -> DocumentLayout {
    let blocks = compose_blocks(request);
    let ctx = LayoutContext::new(StyleRegistry::global(), fonts);
    let pages = layout(&blocks, &config.geometry, &ctx);
    log::debug!(
        "Laid out {} block(s) for {} message(s) onto {} page(s)",
        blocks.len(),
        request.messages.len(),
        pages.len()
    );

    DocumentLayout {
        title: config
            .title
            .clone()
            .unwrap_or_else(|| request.main_title.clone()),
        page_width_pt: config.geometry.width,
        page_height_pt: config.geometry.height,
        pages,
    }
}

/// Full pipeline: request → PDF bytes.
///
/// Returns `(pdf_bytes, layout)`.
pub fn generate_pdf(
    request: &DocumentRequest,
    config: &PipelineConfig,
) -> Result<(Vec<u8>, DocumentLayout)> {
    let fonts = FontManager::default();
    let layout = compute_layout(request, config, &fonts);
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Generate the book into `output_directory` with the default A4 config and
/// return the path of the written file.
pub fn generate_document(request: &DocumentRequest, output_directory: &Path) -> Result<PathBuf> {
    generate_document_with(request, output_directory, &PipelineConfig::default())
}

pub fn generate_document_with(
    request: &DocumentRequest,
    output_directory: &Path,
    config: &PipelineConfig,
) -> Result<PathBuf> {
    let fonts = FontManager::default();
    let layout = compute_layout(request, config, &fonts);
    let path = output_directory.join(request.file_name());
    serialize(&layout, &path)?;
    Ok(path)
}
