//! PDF renderer – takes a [`DocumentLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API), then writes them out.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;

use crate::error::{Error, Result};
use crate::layout_config::{DocumentLayout, LayoutBox};

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a DocumentLayout into PDF bytes.
///
/// Images whose source cannot be read or decoded are silently skipped
/// (a `log::warn` is emitted).
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let page_w = Mm(layout.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(layout.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&layout.title);

    // ── Pre-register all images ────────────────────────────────────────────
    let mut all_srcs: HashSet<&str> = HashSet::new();
    for page_layout in &layout.pages {
        for lbox in &page_layout.boxes {
            lbox.visit(&mut |b| {
                if let Some(img) = &b.image {
                    all_srcs.insert(img.src.as_str());
                }
            });
        }
    }

    let mut image_resources: HashMap<String, ImageResource> = HashMap::new();
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();

    for src in &all_srcs {
        let bytes = match read_image_bytes(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Skipping image: {e}");
                continue;
            }
        };

        // Decode with the `image` crate to obtain pixel dimensions.
        let dyn_img = match ::image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Skipping image: decode error: {e}");
                continue;
            }
        };
        let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

        // Register with printpdf as a reusable XObject.
        let raw = match RawImage::decode_from_bytes(&bytes, &mut img_warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);

        image_resources.insert(
            src.to_string(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::new();

    for page_layout in &layout.pages {
        let mut ops = Vec::new();
        for lbox in &page_layout.boxes {
            render_box(&mut ops, lbox, layout.page_height_pt, &image_resources);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        return Err(Error::Render("document has no pages".to_string()));
    }

    doc.with_pages(pages);
    // Raw `Tj` operators from `show_text` are dropped by secure mode.
    let opts = PdfSaveOptions {
        secure: false,
        ..PdfSaveOptions::default()
    };
    let mut save_warnings = Vec::new();
    let bytes = doc.save(&opts, &mut save_warnings);
    if bytes.is_empty() {
        return Err(Error::Render("PDF backend produced no output".to_string()));
    }

    Ok(bytes)
}

/// Render `layout` and write it to `output_path`.
///
/// The bytes go to a hidden sibling file first and are renamed into place,
/// so `output_path` only ever holds a complete document.
pub fn serialize(layout: &DocumentLayout, output_path: &Path) -> Result<()> {
    let bytes = render_pdf(layout)?;

    let file_name = output_path.file_name().ok_or_else(|| {
        Error::write(
            output_path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".part");
    let tmp_path = output_path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp_path, &bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::write(output_path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, output_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::write(output_path, e));
    }

    log::info!(
        "Wrote '{}' ({} bytes, {} page(s))",
        output_path.display(),
        bytes.len(),
        layout.pages.len()
    );
    Ok(())
}

/// Check that `src` points at an image the renderer can decode.
pub fn probe_image(src: &str) -> std::result::Result<(), String> {
    let bytes = read_image_bytes(src)?;
    ::image::load_from_memory(&bytes)
        .map(|_| ())
        .map_err(|e| format!("{}: decode error: {e}", preview(src)))
}

/// Raw bytes of an image given as a file path or a base64 data URI.
fn read_image_bytes(src: &str) -> std::result::Result<Vec<u8>, String> {
    if src.starts_with("data:") {
        return parse_data_uri(src);
    }
    fs::read(src).map_err(|e| format!("cannot read {:?}: {e}", preview(src)))
}

fn preview(src: &str) -> &str {
    match src.char_indices().nth(80) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}

/// Encode `s` as WinAnsi (Windows-1252), the encoding printpdf declares for
/// builtin fonts. Characters outside it become `?`.
fn to_winansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{0152}' => 0x8C, // OE ligature
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{0153}' => 0x9C, // oe ligature
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (0x20..0x7F).contains(&(c as u32)) || (0xA0..0x100).contains(&(c as u32)) => {
                c as u8
            }
            _ => b'?',
        })
        .collect()
}

/// Show `text` in a builtin font inside an open text section.
///
/// printpdf copies builtin-font strings into the content stream byte for
/// byte, so only ASCII goes through `WriteTextBuiltinFont`. Other text is
/// encoded here and written as a raw `Tj` operand.
fn show_text(ops: &mut Vec<Op>, font: BuiltinFont, text: &str) {
    if text.is_ascii() {
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font,
        });
        return;
    }
    // Registers the font resource; an empty item list writes no operator.
    ops.push(Op::WriteTextBuiltinFont {
        items: Vec::new(),
        font,
    });
    ops.push(Op::Unknown {
        key: "Tj".to_string(),
        value: vec![DictItem::Bytes(to_winansi(text))],
    });
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| format!("not a data URI: {:?}", preview(src)))?;
    let comma_pos = rest.find(',').ok_or_else(|| {
        "Invalid data URI: missing `,` separator between header and data".to_string()
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("Only base64-encoded data URIs are supported. \
             The header must contain `;base64` (e.g. `data:image/png;base64,...`)."
            .to_string());
    }
    let b64_data = rest[comma_pos + 1..].trim();
    BASE64_STD
        .decode(b64_data)
        .map_err(|e| format!("Base64 decode error: {e}"))
}

fn rgb(c: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn corner(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
) {
    // PDF coordinate system: origin at bottom-left.
    // Our layout uses origin at top-left. Convert:
    let pdf_y = page_height - lbox.y;

    // Background
    if let Some(bg) = lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(bg) });

        let x1 = lbox.x;
        let y1 = pdf_y - lbox.height;
        let x2 = lbox.x + lbox.width;
        let y2 = pdf_y;

        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        corner(x1, y1),
                        corner(x2, y1),
                        corner(x2, y2),
                        corner(x1, y2),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    // Text
    if let Some(text) = &lbox.text {
        // Baseline ≈ top of line + ascender (approx 0.75 × font_size)
        let ascender_offset = text.font_size * 0.75;

        for tline in &text.lines {
            let text_y = pdf_y - tline.y_offset - ascender_offset;
            for run in &tline.runs {
                if run.text.trim().is_empty() {
                    continue;
                }
                let font = if run.bold {
                    BuiltinFont::HelveticaBold
                } else {
                    BuiltinFont::Helvetica
                };
                let text_x = lbox.x + tline.x_offset + run.x_offset;

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(text_x),
                        y: Pt(text_y),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(run.font_size),
                    font,
                });
                ops.push(Op::SetLineHeight {
                    lh: Pt(text.line_height),
                });
                ops.push(Op::SetFillColor { col: rgb(run.color) });
                show_text(ops, font, &run.text);
                ops.push(Op::EndTextSection);
            }
        }
    }

    // Image – embed from pre-registered XObject
    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(&img.src) {
            let img_bottom_y = page_height - lbox.y - img.height;

            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = if res.px_width > 0 {
                img.width / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                img.height / res.px_height as f32
            } else {
                1.0
            };

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(lbox.x)),
                    translate_y: Some(Pt(img_bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images);
    }
}
