//! chatbook – command-line chat history → PDF book generator.
//!
//! Usage:
//!   chatbook <request.json> [output_dir] [--layout-json <file>]
//!
//! If `output_dir` is omitted the book is written next to the request file.

use std::{env, fs, path::PathBuf, process};

use chat_book::fonts::FontManager;
use chat_book::pipeline::{compute_layout, DocumentRequest, PipelineConfig};
use chat_book::render::serialize;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut layout_json: Option<PathBuf> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--layout-json" | "-j" => match iter.next() {
                Some(v) => layout_json = Some(PathBuf::from(v)),
                None => {
                    eprintln!("Error: --layout-json needs a file name.");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_dir = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no request file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output_dir = output_dir.unwrap_or_else(|| {
        input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let request = match DocumentRequest::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    if !output_dir.as_os_str().is_empty() {
        if let Err(e) = fs::create_dir_all(&output_dir) {
            eprintln!("Error creating output directory: {e}");
            process::exit(1);
        }
    }

    let fonts = FontManager::default();
    let layout = compute_layout(&request, &PipelineConfig::default(), &fonts);

    if let Some(path) = layout_json {
        let json = match layout.to_json() {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Error serialising layout: {e}");
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(&path, json) {
            eprintln!("Error writing '{}': {e}", path.display());
            process::exit(1);
        }
    }

    let output = output_dir.join(request.file_name());
    if let Err(e) = serialize(&layout, &output) {
        eprintln!("Error generating PDF: {e}");
        process::exit(1);
    }

    let pages = layout.pages.len();
    eprintln!(
        "Wrote '{}' ({} message{}, {} page{})",
        output.display(),
        request.messages.len(),
        if request.messages.len() == 1 { "" } else { "s" },
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn print_usage(prog: &str) {
    eprintln!("chatbook – chat history to PDF book (chat-book)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <request.json> [output_dir] [--layout-json <file>]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <request.json>  main_title, sub_title, cover_image_path, footer_image_path, messages");
    eprintln!("  [output_dir]    Directory for <main_title>_<sub_title>.pdf (default: next to the request)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --layout-json, -j  Also write the page layout as JSON");
    eprintln!("  --help             Print this message");
}
