//! # chat-book – chat history → paginated PDF book
//!
//! The pipeline stages are:
//!
//! 1. **Compose** – title page ([`cover`]) and message bubbles ([`message`])
//!    as a flat sequence of [`block::Block`]s
//! 2. **Layout** – greedy flow of blocks onto fixed-size pages ([`layout`])
//!    producing a frozen [`layout_config::DocumentLayout`]
//! 3. **Render** – emit PDF bytes via printpdf and write them out ([`render`])
//!
//! [`pipeline::generate_document`] runs all of them.

pub mod block;
pub mod cover;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod message;
pub mod pipeline;
pub mod render;
pub mod style;

// Re-exports for convenience
pub use error::{Error, Result};
pub use message::Message;
pub use pipeline::{generate_document, generate_pdf, DocumentRequest, PipelineConfig};
