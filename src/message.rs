//! Message composer – turns chat records into bubble blocks.

use serde::{Deserialize, Deserializer, Serialize};

use crate::block::{Block, ContainerBlock, Padding, Span, TextBlock};
use crate::style::{Color, StyleName};

/// Outer width of a bubble in points.
pub const BUBBLE_WIDTH: f32 = 400.0;
/// Vertical gap after every bubble.
pub const BUBBLE_GAP: f32 = 6.0;
pub const DATETIME_FONT_SIZE: f32 = 8.0;

/// One chat message. Missing or null fields read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub datetime: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        datetime: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            datetime: datetime.into(),
        }
    }

    /// `<sender>: <content>  [<datetime>]` with a bold sender and a small
    /// grey timestamp.
    pub fn spans(&self) -> Vec<Span> {
        vec![
            Span::new(self.sender.as_str()).bold(),
            Span::new(format!(": {}  ", self.content)),
            Span::new(format!("[{}]", self.datetime))
                .sized(DATETIME_FONT_SIZE)
                .colored(Color::GREY),
        ]
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One bubble plus a trailing gap per message, in input order.
pub fn build_message_blocks(messages: &[Message]) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(messages.len() * 2);
    for msg in messages {
        let text = TextBlock::rich(msg.spans(), StyleName::Message);
        blocks.push(Block::Container(ContainerBlock {
            child: Box::new(Block::Text(text)),
            background: Color::WHITESMOKE,
            padding: Padding::symmetric(4.0, 6.0),
            width: Some(BUBBLE_WIDTH),
        }));
        blocks.push(Block::spacer(BUBBLE_GAP));
    }
    blocks
}
