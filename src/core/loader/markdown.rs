//! Markdown loader.
//!
//! Renders Markdown to plain text that keeps the document's block
//! structure: headings stay `#`-prefixed lines, fenced code stays fenced,
//! and every block is separated by a blank line. Inline markup is
//! dropped, keeping only its text.

use std::path::Path;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::core::error::{RagprepError, Result};
use crate::core::loader::read_bytes;
use crate::core::types::LoadedDocument;

const CELL_SEPARATOR: &str = " | ";

/// Load a Markdown file as a single unit
pub fn load(path: &Path) -> Result<Vec<LoadedDocument>> {
    let bytes = read_bytes(path)?;
    let source = String::from_utf8(bytes)
        .map_err(|_| RagprepError::LoadFailed(format!("{path:?} is not valid UTF-8")))?;

    Ok(vec![LoadedDocument::from_source(render_text(&source), path)])
}

/// Render Markdown source to block-structured plain text
pub fn render_text(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut blocks = BlockBuffer::default();

    for event in Parser::new_ext(source, options) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                blocks.flush();
                blocks.current.push_str(&"#".repeat(level as usize));
                blocks.current.push(' ');
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                blocks.flush();
                blocks.current.push_str("```");
                if let CodeBlockKind::Fenced(lang) = kind {
                    blocks.current.push_str(&lang);
                }
                blocks.current.push('\n');
            }
            Event::Start(Tag::Item) => {
                blocks.flush();
                blocks.current.push_str("- ");
            }
            Event::Start(Tag::Table(_)) => blocks.flush(),
            Event::End(TagEnd::CodeBlock) => {
                if !blocks.current.ends_with('\n') {
                    blocks.current.push('\n');
                }
                blocks.current.push_str("```");
                blocks.flush();
            }
            Event::End(TagEnd::TableCell) => blocks.current.push_str(CELL_SEPARATOR),
            Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
                let kept = blocks.current.trim_end_matches(CELL_SEPARATOR).len();
                blocks.current.truncate(kept);
                blocks.current.push('\n');
            }
            Event::End(
                TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::Table,
            ) => blocks.flush(),
            Event::Text(text) | Event::Code(text) => blocks.current.push_str(&text),
            Event::SoftBreak | Event::HardBreak => blocks.current.push('\n'),
            Event::Rule => {
                blocks.flush();
                blocks.blocks.push("---".to_string());
            }
            Event::TaskListMarker(checked) => {
                blocks.current.push_str(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    blocks.finish()
}

#[derive(Default)]
struct BlockBuffer {
    blocks: Vec<String>,
    current: String,
}

impl BlockBuffer {
    fn flush(&mut self) {
        let block = self.current.trim();
        if !block.is_empty() && block != "-" {
            self.blocks.push(block.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.blocks.join("\n\n")
    }
}
