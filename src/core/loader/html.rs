//! HTML loader.
//!
//! Extracts the visible text of `<body>`: block-level elements become
//! blank-line separated paragraphs, `<br>` becomes a line break and
//! runs of whitespace collapse to a single space. The `<title>` text is
//! stored in the unit's metadata.

use std::path::Path;

use scraper::{ElementRef, Html, Node};
use serde_json::Value;

use crate::core::error::{RagprepError, Result};
use crate::core::loader::read_bytes;
use crate::core::types::LoadedDocument;

/// Elements whose subtree never contributes text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tr",
    "ul",
];

/// Load an HTML file as a single unit
pub fn load(path: &Path) -> Result<Vec<LoadedDocument>> {
    let bytes = read_bytes(path)?;
    let source = String::from_utf8(bytes)
        .map_err(|_| RagprepError::LoadFailed(format!("{path:?} is not valid UTF-8")))?;

    let document = Html::parse_document(&source);
    let mut unit = LoadedDocument::from_source(extract_text(&document), path);
    if let Some(title) = extract_title(&document) {
        unit.metadata.insert("title".to_string(), Value::String(title));
    }

    Ok(vec![unit])
}

/// Visible text of the document body
pub fn extract_text(document: &Html) -> String {
    let root = document.root_element();
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or(root);

    let mut text = TextBuffer::default();
    text.collect(body);
    text.finish()
}

/// Whitespace-collapsed `<title>` text, if present and non-empty
pub fn extract_title(document: &Html) -> Option<String> {
    let title = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "title")?;

    let text = title.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

#[derive(Default)]
struct TextBuffer {
    paragraphs: Vec<String>,
    current: String,
    pending_space: bool,
}

impl TextBuffer {
    fn collect(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_ELEMENTS.contains(&name) {
                        continue;
                    }
                    if name == "br" {
                        self.current.push('\n');
                        self.pending_space = false;
                        continue;
                    }
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };

                    let is_block = BLOCK_ELEMENTS.contains(&name);
                    if is_block {
                        self.flush();
                    }
                    self.collect(child_element);
                    if is_block {
                        self.flush();
                    } else if name == "td" || name == "th" {
                        self.pending_space = true;
                    }
                }
                _ => {}
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        let leading_space = text.starts_with(char::is_whitespace) || self.pending_space;
        if leading_space && !self.current.is_empty() && !self.current.ends_with(['\n', ' ']) {
            self.current.push(' ');
        }
        self.current.push_str(&words.join(" "));
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn flush(&mut self) {
        let paragraph = self.current.trim();
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph.to_string());
        }
        self.current.clear();
        self.pending_space = false;
    }

    fn finish(mut self) -> String {
        self.flush();
        self.paragraphs.join("\n\n")
    }
}
