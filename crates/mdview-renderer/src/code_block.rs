//! Code block processor trait for extensible code block handling.
//!
//! This module provides the hook the renderer offers to the rest of the
//! workspace: every fenced code block is presented to the registered
//! processors before the default renderer sees it.
//!
//! # Architecture
//!
//! Processors are registered with the renderer and checked in order when a
//! fenced code block is complete. The first processor returning
//! [`ProcessResult::Handled`] wins; its HTML replaces the block. When every
//! processor returns [`ProcessResult::NotHandled`], the block is rendered
//! by the default code block renderer exactly as the parser produced it.
//!
//! # Example
//!
//! ```
//! use mdview_renderer::{CodeBlockProcessor, FencedCodeBlock, ProcessResult};
//!
//! struct ShoutProcessor;
//!
//! impl CodeBlockProcessor for ShoutProcessor {
//!     fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
//!         if block.language == "shout" {
//!             ProcessResult::Handled(format!("<p>{}</p>", block.source.to_uppercase()))
//!         } else {
//!             ProcessResult::NotHandled
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Outcome of offering a code block to a processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// The processor took ownership of the block; the HTML replaces it.
    Handled(String),

    /// The block is not for this processor.
    ///
    /// The next processor is consulted, then the default renderer.
    NotHandled,
}

/// A complete fenced code block as seen by processors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FencedCodeBlock {
    /// Zero-based index of this fenced block in the document.
    pub index: usize,
    /// Language identifier from the fence (e.g., "mermaid", "rust").
    pub language: String,
    /// Attributes parsed from the fence (e.g., `format=png` → {"format": "png"}).
    pub attrs: HashMap<String, String>,
    /// Literal content of the block, exactly as delivered by the parser.
    pub source: String,
}

/// Trait for processing special code blocks.
///
/// Implementations recognise one or more languages and turn matching blocks
/// into HTML. Each call is independent; the renderer guarantees calls arrive
/// in document order.
pub trait CodeBlockProcessor: Send {
    /// Offer a fenced code block to this processor.
    fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult;

    /// Warnings generated during processing.
    ///
    /// Default implementation returns empty slice.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub(crate) fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}
