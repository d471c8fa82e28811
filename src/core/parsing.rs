//! Span-location utilities for rewriting parsed Rust source.
//!
//! With `proc-macro2`'s `span-locations` feature every token parsed by `syn`
//! knows its line and column. Tables are rewritten by splicing the original
//! text, so spans have to be turned back into byte offsets; [`LineIndex`]
//! does that.
//!
//! The span source map is thread-global and grows with every parsed file.
//! Call [`reset_span_locations`] once a module's spans are no longer needed:
//!
//! ```rust,ignore
//! for path in modules {
//!     let module = SourceModule::parse(&path, text)?;
//!     let rewritten = rewrite_module(&module, &tables, &options)?; // uses spans
//!     tablegen::core::parsing::reset_span_locations();             // done with spans
//! }
//! ```

use proc_macro2::{LineColumn, Span};
use std::ops::Range;

/// Reset the proc-macro2 SourceMap before parsing the next module.
///
/// **IMPORTANT**: every span of previously parsed files becomes invalid.
#[inline]
pub fn reset_span_locations() {
    proc_macro2::extra::invalidate_current_thread_spans();
}

/// Maps `proc_macro2` line/column locations to byte offsets in one text.
///
/// Lines are 1-based, columns count UTF-8 characters from 0.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Byte offset of `at`, or `None` when it lies outside `text`.
    pub fn offset(&self, text: &str, at: LineColumn) -> Option<usize> {
        let start = *self.line_starts.get(at.line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(at.line)
            .copied()
            .unwrap_or(self.len);
        let line = text.get(start..end)?;

        match line.char_indices().nth(at.column) {
            Some((idx, _)) => Some(start + idx),
            None if line.chars().count() == at.column => Some(end),
            None => None,
        }
    }

    /// Byte range covered by `span`.
    pub fn range(&self, text: &str, span: Span) -> Option<Range<usize>> {
        let start = self.offset(text, span.start())?;
        let end = self.offset(text, span.end())?;
        (start <= end).then_some(start..end)
    }
}
