use std::ops::Range;
use std::path::{Path, PathBuf};

use proc_macro2::Span;
use quote::ToTokens;

use crate::core::parsing::LineIndex;
use crate::errors::{Error, Result};

const BOM: &str = "\u{feff}";

/// One source file, its text and its parsed syntax tree.
///
/// The text is kept alongside the tree so rewrites can splice it and leave
/// everything outside the edited ranges byte-for-byte unchanged.
pub struct SourceModule {
    pub path: PathBuf,
    /// `path` with forward slashes, as embedded in generated code and errors.
    pub display_path: String,
    pub text: String,
    pub ast: syn::File,
    /// Bytes before the parsed body (a UTF-8 byte order mark).
    body_offset: usize,
    index: LineIndex,
}

impl SourceModule {
    pub fn parse(path: &Path, text: String) -> Result<Self> {
        let display_path = path.to_string_lossy().replace('\\', "/");
        let body_offset = if text.starts_with(BOM) { BOM.len() } else { 0 };
        let body = &text[body_offset..];

        let ast = syn::parse_file(body).map_err(|err| {
            let start = err.span().start();
            Error::Parse {
                file: display_path.clone(),
                line: start.line,
                column: start.column + 1,
                message: err.to_string(),
            }
        })?;
        let index = LineIndex::new(body);

        Ok(Self {
            path: path.to_path_buf(),
            display_path,
            text,
            ast,
            body_offset,
            index,
        })
    }

    /// Offset of the first byte after any byte order mark.
    pub fn body_start(&self) -> usize {
        self.body_offset
    }

    /// Byte range of `span` in [`SourceModule::text`].
    pub fn range(&self, span: Span) -> Result<Range<usize>> {
        let body = &self.text[self.body_offset..];
        self.index
            .range(body, span)
            .map(|range| range.start + self.body_offset..range.end + self.body_offset)
            .ok_or_else(|| {
                let start = span.start();
                Error::Structural {
                    file: self.display_path.clone(),
                    line: start.line,
                    column: start.column + 1,
                    construct: String::new(),
                    message: "span does not map back into the source text".into(),
                }
            })
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> Result<&str> {
        let range = self.range(span)?;
        Ok(&self.text[range])
    }

    /// Fatal error pointing at `node`.
    pub fn structural(&self, node: &dyn ToTokens, message: impl Into<String>) -> Error {
        let tokens = node.to_token_stream();
        let start = syn::spanned::Spanned::span(&tokens).start();
        Error::Structural {
            file: self.display_path.clone(),
            line: start.line,
            column: start.column + 1,
            construct: tokens.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parsing::reset_span_locations;
    use syn::spanned::Spanned;

    #[test]
    fn test_parse_error_has_location() {
        let result = SourceModule::parse(Path::new("csv\\broken.rs"), "fn (".into());
        match result {
            Err(Error::Parse { file, line, .. }) => {
                assert_eq!(file, "csv/broken.rs");
                assert_eq!(line, 1);
            }
            Err(other) => panic!("unexpected {other}"),
            Ok(_) => panic!("expected a parse error"),
        }
        reset_span_locations();
    }

    #[test]
    fn test_snippet_skips_byte_order_mark() {
        let text = format!("{BOM}static A: u8 = 1;\n");
        let module = SourceModule::parse(Path::new("bom.rs"), text).unwrap();
        let syn::Item::Static(item) = &module.ast.items[0] else {
            panic!("expected static");
        };
        assert_eq!(module.snippet(item.ident.span()).unwrap(), "A");
        assert_eq!(module.snippet(item.expr.span()).unwrap(), "1");
        reset_span_locations();
    }

    #[test]
    fn test_structural_error_points_at_node() {
        let module =
            SourceModule::parse(Path::new("m.rs"), "static A: u8 =\n    1;\n".into()).unwrap();
        let syn::Item::Static(item) = &module.ast.items[0] else {
            panic!("expected static");
        };
        match module.structural(&item.expr, "bad") {
            Error::Structural {
                line,
                column,
                construct,
                ..
            } => {
                assert_eq!((line, column), (2, 5));
                assert_eq!(construct, "1");
            }
            other => panic!("unexpected {other}"),
        }
        reset_span_locations();
    }
}
