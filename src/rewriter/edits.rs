use std::ops::Range;

/// Replace `range` of the original text with `replacement`.
///
/// An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// Apply `edits` to `text`. Insertions at the same offset keep their order.
///
/// Returns `None` when two edits overlap or a range falls outside `text`.
pub fn apply_edits(text: &str, mut edits: Vec<Edit>) -> Option<String> {
    edits.sort_by_key(|edit| edit.range.start);

    let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for edit in &edits {
        if edit.range.start < cursor || edit.range.end < edit.range.start {
            return None;
        }
        out.push_str(text.get(cursor..edit.range.start)?);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(text.get(cursor..)?);
    Some(out)
}
