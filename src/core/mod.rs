pub mod parsing;
pub mod source;
pub mod types;

pub use source::SourceModule;
pub use types::{CandidateTable, KeyKind, RowRecord};
