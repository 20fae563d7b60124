pub mod consolidate;
pub mod duplication;
pub mod highlight;
pub mod measures;
pub mod offsets;
pub mod record;
pub mod render;
pub mod scm;
pub mod source;
pub mod symbols;

pub use consolidate::{
    ConsolidateError, ConsolidateOptions, Consolidator, FileInput, FileMetadata, consolidate,
    consolidate_all,
};
pub use duplication::{Block, DuplicationGroup};
pub use highlight::{HighlightingBuilder, HighlightingRule, TypeOfText};
pub use measures::{LineMetric, MetricParseError, SparseLineMetric};
pub use offsets::{LineOffsetTable, OffsetTableError};
pub use record::{HighlightSegment, LineRecord, SymbolSegment};
pub use render::{data_hash, to_text};
pub use scm::{Changeset, ScmData};
pub use source::{
    ComponentDataLookup, ComponentSource, DuplicationLookup, MeasureLookup, MemorySource, ScmLookup,
};
pub use symbols::{Symbol, SymbolRef, SymbolTableBuilder};
