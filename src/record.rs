use serde::{Deserialize, Serialize};

/// One highlighted piece of a line: `length` characters from the line-relative
/// `start`, styled by `codes` (the active rules' codes, outermost first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlightSegment {
    pub start: usize,
    pub length: usize,
    pub codes: String,
}

/// One occurrence of symbol `symbol` on a line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolSegment {
    pub start: usize,
    pub length: usize,
    pub symbol: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineRecord {
    pub line: u32, // 1-based
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_date: Option<i64>, // epoch millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ut_line_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ut_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ut_covered_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it_line_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it_covered_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_line_hits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_covered_conditions: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplications: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlighting: Vec<HighlightSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolSegment>,
}

impl LineRecord {
    pub fn new(line: u32) -> Self {
        Self { line, ..Default::default() }
    }

    pub fn has_scm(&self) -> bool {
        self.scm_revision.is_some() || self.scm_author.is_some() || self.scm_date.is_some()
    }
}

/// Allocate one empty record per line, numbered `1..=line_count`.
pub fn empty_lines(line_count: u32) -> Vec<LineRecord> {
    (1..=line_count).map(LineRecord::new).collect()
}

/// Mutable access to the record of 1-based `line`, if it exists.
pub(crate) fn line_mut(lines: &mut [LineRecord], line: u32) -> Option<&mut LineRecord> {
    let idx = (line as usize).checked_sub(1)?;
    lines.get_mut(idx)
}
