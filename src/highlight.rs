use crate::offsets::LineOffsetTable;
use crate::record::{HighlightSegment, LineRecord, line_mut};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TypeOfText {
    Annotation,
    Constant,
    Comment,
    CppDoc,
    StructuredComment,
    Keyword,
    String,
    KeywordLight,
    PreprocessDirective,
}

impl TypeOfText {
    /// Short code written into highlighting segments.
    pub fn code(self) -> &'static str {
        match self {
            TypeOfText::Annotation => "a",
            TypeOfText::Constant => "c",
            TypeOfText::Comment => "cd",
            TypeOfText::CppDoc => "cppd",
            TypeOfText::StructuredComment => "j",
            TypeOfText::Keyword => "k",
            TypeOfText::String => "s",
            TypeOfText::KeywordLight => "h",
            TypeOfText::PreprocessDirective => "p",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "a" => TypeOfText::Annotation,
            "c" => TypeOfText::Constant,
            "cd" => TypeOfText::Comment,
            "cppd" => TypeOfText::CppDoc,
            "j" => TypeOfText::StructuredComment,
            "k" => TypeOfText::Keyword,
            "s" => TypeOfText::String,
            "h" => TypeOfText::KeywordLight,
            "p" => TypeOfText::PreprocessDirective,
            _ => return None,
        })
    }
}

impl fmt::Display for TypeOfText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A styled half-open range `[start, end)` over the whole file's characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlightingRule {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub type_of_text: TypeOfText,
}

/// Accumulates highlighting rules as an analyzer reports them.
#[derive(Debug, Default, Clone)]
pub struct HighlightingBuilder {
    rules: Vec<HighlightingRule>,
}

impl HighlightingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, start: usize, end: usize, type_of_text: TypeOfText) -> Self {
        self.rules.push(HighlightingRule { start, end, type_of_text });
        self
    }

    /// Rules ordered by ascending start, enclosing rules before the ones they
    /// contain. Empty and inverted ranges are discarded.
    pub fn build(self) -> Vec<HighlightingRule> {
        let mut rules: Vec<_> = self.rules.into_iter().filter(|r| r.end > r.start).collect();
        sort_rules(&mut rules);
        rules
    }
}

fn sort_rules(rules: &mut [HighlightingRule]) {
    rules.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    // closes sort before opens at the same offset
    Close,
    Open,
}

/// Split `rules` into per-line, non-overlapping segments and append them to
/// `lines`. A rule touching any offset outside `1..=lines.len()` is dropped
/// as a whole.
pub fn apply_highlighting(rules: &[HighlightingRule], table: &LineOffsetTable, lines: &mut [LineRecord]) {
    let max_line = lines.len() as u32;
    let mut kept: Vec<HighlightingRule> = Vec::with_capacity(rules.len());
    for r in rules {
        if r.end <= r.start {
            continue;
        }
        if table.line_span(r.start, r.end, max_line).is_none() {
            debug!(
                "highlighting: dropping rule [{}, {}) {} outside {} lines",
                r.start, r.end, r.type_of_text, max_line
            );
            continue;
        }
        kept.push(*r);
    }
    sort_rules(&mut kept);

    let mut events: Vec<(usize, Edge, usize)> = Vec::with_capacity(kept.len() * 2);
    for (i, r) in kept.iter().enumerate() {
        events.push((r.start, Edge::Open, i));
        events.push((r.end, Edge::Close, i));
    }
    // kept is already outer-first, so the index keeps opens in nesting order
    events.sort();

    let mut active: Vec<usize> = Vec::new();
    let mut cursor = 0;
    let mut i = 0;
    while i < events.len() {
        let offset = events[i].0;
        if !active.is_empty() && offset > cursor {
            let codes: String = active.iter().map(|&r| kept[r].type_of_text.code()).collect();
            emit(table, cursor, offset, &codes, lines);
        }
        while i < events.len() && events[i].0 == offset {
            let (_, edge, rule) = events[i];
            match edge {
                Edge::Open => active.push(rule),
                Edge::Close => {
                    // removing by identity also tolerates partially overlapping rules
                    if let Some(pos) = active.iter().rposition(|&a| a == rule) {
                        active.remove(pos);
                    }
                }
            }
            i += 1;
        }
        cursor = offset;
    }
}

fn emit(table: &LineOffsetTable, start: usize, end: usize, codes: &str, lines: &mut [LineRecord]) {
    let max_line = lines.len() as u32;
    let Some((first, last)) = table.line_span(start, end, max_line) else {
        return;
    };
    for (line, rel_start, length) in table.project(start, end, first, last) {
        trace!("highlighting: line {} {},{},{}", line, rel_start, length, codes);
        if let Some(rec) = line_mut(lines, line) {
            rec.highlighting.push(HighlightSegment {
                start: rel_start,
                length,
                codes: codes.to_string(),
            });
        }
    }
}
