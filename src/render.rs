use crate::record::{HighlightSegment, LineRecord, SymbolSegment};
use std::fmt::Write as _;

/// `start,length,codes` triples joined by `;`.
pub fn highlighting_text(segments: &[HighlightSegment]) -> String {
    let mut buf = String::new();
    for (i, s) in segments.iter().enumerate() {
        if i > 0 {
            buf.push(';');
        }
        let _ = write!(buf, "{},{},{}", s.start, s.length, s.codes);
    }
    buf
}

/// `start,length,id` triples joined by `;`.
pub fn symbols_text(segments: &[SymbolSegment]) -> String {
    let mut buf = String::new();
    for (i, s) in segments.iter().enumerate() {
        if i > 0 {
            buf.push(';');
        }
        let _ = write!(buf, "{},{},{}", s.start, s.length, s.symbol);
    }
    buf
}

pub fn duplications_text(groups: &[u32]) -> String {
    groups.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn esc(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\t', "\\t").replace('\n', "\\n")
}

/// One tab-separated row per line: line, scm revision/author/date, the nine
/// coverage fields, duplications, highlighting, symbols.
pub fn to_text(lines: &[LineRecord]) -> String {
    let mut buf = String::new();
    for l in lines {
        let cols = [
            l.line.to_string(),
            esc(&opt(&l.scm_revision)),
            esc(&opt(&l.scm_author)),
            opt(&l.scm_date),
            opt(&l.ut_line_hits),
            opt(&l.ut_conditions),
            opt(&l.ut_covered_conditions),
            opt(&l.it_line_hits),
            opt(&l.it_conditions),
            opt(&l.it_covered_conditions),
            opt(&l.overall_line_hits),
            opt(&l.overall_conditions),
            opt(&l.overall_covered_conditions),
            duplications_text(&l.duplications),
            highlighting_text(&l.highlighting),
            symbols_text(&l.symbols),
        ];
        buf.push_str(&cols.join("\t"));
        buf.push('\n');
    }
    buf
}

/// blake3 hex digest of [`to_text`], stable across runs for identical records.
pub fn data_hash(lines: &[LineRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(to_text(lines).as_bytes());
    hasher.finalize().to_hex().to_string()
}
