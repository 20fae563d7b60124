use crate::offsets::LineOffsetTable;
use crate::record::{LineRecord, SymbolSegment, line_mut};
use log::debug;
use serde::{Deserialize, Serialize};

/// A declared symbol and the start offsets of its references. Every
/// reference spans as many characters as the declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub references: Vec<usize>,
}

impl Symbol {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The declaration followed by every reference, as `[start, end)` spans.
    /// References whose end does not fit in `usize` are skipped.
    pub fn occurrences(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let len = self.len();
        std::iter::once((self.start, self.end)).chain(self.references.iter().filter_map(move |&r| {
            let end = r.checked_add(len);
            if end.is_none() {
                debug!("symbols: reference at {} overflows the character stream", r);
            }
            end.map(|end| (r, end))
        }))
    }
}

/// Handle to a symbol registered in a [`SymbolTableBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef(usize);

#[derive(Debug, Default, Clone)]
pub struct SymbolTableBuilder {
    symbols: Vec<Symbol>,
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_symbol(&mut self, start: usize, end: usize) -> SymbolRef {
        self.symbols.push(Symbol { start, end, references: Vec::new() });
        SymbolRef(self.symbols.len() - 1)
    }

    pub fn new_reference(&mut self, symbol: SymbolRef, offset: usize) {
        if let Some(s) = self.symbols.get_mut(symbol.0) {
            s.references.push(offset);
        }
    }

    /// Symbols in registration order; ids are assigned later by position.
    pub fn build(self) -> Vec<Symbol> {
        self.symbols
    }
}

/// Symbol ids `1..=N` by ascending declaration start, then end, then
/// registration order. `ids[i]` is the id of `symbols[i]`.
pub fn assign_ids(symbols: &[Symbol]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..symbols.len()).collect();
    order.sort_by_key(|&i| (symbols[i].start, symbols[i].end, i));
    let mut ids = vec![0; symbols.len()];
    for (rank, i) in order.into_iter().enumerate() {
        ids[i] = rank as u32 + 1;
    }
    ids
}

/// Map every declaration and reference onto the lines it touches. Segments of
/// a line are ordered by start, then by symbol id.
pub fn apply_symbols(symbols: &[Symbol], table: &LineOffsetTable, lines: &mut [LineRecord]) {
    let max_line = lines.len() as u32;
    let ids = assign_ids(symbols);
    let mut touched: Vec<u32> = Vec::new();
    for (symbol, &id) in symbols.iter().zip(&ids) {
        for (start, end) in symbol.occurrences() {
            let Some((first, last)) = table.line_span(start, end, max_line) else {
                debug!("symbols: dropping occurrence [{}, {}) of symbol {}", start, end, id);
                continue;
            };
            for (line, rel_start, length) in table.project(start, end, first, last) {
                if let Some(rec) = line_mut(lines, line) {
                    rec.symbols.push(SymbolSegment { start: rel_start, length, symbol: id });
                    touched.push(line);
                }
            }
        }
    }
    touched.sort_unstable();
    touched.dedup();
    for line in touched {
        if let Some(rec) = line_mut(lines, line) {
            rec.symbols.sort_by_key(|s| (s.start, s.symbol, s.length));
            rec.symbols.dedup();
        }
    }
}
