use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OffsetTableError {
    #[error("line offset table is empty")]
    Empty,
    #[error("first line must start at offset 0, got {0}")]
    NonZeroStart(usize),
    #[error("line offsets must be strictly increasing (line {line}: {offset} <= {previous})")]
    NotIncreasing { line: u32, offset: usize, previous: usize },
}

/// Global start offset of every line, in characters.
///
/// The last line extends to `total_len` when it is known, and to the end of
/// the character stream otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsetTable {
    starts: Vec<usize>,
    total_len: Option<usize>,
}

impl LineOffsetTable {
    pub fn new(starts: Vec<usize>) -> Result<Self, OffsetTableError> {
        let Some(&first) = starts.first() else {
            return Err(OffsetTableError::Empty);
        };
        if first != 0 {
            return Err(OffsetTableError::NonZeroStart(first));
        }
        for (i, pair) in starts.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(OffsetTableError::NotIncreasing {
                    line: i as u32 + 2,
                    offset: pair[1],
                    previous: pair[0],
                });
            }
        }
        Ok(Self { starts, total_len: None })
    }

    /// Bound the last line. Offsets at or past `total_len` resolve to no line.
    pub fn with_total_len(mut self, total_len: usize) -> Self {
        self.total_len = Some(total_len);
        self
    }

    /// Build the table from source text, counting characters (not bytes).
    pub fn from_text(text: &str) -> Self {
        let mut starts = vec![0];
        let mut len = 0;
        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                starts.push(len);
            }
        }
        // a trailing newline does not open a new line
        if starts.len() > 1 && starts.last() == Some(&len) {
            starts.pop();
        }
        Self { starts, total_len: Some(len) }
    }

    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }

    pub fn total_len(&self) -> Option<usize> {
        self.total_len
    }

    /// 1-based line containing `offset`, or `None` when it lies past the end.
    pub fn line_of(&self, offset: usize) -> Option<u32> {
        if self.total_len.is_some_and(|len| offset >= len) {
            return None;
        }
        let idx = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.checked_sub(1)?,
        };
        Some(idx as u32 + 1)
    }

    pub fn line_start(&self, line: u32) -> Option<usize> {
        let idx = (line as usize).checked_sub(1)?;
        self.starts.get(idx).copied()
    }

    /// Exclusive end of `line`; `None` means the line runs to the end of the stream.
    pub fn line_end(&self, line: u32) -> Option<usize> {
        self.starts.get(line as usize).copied().or(self.total_len)
    }

    /// Resolve the half-open range `[start, end)` to its first and last line,
    /// both within `1..=max_line`. Empty or out-of-range spans yield `None`.
    pub fn line_span(&self, start: usize, end: usize, max_line: u32) -> Option<(u32, u32)> {
        if end <= start {
            return None;
        }
        let first = self.line_of(start)?;
        let last = self.line_of(end - 1)?;
        (last <= max_line).then_some((first, last))
    }

    /// Clip `[start, end)` to each line it touches, yielding
    /// `(line, line_relative_start, length)` for every non-empty piece.
    pub fn project(
        &self,
        start: usize,
        end: usize,
        first: u32,
        last: u32,
    ) -> impl Iterator<Item = (u32, usize, usize)> + '_ {
        (first..=last).filter_map(move |line| {
            let line_start = self.line_start(line)?;
            let line_end = self.line_end(line).unwrap_or(usize::MAX);
            let from = start.max(line_start);
            let to = end.min(line_end);
            (to > from).then(|| (line, from - line_start, to - from))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(LineOffsetTable::new(vec![]), Err(OffsetTableError::Empty));
        assert_eq!(LineOffsetTable::new(vec![2, 5]), Err(OffsetTableError::NonZeroStart(2)));
        assert_eq!(
            LineOffsetTable::new(vec![0, 4, 4]),
            Err(OffsetTableError::NotIncreasing { line: 3, offset: 4, previous: 4 })
        );
    }

    #[test]
    fn resolves_offsets_to_lines() {
        let t = LineOffsetTable::new(vec![0, 4, 7]).unwrap();
        assert_eq!(t.line_of(0), Some(1));
        assert_eq!(t.line_of(3), Some(1));
        assert_eq!(t.line_of(4), Some(2));
        assert_eq!(t.line_of(6), Some(2));
        assert_eq!(t.line_of(7), Some(3));
        // the last line is open-ended
        assert_eq!(t.line_of(10_000), Some(3));
    }

    #[test]
    fn bounded_table_drops_offsets_past_end() {
        let t = LineOffsetTable::new(vec![0, 4, 7]).unwrap().with_total_len(12);
        assert_eq!(t.line_of(11), Some(3));
        assert_eq!(t.line_of(12), None);
        assert_eq!(t.line_end(3), Some(12));
    }

    #[test]
    fn from_text_counts_chars() {
        let t = LineOffsetTable::from_text("one\ntwo\nthree\n");
        assert_eq!(t.line_count(), 3);
        assert_eq!(t.line_start(2), Some(4));
        assert_eq!(t.line_start(3), Some(8));
        assert_eq!(t.total_len(), Some(14));

        let t = LineOffsetTable::from_text("é\nx");
        assert_eq!(t.line_start(2), Some(2));
    }

    #[test]
    fn line_span_respects_max_line() {
        let t = LineOffsetTable::new(vec![0, 4, 7, 15]).unwrap();
        assert_eq!(t.line_span(7, 15, 3), Some((3, 3)));
        assert_eq!(t.line_span(7, 25, 3), None);
        assert_eq!(t.line_span(5, 5, 3), None);
    }

    #[test]
    fn project_clips_to_lines() {
        let t = LineOffsetTable::new(vec![0, 4, 7]).unwrap();
        let pieces: Vec<_> = t.project(2, 9, 1, 3).collect();
        assert_eq!(pieces, vec![(1, 2, 2), (2, 0, 3), (3, 0, 2)]);
    }
}
