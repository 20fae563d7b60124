use crate::record::{LineRecord, line_mut};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `length` lines starting at 1-based `start_line` of the file `resource`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub resource: String,
    pub start_line: u32,
    pub length: u32,
}

impl Block {
    pub fn new(resource: impl Into<String>, start_line: u32, length: u32) -> Self {
        Self { resource: resource.into(), start_line, length }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicationGroup {
    pub origin: Block,
    #[serde(default)]
    pub duplicates: Vec<Block>,
}

impl DuplicationGroup {
    pub fn new(origin: Block) -> Self {
        Self { origin, duplicates: Vec::new() }
    }

    pub fn with_duplicate(mut self, block: Block) -> Self {
        self.duplicates.push(block);
        self
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.origin).chain(self.duplicates.iter())
    }
}

/// Tag each line of `resource` covered by a group with the group's 1-based
/// index. A line lists a group at most once, whatever the number of blocks.
pub fn apply_duplications(resource: &str, groups: &[DuplicationGroup], lines: &mut [LineRecord]) {
    let max_line = lines.len() as u32;
    for (i, group) in groups.iter().enumerate() {
        let index = i as u32 + 1;
        let mut seen: HashSet<u32> = HashSet::new();
        for block in group.blocks().filter(|b| b.resource == resource) {
            let first = block.start_line.max(1);
            let end = block.start_line.saturating_add(block.length);
            if end > max_line + 1 {
                debug!(
                    "duplications: block {}+{} of group {} runs past {} lines",
                    block.start_line, block.length, index, max_line
                );
            }
            for line in first..end.min(max_line + 1) {
                if !seen.insert(line) {
                    continue;
                }
                if let Some(rec) = line_mut(lines, line) {
                    rec.duplications.push(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::empty_lines;
    use pretty_assertions::assert_eq;

    const FILE: &str = "module_key:src/Foo.java";

    #[test]
    fn groups_indexed_in_order() {
        let g1 = DuplicationGroup::new(Block::new(FILE, 1, 1))
            .with_duplicate(Block::new(FILE, 3, 1))
            .with_duplicate(Block::new("anotherFile1", 12, 1))
            .with_duplicate(Block::new("anotherFile2", 13, 1));
        let g2 = DuplicationGroup::new(Block::new(FILE, 1, 2))
            .with_duplicate(Block::new("anotherFile1", 12, 2))
            .with_duplicate(Block::new("anotherFile2", 13, 2));
        let mut lines = empty_lines(3);
        apply_duplications(FILE, &[g1, g2], &mut lines);
        assert_eq!(lines[0].duplications, vec![1, 2]);
        assert_eq!(lines[1].duplications, vec![2]);
        assert_eq!(lines[2].duplications, vec![1]);
    }

    #[test]
    fn block_past_end_of_file_is_clipped() {
        let g = DuplicationGroup::new(Block::new(FILE, 1, 10))
            .with_duplicate(Block::new("anotherFile1", 12, 1))
            .with_duplicate(Block::new("anotherFile2", 13, 1));
        let mut lines = empty_lines(3);
        apply_duplications(FILE, &[g], &mut lines);
        assert_eq!(lines.len(), 3);
        for rec in &lines {
            assert_eq!(rec.duplications, vec![1]);
        }
    }

    #[test]
    fn overlapping_blocks_of_one_group_count_once() {
        let g = DuplicationGroup::new(Block::new(FILE, 1, 2)).with_duplicate(Block::new(FILE, 2, 2));
        let mut lines = empty_lines(3);
        apply_duplications(FILE, &[g], &mut lines);
        assert_eq!(lines[0].duplications, vec![1]);
        assert_eq!(lines[1].duplications, vec![1]);
        assert_eq!(lines[2].duplications, vec![1]);
    }

    #[test]
    fn foreign_blocks_are_ignored() {
        let g = DuplicationGroup::new(Block::new("other", 1, 3));
        let mut lines = empty_lines(3);
        apply_duplications(FILE, &[g], &mut lines);
        assert!(lines.iter().all(|l| l.duplications.is_empty()));
    }
}
