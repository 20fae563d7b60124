use crate::duplication::{DuplicationGroup, apply_duplications};
use crate::highlight::{HighlightingRule, apply_highlighting};
use crate::measures::{LineMetric, apply_metric};
use crate::offsets::LineOffsetTable;
use crate::record::{LineRecord, empty_lines};
use crate::scm::{ScmData, apply_scm};
use crate::source::ComponentSource;
use crate::symbols::{Symbol, apply_symbols};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsolidateError {
    #[error("{file}: line count is missing")]
    MissingLineCount { file: String },
    #[error("{file}: invalid line count {line_count}")]
    InvalidLineCount { file: String, line_count: u32 },
}

/// What the file itself reports about its lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    #[serde(default)]
    pub line_count: Option<u32>,
    #[serde(default)]
    pub line_offsets: Vec<usize>,
    #[serde(default)]
    pub total_len: Option<usize>,
}

impl FileMetadata {
    pub fn new(line_count: u32, line_offsets: Vec<usize>) -> Self {
        Self { line_count: Some(line_count), line_offsets, total_len: None }
    }

    /// Metadata of `text`, one line per `\n`-terminated line.
    pub fn from_text(text: &str) -> Self {
        let table = LineOffsetTable::from_text(text);
        Self {
            line_count: Some(table.line_count()),
            line_offsets: (1..=table.line_count()).filter_map(|l| table.line_start(l)).collect(),
            total_len: table.total_len(),
        }
    }

    fn offset_table(&self, file: &str) -> Option<LineOffsetTable> {
        if self.line_offsets.is_empty() {
            return None;
        }
        match LineOffsetTable::new(self.line_offsets.clone()) {
            Ok(t) => Some(match self.total_len {
                Some(len) => t.with_total_len(len),
                None => t,
            }),
            Err(e) => {
                warn!("{}: ignoring line offsets: {}", file, e);
                None
            }
        }
    }
}

/// All analysis data reported for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileInput {
    pub key: String,
    #[serde(flatten)]
    pub metadata: FileMetadata,
    #[serde(default)]
    pub highlighting: Option<Vec<HighlightingRule>>,
    #[serde(default)]
    pub symbols: Option<Vec<Symbol>>,
    #[serde(default)]
    pub duplications: Vec<DuplicationGroup>,
    #[serde(default)]
    pub scm: Option<ScmData>,
    /// Raw `line=value;...` data keyed by metric name.
    #[serde(default)]
    pub measures: BTreeMap<String, String>,
}

impl FileInput {
    pub fn new(key: impl Into<String>, metadata: FileMetadata) -> Self {
        Self { key: key.into(), metadata, ..Default::default() }
    }
}

/// Which mappers run. Everything is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolidateOptions {
    pub scm: bool,
    pub measures: bool,
    pub duplications: bool,
    pub highlighting: bool,
    pub symbols: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self { scm: true, measures: true, duplications: true, highlighting: true, symbols: true }
    }
}

pub struct Consolidator<'a> {
    source: &'a dyn ComponentSource,
    options: ConsolidateOptions,
}

impl<'a> Consolidator<'a> {
    pub fn new(source: &'a dyn ComponentSource) -> Self {
        Self { source, options: ConsolidateOptions::default() }
    }

    pub fn with_options(mut self, options: ConsolidateOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the line records of `component`, one per line in `1..=line_count`.
    ///
    /// Only a missing or zero line count is an error. Data pointing outside the
    /// file is dropped or clipped.
    pub fn consolidate(
        &self,
        component: &str,
        metadata: &FileMetadata,
    ) -> Result<Vec<LineRecord>, ConsolidateError> {
        let line_count = match metadata.line_count {
            None => return Err(ConsolidateError::MissingLineCount { file: component.to_string() }),
            Some(0) => {
                return Err(ConsolidateError::InvalidLineCount {
                    file: component.to_string(),
                    line_count: 0,
                });
            }
            Some(n) => n,
        };
        let mut lines = empty_lines(line_count);
        let opts = &self.options;

        if opts.scm {
            if let Some(scm) = self.source.scm(component) {
                apply_scm(scm, &mut lines);
            }
        }
        if opts.measures {
            for metric in LineMetric::ALL {
                if let Some(data) = self.source.line_metric(component, metric) {
                    apply_metric(metric, &data, &mut lines);
                }
            }
        }
        if opts.duplications {
            apply_duplications(component, self.source.duplications(component), &mut lines);
        }

        let highlighting = opts.highlighting.then(|| self.source.highlighting(component)).flatten();
        let symbols = opts.symbols.then(|| self.source.symbols(component)).flatten();
        if highlighting.is_some() || symbols.is_some() {
            match metadata.offset_table(component) {
                Some(table) => {
                    if let Some(rules) = highlighting {
                        apply_highlighting(rules, &table, &mut lines);
                    }
                    if let Some(symbols) = symbols {
                        apply_symbols(symbols, &table, &mut lines);
                    }
                }
                None => debug!("{}: no line offsets, skipping highlighting and symbols", component),
            }
        }
        Ok(lines)
    }
}

/// Consolidate a single file from its own inputs.
pub fn consolidate(
    input: &FileInput,
    options: ConsolidateOptions,
) -> Result<Vec<LineRecord>, ConsolidateError> {
    for key in input.measures.keys() {
        if LineMetric::from_key(key).is_none() {
            debug!("{}: ignoring unknown metric {}", input.key, key);
        }
    }
    Consolidator::new(input).with_options(options).consolidate(&input.key, &input.metadata)
}

/// Consolidate independent files in parallel; results keep the input order.
pub fn consolidate_all(
    inputs: &[FileInput],
    options: ConsolidateOptions,
) -> Vec<Result<Vec<LineRecord>, ConsolidateError>> {
    inputs.par_iter().map(|input| consolidate(input, options)).collect()
}
