//! Read-only lookups the consolidator pulls a component's data from.

use crate::consolidate::FileInput;
use crate::duplication::DuplicationGroup;
use crate::highlight::HighlightingRule;
use crate::measures::{LineMetric, SparseLineMetric};
use crate::scm::ScmData;
use crate::symbols::Symbol;
use std::collections::HashMap;

pub trait MeasureLookup {
    fn line_metric(&self, component: &str, metric: LineMetric) -> Option<SparseLineMetric>;
}

pub trait DuplicationLookup {
    fn duplications(&self, component: &str) -> &[DuplicationGroup];
}

pub trait ComponentDataLookup {
    fn highlighting(&self, component: &str) -> Option<&[HighlightingRule]>;
    fn symbols(&self, component: &str) -> Option<&[Symbol]>;
}

pub trait ScmLookup {
    fn scm(&self, component: &str) -> Option<&ScmData>;
}

/// Everything a [`crate::Consolidator`] needs to look up.
pub trait ComponentSource: MeasureLookup + DuplicationLookup + ComponentDataLookup + ScmLookup {}

impl<T> ComponentSource for T where T: MeasureLookup + DuplicationLookup + ComponentDataLookup + ScmLookup {}

impl FileInput {
    fn owns(&self, component: &str) -> bool {
        self.key == component
    }
}

impl MeasureLookup for FileInput {
    fn line_metric(&self, component: &str, metric: LineMetric) -> Option<SparseLineMetric> {
        if !self.owns(component) {
            return None;
        }
        let data = self.measures.get(metric.key())?;
        Some(SparseLineMetric::parse_lenient(data))
    }
}

impl DuplicationLookup for FileInput {
    fn duplications(&self, component: &str) -> &[DuplicationGroup] {
        if self.owns(component) { &self.duplications } else { &[] }
    }
}

impl ComponentDataLookup for FileInput {
    fn highlighting(&self, component: &str) -> Option<&[HighlightingRule]> {
        self.owns(component).then_some(self.highlighting.as_deref()).flatten()
    }

    fn symbols(&self, component: &str) -> Option<&[Symbol]> {
        self.owns(component).then_some(self.symbols.as_deref()).flatten()
    }
}

impl ScmLookup for FileInput {
    fn scm(&self, component: &str) -> Option<&ScmData> {
        self.owns(component).then_some(self.scm.as_ref()).flatten()
    }
}

/// Inputs of many files, looked up by component key.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: HashMap<String, FileInput>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, input: FileInput) {
        self.files.insert(input.key.clone(), input);
    }

    pub fn get(&self, component: &str) -> Option<&FileInput> {
        self.files.get(component)
    }
}

impl FromIterator<FileInput> for MemorySource {
    fn from_iter<I: IntoIterator<Item = FileInput>>(iter: I) -> Self {
        let mut src = Self::new();
        for input in iter {
            src.insert(input);
        }
        src
    }
}

impl MeasureLookup for MemorySource {
    fn line_metric(&self, component: &str, metric: LineMetric) -> Option<SparseLineMetric> {
        self.get(component)?.line_metric(component, metric)
    }
}

impl DuplicationLookup for MemorySource {
    fn duplications(&self, component: &str) -> &[DuplicationGroup] {
        self.get(component).map(|f| f.duplications(component)).unwrap_or(&[])
    }
}

impl ComponentDataLookup for MemorySource {
    fn highlighting(&self, component: &str) -> Option<&[HighlightingRule]> {
        self.get(component)?.highlighting(component)
    }

    fn symbols(&self, component: &str) -> Option<&[Symbol]> {
        self.get(component)?.symbols(component)
    }
}

impl ScmLookup for MemorySource {
    fn scm(&self, component: &str) -> Option<&ScmData> {
        self.get(component)?.scm(component)
    }
}
