use crate::record::LineRecord;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Changeset {
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<i64>, // epoch millis
}

/// Blame for one file: `index_by_line[i]` points into `changesets` for line `i + 1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScmData {
    pub changesets: Vec<Changeset>,
    pub index_by_line: Vec<usize>,
}

/// Copy each line's changeset onto its record. Lines without an index, or with
/// an index naming no changeset, keep no scm data; extra indices are ignored.
pub fn apply_scm(scm: &ScmData, lines: &mut [LineRecord]) {
    if scm.index_by_line.len() > lines.len() {
        debug!(
            "scm: {} changeset indices for {} lines, ignoring the rest",
            scm.index_by_line.len(),
            lines.len()
        );
    }
    for (rec, &idx) in lines.iter_mut().zip(&scm.index_by_line) {
        let Some(cs) = scm.changesets.get(idx) else {
            debug!("scm: line {} references missing changeset {}", rec.line, idx);
            continue;
        };
        if let Some(rev) = &cs.revision {
            rec.scm_revision = Some(rev.clone());
        }
        if let Some(author) = &cs.author {
            rec.scm_author = Some(author.clone());
        }
        if let Some(date) = cs.date {
            rec.scm_date = Some(date);
        }
    }
}
