use crate::record::{LineRecord, line_mut};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Line-level coverage metrics, keyed by the analyzer's metric names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LineMetric {
    #[serde(rename = "coverage_line_hits_data")]
    UtLineHits,
    #[serde(rename = "conditions_by_line")]
    UtConditions,
    #[serde(rename = "covered_conditions_by_line")]
    UtCoveredConditions,
    #[serde(rename = "it_coverage_line_hits_data")]
    ItLineHits,
    #[serde(rename = "it_conditions_by_line")]
    ItConditions,
    #[serde(rename = "it_covered_conditions_by_line")]
    ItCoveredConditions,
    #[serde(rename = "overall_coverage_line_hits_data")]
    OverallLineHits,
    #[serde(rename = "overall_conditions_by_line")]
    OverallConditions,
    #[serde(rename = "overall_covered_conditions_by_line")]
    OverallCoveredConditions,
}

impl LineMetric {
    pub const ALL: [LineMetric; 9] = [
        LineMetric::UtLineHits,
        LineMetric::UtConditions,
        LineMetric::UtCoveredConditions,
        LineMetric::ItLineHits,
        LineMetric::ItConditions,
        LineMetric::ItCoveredConditions,
        LineMetric::OverallLineHits,
        LineMetric::OverallConditions,
        LineMetric::OverallCoveredConditions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LineMetric::UtLineHits => "coverage_line_hits_data",
            LineMetric::UtConditions => "conditions_by_line",
            LineMetric::UtCoveredConditions => "covered_conditions_by_line",
            LineMetric::ItLineHits => "it_coverage_line_hits_data",
            LineMetric::ItConditions => "it_conditions_by_line",
            LineMetric::ItCoveredConditions => "it_covered_conditions_by_line",
            LineMetric::OverallLineHits => "overall_coverage_line_hits_data",
            LineMetric::OverallConditions => "overall_conditions_by_line",
            LineMetric::OverallCoveredConditions => "overall_covered_conditions_by_line",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    fn field(self, rec: &mut LineRecord) -> &mut Option<u64> {
        match self {
            LineMetric::UtLineHits => &mut rec.ut_line_hits,
            LineMetric::UtConditions => &mut rec.ut_conditions,
            LineMetric::UtCoveredConditions => &mut rec.ut_covered_conditions,
            LineMetric::ItLineHits => &mut rec.it_line_hits,
            LineMetric::ItConditions => &mut rec.it_conditions,
            LineMetric::ItCoveredConditions => &mut rec.it_covered_conditions,
            LineMetric::OverallLineHits => &mut rec.overall_line_hits,
            LineMetric::OverallConditions => &mut rec.overall_conditions,
            LineMetric::OverallCoveredConditions => &mut rec.overall_covered_conditions,
        }
    }

    pub fn set(self, rec: &mut LineRecord, value: u64) {
        *self.field(rec) = Some(value);
    }
}

impl fmt::Display for LineMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricParseError {
    #[error("missing '=' in pair: {0}")]
    MissingSeparator(String),
    #[error("invalid line number: {0}")]
    InvalidLine(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Values keyed by 1-based line, decoded from `line=value` pairs joined by `;`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparseLineMetric {
    pub entries: Vec<(u32, u64)>,
}

impl SparseLineMetric {
    /// Decode `data`, skipping pairs that do not parse.
    pub fn parse_lenient(data: &str) -> Self {
        let mut entries = Vec::new();
        for pair in split_pairs(data) {
            match parse_pair(pair) {
                Ok(e) => entries.push(e),
                Err(e) => debug!("measures: skipping pair: {}", e),
            }
        }
        Self { entries }
    }
}

impl FromStr for SparseLineMetric {
    type Err = MetricParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let entries = split_pairs(data).map(parse_pair).collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

impl fmt::Display for SparseLineMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (line, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", line, value)?;
        }
        Ok(())
    }
}

fn split_pairs(data: &str) -> impl Iterator<Item = &str> {
    data.split(';').map(str::trim).filter(|p| !p.is_empty())
}

fn parse_pair(pair: &str) -> Result<(u32, u64), MetricParseError> {
    let (line, value) = pair
        .split_once('=')
        .ok_or_else(|| MetricParseError::MissingSeparator(pair.to_string()))?;
    let line = line
        .trim()
        .parse()
        .map_err(|_| MetricParseError::InvalidLine(line.to_string()))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| MetricParseError::InvalidValue(value.to_string()))?;
    Ok((line, value))
}

/// Set `metric` on every line named by `data`, overwriting earlier values.
/// Entries outside `1..=lines.len()` are discarded.
pub fn apply_metric(metric: LineMetric, data: &SparseLineMetric, lines: &mut [LineRecord]) {
    for &(line, value) in &data.entries {
        match line_mut(lines, line) {
            Some(rec) => metric.set(rec, value),
            None => debug!("measures: {} line {} outside {} lines", metric, line, lines.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::empty_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_pairs() {
        let m: SparseLineMetric = "1=10;3=4".parse().unwrap();
        assert_eq!(m.entries, vec![(1, 10), (3, 4)]);
        assert_eq!(m.to_string(), "1=10;3=4");
        assert_eq!(
            "1=x".parse::<SparseLineMetric>(),
            Err(MetricParseError::InvalidValue("x".to_string()))
        );
        assert_eq!(
            SparseLineMetric::parse_lenient("1=2;bogus;-3=4;5=6;").entries,
            vec![(1, 2), (5, 6)]
        );
    }

    #[test]
    fn metric_keys_resolve() {
        for m in LineMetric::ALL {
            assert_eq!(LineMetric::from_key(m.key()), Some(m));
        }
        assert_eq!(LineMetric::from_key("ncloc_data"), None);
    }

    #[test]
    fn applies_line_values() {
        let mut lines = empty_lines(3);
        apply_metric(LineMetric::UtLineHits, &SparseLineMetric::parse_lenient("1=10;3=4"), &mut lines);
        assert_eq!(lines[0].ut_line_hits, Some(10));
        assert_eq!(lines[1].ut_line_hits, None);
        assert_eq!(lines[2].ut_line_hits, Some(4));
    }

    #[test]
    fn ignores_bad_line_numbers() {
        let mut lines = empty_lines(3);
        apply_metric(LineMetric::UtLineHits, &SparseLineMetric::parse_lenient("30=42;0=1"), &mut lines);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.ut_line_hits.is_none()));
    }

    #[test]
    fn metrics_are_independent() {
        let mut lines = empty_lines(3);
        apply_metric(LineMetric::UtLineHits, &SparseLineMetric::parse_lenient("1=10;3=4"), &mut lines);
        apply_metric(LineMetric::ItLineHits, &SparseLineMetric::parse_lenient("1=11;2=4"), &mut lines);
        assert_eq!(lines[0].ut_line_hits, Some(10));
        assert_eq!(lines[0].it_line_hits, Some(11));
        assert_eq!(lines[1].ut_line_hits, None);
        assert_eq!(lines[1].it_line_hits, Some(4));
        assert_eq!(lines[2].ut_line_hits, Some(4));
    }
}
