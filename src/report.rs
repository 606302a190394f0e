//! Plain, language-neutral result structure.
//!
//! Everything a presentation layer needs and nothing it does not: per test
//! name, per instrument label, the fitted estimates with their unit string,
//! plus explicit failure markers attached to exactly the test or instrument
//! they concern. Serializable as-is.

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;

/// Combined results for one benchmarking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// One entry per test unit, in input order.
    pub tests: Vec<TestReport>,
}

impl Report {
    /// Look up a test's report by name.
    pub fn test(&self, name: &str) -> Option<&TestReport> {
        self.tests.iter().find(|t| t.name == name)
    }
}

/// Results for one test across all instruments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Test unit name.
    pub name: String,
    /// Measured instruments, or the failure that aborted the test.
    pub outcome: TestOutcome,
}

impl TestReport {
    /// Merge per-instrument results into one reportable aggregate.
    ///
    /// Pure grouping, no numerical recomputation.
    pub fn merged(name: impl Into<String>, instruments: Vec<InstrumentReport>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Measured { instruments },
        }
    }

    /// Mark a test as aborted by an instrument resource failure.
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Failed {
                error: error.into(),
            },
        }
    }

    /// Look up an instrument's report by label, if the test was measured.
    pub fn instrument(&self, label: &str) -> Option<&InstrumentReport> {
        match &self.outcome {
            TestOutcome::Measured { instruments } => {
                instruments.iter().find(|i| i.label == label)
            }
            TestOutcome::Failed { .. } => None,
        }
    }
}

/// Whether a test produced measurements or aborted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    /// All batches ran; per-instrument results follow.
    Measured {
        /// One report per requested instrument.
        instruments: Vec<InstrumentReport>,
    },
    /// An instrument failed to load; sampling for this test was aborted.
    Failed {
        /// The resource error, rendered for reporting.
        error: String,
    },
}

/// Fit result for one (test, instrument) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentReport {
    /// Instrument label.
    pub label: String,
    /// Physical unit of the slope and intercept.
    pub unit: String,
    /// The fit, or why it could not be produced.
    pub outcome: FitOutcome,
}

/// Fitted estimates or the per-instrument analysis failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitOutcome {
    /// The linear model was fitted.
    Fitted {
        /// Calibrated estimates.
        analysis: Analysis,
    },
    /// Too few distinct run-counts were collected before the quota ran out.
    Underdetermined {
        /// Distinct run-counts actually observed.
        distinct_run_counts: usize,
    },
}

impl FitOutcome {
    /// The analysis, if the fit succeeded.
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            FitOutcome::Fitted { analysis } => Some(analysis),
            FitOutcome::Underdetermined { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(label: &str) -> InstrumentReport {
        InstrumentReport {
            label: label.to_string(),
            unit: "s".to_string(),
            outcome: FitOutcome::Fitted {
                analysis: Analysis {
                    intercept: 0.5,
                    slope: 10.0,
                    r_square: Some(1.0),
                    bootstrap: None,
                    kde: None,
                },
            },
        }
    }

    #[test]
    fn lookup_by_name_and_label() {
        let report = Report {
            tests: vec![
                TestReport::merged("a", vec![fitted("wall-clock")]),
                TestReport::failed("b", "instrument 'pmu' failed to load: denied"),
            ],
        };

        let a = report.test("a").unwrap();
        let clock = a.instrument("wall-clock").unwrap();
        assert_eq!(clock.outcome.analysis().unwrap().slope, 10.0);

        let b = report.test("b").unwrap();
        assert!(b.instrument("wall-clock").is_none());
        match &b.outcome {
            TestOutcome::Failed { error } => assert!(error.contains("pmu")),
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert!(report.test("c").is_none());
    }

    #[test]
    fn serializes_with_explicit_status_tags() {
        let report = Report {
            tests: vec![
                TestReport::merged(
                    "a",
                    vec![InstrumentReport {
                        label: "calls".to_string(),
                        unit: "count".to_string(),
                        outcome: FitOutcome::Underdetermined {
                            distinct_run_counts: 1,
                        },
                    }],
                ),
                TestReport::failed("b", "denied"),
            ],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"measured\""));
        assert!(json.contains("\"status\":\"underdetermined\""));
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"distinct_run_counts\":1"));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tests.len(), 2);
    }
}
