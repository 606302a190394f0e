//! JSON serialization for benchmark reports.

use crate::report::Report;

/// Serialize a report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for `Report`).
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for `Report`).
pub fn to_json_pretty(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analysis;
    use crate::report::{FitOutcome, InstrumentReport, TestReport};

    fn make_report() -> Report {
        Report {
            tests: vec![TestReport::merged(
                "list 100",
                vec![InstrumentReport {
                    label: "wall-clock".to_string(),
                    unit: "s".to_string(),
                    outcome: FitOutcome::Fitted {
                        analysis: Analysis {
                            intercept: 0.25,
                            slope: 10.0,
                            r_square: Some(0.999),
                            bootstrap: Some(vec![9.8, 10.0, 10.2]),
                            kde: None,
                        },
                    },
                }],
            )],
        }
    }

    #[test]
    fn compact_json_carries_estimates() {
        let json = to_json(&make_report()).unwrap();
        assert!(json.contains("\"name\":\"list 100\""));
        assert!(json.contains("\"slope\":10.0"));
        assert!(json.contains("\"unit\":\"s\""));
        assert!(json.contains("\"r_square\":0.999"));
    }

    #[test]
    fn pretty_json_has_newlines() {
        let json = to_json_pretty(&make_report()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("intercept"));
    }
}
