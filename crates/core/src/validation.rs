//! Checklist outcomes, scoring, and letter grades.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a checklist item. Critical failures block an S/A/B grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
}

/// Letter grade, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Grade thresholds, evaluated top-down; first match wins.
    pub fn from_counts(score: f64, critical: usize, warnings: usize) -> Self {
        if critical == 0 && score >= 95.0 && warnings <= 1 {
            Self::S
        } else if critical == 0 && score >= 85.0 && warnings <= 3 {
            Self::A
        } else if critical == 0 && score >= 70.0 && warnings <= 5 {
            Self::B
        } else if critical <= 2 && score >= 50.0 {
            Self::C
        } else {
            Self::D
        }
    }

    /// C and D plans are handed to the optimizer.
    pub fn needs_optimization(&self) -> bool {
        matches!(self, Self::C | Self::D)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one checklist item against one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
}

/// Full result of a validation pass. Always recomputed from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: Vec<CheckOutcome>,
    pub warnings: Vec<CheckOutcome>,
    pub critical_failures: Vec<CheckOutcome>,
    /// Passed checks as a percentage of all checks (0.0 when none ran).
    pub score: f64,
    pub grade: Grade,
}

impl ValidationResult {
    /// Bucket outcomes and derive score and grade. Non-critical failures,
    /// including info-level ones, count as warnings.
    pub fn from_outcomes(outcomes: Vec<CheckOutcome>) -> Self {
        let total = outcomes.len();
        let mut passed = Vec::new();
        let mut warnings = Vec::new();
        let mut critical_failures = Vec::new();

        for outcome in outcomes {
            if outcome.passed {
                passed.push(outcome);
            } else if outcome.severity == Severity::Critical {
                critical_failures.push(outcome);
            } else {
                warnings.push(outcome);
            }
        }

        let score = if total > 0 {
            passed.len() as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let grade = Grade::from_counts(score, critical_failures.len(), warnings.len());

        Self {
            passed,
            warnings,
            critical_failures,
            score,
            grade,
        }
    }

    pub fn total_checks(&self) -> usize {
        self.passed.len() + self.warnings.len() + self.critical_failures.len()
    }

    pub fn has_failure(&self, check_id: &str) -> bool {
        self.warnings
            .iter()
            .chain(self.critical_failures.iter())
            .any(|o| o.id == check_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, severity: Severity, passed: bool) -> CheckOutcome {
        CheckOutcome {
            id: id.to_string(),
            description: String::new(),
            severity,
            passed,
            message: String::new(),
        }
    }

    #[test]
    fn test_grade_thresholds_first_match_wins() {
        assert_eq!(Grade::from_counts(100.0, 0, 0), Grade::S);
        assert_eq!(Grade::from_counts(95.0, 0, 1), Grade::S);
        assert_eq!(Grade::from_counts(96.0, 0, 2), Grade::A);
        assert_eq!(Grade::from_counts(85.0, 0, 3), Grade::A);
        assert_eq!(Grade::from_counts(84.9, 0, 0), Grade::B);
        assert_eq!(Grade::from_counts(90.0, 0, 5), Grade::B);
        assert_eq!(Grade::from_counts(99.0, 1, 0), Grade::C);
        assert_eq!(Grade::from_counts(50.0, 2, 9), Grade::C);
        assert_eq!(Grade::from_counts(49.9, 0, 0), Grade::D);
        assert_eq!(Grade::from_counts(90.0, 3, 0), Grade::D);
    }

    #[test]
    fn test_needs_optimization() {
        assert!(!Grade::S.needs_optimization());
        assert!(!Grade::B.needs_optimization());
        assert!(Grade::C.needs_optimization());
        assert!(Grade::D.needs_optimization());
    }

    #[test]
    fn test_from_outcomes_buckets_and_scores() {
        let result = ValidationResult::from_outcomes(vec![
            outcome("BV001", Severity::Critical, false),
            outcome("BV002", Severity::Warning, false),
            outcome("MV001", Severity::Info, false),
            outcome("SV001", Severity::Critical, true),
        ]);
        assert_eq!(result.passed.len(), 1);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.critical_failures.len(), 1);
        assert_eq!(result.score, 25.0);
        assert_eq!(result.grade, Grade::D);
        assert!(result.has_failure("BV001"));
        assert!(!result.has_failure("SV001"));
        assert_eq!(result.total_checks(), 4);
    }

    #[test]
    fn test_empty_checklist_scores_zero() {
        let result = ValidationResult::from_outcomes(Vec::new());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.grade, Grade::D);
    }

    #[test]
    fn test_grade_s_implies_no_criticals() {
        for critical in 0..4 {
            for warnings in 0..7 {
                for score in [0.0, 49.0, 50.0, 70.0, 85.0, 95.0, 100.0] {
                    let grade = Grade::from_counts(score, critical, warnings);
                    if grade == Grade::S {
                        assert_eq!(critical, 0);
                        assert!(score >= 95.0);
                    }
                }
            }
        }
    }
}
