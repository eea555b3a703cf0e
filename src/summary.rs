//! Run summary and pass/fail decision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conventions::{AnalysisResult, Severity};
use crate::report::Finding;

/// Lowest severity that fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    /// Fail on warnings and errors.
    #[default]
    Warning,
    /// Fail on errors only.
    Error,
    /// Never fail because of findings.
    Never,
}

impl FailOn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailOn::Warning => "warning",
            FailOn::Error => "error",
            FailOn::Never => "never",
        }
    }

    /// Whether a finding of `severity` fails the run.
    pub fn fails(&self, severity: Severity) -> bool {
        match self {
            FailOn::Warning => severity.rank() >= Severity::Warning.rank(),
            FailOn::Error => severity == Severity::Error,
            FailOn::Never => false,
        }
    }
}

impl std::fmt::Display for FailOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub methods_analyzed: usize,
    pub methods_skipped: usize,
    pub return_statements: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Findings per rule name.
    pub by_rule: BTreeMap<String, usize>,
    pub cancelled: bool,
    pub fail_on: FailOn,
    /// Whether the run passed under `fail_on`.
    pub passed: bool,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// Summarize a run. A cancelled run never passes.
pub fn summarize(result: &AnalysisResult, findings: &[Finding], fail_on: FailOn) -> Summary {
    let mut by_rule = BTreeMap::new();
    let (mut errors, mut warnings, mut infos) = (0, 0, 0);
    for finding in findings {
        *by_rule.entry(finding.kind.as_str().to_string()).or_insert(0) += 1;
        match finding.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
            Severity::Info => infos += 1,
        }
    }

    let passed = !result.cancelled && !findings.iter().any(|f| fail_on.fails(f.severity));

    Summary {
        methods_analyzed: result.methods_analyzed,
        methods_skipped: result.methods_skipped,
        return_statements: result.return_statements,
        errors,
        warnings,
        infos,
        by_rule,
        cancelled: result.cancelled,
        fail_on,
        passed,
    }
}
