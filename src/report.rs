//! Output formatting for convcheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Config;
use crate::conventions::{Diagnostic, DiagnosticKind, Severity};
use crate::model::Compilation;
use crate::summary::Summary;

/// A diagnostic rendered against its compilation, ready for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "rule")]
    pub kind: DiagnosticKind,
    pub id: String,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub payload_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i32>,
    pub message: String,
}

impl Finding {
    pub fn from_diagnostic(compilation: &Compilation, diagnostic: &Diagnostic, config: &Config) -> Self {
        Self {
            kind: diagnostic.kind,
            id: diagnostic.kind.id().to_string(),
            severity: config.severity_for(diagnostic.kind),
            file: diagnostic.location.file.clone(),
            line: diagnostic.location.line,
            column: diagnostic.location.column,
            method: diagnostic.method.map(|m| compilation.method_display_name(m)),
            payload_type: compilation.display_name(diagnostic.payload_type),
            status_code: diagnostic.status_code,
            message: message(compilation, diagnostic),
        }
    }
}

/// Render all diagnostics of a run.
pub fn findings(compilation: &Compilation, diagnostics: &[Diagnostic], config: &Config) -> Vec<Finding> {
    diagnostics
        .iter()
        .map(|d| Finding::from_diagnostic(compilation, d, config))
        .collect()
}

/// Human-readable message for a diagnostic.
pub fn message(compilation: &Compilation, diagnostic: &Diagnostic) -> String {
    let action = diagnostic
        .method
        .map(|m| format!("Action method '{}'", compilation.method_display_name(m)))
        .unwrap_or_else(|| "Action method".to_string());
    let payload = compilation.display_name(diagnostic.payload_type);
    match (diagnostic.kind, diagnostic.status_code) {
        (DiagnosticKind::UndocumentedStatusCode, Some(code)) => format!(
            "{} returns undocumented status code '{}' ('{}')",
            action, code, payload
        ),
        (DiagnosticKind::UndocumentedStatusCode, None) => {
            format!("{} returns an undocumented status code ('{}')", action, payload)
        }
        (DiagnosticKind::UndocumentedSuccessResult, _) => format!(
            "{} returns '{}' as a success result without a documented success status code",
            action, payload
        ),
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub passed: bool,
    pub fail_on: String,
    pub methods_analyzed: usize,
    pub methods_skipped: usize,
    pub return_statements: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
    pub findings: Vec<Finding>,
    pub breakdown: Vec<BreakdownEntry>,
}

/// Findings per rule.
#[derive(Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub rule: String,
    pub id: String,
    pub count: usize,
}

pub fn build_json_report(path: &str, config_path: Option<&str>, findings: &[Finding], summary: &Summary) -> JsonReport {
    let breakdown = summary
        .by_rule
        .iter()
        .map(|(rule, count)| BreakdownEntry {
            rule: rule.clone(),
            id: DiagnosticKind::parse(rule)
                .map(|k| k.id().to_string())
                .unwrap_or_default(),
            count: *count,
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        passed: summary.passed,
        fail_on: summary.fail_on.to_string(),
        methods_analyzed: summary.methods_analyzed,
        methods_skipped: summary.methods_skipped,
        return_statements: summary.return_statements,
        cancelled: summary.cancelled,
        findings: findings.to_vec(),
        breakdown,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, config_path: Option<&str>, findings: &[Finding], summary: &Summary) -> anyhow::Result<()> {
    let report = build_json_report(path, config_path, findings, summary);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "convcheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    pub full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn", skip_serializing_if = "Option::is_none")]
    pub start_column: Option<usize>,
}

fn rule_name(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::UndocumentedStatusCode => "UndocumentedStatusCode",
        DiagnosticKind::UndocumentedSuccessResult => "UndocumentedSuccessResult",
    }
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }
    Path::new(file_path)
        .strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.replace('\\', "/"))
}

pub fn build_sarif_report(base_path: &Path, findings: &[Finding], config: &Config) -> SarifReport {
    let kinds: BTreeSet<DiagnosticKind> = findings.iter().map(|f| f.kind).collect();

    let rules = kinds
        .into_iter()
        .map(|kind| SarifRule {
            id: kind.id().to_string(),
            name: rule_name(kind).to_string(),
            short_description: SarifMessage {
                text: kind.title().to_string(),
            },
            full_description: SarifMessage {
                text: kind.description().to_string(),
            },
            default_config: SarifRuleConfig {
                level: map_severity_to_level(&config.severity_for(kind)).to_string(),
            },
        })
        .collect();

    let results = findings
        .iter()
        .map(|f| SarifResult {
            rule_id: f.id.clone(),
            level: map_severity_to_level(&f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(&f.file, base_path),
                    },
                    region: SarifRegion {
                        start_line: f.line.max(1),
                        start_column: (f.column > 0).then_some(f.column),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, findings: &[Finding], config: &Config) -> anyhow::Result<()> {
    let report = build_sarif_report(base_path, findings, config);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: Option<&str>, findings: &[Finding], summary: &Summary) {
    println!();
    print!("  ");
    print!("{}", TOOL_NAME.cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Model:  ".dimmed());
    println!("{}", path);
    print!("  {}", "Config: ".dimmed());
    println!("{}", config_path.unwrap_or("(defaults)"));
    println!();

    write_result_summary(summary);
    println!();

    if !findings.is_empty() {
        write_findings(findings);
        println!();
    }

    if !summary.by_rule.is_empty() {
        write_breakdown(summary);
        println!();
    }
}

fn write_result_summary(summary: &Summary) {
    if summary.passed {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }
    print!(
        "  {} action(s), {} return(s) checked",
        summary.methods_analyzed, summary.return_statements
    );
    if summary.methods_skipped > 0 {
        print!("  {}", format!("({} skipped)", summary.methods_skipped).dimmed());
    }
    if summary.cancelled {
        print!("  {}", "cancelled".yellow());
    }
    println!();
}

fn write_findings(findings: &[Finding]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for f in findings {
        write_severity_tag(&f.severity);
        print!("   ");
        print!("{:<9}", f.id.dimmed());
        print!("{}", f.file.blue());
        if f.line > 0 {
            print!("{}", format!(":{}", f.line).dimmed());
            if f.column > 0 {
                print!("{}", format!(":{}", f.column).dimmed());
            }
        }
        println!();
        println!("            {}", f.message);
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_breakdown(summary: &Summary) {
    println!("  {}", "Breakdown:".bold());
    let mut rules: Vec<(&String, &usize)> = summary.by_rule.iter().collect();
    rules.sort_by(|a, b| b.1.cmp(a.1));
    for (rule, count) in rules {
        let plural = if *count != 1 { "s" } else { "" };
        println!("    {:<28} {} finding{}", rule, count, plural);
    }
}
