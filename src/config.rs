//! Configuration schema for convcheck.
//!
//! A config file tunes which methods are analyzed and which responses count
//! as documented. Every field is optional.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::conventions::{AnalyzerOptions, ContextOptions, DiagnosticKind, Severity, WellKnownNames, WellKnownType};
use crate::model::{parse_type_expr, Compilation};

/// File names looked up, in order, when no config is given explicitly.
pub const CONFIG_FILE_NAMES: &[&str] = &["convcheck.yaml", ".convcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Codes that count as the implicit success response (default: [200])
    #[serde(default)]
    pub implicit_success_codes: Option<Vec<i32>>,
    /// Only analyze controllers with the API controller attribute (default: true)
    #[serde(default)]
    pub require_api_controller: Option<bool>,
    /// Convention types applied to every controller, after the ones it names.
    #[serde(default)]
    pub default_conventions: Vec<String>,
    /// Glob patterns over type names that are never analyzed.
    #[serde(default)]
    pub excluded_types: Vec<String>,
    /// Glob patterns for model files to skip (e.g., "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Severity per rule, keyed by rule name or id.
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
    /// Framework type names, for hosts that spell them differently.
    #[serde(default)]
    pub symbols: WellKnownNames,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Returns the implicit success codes (defaults to [200]).
    pub fn get_implicit_success_codes(&self) -> Vec<i32> {
        self.implicit_success_codes.clone().unwrap_or_else(|| vec![200])
    }

    /// Returns whether the API controller attribute is required (defaults to true).
    pub fn should_require_api_controller(&self) -> bool {
        self.require_api_controller.unwrap_or(true)
    }

    /// Check if a model file should be skipped based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excluded_paths.iter().any(|pattern| {
            Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }

    /// Severity for a rule, falling back to the rule's default.
    pub fn severity_for(&self, kind: DiagnosticKind) -> Severity {
        self.severity
            .iter()
            .find(|(key, _)| DiagnosticKind::parse(key) == Some(kind))
            .map(|(_, severity)| *severity)
            .unwrap_or_else(|| kind.default_severity())
    }

    fn excluded_type_set(&self) -> anyhow::Result<Option<GlobSet>> {
        if self.excluded_types.is_empty() {
            return Ok(None);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_types {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Some(builder.build()?))
    }

    /// Resolve the config against a compilation.
    pub fn analyzer_options(&self, compilation: &Compilation) -> anyhow::Result<AnalyzerOptions> {
        let mut default_conventions = Vec::with_capacity(self.default_conventions.len());
        for name in &self.default_conventions {
            let expr = parse_type_expr(name)?;
            let ty = compilation
                .resolve_expr(&expr)
                .ok_or_else(|| anyhow::anyhow!("default convention type {:?} not found in model", name))?;
            default_conventions.push(ty);
        }

        Ok(AnalyzerOptions {
            context: ContextOptions {
                implicit_success_codes: self.get_implicit_success_codes(),
                default_conventions,
            },
            require_api_controller: self.should_require_api_controller(),
            excluded_types: self.excluded_type_set()?,
            names: self.symbols.clone(),
        })
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if let Some(codes) = &config.implicit_success_codes {
        for code in codes {
            if !(100..=599).contains(code) {
                anyhow::bail!("invalid implicit success code {}, must be in 100..=599", code);
            }
        }
    }

    for pattern in config.excluded_types.iter().chain(&config.excluded_paths) {
        Glob::new(pattern).map_err(|e| anyhow::anyhow!("invalid glob pattern {:?}: {}", pattern, e))?;
    }

    for key in config.severity.keys() {
        if DiagnosticKind::parse(key).is_none() {
            anyhow::bail!("unknown rule {:?} in severity section", key);
        }
    }

    for name in &config.default_conventions {
        parse_type_expr(name).map_err(|e| anyhow::anyhow!("invalid default convention {:?}: {}", name, e))?;
    }

    for wk in WellKnownType::ALL {
        if config.symbols.name(wk).trim().is_empty() {
            anyhow::bail!("symbols.{} must not be empty", wk.as_str());
        }
    }

    Ok(())
}
