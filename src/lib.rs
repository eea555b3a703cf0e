//! convcheck - API convention analyzer.
//!
//! convcheck checks that every value an API action can return is covered by
//! the responses the action documents. A result type that declares a status
//! code (`BadRequestResult` is 400) must have that code documented; a plain
//! payload is the implicit success response and needs a documented success
//! code.
//!
//! # Architecture
//!
//! - `model`: the host type graph (types, attributes, methods, return
//!   statements), loaded from YAML or JSON model files
//! - `conventions`: the analysis engine (symbol cache, return type
//!   unwrapping, status code extraction, convention matching, inspection)
//! - `config`: YAML configuration schema
//! - `report`: Output formatting (pretty, JSON, SARIF)
//! - `summary`: Pass/fail decision and counts

pub mod cli;
pub mod config;
pub mod conventions;
pub mod model;
pub mod report;
pub mod summary;

pub use config::Config;
pub use conventions::{
    AnalysisResult, Analyzer, AnalyzerOptions, ApiConventionContext, Diagnostic, DiagnosticKind,
    Severity, SymbolCache, WellKnownNames, WellKnownType,
};
pub use model::{Compilation, CompilationBuilder, ModelError};
pub use report::Finding;
pub use summary::{FailOn, Summary};
