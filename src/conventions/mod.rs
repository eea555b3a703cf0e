//! The convention engine.
//!
//! For every action method, the engine works out which responses are
//! documented (response attributes on the method, its controller and a
//! matching convention) and flags each return statement whose result isn't
//! among them. The engine never fails: malformed attributes, missing
//! framework types and unknowable return types are all treated as "no
//! opinion".

mod analyzer;
mod context;
mod diagnostics;
mod inspect;
mod matching;
mod status_code;
mod symbols;
mod unwrap;

pub use analyzer::{analyze_method, should_evaluate_method, AnalysisResult, Analyzer, AnalyzerOptions};
pub use context::{ApiConventionContext, ContextOptions, ResponseMetadata};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use inspect::inspect_return_expression;
pub use matching::{convention_types, find_convention_method, is_name_match, name_match_behavior, NameMatchBehavior};
pub use status_code::{get_default_status_code, payload_type, try_extract_response_metadata, try_extract_status_code};
pub use symbols::{SymbolCache, WellKnownNames, WellKnownType};
pub use unwrap::{unwrap_async, unwrap_return_type};
