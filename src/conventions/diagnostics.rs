//! Diagnostic types produced by the inspector.

use serde::{Deserialize, Serialize};

use crate::model::{Location, MethodId, TypeId};

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Info => 0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// What kind of convention violation was found.
///
/// Variant order is the tiebreak when sorting diagnostics at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A result type with a known status code that the action doesn't
    /// document.
    #[serde(rename = "undocumented_status_code")]
    UndocumentedStatusCode,
    /// A plain payload (the implicit success response) returned by an action
    /// that documents no success code.
    #[serde(rename = "undocumented_success_result")]
    UndocumentedSuccessResult,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 2] = [
        DiagnosticKind::UndocumentedStatusCode,
        DiagnosticKind::UndocumentedSuccessResult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UndocumentedStatusCode => "undocumented_status_code",
            DiagnosticKind::UndocumentedSuccessResult => "undocumented_success_result",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "undocumented_status_code" | "API1001" => Some(DiagnosticKind::UndocumentedStatusCode),
            "undocumented_success_result" | "API1002" => Some(DiagnosticKind::UndocumentedSuccessResult),
            _ => None,
        }
    }

    /// Stable rule id used in SARIF output.
    pub fn id(&self) -> &'static str {
        match self {
            DiagnosticKind::UndocumentedStatusCode => "API1001",
            DiagnosticKind::UndocumentedSuccessResult => "API1002",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticKind::UndocumentedStatusCode => "Action returns undocumented status code",
            DiagnosticKind::UndocumentedSuccessResult => "Action returns undocumented success result",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticKind::UndocumentedStatusCode => {
                "The returned result type produces a status code that no response metadata on the action, its controller or its convention documents."
            }
            DiagnosticKind::UndocumentedSuccessResult => {
                "The action returns a payload as its success response, but no success status code is documented."
            }
        }
    }

    pub fn default_severity(&self) -> Severity {
        Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One convention violation at a return statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
    /// The action, once the analyzer has attached it.
    pub method: Option<MethodId>,
    /// The returned type after unwrapping.
    pub payload_type: TypeId,
    /// Set for `UndocumentedStatusCode`.
    pub status_code: Option<i32>,
}

impl Diagnostic {
    pub fn undocumented_status_code(location: Location, payload_type: TypeId, status_code: i32) -> Self {
        Self {
            kind: DiagnosticKind::UndocumentedStatusCode,
            location,
            method: None,
            payload_type,
            status_code: Some(status_code),
        }
    }

    pub fn undocumented_success_result(location: Location, payload_type: TypeId) -> Self {
        Self {
            kind: DiagnosticKind::UndocumentedSuccessResult,
            location,
            method: None,
            payload_type,
            status_code: None,
        }
    }

    pub fn with_method(mut self, method: MethodId) -> Self {
        self.method = Some(method);
        self
    }

    /// Key that orders diagnostics deterministically.
    pub fn sort_key(&self) -> (&str, usize, usize, DiagnosticKind) {
        (
            self.location.file.as_str(),
            self.location.line,
            self.location.column,
            self.kind,
        )
    }
}
