//! Analysis driver: picks the actions of a compilation and inspects every
//! return statement in them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use globset::GlobSet;
use rayon::prelude::*;

use crate::model::{Compilation, MethodId};

use super::context::{ApiConventionContext, ContextOptions};
use super::diagnostics::Diagnostic;
use super::inspect::inspect_return_expression;
use super::symbols::{SymbolCache, WellKnownNames, WellKnownType};

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub context: ContextOptions,
    /// Only analyze types carrying the API controller attribute.
    pub require_api_controller: bool,
    /// Types whose display name matches are never analyzed.
    pub excluded_types: Option<GlobSet>,
    pub names: WellKnownNames,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            context: ContextOptions::default(),
            require_api_controller: true,
            excluded_types: None,
            names: WellKnownNames::default(),
        }
    }
}

/// Results of analyzing a compilation.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub methods_analyzed: usize,
    pub methods_skipped: usize,
    pub return_statements: usize,
    /// Set when the run stopped before every method was analyzed.
    pub cancelled: bool,
    /// Framework types the compilation lacks; non-empty only when the
    /// analyzer had to stand down.
    pub missing_symbols: Vec<WellKnownType>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.diagnostics.extend(other.diagnostics);
        self.methods_analyzed += other.methods_analyzed;
        self.methods_skipped += other.methods_skipped;
        self.return_statements += other.return_statements;
        self.cancelled |= other.cancelled;
        for wk in other.missing_symbols {
            if !self.missing_symbols.contains(&wk) {
                self.missing_symbols.push(wk);
            }
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
}

/// Whether a method is an action the analyzer should look at.
pub fn should_evaluate_method(cache: &SymbolCache<'_>, method: MethodId, options: &AnalyzerOptions) -> bool {
    let compilation = cache.compilation();
    let symbol = compilation.method(method);
    if !symbol.is_public || symbol.is_static {
        return false;
    }
    let owner = symbol.containing_type;

    if let Some(non_action) = cache.resolve(WellKnownType::NonActionAttribute) {
        if compilation.method_has_attribute(method, non_action, true) {
            return false;
        }
    }

    if options.require_api_controller {
        match cache.resolve(WellKnownType::ApiControllerAttribute) {
            Some(api_controller) if compilation.has_attribute(owner, api_controller, true) => {}
            _ => return false,
        }
    }

    if let Some(marker) = cache.resolve(WellKnownType::DefaultResponseMarker) {
        if compilation.method_has_attribute(method, marker, true)
            || compilation.has_attribute(owner, marker, true)
        {
            return false;
        }
    }

    if let Some(excluded) = &options.excluded_types {
        if excluded.is_match(compilation.display_name(owner)) {
            return false;
        }
    }

    true
}

/// Inspect every return statement of one action.
pub fn analyze_method(cache: &SymbolCache<'_>, method: MethodId, options: &ContextOptions) -> AnalysisResult {
    let compilation = cache.compilation();
    let context = ApiConventionContext::build(cache, method, options);
    let mut result = AnalysisResult::new();
    result.methods_analyzed = 1;

    for statement in &compilation.method(method).returns {
        result.return_statements += 1;
        let Some(actual) = statement.expression_type else {
            tracing::trace!(location = %statement.location, "return without a static type");
            continue;
        };
        tracing::trace!(
            location = %statement.location,
            actual = %compilation.display_name(actual),
            "inspecting return"
        );
        if let Some(diagnostic) = inspect_return_expression(&context, actual, &statement.location) {
            result.diagnostics.push(diagnostic.with_method(method));
        }
    }
    result
}

/// Runs the convention analysis over a whole compilation.
pub struct Analyzer<'c> {
    compilation: &'c Compilation,
    options: AnalyzerOptions,
    parallel: bool,
    cancel: Arc<AtomicBool>,
}

impl<'c> Analyzer<'c> {
    pub fn new(compilation: &'c Compilation) -> Self {
        Self {
            compilation,
            options: AnalyzerOptions::default(),
            parallel: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    /// Analyze methods on the rayon pool (default) or one at a time.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Flag checked between methods; setting it stops the run early.
    pub fn cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn run(&self) -> AnalysisResult {
        let cache = SymbolCache::with_names(self.compilation, self.options.names.clone());

        let missing: Vec<WellKnownType> = [
            WellKnownType::ActionResultInterface,
            WellKnownType::DefaultStatusCodeAttribute,
        ]
        .into_iter()
        .filter(|wk| cache.resolve(*wk).is_none())
        .collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|wk| cache.names().name(*wk)).collect();
            tracing::warn!(missing = ?names, "framework types not found, skipping analysis");
            let mut result = AnalysisResult::new();
            result.methods_skipped = self.compilation.method_count();
            result.missing_symbols = missing;
            return result;
        }

        let methods: Vec<MethodId> = self.compilation.method_ids().collect();
        let analyze_one = |method: MethodId| -> AnalysisResult {
            if self.cancel.load(Ordering::Relaxed) {
                return AnalysisResult {
                    cancelled: true,
                    ..Default::default()
                };
            }
            if !should_evaluate_method(&cache, method, &self.options) {
                tracing::debug!(method = %self.compilation.method_display_name(method), "skipping method");
                return AnalysisResult {
                    methods_skipped: 1,
                    ..Default::default()
                };
            }
            analyze_method(&cache, method, &self.options.context)
        };

        let partials: Vec<AnalysisResult> = if self.parallel {
            methods.into_par_iter().map(analyze_one).collect()
        } else {
            methods.into_iter().map(analyze_one).collect()
        };

        let mut result = AnalysisResult::new();
        for partial in partials {
            result.merge(partial);
        }
        result.sort();

        tracing::info!(
            analyzed = result.methods_analyzed,
            skipped = result.methods_skipped,
            returns = result.return_statements,
            diagnostics = result.diagnostics.len(),
            cancelled = result.cancelled,
            "analysis complete"
        );
        result
    }
}
