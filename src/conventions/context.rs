//! Per-method view of the documented responses of an action.

use std::collections::HashSet;

use crate::model::{AttributeHit, AttributeRef, MethodId, TypeId};

use super::matching::find_convention_method;
use super::status_code::try_extract_response_metadata;
use super::symbols::{SymbolCache, WellKnownType};
use super::unwrap::unwrap_async;

/// One documented response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status_code: i32,
    pub payload_type: Option<TypeId>,
    /// The attribute the response was read from.
    pub attribute_source: Option<AttributeRef>,
}

impl ResponseMetadata {
    pub fn new(status_code: i32, payload_type: Option<TypeId>, attribute_source: Option<AttributeRef>) -> Self {
        Self {
            status_code,
            payload_type,
            attribute_source,
        }
    }
}

/// Settings that shape how contexts are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Codes that count as the implicit success response.
    pub implicit_success_codes: Vec<i32>,
    /// Convention types applied after those named on the controller.
    pub default_conventions: Vec<TypeId>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            implicit_success_codes: vec![200],
            default_conventions: Vec::new(),
        }
    }
}

/// Everything the inspector needs to know about one action.
///
/// Built once per method and never mutated afterwards, so return
/// statements of the same method can be inspected from any thread.
#[derive(Debug)]
pub struct ApiConventionContext<'a> {
    symbol_cache: &'a SymbolCache<'a>,
    method: Option<MethodId>,
    declared_return_type: TypeId,
    expected_responses: Vec<ResponseMetadata>,
    documented_status_codes: HashSet<i32>,
    implicit_success_codes: Vec<i32>,
}

impl<'a> ApiConventionContext<'a> {
    /// Build a context from an explicit response list.
    ///
    /// `declared` is the method's full return type; async wrappers are
    /// stripped here.
    pub fn new(
        symbol_cache: &'a SymbolCache<'a>,
        declared: TypeId,
        expected_responses: Vec<ResponseMetadata>,
        implicit_success_codes: Vec<i32>,
    ) -> Self {
        let documented_status_codes = expected_responses.iter().map(|r| r.status_code).collect();
        Self {
            symbol_cache,
            method: None,
            declared_return_type: unwrap_async(symbol_cache, declared),
            expected_responses,
            documented_status_codes,
            implicit_success_codes,
        }
    }

    /// Build the context of an action method.
    pub fn build(symbol_cache: &'a SymbolCache<'a>, method: MethodId, options: &ContextOptions) -> Self {
        let compilation = symbol_cache.compilation();
        let symbol = compilation.method(method);

        let mut responses = Vec::new();
        if let Some(attribute) = symbol_cache.resolve(WellKnownType::ResponseMetadataAttribute) {
            let method_hits = compilation.method_attributes(method, attribute, true);
            let type_hits = compilation.attributes_of(symbol.containing_type, attribute, true);
            let convention_hits = find_convention_method(symbol_cache, method, &options.default_conventions)
                .map(|convention| compilation.method_attributes(convention, attribute, false))
                .unwrap_or_default();

            for hit in method_hits.into_iter().chain(type_hits).chain(convention_hits) {
                push_response(symbol_cache, &mut responses, hit);
            }
        }

        let mut context = Self::new(
            symbol_cache,
            symbol.return_type,
            responses,
            options.implicit_success_codes.clone(),
        );
        context.method = Some(method);
        context
    }

    pub fn symbol_cache(&self) -> &'a SymbolCache<'a> {
        self.symbol_cache
    }

    pub fn method(&self) -> Option<MethodId> {
        self.method
    }

    /// Return type with async wrappers removed.
    pub fn declared_return_type(&self) -> TypeId {
        self.declared_return_type
    }

    pub fn expected_responses(&self) -> &[ResponseMetadata] {
        &self.expected_responses
    }

    pub fn documented_status_codes(&self) -> &HashSet<i32> {
        &self.documented_status_codes
    }

    pub fn implicit_success_codes(&self) -> &[i32] {
        &self.implicit_success_codes
    }

    pub fn is_documented(&self, status_code: i32) -> bool {
        self.documented_status_codes.contains(&status_code)
    }

    /// Whether any of the implicit success codes is documented.
    pub fn documents_implicit_success(&self) -> bool {
        self.implicit_success_codes.iter().any(|code| self.is_documented(*code))
    }
}

fn push_response(cache: &SymbolCache<'_>, responses: &mut Vec<ResponseMetadata>, hit: AttributeHit<'_>) {
    match try_extract_response_metadata(cache.compilation(), hit) {
        Some(response) => responses.push(response),
        None => tracing::debug!(
            owner = ?hit.source.owner,
            index = hit.source.index,
            "skipping response attribute without a resolvable status code"
        ),
    }
}
