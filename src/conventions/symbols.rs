//! Compilation-scoped cache of the well-known types the analyzer needs.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::model::{Compilation, TypeId};

/// The closed set of types the analyzer resolves by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    /// `Task<T>`
    AsyncWrapper,
    /// `ValueTask<T>`
    ValueAsyncWrapper,
    /// `ActionResult<T>`
    ActionResultOfT,
    /// `IActionResult`
    ActionResultInterface,
    /// Declares the status code a result type produces.
    DefaultStatusCodeAttribute,
    /// Documents one response of an action.
    ResponseMetadataAttribute,
    /// Marks an action whose undocumented responses are covered by a
    /// default response.
    DefaultResponseMarker,
    EmptyResult,
    ApiControllerAttribute,
    NonActionAttribute,
    ConventionTypeAttribute,
    ConventionNameMatchAttribute,
}

impl WellKnownType {
    pub const ALL: [WellKnownType; 12] = [
        WellKnownType::AsyncWrapper,
        WellKnownType::ValueAsyncWrapper,
        WellKnownType::ActionResultOfT,
        WellKnownType::ActionResultInterface,
        WellKnownType::DefaultStatusCodeAttribute,
        WellKnownType::ResponseMetadataAttribute,
        WellKnownType::DefaultResponseMarker,
        WellKnownType::EmptyResult,
        WellKnownType::ApiControllerAttribute,
        WellKnownType::NonActionAttribute,
        WellKnownType::ConventionTypeAttribute,
        WellKnownType::ConventionNameMatchAttribute,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Key used in the `symbols` configuration section.
    pub fn as_str(&self) -> &'static str {
        match self {
            WellKnownType::AsyncWrapper => "async_wrapper",
            WellKnownType::ValueAsyncWrapper => "value_async_wrapper",
            WellKnownType::ActionResultOfT => "action_result_of_t",
            WellKnownType::ActionResultInterface => "action_result_interface",
            WellKnownType::DefaultStatusCodeAttribute => "default_status_code_attribute",
            WellKnownType::ResponseMetadataAttribute => "response_metadata_attribute",
            WellKnownType::DefaultResponseMarker => "default_response_marker",
            WellKnownType::EmptyResult => "empty_result",
            WellKnownType::ApiControllerAttribute => "api_controller_attribute",
            WellKnownType::NonActionAttribute => "non_action_attribute",
            WellKnownType::ConventionTypeAttribute => "convention_type_attribute",
            WellKnownType::ConventionNameMatchAttribute => "convention_name_match_attribute",
        }
    }
}

/// Metadata names of the well-known types for one host framework.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WellKnownNames {
    pub async_wrapper: String,
    pub value_async_wrapper: String,
    pub action_result_of_t: String,
    pub action_result_interface: String,
    pub default_status_code_attribute: String,
    pub response_metadata_attribute: String,
    pub default_response_marker: String,
    pub empty_result: String,
    pub api_controller_attribute: String,
    pub non_action_attribute: String,
    pub convention_type_attribute: String,
    pub convention_name_match_attribute: String,
}

impl Default for WellKnownNames {
    fn default() -> Self {
        Self {
            async_wrapper: "Task`1".to_string(),
            value_async_wrapper: "ValueTask`1".to_string(),
            action_result_of_t: "ActionResult`1".to_string(),
            action_result_interface: "IActionResult".to_string(),
            default_status_code_attribute: "DefaultStatusCodeAttribute".to_string(),
            response_metadata_attribute: "ProducesResponseTypeAttribute".to_string(),
            default_response_marker: "ProducesDefaultResponseTypeAttribute".to_string(),
            empty_result: "EmptyResult".to_string(),
            api_controller_attribute: "ApiControllerAttribute".to_string(),
            non_action_attribute: "NonActionAttribute".to_string(),
            convention_type_attribute: "ApiConventionTypeAttribute".to_string(),
            convention_name_match_attribute: "ApiConventionNameMatchAttribute".to_string(),
        }
    }
}

impl WellKnownNames {
    pub fn name(&self, wk: WellKnownType) -> &str {
        match wk {
            WellKnownType::AsyncWrapper => &self.async_wrapper,
            WellKnownType::ValueAsyncWrapper => &self.value_async_wrapper,
            WellKnownType::ActionResultOfT => &self.action_result_of_t,
            WellKnownType::ActionResultInterface => &self.action_result_interface,
            WellKnownType::DefaultStatusCodeAttribute => &self.default_status_code_attribute,
            WellKnownType::ResponseMetadataAttribute => &self.response_metadata_attribute,
            WellKnownType::DefaultResponseMarker => &self.default_response_marker,
            WellKnownType::EmptyResult => &self.empty_result,
            WellKnownType::ApiControllerAttribute => &self.api_controller_attribute,
            WellKnownType::NonActionAttribute => &self.non_action_attribute,
            WellKnownType::ConventionTypeAttribute => &self.convention_type_attribute,
            WellKnownType::ConventionNameMatchAttribute => &self.convention_name_match_attribute,
        }
    }
}

/// Memoized well-known type lookups for one compilation.
///
/// Each slot is filled on first use. Lookups are pure functions of the
/// compilation, so concurrent first use from several analysis threads is
/// safe. A type the compilation doesn't contain resolves to `None`.
#[derive(Debug)]
pub struct SymbolCache<'c> {
    compilation: &'c Compilation,
    names: WellKnownNames,
    slots: [OnceCell<Option<TypeId>>; 12],
}

impl<'c> SymbolCache<'c> {
    pub fn new(compilation: &'c Compilation) -> Self {
        Self::with_names(compilation, WellKnownNames::default())
    }

    pub fn with_names(compilation: &'c Compilation, names: WellKnownNames) -> Self {
        Self {
            compilation,
            names,
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    pub fn compilation(&self) -> &'c Compilation {
        self.compilation
    }

    pub fn names(&self) -> &WellKnownNames {
        &self.names
    }

    pub fn resolve(&self, wk: WellKnownType) -> Option<TypeId> {
        *self.slots[wk.slot()].get_or_init(|| {
            let found = self.compilation.type_by_name(self.names.name(wk));
            if found.is_none() {
                tracing::debug!(
                    symbol = wk.as_str(),
                    name = self.names.name(wk),
                    "well-known type not present in compilation"
                );
            }
            found
        })
    }

    /// Whether `ty` is the given well-known type.
    pub fn is(&self, ty: TypeId, wk: WellKnownType) -> bool {
        self.resolve(wk) == Some(ty)
    }

    /// Well-known types missing from the compilation.
    pub fn missing(&self) -> Vec<WellKnownType> {
        WellKnownType::ALL
            .iter()
            .copied()
            .filter(|wk| self.resolve(*wk).is_none())
            .collect()
    }
}
