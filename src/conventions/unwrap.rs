//! Stripping async and result wrappers off a return type.

use super::symbols::{SymbolCache, WellKnownType};
use crate::model::TypeId;

const ASYNC_WRAPPERS: &[WellKnownType] = &[
    WellKnownType::AsyncWrapper,
    WellKnownType::ValueAsyncWrapper,
];

/// Remove every async wrapper layer: `Task<ValueTask<T>>` becomes `T`.
pub fn unwrap_async(cache: &SymbolCache<'_>, ty: TypeId) -> TypeId {
    let mut current = ty;
    // Each step descends into a type argument, so this terminates.
    while let Some(inner) = single_argument_of(cache, current, ASYNC_WRAPPERS) {
        current = inner;
    }
    current
}

/// The payload type a method communicates.
///
/// Async wrappers are removed first, then at most one `ActionResult<T>`
/// layer. Anything else (plain payloads, `IActionResult`, `void`,
/// `IEnumerable<T>`) comes back unchanged.
pub fn unwrap_return_type(cache: &SymbolCache<'_>, ty: TypeId) -> TypeId {
    let ty = unwrap_async(cache, ty);
    single_argument_of(cache, ty, &[WellKnownType::ActionResultOfT]).unwrap_or(ty)
}

/// The type argument of `ty` when it is a one-argument instantiation of one
/// of `wrappers`.
fn single_argument_of(
    cache: &SymbolCache<'_>,
    ty: TypeId,
    wrappers: &[WellKnownType],
) -> Option<TypeId> {
    let compilation = cache.compilation();
    let definition = compilation.definition_of(ty)?;
    let [argument] = compilation.type_arguments(ty) else {
        return None;
    };
    wrappers
        .iter()
        .any(|wk| cache.is(definition, *wk))
        .then_some(*argument)
}
