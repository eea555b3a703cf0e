//! Judging one return statement against an action's documented responses.

use crate::model::{Location, TypeId};

use super::context::ApiConventionContext;
use super::diagnostics::Diagnostic;
use super::status_code::get_default_status_code;
use super::symbols::WellKnownType;
use super::unwrap::unwrap_return_type;

/// Inspect the statically known type of one returned expression.
///
/// Returns `None` when the return is documented, or when its status code
/// can't be known statically.
pub fn inspect_return_expression(
    context: &ApiConventionContext<'_>,
    actual: TypeId,
    location: &Location,
) -> Option<Diagnostic> {
    let cache = context.symbol_cache();
    let compilation = cache.compilation();
    let result_interface = cache.resolve(WellKnownType::ActionResultInterface);

    // `return result;` where result is typed as the interface itself.
    if let Some(iface) = result_interface {
        if actual == iface && compilation.is_assignable_from(iface, context.declared_return_type()) {
            return None;
        }
    }

    let payload = unwrap_return_type(cache, actual);

    if let Some(marker) = cache.resolve(WellKnownType::DefaultStatusCodeAttribute) {
        if let Some(hit) = compilation.attributes_of(payload, marker, true).into_iter().next() {
            let status_code = get_default_status_code(compilation, hit.data)?;
            if context.is_documented(status_code) {
                return None;
            }
            return Some(Diagnostic::undocumented_status_code(
                location.clone(),
                payload,
                status_code,
            ));
        }
    }

    let is_result = result_interface.is_some_and(|iface| compilation.is_assignable_from(iface, payload));
    if is_result && !cache.is(payload, WellKnownType::EmptyResult) {
        tracing::trace!(
            payload = %compilation.display_name(payload),
            "result type without a status code"
        );
        return None;
    }

    if context.documents_implicit_success() {
        None
    } else {
        Some(Diagnostic::undocumented_success_result(location.clone(), payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::context::ResponseMetadata;
    use crate::conventions::diagnostics::DiagnosticKind;
    use crate::conventions::fixtures;
    use crate::conventions::symbols::SymbolCache;
    use crate::model::{parse_type_expr, Compilation};

    fn ty(c: &Compilation, expr: &str) -> TypeId {
        c.resolve_expr(&parse_type_expr(expr).unwrap())
            .unwrap_or_else(|| panic!("type {} not in fixture", expr))
    }

    fn responses(codes: &[i32]) -> Vec<ResponseMetadata> {
        codes
            .iter()
            .map(|code| ResponseMetadata::new(*code, None, None))
            .collect()
    }

    fn inspect(declared: &str, actual: &str, documented: &[i32]) -> Option<Diagnostic> {
        let c = fixtures::compilation();
        let cache = SymbolCache::new(&c);
        let context = ApiConventionContext::new(&cache, ty(&c, declared), responses(documented), vec![200]);
        inspect_return_expression(&context, ty(&c, actual), &Location::new("Test.cs", 10, 5))
    }

    #[test]
    fn test_declared_and_actual_result_interface() {
        assert_eq!(inspect("IActionResult", "IActionResult", &[]), None);
        assert_eq!(inspect("Task<IActionResult>", "IActionResult", &[404]), None);
    }

    #[test]
    fn test_model_with_documented_success() {
        assert_eq!(inspect("Pet", "Pet", &[200]), None);
        assert_eq!(inspect("ActionResult<Pet>", "Pet", &[200, 404]), None);
    }

    #[test]
    fn test_model_without_documented_success() {
        let c = fixtures::compilation();
        let d = inspect("Pet", "Pet", &[201]).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedSuccessResult);
        assert_eq!(d.payload_type, ty(&c, "Pet"));
        assert_eq!(d.status_code, None);
        assert_eq!(d.location, Location::new("Test.cs", 10, 5));
    }

    #[test]
    fn test_derived_model_is_judged_by_actual_type() {
        let c = fixtures::compilation();
        let d = inspect("ActionResult<Pet>", "Dog", &[404]).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedSuccessResult);
        assert_eq!(d.payload_type, ty(&c, "Dog"));

        assert_eq!(inspect("ActionResult<Pet>", "Dog", &[200]), None);
    }

    #[test]
    fn test_result_with_undocumented_status_code() {
        let d = inspect(
            "IActionResult",
            "TestActionResultUsingStatusCodesConstants",
            &[200, 404],
        )
        .unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedStatusCode);
        assert_eq!(d.status_code, Some(412));
    }

    #[test]
    fn test_result_with_documented_status_code() {
        assert_eq!(inspect("IActionResult", "NotFoundResult", &[404]), None);
        assert_eq!(
            inspect("IActionResult", "TestActionResultUsingLiteral", &[412]),
            None
        );
    }

    #[test]
    fn test_status_code_is_inherited_from_base_result() {
        let d = inspect("IActionResult", "ValidationProblemResult", &[200]).unwrap();
        assert_eq!(d.status_code, Some(400));
    }

    #[test]
    fn test_unresolvable_status_code_yields_nothing() {
        assert_eq!(inspect("IActionResult", "BrokenStatusCodeResult", &[]), None);
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(inspect("IActionResult", "EmptyResult", &[200, 404]), None);

        let d = inspect("IActionResult", "EmptyResult", &[404]).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedSuccessResult);
    }

    #[test]
    fn test_result_without_status_code_yields_nothing() {
        assert_eq!(inspect("IActionResult", "ContentResult", &[]), None);
    }

    #[test]
    fn test_returned_action_result_of_t_is_unwrapped() {
        assert_eq!(inspect("ActionResult<Pet>", "ActionResult<Pet>", &[200]), None);
        let d = inspect("ActionResult<Pet>", "ActionResult<Pet>", &[404]).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedSuccessResult);
    }

    #[test]
    fn test_task_of_action_result_end_to_end() {
        let c = fixtures::compilation();
        let cache = SymbolCache::new(&c);
        let declared = ty(&c, "Task<ActionResult<Pet>>");
        let context = ApiConventionContext::new(&cache, declared, responses(&[200, 404]), vec![200]);
        let here = Location::new("PetsController.cs", 20, 13);

        assert_eq!(inspect_return_expression(&context, ty(&c, "Pet"), &here), None);
        assert_eq!(inspect_return_expression(&context, ty(&c, "NotFoundResult"), &here), None);

        let d = inspect_return_expression(&context, ty(&c, "BadRequestResult"), &here).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedStatusCode);
        assert_eq!(d.status_code, Some(400));
        assert_eq!(d.payload_type, ty(&c, "BadRequestResult"));
    }

    #[test]
    fn test_payload_documented_by_typeof_or_named_status_code() {
        let c = fixtures::compilation();
        let cache = SymbolCache::new(&c);
        let pet = ty(&c, "Pet");
        let here = Location::new("ResponseEncodings.cs", 3, 13);

        for name in ["Fetch", "Named"] {
            let method = fixtures::method(&c, "ResponseEncodings", name);
            let context = ApiConventionContext::build(&cache, method, &Default::default());
            assert_eq!(inspect_return_expression(&context, pet, &here), None, "{}", name);
        }

        let method = fixtures::method(&c, "ResponseEncodings", "NamedNotFound");
        let context = ApiConventionContext::build(&cache, method, &Default::default());
        let d = inspect_return_expression(&context, pet, &here).unwrap();
        assert_eq!(d.kind, DiagnosticKind::UndocumentedSuccessResult);
    }

    #[test]
    fn test_missing_framework_types_fall_back() {
        let c = Compilation::from_yaml_str("types:\n  - name: Pet\n").unwrap();
        let cache = SymbolCache::new(&c);
        let pet = ty(&c, "Pet");
        let context = ApiConventionContext::new(&cache, pet, responses(&[200]), vec![200]);
        assert_eq!(inspect_return_expression(&context, pet, &Location::none()), None);
    }
}
