//! Extracting status codes from status-code-declaring attributes.
//!
//! The code may be written as an integer literal, as a cast of an enum
//! member (`(int)HttpStatusCode.NotFound`) or as a reference to an integer
//! constant (`StatusCodes.Status404NotFound`). All three resolve to the same
//! integer. Anything else yields `None`; a malformed attribute is never an
//! analyzer failure.

use crate::model::{AttributeArg, AttributeData, AttributeHit, Compilation, ConstValue, TypeId};

use super::context::ResponseMetadata;

/// Status code declared by an attribute.
///
/// The code is the first positional argument that isn't a `typeof(...)`:
/// the only argument of `DefaultStatusCode(int)` and the integer argument of
/// `ProducesResponseType(typeof(T), int)`.
pub fn get_default_status_code(
    compilation: &Compilation,
    attribute: &AttributeData,
) -> Option<i32> {
    let argument = attribute
        .args
        .iter()
        .find(|arg| !matches!(arg, AttributeArg::TypeOf(_)))?;
    try_extract_status_code(compilation, argument)
}

/// Resolve one argument to an `i32` status code.
pub fn try_extract_status_code(compilation: &Compilation, argument: &AttributeArg) -> Option<i32> {
    let value = constant_int(compilation, argument)?;
    i32::try_from(value).ok()
}

/// Compile-time integer value of an argument: a literal, a cast, or an
/// integer constant member.
pub fn constant_int(compilation: &Compilation, argument: &AttributeArg) -> Option<i64> {
    match argument {
        AttributeArg::Int(value) => Some(*value),
        AttributeArg::Cast(inner) => constant_int(compilation, inner),
        AttributeArg::Constant { owner, member } => match compilation.constant_value(*owner, member)? {
            ConstValue::Int(value) => Some(*value),
            _ => None,
        },
        AttributeArg::Bool(_) | AttributeArg::Str(_) | AttributeArg::TypeOf(_) => None,
    }
}

/// Payload type documented by a response attribute: the named `Type`
/// argument, or else the first `typeof(...)` positional argument.
pub fn payload_type(attribute: &AttributeData) -> Option<TypeId> {
    let from_named = match attribute.named_arg("Type") {
        Some(AttributeArg::TypeOf(ty)) => Some(*ty),
        _ => None,
    };
    from_named.or_else(|| {
        attribute.args.iter().find_map(|arg| match arg {
            AttributeArg::TypeOf(ty) => Some(*ty),
            _ => None,
        })
    })
}

/// Status code of a response attribute when none is written out.
///
/// `ProducesResponseType(typeof(T))` documents the payload of a 200.
pub const IMPLICIT_RESPONSE_STATUS_CODE: i32 = 200;

/// Build the documented response for one attribute, or `None` when its
/// status code can't be resolved.
///
/// A named `StatusCode` argument wins over the positional one. An attribute
/// whose only arguments are `typeof(...)` documents a 200.
pub fn try_extract_response_metadata(
    compilation: &Compilation,
    hit: AttributeHit<'_>,
) -> Option<ResponseMetadata> {
    let data = hit.data;
    let status_code = match data.named_arg("StatusCode") {
        Some(argument) => try_extract_status_code(compilation, argument)?,
        None if !data.args.is_empty()
            && data.args.iter().all(|arg| matches!(arg, AttributeArg::TypeOf(_))) =>
        {
            IMPLICIT_RESPONSE_STATUS_CODE
        }
        None => get_default_status_code(compilation, data)?,
    };
    Some(ResponseMetadata::new(
        status_code,
        payload_type(hit.data),
        Some(hit.source),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::fixtures;
    use crate::model::{AttributeOwner, AttributeRef};

    fn first_attribute(compilation: &Compilation, type_name: &str) -> AttributeData {
        let ty = compilation.type_by_name(type_name).unwrap();
        compilation.attributes(ty)[0].clone()
    }

    #[test]
    fn test_value_defined_using_status_codes_constants() {
        let c = fixtures::compilation();
        let attribute = first_attribute(&c, "TestActionResultUsingStatusCodesConstants");
        assert_eq!(get_default_status_code(&c, &attribute), Some(412));
    }

    #[test]
    fn test_value_defined_using_http_status_cast() {
        let c = fixtures::compilation();
        let attribute = first_attribute(&c, "TestActionResultUsingHttpStatusCodeCast");
        assert_eq!(get_default_status_code(&c, &attribute), Some(103));
    }

    #[test]
    fn test_equivalent_encodings_extract_same_code() {
        let c = fixtures::compilation();
        let literal = first_attribute(&c, "TestActionResultUsingLiteral");
        let constant = first_attribute(&c, "TestActionResultUsingStatusCodesConstants");
        let cast = first_attribute(&c, "TestActionResultUsingPreconditionFailedCast");
        assert_eq!(get_default_status_code(&c, &literal), Some(412));
        assert_eq!(get_default_status_code(&c, &constant), Some(412));
        assert_eq!(get_default_status_code(&c, &cast), Some(412));
    }

    #[test]
    fn test_malformed_arguments_yield_none() {
        let c = fixtures::compilation();
        let codes = c.type_by_name("StatusCodes").unwrap();
        let marker = c.type_by_name("DefaultStatusCodeAttribute").unwrap();

        let cases = vec![
            AttributeData::new(marker, vec![]),
            AttributeData::new(marker, vec![AttributeArg::Str("404".to_string())]),
            AttributeData::new(marker, vec![AttributeArg::Bool(true)]),
            AttributeData::new(marker, vec![AttributeArg::Int(i64::from(i32::MAX) + 1)]),
            AttributeData::new(
                marker,
                vec![AttributeArg::Constant {
                    owner: codes,
                    member: "NoSuchMember".to_string(),
                }],
            ),
            AttributeData::new(
                marker,
                vec![AttributeArg::Cast(Box::new(AttributeArg::Str("x".to_string())))],
            ),
        ];
        for attribute in &cases {
            assert_eq!(get_default_status_code(&c, attribute), None, "{:?}", attribute);
        }
    }

    #[test]
    fn test_typeof_argument_is_skipped_for_status_code() {
        let c = fixtures::compilation();
        let pet = c.type_by_name("Pet").unwrap();
        let produces = c.type_by_name("ProducesResponseTypeAttribute").unwrap();
        let attribute = AttributeData::new(
            produces,
            vec![AttributeArg::TypeOf(pet), AttributeArg::Int(201)],
        );
        assert_eq!(get_default_status_code(&c, &attribute), Some(201));
        assert_eq!(payload_type(&attribute), Some(pet));
    }

    fn response(c: &Compilation, data: &AttributeData) -> Option<ResponseMetadata> {
        let controller = c.type_by_name("PetsController").unwrap();
        let source = AttributeRef {
            owner: AttributeOwner::Type(controller),
            index: 0,
        };
        try_extract_response_metadata(c, AttributeHit { data, source })
    }

    #[test]
    fn test_typeof_only_response_documents_200() {
        let c = fixtures::compilation();
        let pet = c.type_by_name("Pet").unwrap();
        let produces = c.type_by_name("ProducesResponseTypeAttribute").unwrap();
        let attribute = AttributeData::new(produces, vec![AttributeArg::TypeOf(pet)]);

        let metadata = response(&c, &attribute).unwrap();
        assert_eq!(metadata.status_code, 200);
        assert_eq!(metadata.payload_type, Some(pet));
        // DefaultStatusCode markers never get the implicit code.
        assert_eq!(get_default_status_code(&c, &attribute), None);
    }

    #[test]
    fn test_named_status_code_argument() {
        let c = fixtures::compilation();
        let pet = c.type_by_name("Pet").unwrap();
        let codes = c.type_by_name("StatusCodes").unwrap();
        let produces = c.type_by_name("ProducesResponseTypeAttribute").unwrap();

        let mut named = AttributeData::new(produces, vec![]);
        named.named.push(("Type".to_string(), AttributeArg::TypeOf(pet)));
        named.named.push(("StatusCode".to_string(), AttributeArg::Int(200)));
        let metadata = response(&c, &named).unwrap();
        assert_eq!(metadata.status_code, 200);
        assert_eq!(metadata.payload_type, Some(pet));

        let mut overridden = AttributeData::new(produces, vec![AttributeArg::Int(200)]);
        overridden.named.push((
            "StatusCode".to_string(),
            AttributeArg::Constant {
                owner: codes,
                member: "Status404NotFound".to_string(),
            },
        ));
        assert_eq!(response(&c, &overridden).unwrap().status_code, 404);

        let mut broken = AttributeData::new(produces, vec![AttributeArg::Int(200)]);
        broken
            .named
            .push(("StatusCode".to_string(), AttributeArg::Str("ok".to_string())));
        assert_eq!(response(&c, &broken), None);
    }

    #[test]
    fn test_response_without_arguments_is_skipped() {
        let c = fixtures::compilation();
        let produces = c.type_by_name("ProducesResponseTypeAttribute").unwrap();
        assert_eq!(response(&c, &AttributeData::new(produces, vec![])), None);
    }

    #[test]
    fn test_named_type_argument_wins() {
        let c = fixtures::compilation();
        let pet = c.type_by_name("Pet").unwrap();
        let dog = c.type_by_name("Dog").unwrap();
        let produces = c.type_by_name("ProducesResponseTypeAttribute").unwrap();
        let mut attribute = AttributeData::new(
            produces,
            vec![AttributeArg::TypeOf(pet), AttributeArg::Int(200)],
        );
        attribute
            .named
            .push(("Type".to_string(), AttributeArg::TypeOf(dog)));
        assert_eq!(payload_type(&attribute), Some(dog));
    }
}
