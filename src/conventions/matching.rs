//! Convention groups: matching an action to a convention method by name.

use crate::model::{AttributeArg, MethodId, TypeId};

use super::status_code::constant_int;
use super::symbols::{SymbolCache, WellKnownType};

/// How a convention method's name is compared with an action's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatchBehavior {
    Any,
    Exact,
    /// `Get` matches `Get` and `GetPet`, not `Getaway`.
    Prefix,
    /// `Pet` matches `Pet` and `GetPet`, not `Carpet`.
    Suffix,
}

impl NameMatchBehavior {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(NameMatchBehavior::Any),
            1 => Some(NameMatchBehavior::Exact),
            2 => Some(NameMatchBehavior::Prefix),
            3 => Some(NameMatchBehavior::Suffix),
            _ => None,
        }
    }
}

pub fn is_name_match(name: &str, convention_name: &str, behavior: NameMatchBehavior) -> bool {
    match behavior {
        NameMatchBehavior::Any => true,
        NameMatchBehavior::Exact => name == convention_name,
        NameMatchBehavior::Prefix => {
            name.starts_with(convention_name)
                && name[convention_name.len()..]
                    .chars()
                    .next()
                    .map_or(true, char::is_uppercase)
        }
        NameMatchBehavior::Suffix => {
            name.ends_with(convention_name)
                && name[..name.len() - convention_name.len()]
                    .chars()
                    .next_back()
                    .map_or(true, char::is_lowercase)
        }
    }
}

/// Behavior declared on a convention method; `Exact` when absent or
/// unresolvable.
pub fn name_match_behavior(cache: &SymbolCache<'_>, convention_method: MethodId) -> NameMatchBehavior {
    let Some(attribute) = cache.resolve(WellKnownType::ConventionNameMatchAttribute) else {
        return NameMatchBehavior::Exact;
    };
    let compilation = cache.compilation();
    compilation
        .method_attributes(convention_method, attribute, false)
        .first()
        .and_then(|hit| hit.data.args.first())
        .and_then(|arg| constant_int(compilation, arg))
        .and_then(NameMatchBehavior::from_value)
        .unwrap_or(NameMatchBehavior::Exact)
}

/// Convention types that apply to an action, in priority order: those named
/// by convention-type attributes on the controller (base types included),
/// then `defaults`.
pub fn convention_types(cache: &SymbolCache<'_>, method: MethodId, defaults: &[TypeId]) -> Vec<TypeId> {
    let compilation = cache.compilation();
    let mut types = Vec::new();
    if let Some(attribute) = cache.resolve(WellKnownType::ConventionTypeAttribute) {
        let owner = compilation.method(method).containing_type;
        for hit in compilation.attributes_of(owner, attribute, true) {
            if let Some(AttributeArg::TypeOf(ty)) = hit.data.args.first() {
                if !types.contains(ty) {
                    types.push(*ty);
                }
            }
        }
    }
    for ty in defaults {
        if !types.contains(ty) {
            types.push(*ty);
        }
    }
    types
}

/// The first convention method whose name matches the action.
pub fn find_convention_method(cache: &SymbolCache<'_>, method: MethodId, defaults: &[TypeId]) -> Option<MethodId> {
    let compilation = cache.compilation();
    let name = &compilation.method(method).name;
    convention_types(cache, method, defaults)
        .into_iter()
        .flat_map(|ty| compilation.methods_of(ty).iter().copied())
        .find(|candidate| {
            let behavior = name_match_behavior(cache, *candidate);
            is_name_match(name, &compilation.method(*candidate).name, behavior)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::fixtures;

    #[test]
    fn test_exact_and_any() {
        assert!(is_name_match("Get", "Get", NameMatchBehavior::Exact));
        assert!(!is_name_match("GetPet", "Get", NameMatchBehavior::Exact));
        assert!(is_name_match("Whatever", "Get", NameMatchBehavior::Any));
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        assert!(is_name_match("Get", "Get", NameMatchBehavior::Prefix));
        assert!(is_name_match("GetPet", "Get", NameMatchBehavior::Prefix));
        assert!(!is_name_match("Getaway", "Get", NameMatchBehavior::Prefix));
        assert!(!is_name_match("PetGet", "Get", NameMatchBehavior::Prefix));
    }

    #[test]
    fn test_suffix_requires_word_boundary() {
        assert!(is_name_match("Pet", "Pet", NameMatchBehavior::Suffix));
        assert!(is_name_match("GetPet", "Pet", NameMatchBehavior::Suffix));
        assert!(!is_name_match("GetPETPet", "Pet", NameMatchBehavior::Suffix));
        assert!(!is_name_match("PetGet", "Pet", NameMatchBehavior::Suffix));
    }

    #[test]
    fn test_behavior_values() {
        assert_eq!(NameMatchBehavior::from_value(2), Some(NameMatchBehavior::Prefix));
        assert_eq!(NameMatchBehavior::from_value(7), None);
    }

    #[test]
    fn test_find_convention_method_from_controller_attribute() {
        let c = fixtures::compilation();
        let cache = SymbolCache::new(&c);
        let action = fixtures::method(&c, "PetsController", "GetPetByName");
        let convention = find_convention_method(&cache, action, &[]).unwrap();
        assert_eq!(c.method_display_name(convention), "DefaultApiConventions.Get");
        assert_eq!(name_match_behavior(&cache, convention), NameMatchBehavior::Prefix);
    }

    #[test]
    fn test_no_convention_without_sources() {
        let c = fixtures::compilation();
        let cache = SymbolCache::new(&c);
        let action = fixtures::method(&c, "PlainController", "GetThing");
        assert_eq!(find_convention_method(&cache, action, &[]), None);

        let defaults = vec![c.type_by_name("DefaultApiConventions").unwrap()];
        let convention = find_convention_method(&cache, action, &defaults).unwrap();
        assert_eq!(c.method(convention).name, "Get");
    }
}
