// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Matching attributed types against matcher types.
//!
//! [`matches`] decides by the matcher's mode: a relaxed class matcher accepts
//! any candidate with the same fully-qualified name, a strict one also
//! requires the declared structure to agree. Members, interfaces and
//! constructors compare as multisets; type parameters compare in order.

use super::{ClassType, MatchMode, MethodType, Primitive, Type, VarType};

/// True if `candidate` satisfies `matcher`.
pub fn matches(candidate: &Type, matcher: &Type) -> bool {
    match (candidate, matcher) {
        (Type::Primitive(a), Type::Primitive(b)) => a == b,
        (Type::Class(c), Type::Class(m)) => class_matches(c, m),
        (Type::Primitive(Primitive::String), Type::Class(m)) => {
            m.fully_qualified_name == "java.lang.String"
        }
        (Type::Class(c), Type::Primitive(Primitive::String)) => {
            c.fully_qualified_name == "java.lang.String"
        }
        (Type::Array(c), Type::Array(m)) => matches(&c.element, &m.element),
        (Type::Method(c), Type::Method(m)) => method_matches(c, m),
        (Type::Var(c), Type::Var(m)) => var_matches(c, m),
        _ => false,
    }
}

/// Like [`matches`], for a candidate the parser may have failed to attribute.
///
/// A missing attribution never matches.
pub fn matches_attributed(candidate: Option<&Type>, matcher: &Type) -> bool {
    candidate.is_some_and(|c| matches(c, matcher))
}

/// True if `ty` is a class type (or the `String` primitive) named `fully_qualified_name`.
pub fn is_of_class_type(ty: Option<&Type>, fully_qualified_name: &str) -> bool {
    ty.and_then(Type::fully_qualified_name) == Some(fully_qualified_name)
}

/// True if `ty` is the named class or declares it as a super type or interface.
pub fn is_assignable_to(fully_qualified_name: &str, ty: Option<&Type>) -> bool {
    let Some(class) = ty.and_then(Type::as_class) else {
        return is_of_class_type(ty, fully_qualified_name);
    };
    let mut current = Some(class);
    while let Some(c) = current {
        if c.fully_qualified_name == fully_qualified_name
            || c
                .interfaces
                .iter()
                .any(|i| i.fully_qualified_name() == Some(fully_qualified_name))
        {
            return true;
        }
        current = c.super_type.as_deref();
    }
    false
}

/// Class matching under the matcher's mode.
pub fn class_matches(candidate: &ClassType, matcher: &ClassType) -> bool {
    if candidate.fully_qualified_name != matcher.fully_qualified_name {
        return false;
    }
    match matcher.match_mode {
        MatchMode::Relaxed => true,
        MatchMode::Strict => structure_matches(candidate, matcher),
    }
}

/// Strict structural equality of two class types.
pub(crate) fn structurally_equal(a: &ClassType, b: &ClassType) -> bool {
    a.fully_qualified_name == b.fully_qualified_name && structure_matches(a, b)
}

fn structure_matches(candidate: &ClassType, matcher: &ClassType) -> bool {
    same_multiset(&candidate.members, &matcher.members, var_matches)
        && candidate.type_parameters.len() == matcher.type_parameters.len()
        && candidate
            .type_parameters
            .iter()
            .zip(&matcher.type_parameters)
            .all(|(c, m)| matches(c, m))
        && same_multiset(&candidate.interfaces, &matcher.interfaces, matches)
        && same_multiset(&candidate.constructors, &matcher.constructors, method_matches)
        && match (&candidate.super_type, &matcher.super_type) {
            (Some(c), Some(m)) => class_matches(c, m),
            (None, None) => true,
            _ => false,
        }
}

fn method_matches(candidate: &MethodType, matcher: &MethodType) -> bool {
    candidate.declaring_type == matcher.declaring_type
        && candidate.name == matcher.name
        && matches(&candidate.return_type, &matcher.return_type)
        && candidate.parameter_types.len() == matcher.parameter_types.len()
        && candidate
            .parameter_types
            .iter()
            .zip(&matcher.parameter_types)
            .all(|(c, m)| matches(c, m))
}

fn var_matches(candidate: &VarType, matcher: &VarType) -> bool {
    candidate.name == matcher.name
        && candidate.flags == matcher.flags
        && matches(&candidate.ty, &matcher.ty)
}

/// Order-insensitive comparison: every element pairs with a distinct match.
fn same_multiset<T>(candidates: &[T], matchers: &[T], eq: fn(&T, &T) -> bool) -> bool {
    if candidates.len() != matchers.len() {
        return false;
    }
    let mut used = vec![false; candidates.len()];
    matchers.iter().all(|m| {
        let found = candidates
            .iter()
            .enumerate()
            .find(|(i, c)| !used[*i] && eq(c, m))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typing::builder::{string_primitive, ClassTypeBuilder, VariableTypeBuilder};
    use crate::typing::Flag;
    use std::sync::Arc;

    fn field(name: &str) -> VarType {
        VariableTypeBuilder::new()
            .name(name)
            .ty(string_primitive())
            .flag(Flag::Private)
            .build()
            .unwrap()
    }

    fn declared_a(members: &[&str]) -> Type {
        let mut builder = ClassTypeBuilder::new()
            .fully_qualified_name("org.A")
            .relaxed_type_match(false);
        for m in members {
            builder = builder.member(field(m));
        }
        Type::Class(Arc::new(builder.resolve().unwrap()))
    }

    #[test]
    fn relaxed_matcher_compares_names_only() {
        let matcher = Type::Class(Arc::new(
            ClassTypeBuilder::new()
                .fully_qualified_name("org.A")
                .resolve()
                .unwrap(),
        ));
        assert!(matches(&declared_a(&["foo", "bar"]), &matcher));
        assert!(!matches(&Type::class("org.B"), &matcher));
    }

    #[test]
    fn strict_matcher_compares_members_as_a_set() {
        let matcher = declared_a(&["bar", "foo"]);
        assert!(matches(&declared_a(&["foo", "bar"]), &matcher));
        assert!(!matches(&declared_a(&["foo"]), &matcher));
        assert!(!matches(&declared_a(&["foo", "baz"]), &matcher));
    }

    #[test]
    fn strict_matcher_checks_super_type() {
        let with_super = |sup: &str| {
            Type::Class(Arc::new(
                ClassTypeBuilder::new()
                    .fully_qualified_name("org.A")
                    .relaxed_type_match(false)
                    .super_type(ClassType::shallow(sup))
                    .resolve()
                    .unwrap(),
            ))
        };
        assert!(matches(&with_super("org.Base"), &with_super("org.Base")));
        assert!(!matches(&with_super("org.Other"), &with_super("org.Base")));
        assert!(!matches(&declared_a(&[]), &with_super("org.Base")));
    }

    #[test]
    fn arrays_match_by_element() {
        assert!(matches(&Type::build("org.A[]"), &Type::build("org.A[]")));
        assert!(!matches(&Type::build("org.A[]"), &Type::build("org.B[]")));
        assert!(!matches(&Type::build("org.A[]"), &Type::build("org.A")));
    }

    #[test]
    fn missing_attribution_never_matches() {
        assert!(!matches_attributed(None, &Type::class("org.A")));
        assert!(matches_attributed(Some(&Type::class("org.A")), &Type::class("org.A")));
    }

    #[test]
    fn class_type_helpers() {
        assert!(is_of_class_type(Some(&Type::class("org.A")), "org.A"));
        assert!(is_of_class_type(Some(&Type::build("String")), "java.lang.String"));
        assert!(!is_of_class_type(None, "org.A"));

        let sub = Type::Class(Arc::new(
            ClassTypeBuilder::new()
                .fully_qualified_name("org.Sub")
                .super_type(ClassType::shallow("org.Base"))
                .interface_name("java.io.Serializable")
                .resolve()
                .unwrap(),
        ));
        assert!(is_assignable_to("org.Base", Some(&sub)));
        assert!(is_assignable_to("java.io.Serializable", Some(&sub)));
        assert!(!is_assignable_to("org.Other", Some(&sub)));
    }
}
