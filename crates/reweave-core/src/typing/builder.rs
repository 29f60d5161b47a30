// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Builders for matcher types, plus factory functions for common types.
//!
//! Builders accumulate fields and validate once, in `resolve()`/`build()`,
//! failing with [`ConstructionError::MissingField`] when a required field was
//! never set.
//!
//! ```
//! use reweave_core::typing::builder::{string_primitive, ClassTypeBuilder, VariableTypeBuilder};
//! use reweave_core::typing::Flag;
//!
//! let foo = VariableTypeBuilder::new()
//!     .name("foo")
//!     .ty(string_primitive())
//!     .flag(Flag::Private)
//!     .build()
//!     .unwrap();
//! let class = ClassTypeBuilder::new()
//!     .fully_qualified_name("org.A")
//!     .member(foo)
//!     .resolve()
//!     .unwrap();
//! assert_eq!(class.class_name(), "A");
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{ArrayType, ClassType, Flag, MatchMode, MethodType, Primitive, Type, VarType};
use crate::error::ConstructionError;

// ============================================================================
// ClassTypeBuilder
// ============================================================================

/// Builds a [`ClassType`]. Relaxed matching is the default.
#[derive(Debug, Clone)]
pub struct ClassTypeBuilder {
    fully_qualified_name: Option<String>,
    members: Vec<VarType>,
    type_parameters: Vec<Type>,
    interfaces: Vec<Type>,
    constructors: Vec<MethodType>,
    super_type: Option<ClassType>,
    relaxed_type_match: bool,
}

impl Default for ClassTypeBuilder {
    fn default() -> Self {
        ClassTypeBuilder {
            fully_qualified_name: None,
            members: Vec::new(),
            type_parameters: Vec::new(),
            interfaces: Vec::new(),
            constructors: Vec::new(),
            super_type: None,
            relaxed_type_match: true,
        }
    }
}

impl ClassTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fully_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.fully_qualified_name = Some(name.into());
        self
    }

    pub fn member(mut self, member: VarType) -> Self {
        self.members.push(member);
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = VarType>) -> Self {
        self.members.extend(members);
        self
    }

    pub fn type_parameter(mut self, ty: Type) -> Self {
        self.type_parameters.push(ty);
        self
    }

    /// Add a type parameter by source-level name, see [`Type::build`].
    pub fn type_parameter_name(self, name: &str) -> Self {
        self.type_parameter(Type::build(name))
    }

    pub fn interface(mut self, ty: Type) -> Self {
        self.interfaces.push(ty);
        self
    }

    pub fn interface_name(self, name: &str) -> Self {
        self.interface(Type::build(name))
    }

    pub fn constructor(mut self, constructor: MethodType) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn super_type(mut self, super_type: ClassType) -> Self {
        self.super_type = Some(super_type);
        self
    }

    pub fn super_type_name(self, name: &str) -> Self {
        self.super_type(ClassType::shallow(name))
    }

    pub fn relaxed_type_match(mut self, relaxed: bool) -> Self {
        self.relaxed_type_match = relaxed;
        self
    }

    pub fn resolve(self) -> Result<ClassType, ConstructionError> {
        let fully_qualified_name = self
            .fully_qualified_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConstructionError::MissingField {
                builder: "ClassTypeBuilder",
                field: "fully-qualified class name",
            })?;
        Ok(ClassType {
            fully_qualified_name,
            members: self.members,
            type_parameters: self.type_parameters,
            interfaces: self.interfaces,
            constructors: self.constructors,
            super_type: self.super_type.map(Arc::new),
            match_mode: if self.relaxed_type_match {
                MatchMode::Relaxed
            } else {
                MatchMode::Strict
            },
        })
    }
}

// ============================================================================
// VariableTypeBuilder
// ============================================================================

/// Builds a [`VarType`]. Name and type are required.
#[derive(Debug, Clone, Default)]
pub struct VariableTypeBuilder {
    name: Option<String>,
    ty: Option<Type>,
    flags: BTreeSet<Flag>,
}

impl VariableTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn ty(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Set the type from a fully-qualified class name.
    pub fn type_name(self, name: &str) -> Self {
        self.ty(Type::class(name))
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn build(self) -> Result<VarType, ConstructionError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConstructionError::MissingField {
                builder: "VariableTypeBuilder",
                field: "variable name",
            })?;
        let ty = self.ty.ok_or(ConstructionError::MissingField {
            builder: "VariableTypeBuilder",
            field: "variable type",
        })?;
        Ok(VarType {
            name,
            ty,
            flags: self.flags,
        })
    }
}

// ============================================================================
// MethodTypeBuilder
// ============================================================================

/// Builds a [`MethodType`]. Declaring type and name are required; the
/// return type defaults to `void`.
#[derive(Debug, Clone, Default)]
pub struct MethodTypeBuilder {
    declaring_type: Option<String>,
    name: Option<String>,
    return_type: Option<Type>,
    parameters: Vec<(String, Type)>,
    flags: BTreeSet<Flag>,
}

impl MethodTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declaring_type(mut self, fully_qualified_name: impl Into<String>) -> Self {
        self.declaring_type = Some(fully_qualified_name.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn return_type(mut self, ty: Type) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.parameters.push((name.into(), ty));
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn build(self) -> Result<MethodType, ConstructionError> {
        let declaring_type = self
            .declaring_type
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConstructionError::MissingField {
                builder: "MethodTypeBuilder",
                field: "declaring type",
            })?;
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConstructionError::MissingField {
                builder: "MethodTypeBuilder",
                field: "method name",
            })?;
        let (parameter_names, parameter_types) = self.parameters.into_iter().unzip();
        Ok(MethodType {
            declaring_type,
            name,
            return_type: self.return_type.unwrap_or(Type::Primitive(Primitive::Void)),
            parameter_names,
            parameter_types,
            flags: self.flags,
        })
    }
}

// ============================================================================
// Factory functions
// ============================================================================

pub fn array_type(element: Type) -> Type {
    Type::Array(Arc::new(ArrayType { element }))
}

pub fn array_type_named(element: &str) -> Type {
    array_type(Type::build(element))
}

pub fn boolean_primitive() -> Type {
    Type::Primitive(Primitive::Boolean)
}

pub fn boolean_class() -> Type {
    Type::class("java.lang.Boolean")
}

pub fn byte_primitive() -> Type {
    Type::Primitive(Primitive::Byte)
}

pub fn byte_class() -> Type {
    Type::class("java.lang.Byte")
}

pub fn char_primitive() -> Type {
    Type::Primitive(Primitive::Char)
}

pub fn char_class() -> Type {
    Type::class("java.lang.Character")
}

pub fn double_primitive() -> Type {
    Type::Primitive(Primitive::Double)
}

pub fn double_class() -> Type {
    Type::class("java.lang.Double")
}

pub fn float_primitive() -> Type {
    Type::Primitive(Primitive::Float)
}

pub fn float_class() -> Type {
    Type::class("java.lang.Float")
}

pub fn integer_primitive() -> Type {
    Type::Primitive(Primitive::Int)
}

pub fn integer_class() -> Type {
    Type::class("java.lang.Integer")
}

pub fn long_primitive() -> Type {
    Type::Primitive(Primitive::Long)
}

pub fn long_class() -> Type {
    Type::class("java.lang.Long")
}

pub fn short_primitive() -> Type {
    Type::Primitive(Primitive::Short)
}

pub fn short_class() -> Type {
    Type::class("java.lang.Short")
}

pub fn void_primitive() -> Type {
    Type::Primitive(Primitive::Void)
}

pub fn string_primitive() -> Type {
    Type::Primitive(Primitive::String)
}

pub fn string_class() -> Type {
    Type::class("java.lang.String")
}

pub fn wildcard_primitive() -> Type {
    Type::Primitive(Primitive::Wildcard)
}

pub fn null_primitive() -> Type {
    Type::Primitive(Primitive::Null)
}

pub fn date_class() -> Type {
    Type::class("java.util.Date")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_builder_requires_name() {
        let err = ClassTypeBuilder::new().resolve().unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MissingField {
                builder: "ClassTypeBuilder",
                field: "fully-qualified class name",
            }
        );
        assert!(ClassTypeBuilder::new()
            .fully_qualified_name("  ")
            .resolve()
            .is_err());
    }

    #[test]
    fn class_builder_defaults_to_relaxed() {
        let class = ClassTypeBuilder::new()
            .fully_qualified_name("org.A")
            .type_parameter_name("String")
            .interface_name("java.io.Serializable")
            .super_type_name("org.Base")
            .resolve()
            .unwrap();
        assert!(class.is_relaxed());
        assert_eq!(class.type_parameters, vec![string_primitive()]);
        assert_eq!(class.interfaces.len(), 1);
        assert_eq!(
            class.super_type.as_ref().map(|s| s.fully_qualified_name.as_str()),
            Some("org.Base")
        );

        let strict = ClassTypeBuilder::new()
            .fully_qualified_name("org.A")
            .relaxed_type_match(false)
            .resolve()
            .unwrap();
        assert_eq!(strict.match_mode, MatchMode::Strict);
    }

    #[test]
    fn variable_builder_requires_name_then_type() {
        let no_name = VariableTypeBuilder::new().ty(string_primitive()).build();
        assert_eq!(
            no_name.unwrap_err().to_string(),
            "VariableTypeBuilder: the variable name is required"
        );

        let no_type = VariableTypeBuilder::new().name("foo").build();
        assert_eq!(
            no_type.unwrap_err().to_string(),
            "VariableTypeBuilder: the variable type is required"
        );

        let var = VariableTypeBuilder::new()
            .name("created")
            .ty(date_class())
            .flags([Flag::Private, Flag::Final])
            .build()
            .unwrap();
        assert!(var.has_flag(Flag::Final));
        assert_eq!(var.ty.fully_qualified_name(), Some("java.util.Date"));
    }

    #[test]
    fn method_builder_defaults_return_to_void() {
        let method = MethodTypeBuilder::new()
            .declaring_type("org.A")
            .name("setFoo")
            .parameter("value", string_primitive())
            .flag(Flag::Public)
            .build()
            .unwrap();
        assert!(method.return_type.is_void());
        assert_eq!(method.parameter_names, vec!["value".to_string()]);
        assert!(method.has_flag(Flag::Public));

        assert!(MethodTypeBuilder::new().name("setFoo").build().is_err());
        assert!(MethodTypeBuilder::new().declaring_type("org.A").build().is_err());
    }

    #[test]
    fn factories() {
        assert_eq!(array_type_named("int"), array_type(integer_primitive()));
        assert_eq!(boolean_class().fully_qualified_name(), Some("java.lang.Boolean"));
        assert_eq!(null_primitive().to_string(), "null");
        assert_eq!(wildcard_primitive().to_string(), "?");
    }
}
