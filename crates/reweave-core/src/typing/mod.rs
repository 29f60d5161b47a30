// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declared-type model.
//!
//! Parsers attribute nodes with [`Type`]s; recipes compare those against
//! matcher types built with the builders in [`builder`].
//!
//! ## Equality
//!
//! A [`ClassType`] is identified by its fully-qualified name. Two class types
//! compare structurally only when both are [`MatchMode::Strict`]; if either
//! side is [`MatchMode::Relaxed`], only the names are compared. Hashing uses
//! the name alone so it agrees with both modes.
//!
//! The type graph is acyclic: methods name their declaring type by
//! fully-qualified name, field and return types are shallow relaxed class
//! types, and a super type is either shared with its own declaration or
//! shallow when it was not declared in the parsed sources.

pub mod builder;
pub mod matching;

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::tree::Unchanged;

pub use builder::{ClassTypeBuilder, MethodTypeBuilder, VariableTypeBuilder};
pub use matching::{is_assignable_to, is_of_class_type, matches, matches_attributed};

// ============================================================================
// Type
// ============================================================================

/// A declared type.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum Type {
    Primitive(Primitive),
    Class(Arc<ClassType>),
    Array(Arc<ArrayType>),
    Method(Arc<MethodType>),
    Var(Arc<VarType>),
}

impl Type {
    /// Build a type from a source-level name.
    ///
    /// Primitive keywords (and `String`) map to [`Primitive`], a trailing
    /// `[]` to an array of the element, anything else to a shallow relaxed
    /// class type.
    pub fn build(name: &str) -> Type {
        let name = name.trim();
        if let Some(element) = name.strip_suffix("[]") {
            return Type::Array(Arc::new(ArrayType {
                element: Type::build(element),
            }));
        }
        match Primitive::from_keyword(name) {
            Some(primitive) => Type::Primitive(primitive),
            None => Type::class(name),
        }
    }

    /// Shallow relaxed class type.
    pub fn class(fully_qualified_name: &str) -> Type {
        Type::Class(Arc::new(ClassType::shallow(fully_qualified_name)))
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodType> {
        match self {
            Type::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    /// Fully-qualified name of a class type (or of `java.lang.String` for the
    /// `String` primitive).
    pub fn fully_qualified_name(&self) -> Option<&str> {
        match self {
            Type::Class(class) => Some(&class.fully_qualified_name),
            Type::Primitive(Primitive::String) => Some("java.lang.String"),
            _ => None,
        }
    }
}

impl Unchanged for Type {
    fn unchanged(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => Arc::ptr_eq(a, b),
            (Type::Array(a), Type::Array(b)) => Arc::ptr_eq(a, b),
            (Type::Method(a), Type::Method(b)) => Arc::ptr_eq(a, b),
            (Type::Var(a), Type::Var(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p.keyword()),
            Type::Class(class) => write!(f, "{}", class.fully_qualified_name),
            Type::Array(array) => write!(f, "{}[]", array.element),
            Type::Method(method) => write!(f, "{}", method),
            Type::Var(var) => write!(f, "{} {}", var.ty, var.name),
        }
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Built-in value types, plus the `String`, `null` and wildcard pseudo-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
    String,
    Null,
    Wildcard,
}

impl Primitive {
    pub fn keyword(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Void => "void",
            Primitive::String => "String",
            Primitive::Null => "null",
            Primitive::Wildcard => "?",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Primitive> {
        let primitive = match keyword {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "double" => Primitive::Double,
            "float" => Primitive::Float,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "short" => Primitive::Short,
            "void" => Primitive::Void,
            "String" | "java.lang.String" => Primitive::String,
            "null" => Primitive::Null,
            "?" => Primitive::Wildcard,
            _ => return None,
        };
        Some(primitive)
    }
}

// ============================================================================
// Flags
// ============================================================================

/// Declaration modifiers recorded on types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Default,
}

impl Flag {
    pub fn keyword(&self) -> &'static str {
        match self {
            Flag::Public => "public",
            Flag::Private => "private",
            Flag::Protected => "protected",
            Flag::Static => "static",
            Flag::Final => "final",
            Flag::Abstract => "abstract",
            Flag::Synchronized => "synchronized",
            Flag::Native => "native",
            Flag::Transient => "transient",
            Flag::Volatile => "volatile",
            Flag::Default => "default",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Flag> {
        let flag = match keyword {
            "public" => Flag::Public,
            "private" => Flag::Private,
            "protected" => Flag::Protected,
            "static" => Flag::Static,
            "final" => Flag::Final,
            "abstract" => Flag::Abstract,
            "synchronized" => Flag::Synchronized,
            "native" => Flag::Native,
            "transient" => Flag::Transient,
            "volatile" => Flag::Volatile,
            "default" => Flag::Default,
            _ => return None,
        };
        Some(flag)
    }
}

// ============================================================================
// Class, array, method and variable types
// ============================================================================

/// How a class type compares against others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// Names and declared structure must agree.
    Strict,
    /// Only fully-qualified names must agree.
    #[default]
    Relaxed,
}

/// A declared class, interface or enum type.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub fully_qualified_name: String,
    pub members: Vec<VarType>,
    pub type_parameters: Vec<Type>,
    pub interfaces: Vec<Type>,
    pub constructors: Vec<MethodType>,
    pub super_type: Option<Arc<ClassType>>,
    pub match_mode: MatchMode,
}

impl ClassType {
    /// Class type known only by name.
    pub fn shallow(fully_qualified_name: &str) -> ClassType {
        ClassType {
            fully_qualified_name: fully_qualified_name.to_string(),
            members: Vec::new(),
            type_parameters: Vec::new(),
            interfaces: Vec::new(),
            constructors: Vec::new(),
            super_type: None,
            match_mode: MatchMode::Relaxed,
        }
    }

    /// Simple name: the part after the last `.`.
    pub fn class_name(&self) -> &str {
        match self.fully_qualified_name.rfind('.') {
            Some(pos) => &self.fully_qualified_name[pos + 1..],
            None => &self.fully_qualified_name,
        }
    }

    /// Package part of the name, empty for the default package.
    pub fn package_name(&self) -> &str {
        match self.fully_qualified_name.rfind('.') {
            Some(pos) => &self.fully_qualified_name[..pos],
            None => "",
        }
    }

    pub fn is_relaxed(&self) -> bool {
        self.match_mode == MatchMode::Relaxed
    }

    pub fn member(&self, name: &str) -> Option<&VarType> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Copy of this type compared under `match_mode`.
    pub fn with_match_mode(&self, match_mode: MatchMode) -> ClassType {
        ClassType {
            match_mode,
            ..self.clone()
        }
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &Self) -> bool {
        if self.is_relaxed() || other.is_relaxed() {
            return self.fully_qualified_name == other.fully_qualified_name;
        }
        matching::structurally_equal(self, other)
    }
}

impl Hash for ClassType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fully_qualified_name.hash(state);
    }
}

/// An array of some element type.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct ArrayType {
    pub element: Type,
}

/// A method or constructor signature.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct MethodType {
    /// Fully-qualified name of the declaring class.
    pub declaring_type: String,
    pub name: String,
    pub return_type: Type,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<Type>,
    pub flags: BTreeSet<Flag>,
}

impl MethodType {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<constructor>"
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameter_types.iter().map(|t| t.to_string()).collect();
        write!(
            f,
            "{}{{name={},return={},parameters=[{}]}}",
            self.declaring_type,
            self.name,
            self.return_type,
            params.join(",")
        )
    }
}

/// A field, parameter or local variable.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct VarType {
    pub name: String,
    pub ty: Type,
    pub flags: BTreeSet<Flag>,
}

impl VarType {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_primitives_arrays_and_classes() {
        assert_eq!(Type::build("int"), Type::Primitive(Primitive::Int));
        assert_eq!(Type::build("String"), Type::Primitive(Primitive::String));
        assert_eq!(
            Type::build("int[]"),
            Type::Array(Arc::new(ArrayType {
                element: Type::Primitive(Primitive::Int)
            }))
        );
        let class = Type::build("org.A");
        assert_eq!(class.fully_qualified_name(), Some("org.A"));
        assert_eq!(class.as_class().map(|c| c.class_name()), Some("A"));
        assert_eq!(class.as_class().map(|c| c.package_name()), Some("org"));
    }

    #[test]
    fn relaxed_on_either_side_compares_names_only() {
        let mut strict = ClassType::shallow("org.A");
        strict.match_mode = MatchMode::Strict;
        strict.members.push(VarType {
            name: "foo".to_string(),
            ty: Type::Primitive(Primitive::String),
            flags: BTreeSet::new(),
        });

        let relaxed = ClassType::shallow("org.A");
        assert_eq!(strict, relaxed);
        assert_eq!(relaxed, strict);

        let bare_strict = relaxed.with_match_mode(MatchMode::Strict);
        assert_ne!(strict, bare_strict);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Type::build("String[]").to_string(), "String[]");
        assert_eq!(Type::build("org.A").to_string(), "org.A");
    }

    #[test]
    fn unchanged_is_identity_for_class_types() {
        let a = Type::class("org.A");
        let b = Type::class("org.A");
        assert_eq!(a, b);
        assert!(!a.unchanged(&b));
        assert!(a.unchanged(&a.clone()));
    }
}
