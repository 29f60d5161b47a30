// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Type attribution.
//!
//! [`TypeTable::build`] declares every class of a batch of compilation
//! units. [`attribute`] then fills in `ty`, `method_type` and
//! `variable_type` on one unit's nodes, resolving names against the unit's
//! package and imports and against the table. Names that do not resolve
//! stay unattributed.
//!
//! Name resolution, in order: type parameters, primitives (and `String`),
//! qualified names, classes nested in the enclosing classes, single-type
//! imports, the unit's own package, the common `java.lang` types, and
//! wildcard imports. With exactly one wildcard import an unknown
//! capitalized name is assumed to come from it.
//!
//! Attributed units carry a [`JavaSourceSet`] marker pointing at the table,
//! so snippets parsed later can be attributed against the same classes.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::marker::Marker;
use reweave_core::tree::{Container, LeftPadded, Padded};
use reweave_core::typing::{ArrayType, ClassType, Flag, MatchMode, MethodType, Primitive, Type, VarType};

use crate::tree::{
    flags as declared_flags, Annotation, Assignment, Binary, BinaryOperator, Block, ClassDeclaration, ClassKind,
    CompilationUnit, Expression, FieldAccess, Import, MethodDeclaration, MethodInvocation, NewClass, Package,
    Statement, TypeName, TypeParameter, Unary, UnaryOperator, VariableDeclarations, J,
};
use crate::visitor::{
    enclosing_class, walk_assignment, walk_binary, walk_block, walk_class_declaration, walk_expression,
    walk_field_access, walk_method_declaration, walk_method_invocation, walk_new_class, walk_unary,
    walk_variable_declarations, JavaVisitor,
};

/// Name of a constructor in its [`MethodType`].
pub const CONSTRUCTOR: &str = "<constructor>";

/// `java.lang` types resolved without an import.
const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "Integer",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Runnable",
    "RuntimeException",
    "Short",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

// ============================================================================
// Type table
// ============================================================================

/// Declared classes of a batch of compilation units, by fully-qualified
/// name. Nested classes are named `pkg.Outer.Inner`.
#[derive(Debug, Default)]
pub struct TypeTable {
    classes: HashMap<String, Arc<ClassType>>,
    /// Methods other than constructors, by declaring class.
    methods: HashMap<String, Vec<Arc<MethodType>>>,
    declared: HashSet<String>,
}

impl TypeTable {
    pub fn build<'u>(units: impl IntoIterator<Item = &'u Arc<CompilationUnit>>) -> TypeTable {
        let units: Vec<&CompilationUnit> = units.into_iter().map(Arc::as_ref).collect();
        let mut declarations = HashMap::new();
        for unit in &units {
            let package = unit.package_name();
            for class in &unit.classes {
                let fqn = match &package {
                    Some(package) => format!("{}.{}", package, class.name.name),
                    None => class.name.name.clone(),
                };
                collect_declarations(unit, class, fqn, Vec::new(), &mut declarations);
            }
        }
        let declared: HashSet<String> = declarations.keys().cloned().collect();

        let mut builder = TableBuilder {
            declarations: &declarations,
            declared: &declared,
            classes: HashMap::new(),
            methods: HashMap::new(),
            in_progress: HashSet::new(),
        };
        let mut names: Vec<&String> = declarations.keys().collect();
        names.sort();
        for fqn in names {
            builder.class(fqn);
        }
        let TableBuilder { classes, methods, .. } = builder;
        TypeTable {
            classes,
            methods,
            declared,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class(&self, fully_qualified_name: &str) -> Option<&Arc<ClassType>> {
        self.classes.get(fully_qualified_name)
    }

    /// Methods declared by the class itself, constructors excluded.
    pub fn methods(&self, fully_qualified_name: &str) -> &[Arc<MethodType>] {
        self.methods.get(fully_qualified_name).map_or(&[], Vec::as_slice)
    }

    /// Method named `name` taking `arity` arguments, declared by the class
    /// or inherited from its super types and interfaces.
    pub fn method(&self, fully_qualified_name: &str, name: &str, arity: usize) -> Option<&Arc<MethodType>> {
        self.hierarchy(fully_qualified_name).into_iter().find_map(|class| {
            self.methods(class)
                .iter()
                .find(|m| m.name == name && m.parameter_types.len() == arity)
        })
    }

    /// Field named `name`, declared or inherited.
    pub fn field(&self, fully_qualified_name: &str, name: &str) -> Option<&VarType> {
        self.hierarchy(fully_qualified_name)
            .into_iter()
            .find_map(|class| self.classes.get(class).and_then(|c| c.member(name)))
    }

    /// The class followed by its super types and interfaces, breadth first.
    fn hierarchy<'t>(&'t self, fully_qualified_name: &'t str) -> Vec<&'t str> {
        let mut order: Vec<&str> = Vec::new();
        let mut queue = VecDeque::from([fully_qualified_name]);
        while let Some(name) = queue.pop_front() {
            if order.contains(&name) {
                continue;
            }
            order.push(name);
            if let Some(class) = self.classes.get(name) {
                if let Some(super_type) = &class.super_type {
                    queue.push_back(&super_type.fully_qualified_name);
                }
                queue.extend(class.interfaces.iter().filter_map(Type::fully_qualified_name));
            }
        }
        order
    }
}

/// A class declaration and where it was found.
struct Declaration<'u> {
    unit: &'u CompilationUnit,
    class: &'u Arc<ClassDeclaration>,
    /// Fully-qualified names of the enclosing classes, outermost first,
    /// ending with this class.
    nesting: Vec<String>,
}

fn collect_declarations<'u>(
    unit: &'u CompilationUnit,
    class: &'u Arc<ClassDeclaration>,
    fqn: String,
    mut nesting: Vec<String>,
    out: &mut HashMap<String, Declaration<'u>>,
) {
    nesting.push(fqn.clone());
    for statement in &class.body.statements {
        if let Statement::ClassDeclaration(inner) = &statement.element {
            let inner_fqn = format!("{}.{}", fqn, inner.name.name);
            collect_declarations(unit, inner, inner_fqn, nesting.clone(), out);
        }
    }
    out.insert(fqn, Declaration { unit, class, nesting });
}

struct TableBuilder<'a, 'u> {
    declarations: &'a HashMap<String, Declaration<'u>>,
    declared: &'a HashSet<String>,
    classes: HashMap<String, Arc<ClassType>>,
    methods: HashMap<String, Vec<Arc<MethodType>>>,
    in_progress: HashSet<String>,
}

impl TableBuilder<'_, '_> {
    /// Build (once) the class type of a declared class. Super classes are
    /// built first and shared; an inheritance cycle leaves the super type
    /// shallow.
    fn class(&mut self, fqn: &str) -> Option<Arc<ClassType>> {
        if let Some(class) = self.classes.get(fqn) {
            return Some(Arc::clone(class));
        }
        let declarations = self.declarations;
        let declaration = declarations.get(fqn)?;
        if !self.in_progress.insert(fqn.to_string()) {
            return None;
        }
        let resolver = Resolver::for_unit(declaration.unit, self.declared);
        let class = declaration.class;
        let enclosing = &declaration.nesting;
        let type_parameters = type_parameter_names(&class.type_parameters);
        let resolve = |t: &Arc<TypeName>| resolver.type_of(t, enclosing, &type_parameters);

        let extends: Vec<Type> = class.extends.iter().flat_map(Container::iter).map(resolve).collect();
        let mut interfaces = Vec::new();
        let mut super_type = None;
        match class.kind {
            ClassKind::Class => {
                if let Some(name) = extends.first().and_then(Type::fully_qualified_name) {
                    let name = name.to_string();
                    super_type = Some(
                        self.class(&name)
                            .unwrap_or_else(|| Arc::new(ClassType::shallow(&name))),
                    );
                }
            }
            ClassKind::Interface | ClassKind::Annotation => interfaces.extend(extends),
        }
        interfaces.extend(class.implements.iter().flat_map(Container::iter).map(resolve));

        let mut members = Vec::new();
        for field in class.fields() {
            let ty = resolve(&field.type_expr);
            let flags = field_flags(class.kind, field);
            for variable in field.variables() {
                members.push(VarType {
                    name: variable.name.name.clone(),
                    ty: ty.clone(),
                    flags: flags.clone(),
                });
            }
        }

        let mut constructors = Vec::new();
        let mut methods = Vec::new();
        for method in class.methods() {
            let method_type = declared_method_type(&resolver, fqn, class.kind, method, enclosing, &type_parameters);
            if method.is_constructor() {
                constructors.push(method_type);
            } else {
                methods.push(Arc::new(method_type));
            }
        }

        let class_type = Arc::new(ClassType {
            fully_qualified_name: fqn.to_string(),
            members,
            type_parameters: type_parameters.iter().map(|name| Type::class(name)).collect(),
            interfaces,
            constructors,
            super_type,
            match_mode: MatchMode::Strict,
        });
        self.in_progress.remove(fqn);
        self.classes.insert(fqn.to_string(), Arc::clone(&class_type));
        self.methods.insert(fqn.to_string(), methods);
        Some(class_type)
    }
}

fn type_parameter_names(parameters: &Option<Container<Arc<TypeParameter>>>) -> Vec<String> {
    parameters
        .iter()
        .flat_map(Container::iter)
        .map(|p| p.name.name.clone())
        .collect()
}

/// Interface fields are implicitly `public static final`.
fn field_flags(kind: ClassKind, field: &VariableDeclarations) -> BTreeSet<Flag> {
    let mut flags: BTreeSet<Flag> = declared_flags(&field.decorations).collect();
    if kind != ClassKind::Class {
        flags.extend([Flag::Public, Flag::Static, Flag::Final]);
    }
    flags
}

fn array_of(element: Type, dimensions: usize) -> Type {
    (0..dimensions).fold(element, |element, _| Type::Array(Arc::new(ArrayType { element })))
}

fn declared_method_type(
    resolver: &Resolver<'_>,
    declaring_type: &str,
    kind: ClassKind,
    method: &MethodDeclaration,
    enclosing: &[String],
    class_type_parameters: &[String],
) -> MethodType {
    let mut type_parameters = class_type_parameters.to_vec();
    type_parameters.extend(type_parameter_names(&method.type_parameters));
    let (name, return_type) = match &method.return_type {
        Some(t) => (method.name.name.clone(), resolver.type_of(t, enclosing, &type_parameters)),
        None => (CONSTRUCTOR.to_string(), Type::class(declaring_type)),
    };
    let mut parameter_names = Vec::new();
    let mut parameter_types = Vec::new();
    for param in method.parameters() {
        let ty = resolver.type_of(&param.type_expr, enclosing, &type_parameters);
        let ty = if param.varargs.is_some() { array_of(ty, 1) } else { ty };
        for variable in param.variables() {
            parameter_names.push(variable.name.name.clone());
            parameter_types.push(ty.clone());
        }
    }
    let mut flags: BTreeSet<Flag> = declared_flags(&method.decorations).collect();
    if kind != ClassKind::Class && !flags.contains(&Flag::Private) {
        flags.insert(Flag::Public);
    }
    MethodType {
        declaring_type: declaring_type.to_string(),
        name,
        return_type,
        parameter_names,
        parameter_types,
        flags,
    }
}

fn default_constructor(declaring_type: &str) -> MethodType {
    MethodType {
        declaring_type: declaring_type.to_string(),
        name: CONSTRUCTOR.to_string(),
        return_type: Type::class(declaring_type),
        parameter_names: Vec::new(),
        parameter_types: Vec::new(),
        flags: BTreeSet::from([Flag::Public]),
    }
}

// ============================================================================
// Name resolution
// ============================================================================

/// Resolves type names as seen from one compilation unit.
struct Resolver<'a> {
    package: Option<String>,
    /// Simple name to fully-qualified name, for single-type imports.
    imports: HashMap<String, String>,
    /// Packages (or classes) imported with `.*`.
    wildcards: Vec<String>,
    declared: &'a HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(package: Option<String>, imports: impl IntoIterator<Item = String>, declared: &'a HashSet<String>) -> Self {
        let mut resolver = Resolver {
            package,
            imports: HashMap::new(),
            wildcards: Vec::new(),
            declared,
        };
        for import in imports {
            match import.strip_suffix(".*") {
                Some(wildcard) => resolver.wildcards.push(wildcard.to_string()),
                None => {
                    let simple = import.rsplit('.').next().unwrap_or(&import).to_string();
                    resolver.imports.insert(simple, import);
                }
            }
        }
        resolver
    }

    fn for_unit(unit: &CompilationUnit, declared: &'a HashSet<String>) -> Self {
        Resolver::new(unit.package_name(), type_imports(unit.imports()), declared)
    }

    fn qualify(&self, name: &str) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_string(),
        }
    }

    /// Fully-qualified name of the class `name` refers to from inside
    /// `enclosing` (outermost first).
    fn class_name(&self, name: &str, enclosing: &[String]) -> Option<String> {
        if let Some((first, rest)) = name.split_once('.') {
            if self.declared.contains(name) {
                return Some(name.to_string());
            }
            return self
                .class_name(first, enclosing)
                .map(|outer| format!("{}.{}", outer, rest));
        }
        for outer in enclosing.iter().rev() {
            let nested = format!("{}.{}", outer, name);
            if self.declared.contains(&nested) {
                return Some(nested);
            }
            if outer.rsplit('.').next() == Some(name) {
                return Some(outer.clone());
            }
        }
        if let Some(fqn) = self.imports.get(name) {
            return Some(fqn.clone());
        }
        let local = self.qualify(name);
        if self.declared.contains(&local) {
            return Some(local);
        }
        if JAVA_LANG.contains(&name) {
            return Some(format!("java.lang.{}", name));
        }
        for wildcard in &self.wildcards {
            let candidate = format!("{}.{}", wildcard, name);
            if self.declared.contains(&candidate) {
                return Some(candidate);
            }
        }
        match self.wildcards.as_slice() {
            [only] if name.starts_with(|c: char| c.is_uppercase()) => Some(format!("{}.{}", only, name)),
            _ => None,
        }
    }

    fn resolve(&self, name: &str, enclosing: &[String], type_parameters: &[String]) -> Option<Type> {
        if type_parameters.iter().any(|t| t == name) {
            return Some(Type::class(name));
        }
        if let Some(primitive) = Primitive::from_keyword(name) {
            return Some(Type::Primitive(primitive));
        }
        self.class_name(name, enclosing).map(|fqn| Type::class(&fqn))
    }

    /// Type of a written type name. Unresolved names are taken as written.
    fn type_of(&self, type_name: &TypeName, enclosing: &[String], type_parameters: &[String]) -> Type {
        let written = type_name.base_name();
        let base = self
            .resolve(&written, enclosing, type_parameters)
            .unwrap_or_else(|| Type::class(&written));
        array_of(base, type_name.dimensions.len())
    }
}

fn type_imports<'i>(imports: impl Iterator<Item = &'i Arc<Import>>) -> Vec<String> {
    imports.filter(|i| !i.is_static()).map(|i| i.type_name()).collect()
}

// ============================================================================
// Attribution
// ============================================================================

/// Attribute every node of `unit` against `table`.
pub fn attribute(unit: Arc<CompilationUnit>, table: &Arc<TypeTable>) -> Arc<CompilationUnit> {
    let resolver = Resolver::for_unit(&unit, &table.declared);
    let mut attributor = Attributor::new(table, resolver);
    let unit = attributor.visit_root(unit, &mut ());
    let markers = unit.markers.set(JavaSourceSet(Arc::clone(table)));
    unit.with_markers(markers)
}

/// What a detached snippet can see of the code around it.
#[derive(Debug, Clone, Default)]
pub struct SnippetScope {
    pub package: Option<String>,
    /// Imported type names as written, `a.b.*` included.
    pub imports: Vec<String>,
    /// Fully-qualified names of the enclosing classes, outermost first.
    pub classes: Vec<String>,
    pub type_parameters: Vec<String>,
    /// Variables visible at the insertion point.
    pub locals: Vec<Arc<VarType>>,
    pub table: Arc<TypeTable>,
}

impl SnippetScope {
    fn attributor(&self) -> Attributor<'_> {
        let resolver = Resolver::new(self.package.clone(), self.imports.iter().cloned(), &self.table.declared);
        let mut attributor = Attributor::new(&self.table, resolver);
        attributor.classes = self.classes.clone();
        attributor.type_parameters = self.type_parameters.clone();
        attributor.scopes = vec![self.locals.clone()];
        attributor
    }

    /// Attribute statements parsed from a snippet.
    pub fn attribute_statements(&self, statements: Vec<Padded<Statement>>) -> Vec<Padded<Statement>> {
        let mut attributor = self.attributor();
        statements
            .into_iter()
            .map(|statement| {
                let cursor = Cursor::root(J::from(statement.element.clone()));
                let element = attributor.visit_statement(statement.element, &cursor, &mut ());
                Padded::new(element, statement.after)
            })
            .collect()
    }

    /// Attribute an expression parsed from a snippet.
    pub fn attribute_expression(&self, expression: Expression) -> Expression {
        let mut attributor = self.attributor();
        let cursor = Cursor::root(J::from(expression.clone()));
        attributor.visit_expression(expression, &cursor, &mut ())
    }
}

/// Imported type names of a unit, as [`SnippetScope::imports`] wants them.
pub fn imported_type_names(unit: &CompilationUnit) -> Vec<String> {
    type_imports(unit.imports())
}

struct Attributor<'a> {
    table: &'a TypeTable,
    resolver: Resolver<'a>,
    /// Enclosing classes, outermost first.
    classes: Vec<String>,
    type_parameters: Vec<String>,
    /// Local variables and parameters, one frame per block or method.
    scopes: Vec<Vec<Arc<VarType>>>,
}

impl<'a> Attributor<'a> {
    fn new(table: &'a TypeTable, resolver: Resolver<'a>) -> Self {
        Attributor {
            table,
            resolver,
            classes: Vec::new(),
            type_parameters: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// The declared type when the table has it, otherwise a shallow one.
    fn class_type(&self, fqn: &str) -> Type {
        match self.table.class(fqn) {
            Some(class) => Type::Class(Arc::clone(class)),
            None => Type::class(fqn),
        }
    }

    fn type_of(&self, type_name: &TypeName) -> Type {
        let written = type_name.base_name();
        let base = match self.resolver.resolve(&written, &self.classes, &self.type_parameters) {
            Some(Type::Class(class)) if !self.type_parameters.contains(&written) => {
                self.class_type(&class.fully_qualified_name)
            }
            Some(ty) => ty,
            None => Type::class(&written),
        };
        array_of(base, type_name.dimensions.len())
    }

    fn identifier_type(&self, name: &str) -> Option<Type> {
        match name {
            "this" => return self.classes.last().map(|c| self.class_type(c)),
            "super" => {
                return self
                    .classes
                    .last()
                    .and_then(|c| self.table.class(c))
                    .and_then(|c| c.super_type.clone())
                    .map(Type::Class)
            }
            _ => {}
        }
        if let Some(var) = self.scopes.iter().rev().flat_map(|s| s.iter().rev()).find(|v| v.name == name) {
            return Some(var.ty.clone());
        }
        if let Some(field) = self.classes.iter().rev().find_map(|c| self.table.field(c, name)) {
            return Some(field.ty.clone());
        }
        self.resolver
            .class_name(name, &self.classes)
            .map(|fqn| self.class_type(&fqn))
    }

    fn field_access_type(&self, access: &FieldAccess) -> Option<Type> {
        let name = access.simple_name();
        if name == "class" {
            return Some(Type::class("java.lang.Class"));
        }
        let target = access.target.ty();
        if name == "length" && matches!(target, Some(Type::Array(_))) {
            return Some(Type::Primitive(Primitive::Int));
        }
        if let Some(fqn) = target.as_ref().and_then(Type::fully_qualified_name) {
            if let Some(field) = self.table.field(fqn, name) {
                return Some(field.ty.clone());
            }
            let nested = format!("{}.{}", fqn, name);
            return self.table.class(&nested).map(|_| self.class_type(&nested));
        }
        // A fully-qualified class name used as an expression.
        let qualified = format!("{}.{}", access.target.qualified_name()?, name);
        self.table
            .declared
            .contains(&qualified)
            .then(|| self.class_type(&qualified))
    }

    fn invoked_method(&self, call: &MethodInvocation) -> Option<Arc<MethodType>> {
        let name = &call.name.name;
        let arity = call.args.len();
        match call.select() {
            Some(select) => {
                let ty = select.ty();
                let fqn = ty.as_ref().and_then(Type::fully_qualified_name)?;
                self.table.method(fqn, name, arity).cloned()
            }
            None => self
                .classes
                .iter()
                .rev()
                .find_map(|c| self.table.method(c, name, arity))
                .cloned(),
        }
    }

    fn constructor(&self, new_class: &NewClass) -> Option<Arc<MethodType>> {
        let fqn = new_class.clazz.ty.as_ref().and_then(Type::fully_qualified_name)?;
        let class = self.table.class(fqn)?;
        let arity = new_class.args.len();
        match class.constructors.iter().find(|c| c.parameter_types.len() == arity) {
            Some(constructor) => Some(Arc::new(constructor.clone())),
            None if class.constructors.is_empty() && arity == 0 => Some(Arc::new(default_constructor(fqn))),
            None => None,
        }
    }

    fn type_arguments(
        &mut self,
        arguments: &Option<Container<Arc<TypeName>>>,
        cursor: &Cursor<'_, J>,
    ) -> Option<Container<Arc<TypeName>>> {
        let arguments = arguments.as_ref()?;
        let elements = arguments
            .elements
            .iter()
            .map(|argument| {
                let child = cursor.push(J::TypeName(Arc::clone(&argument.element)));
                let element = self.visit_type_name(Arc::clone(&argument.element), &child, &mut ());
                Padded::new(element, argument.after.clone())
            })
            .collect();
        Some(Container {
            before: arguments.before.clone(),
            elements,
            end: arguments.end.clone(),
        })
    }
}

fn is_field(cursor: &Cursor<'_, J>) -> bool {
    cursor
        .parent()
        .and_then(|block| block.parent())
        .is_some_and(|owner| matches!(owner.value(), J::ClassDeclaration(_)))
}

fn binary_type(operator: BinaryOperator, left: Option<Type>, right: Option<Type>) -> Option<Type> {
    if operator.is_comparison() {
        return Some(Type::Primitive(Primitive::Boolean));
    }
    let is_string = |ty: &Option<Type>| ty.as_ref().and_then(Type::fully_qualified_name) == Some("java.lang.String");
    if operator == BinaryOperator::Addition && (is_string(&left) || is_string(&right)) {
        return Some(Type::Primitive(Primitive::String));
    }
    let (left, right) = (left?, right?);
    match (left, right) {
        (Type::Primitive(a), Type::Primitive(b)) => widen(a, b).map(Type::Primitive),
        _ => None,
    }
}

/// Binary numeric promotion; `boolean` with `boolean` for `&`, `|`, `^`.
fn widen(a: Primitive, b: Primitive) -> Option<Primitive> {
    if a == Primitive::Boolean && b == Primitive::Boolean {
        return Some(Primitive::Boolean);
    }
    let rank = |p: Primitive| match p {
        Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int => Some(0),
        Primitive::Long => Some(1),
        Primitive::Float => Some(2),
        Primitive::Double => Some(3),
        _ => None,
    };
    let promoted = [Primitive::Int, Primitive::Long, Primitive::Float, Primitive::Double];
    Some(promoted[rank(a)?.max(rank(b)?)])
}

impl JavaVisitor<()> for Attributor<'_> {
    fn visit_package(&mut self, package: Arc<Package>, _: &Cursor<'_, J>, _: &mut ()) -> Arc<Package> {
        package
    }

    fn visit_import(&mut self, import: Arc<Import>, _: &Cursor<'_, J>, _: &mut ()) -> Arc<Import> {
        import
    }

    fn visit_annotation(&mut self, annotation: Arc<Annotation>, _: &Cursor<'_, J>, _: &mut ()) -> Arc<Annotation> {
        annotation
    }

    fn visit_class_declaration(
        &mut self,
        class: Arc<ClassDeclaration>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<ClassDeclaration> {
        let fqn = match self.classes.last() {
            Some(outer) => format!("{}.{}", outer, class.name.name),
            None => self.resolver.qualify(&class.name.name),
        };
        let outer_type_parameters = self.type_parameters.len();
        self.type_parameters.extend(type_parameter_names(&class.type_parameters));
        self.classes.push(fqn.clone());
        let class = walk_class_declaration(self, class, cursor, p);
        self.classes.pop();
        self.type_parameters.truncate(outer_type_parameters);

        let ty = self.class_type(&fqn);
        let name = Arc::clone(&class.name).with_ty(Some(ty.clone()));
        class.with_name(name).with_ty(Some(ty))
    }

    fn visit_method_declaration(
        &mut self,
        method: Arc<MethodDeclaration>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<MethodDeclaration> {
        let outer_type_parameters = self.type_parameters.len();
        self.type_parameters.extend(type_parameter_names(&method.type_parameters));
        self.scopes.push(Vec::new());
        let method = walk_method_declaration(self, method, cursor, p);
        self.scopes.pop();
        self.type_parameters.truncate(outer_type_parameters);

        let Some(declaring_type) = self.classes.last() else {
            return method;
        };
        let kind = enclosing_class(cursor).map_or(ClassKind::Class, |c| c.kind);
        let method_type = declared_method_type(
            &self.resolver,
            declaring_type,
            kind,
            &method,
            &self.classes,
            &self.type_parameters,
        );
        let method_type = self
            .table
            .methods(declaring_type)
            .iter()
            .find(|m| m.as_ref() == &method_type)
            .cloned()
            .unwrap_or_else(|| Arc::new(method_type));
        method.with_method_type(Some(method_type))
    }

    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Block> {
        self.scopes.push(Vec::new());
        let block = walk_block(self, block, cursor, p);
        self.scopes.pop();
        block
    }

    fn visit_variable_declarations(
        &mut self,
        declarations: Arc<VariableDeclarations>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<VariableDeclarations> {
        let declarations = walk_variable_declarations(self, declarations, cursor, p);
        let base = declarations
            .type_expr
            .ty
            .clone()
            .unwrap_or_else(|| Type::class(&declarations.type_expr.base_name()));
        let ty = if declarations.varargs.is_some() { array_of(base, 1) } else { base };
        let field = is_field(cursor);
        let flags = match enclosing_class(cursor) {
            Some(class) if field => field_flags(class.kind, &declarations),
            _ => declared_flags(&declarations.decorations).collect(),
        };

        let mut variables = Vec::with_capacity(declarations.variables.len());
        for variable in &declarations.variables {
            let var = Arc::new(VarType {
                name: variable.element.name.name.clone(),
                ty: ty.clone(),
                flags: flags.clone(),
            });
            if !field {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push(Arc::clone(&var));
                }
            }
            let name = Arc::clone(&variable.element.name).with_ty(Some(ty.clone()));
            let element = Arc::clone(&variable.element)
                .with_name(name)
                .with_variable_type(Some(var));
            variables.push(Padded::new(element, variable.after.clone()));
        }
        declarations.with_variables(variables)
    }

    fn visit_type_name(&mut self, node: Arc<TypeName>, cursor: &Cursor<'_, J>, _: &mut ()) -> Arc<TypeName> {
        let type_arguments = self.type_arguments(&node.type_arguments, cursor);
        let ty = self.type_of(&node);
        let name = match &node.name {
            Expression::Identifier(identifier) if node.dimensions.is_empty() => {
                Expression::Identifier(Arc::clone(identifier).with_ty(Some(ty.clone())))
            }
            other => other.clone(),
        };
        node.with_type_arguments(type_arguments)
            .with_name(name)
            .with_ty(Some(ty))
    }

    fn visit_expression(&mut self, expression: Expression, cursor: &Cursor<'_, J>, p: &mut ()) -> Expression {
        match walk_expression(self, expression, cursor, p) {
            Expression::Identifier(identifier) => {
                let ty = self.identifier_type(&identifier.name);
                Expression::Identifier(identifier.with_ty(ty))
            }
            other => other,
        }
    }

    fn visit_field_access(&mut self, node: Arc<FieldAccess>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<FieldAccess> {
        let node = walk_field_access(self, node, cursor, p);
        let ty = self.field_access_type(&node);
        let name = LeftPadded::new(node.name.before.clone(), Arc::clone(&node.name.element).with_ty(ty.clone()));
        node.with_name(name).with_ty(ty)
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        cursor: &Cursor<'_, J>,
        p: &mut (),
    ) -> Arc<MethodInvocation> {
        let node = walk_method_invocation(self, node, cursor, p);
        let method_type = self.invoked_method(&node);
        let name = Arc::clone(&node.name).with_ty(method_type.clone().map(Type::Method));
        node.with_name(name).with_method_type(method_type)
    }

    fn visit_assignment(&mut self, node: Arc<Assignment>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Assignment> {
        let node = walk_assignment(self, node, cursor, p);
        let ty = node.variable.ty();
        node.with_ty(ty)
    }

    fn visit_new_class(&mut self, node: Arc<NewClass>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<NewClass> {
        let node = walk_new_class(self, node, cursor, p);
        let constructor = self.constructor(&node);
        node.with_constructor_type(constructor)
    }

    fn visit_binary(&mut self, node: Arc<Binary>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Binary> {
        let node = walk_binary(self, node, cursor, p);
        let ty = binary_type(node.operator.element, node.left.ty(), node.right.ty());
        node.with_ty(ty)
    }

    fn visit_unary(&mut self, node: Arc<Unary>, cursor: &Cursor<'_, J>, p: &mut ()) -> Arc<Unary> {
        let node = walk_unary(self, node, cursor, p);
        let ty = match node.operator {
            UnaryOperator::Not => Some(Type::Primitive(Primitive::Boolean)),
            _ => node.expression.ty(),
        };
        node.with_ty(ty)
    }
}

// ============================================================================
// Source set marker
// ============================================================================

/// The type table an attributed unit was attributed against.
///
/// Two markers are equal when they share the same table.
#[derive(Clone)]
pub struct JavaSourceSet(pub Arc<TypeTable>);

impl JavaSourceSet {
    /// The table of an attributed unit.
    pub fn of(unit: &CompilationUnit) -> Option<Arc<TypeTable>> {
        unit.markers
            .find_first::<JavaSourceSet>()
            .map(|set| Arc::clone(&set.0))
    }
}

impl fmt::Debug for JavaSourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JavaSourceSet").field("classes", &self.0.len()).finish()
    }
}

impl PartialEq for JavaSourceSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for JavaSourceSet {}

impl Hash for JavaSourceSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl Marker for JavaSourceSet {
    fn kind(&self) -> &'static str {
        "JavaSourceSet"
    }
}

// ============================================================================
// Tests
// ============================================================================
