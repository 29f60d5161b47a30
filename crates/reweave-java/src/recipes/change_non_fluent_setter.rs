// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use reweave_core::cursor::Cursor;
use reweave_core::print::Codegen;
use reweave_core::recipe::{Recipe, RecipeEntry, RecipeOptions};
use reweave_core::template::{Coordinate, Template};
use reweave_core::text::trim_indent;
use reweave_core::tree::{Comment, CommentStyle, NodeId, Space};
use reweave_core::typing::{is_of_class_type, Flag, Type};
use reweave_core::visitor::TreeVisitor;
use reweave_core::{ConstructionError, ExecutionContext};
use tracing::{debug, error};

use crate::template::{apply_to_block, apply_to_method};
use crate::tree::{Block, ClassDeclaration, Expression, MethodDeclaration, MethodInvocation, Statement, TypeName, J};
use crate::visitor::{enclosing_class_or_err, walk_block, walk_method_declaration, JavaVisitor};

/// Turns `void` setters of a class into setters returning `this`, and fuses
/// runs of consecutive fluent setter calls on one receiver into a chain.
///
/// A setter qualifies when it is public, returns `void`, takes one
/// parameter and its body is a single assignment to a field of the class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNonFluentSetterToFluentSetter {
    fully_qualified_target_type_name: String,
}

impl ChangeNonFluentSetterToFluentSetter {
    pub const NAME: &'static str = "java.ChangeNonFluentSetterToFluentSetter";
    const OPTIONS: &'static [&'static str] = &["fullyQualifiedTargetTypeName"];

    pub fn new(fully_qualified_target_type_name: impl Into<String>) -> Result<Self, ConstructionError> {
        let options = RecipeOptions::new().with("fullyQualifiedTargetTypeName", fully_qualified_target_type_name);
        Self::from_options(&options)
    }

    pub fn from_options(options: &RecipeOptions) -> Result<Self, ConstructionError> {
        options.require(Self::NAME, Self::OPTIONS)?;
        Ok(ChangeNonFluentSetterToFluentSetter {
            fully_qualified_target_type_name: options.required(Self::NAME, "fullyQualifiedTargetTypeName")?,
        })
    }

    pub fn entry() -> RecipeEntry {
        RecipeEntry {
            name: Self::NAME,
            description: "Make the setters of a class fluent and chain consecutive calls to them.",
            options: Self::OPTIONS,
            constructor: |options| Ok(Arc::new(Self::from_options(options)?)),
        }
    }
}

impl Recipe for ChangeNonFluentSetterToFluentSetter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change non-fluent setters to fluent setters"
    }

    fn description(&self) -> &str {
        "Make the setters of a class fluent and chain consecutive calls to them."
    }

    fn options(&self) -> RecipeOptions {
        RecipeOptions::new().with("fullyQualifiedTargetTypeName", self.fully_qualified_target_type_name.clone())
    }

    fn visitor(&self, _ctx: &ExecutionContext) -> Box<dyn TreeVisitor> {
        FluentSetterVisitor::new(self.fully_qualified_target_type_name.as_str()).into_tree_visitor()
    }
}

struct FluentSetterVisitor {
    target: String,
    /// Appended to each setter made fluent.
    return_this: Template,
    /// Stands in for the first call of a fused run.
    chain: Template,
}

impl FluentSetterVisitor {
    fn new(target: impl Into<String>) -> Self {
        FluentSetterVisitor {
            target: target.into(),
            return_this: Template::new("return this;"),
            chain: Template::new("#{}"),
        }
    }

    fn is_target_class(&self, class: &ClassDeclaration, ctx: &mut ExecutionContext) -> bool {
        match &class.ty {
            Some(ty) => is_of_class_type(Some(ty), &self.target),
            None => {
                ctx.record_type_gap(class.id, format_args!("class {}", class.name.name));
                false
            }
        }
    }

    /// `public void setX(T value) { x = value; }` in the target class.
    fn is_non_fluent_setter(&self, class: &ClassDeclaration, method: &MethodDeclaration) -> bool {
        let returns_void = method
            .return_type
            .as_ref()
            .and_then(|rt| rt.ty.as_ref())
            .is_some_and(Type::is_void);
        if !method.has_flag(Flag::Public) || !returns_void || method.params.len() != 1 {
            return false;
        }
        let Some(body) = &method.body else {
            return false;
        };
        let mut statements = body.statements();
        let (Some(Statement::Assignment(assignment)), None) = (statements.next(), statements.next()) else {
            return false;
        };
        let field = match &assignment.variable {
            Expression::Identifier(_) | Expression::FieldAccess(_) => assignment.variable.simple_name(),
            _ => None,
        };
        let class_type = class.ty.as_ref().and_then(Type::as_class);
        field.is_some_and(|name| class_type.is_some_and(|ty| ty.member(name).is_some()))
    }

    /// `receiver.setX(value)` where `setX` is a public method of the target
    /// class returning the target class.
    fn fluent_receiver(&self, statement: &Statement, ctx: &mut ExecutionContext) -> Option<String> {
        let call = statement.as_method_invocation()?;
        let select = call.select()?;
        let Some(select_type) = select.ty() else {
            ctx.record_type_gap(select.id(), format_args!("receiver of {}", call.name.name));
            return None;
        };
        let method_type = call.method_type.as_ref()?;
        let fluent = is_of_class_type(Some(&select_type), &self.target)
            && method_type.has_flag(Flag::Public)
            && is_of_class_type(Some(&method_type.return_type), &self.target)
            && call.args.len() == 1;
        fluent.then(|| select.clone().with_prefix(Space::EMPTY).print())
    }

    /// Ids of the statements of each run of two or more fluent calls on the
    /// same receiver.
    fn fluent_runs(&self, block: &Block, ctx: &mut ExecutionContext) -> Vec<Vec<NodeId>> {
        let mut runs = Vec::new();
        let mut run: Vec<NodeId> = Vec::new();
        let mut receiver: Option<String> = None;
        for statement in block.statements() {
            let next = self.fluent_receiver(statement, ctx);
            if next.is_none() || next != receiver {
                if run.len() > 1 {
                    runs.push(std::mem::take(&mut run));
                } else {
                    run.clear();
                }
            }
            if next.is_some() {
                run.push(statement.id());
            }
            receiver = next;
        }
        if run.len() > 1 {
            runs.push(run);
        }
        runs
    }

    /// Replace the first statement of `run` with the chained calls and drop
    /// the rest. Comments ahead of a dropped statement move in front of its
    /// link in the chain.
    fn fuse(&self, cursor: &Cursor<'_, J>, block: Arc<Block>, run: &[NodeId], ctx: &mut ExecutionContext) -> Arc<Block> {
        let calls: Vec<Arc<MethodInvocation>> = run
            .iter()
            .filter_map(|id| block.statements().find(|s| s.id() == *id))
            .filter_map(Statement::as_method_invocation)
            .cloned()
            .collect();
        let Some((first, rest)) = calls.split_first() else {
            return block;
        };
        let mut code = trim_indent(&Arc::clone(first).with_prefix(Space::EMPTY).print());
        for call in rest {
            for comment in &call.prefix.comments {
                code.push('\n');
                code.push_str(&comment_text(comment));
            }
            code.push_str("\n.");
            code.push_str(&Arc::clone(call).with_select(None).with_prefix(Space::EMPTY).print());
        }
        debug!(calls = calls.len(), target = %self.target, "chaining fluent setter calls");

        let statements = block
            .statements
            .iter()
            .filter(|s| !run[1..].contains(&s.element.id()))
            .cloned()
            .collect();
        let pruned = Arc::clone(&block).with_statements(statements);
        apply_to_block(cursor, &block, pruned, Coordinate::replace(run[0]), &self.chain, &[&code], ctx)
    }
}

fn comment_text(comment: &Comment) -> String {
    match comment.style {
        CommentStyle::Line => format!("//{}", comment.text),
        CommentStyle::Block => format!("/*{}*/", comment.text),
    }
}

impl JavaVisitor<ExecutionContext> for FluentSetterVisitor {
    fn visit_method_declaration(
        &mut self,
        method: Arc<MethodDeclaration>,
        cursor: &Cursor<'_, J>,
        ctx: &mut ExecutionContext,
    ) -> Arc<MethodDeclaration> {
        let method = walk_method_declaration(self, method, cursor, ctx);
        let class = match enclosing_class_or_err(cursor) {
            Ok(class) => class,
            Err(err) => {
                error!(method = %method.name.name, %err, "method outside a class");
                ctx.record_ancestor_not_found(method.id, &err);
                return method;
            }
        };
        if !self.is_target_class(&class, ctx) || !self.is_non_fluent_setter(&class, &method) {
            return method;
        }
        let (Some(old_return), Some(body)) = (&method.return_type, &method.body) else {
            return method;
        };
        debug!(class = %self.target, setter = %method.name.name, "making setter fluent");

        let class_type = class.ty.clone().unwrap_or_else(|| Type::class(self.target.as_str()));
        let return_type = TypeName::build(&class.name.name, Some(class_type)).with_prefix(old_return.prefix.clone());
        let body = body.id;
        let edited = Arc::clone(&method).with_return_type(Some(return_type));
        apply_to_method(
            cursor,
            &method,
            edited,
            Coordinate::last_statement(body),
            &self.return_this,
            &[],
            ctx,
        )
    }

    fn visit_block(&mut self, block: Arc<Block>, cursor: &Cursor<'_, J>, ctx: &mut ExecutionContext) -> Arc<Block> {
        let mut block = walk_block(self, block, cursor, ctx);
        for run in self.fluent_runs(&block, ctx) {
            block = self.fuse(cursor, block, &run, ctx);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JavaParser;
    use reweave_core::typing::Primitive;
    use reweave_core::DiagnosticKind;

    const SETTER: &str = "package org;\n\npublic class A {\n    private String foo;\n\n    public void setFoo(String value) {\n        foo = value;\n    }\n\n    void setQuietly(String value) {\n        foo = value;\n    }\n\n    public void setTwice(String value) {\n        foo = value;\n        foo = value;\n    }\n\n    public void setOther(String value) {\n        other = value;\n    }\n}\n";

    const FLUENT: &str = "package org;\n\npublic class A {\n    private String foo;\n\n    public A setFoo(String value) {\n        foo = value;\n        return this;\n    }\n\n    public A setBar(String value) {\n        foo = value;\n        return this;\n    }\n}\n";

    const CALLER: &str = "package org;\n\npublic class B {\n    void configure(A a) {\n        a.setFoo(\"x\");\n        a.setBar(\"y\");\n    }\n}\n";

    fn template_failed(ctx: &ExecutionContext) -> bool {
        ctx.diagnostics().iter().any(|d| d.kind == DiagnosticKind::TemplateParse)
    }

    fn visitor() -> FluentSetterVisitor {
        FluentSetterVisitor::new("org.A")
    }

    #[test]
    fn only_single_assignment_public_void_setters_qualify() {
        let unit = JavaParser::new().parse("A.java", SETTER).unwrap();
        let class = &unit.classes[0];
        let qualifying: Vec<&str> = class
            .methods()
            .filter(|m| visitor().is_non_fluent_setter(class, m))
            .map(|m| m.name.name.as_str())
            .collect();
        assert_eq!(qualifying, vec!["setFoo"]);
    }

    #[test]
    fn other_classes_are_ignored() {
        let unit = JavaParser::new().parse("A.java", &SETTER.replace("class A", "class B")).unwrap();
        let mut ctx = ExecutionContext::new();
        assert!(!visitor().is_target_class(&unit.classes[0], &mut ctx));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn return_type_is_the_target_class() {
        let unit = JavaParser::new().parse("A.java", SETTER).unwrap();
        let out = visitor().visit_root(unit, &mut ExecutionContext::new());
        let setter = out.classes[0].methods().find(|m| m.name.name == "setFoo").unwrap();
        let return_type = setter.return_type.as_ref().unwrap();
        assert_eq!(return_type.ty.as_ref().and_then(Type::fully_qualified_name), Some("org.A"));
        assert_ne!(return_type.ty, Some(Type::Primitive(Primitive::Void)));
        assert_eq!(return_type.print(), " A");
    }

    #[test]
    fn options_round_trip_through_the_registry_entry() {
        let recipe = ChangeNonFluentSetterToFluentSetter::new("org.A").unwrap();
        assert_eq!(
            recipe.descriptor().to_string(),
            "java.ChangeNonFluentSetterToFluentSetter(fullyQualifiedTargetTypeName=org.A)"
        );
        let entry = ChangeNonFluentSetterToFluentSetter::entry();
        let built = (entry.constructor)(&recipe.options()).unwrap();
        assert_eq!(built.descriptor(), recipe.descriptor());
    }

    #[test]
    fn failed_chain_keeps_every_call_of_the_run() {
        let unit = JavaParser::new().depends_on([FLUENT]).parse("B.java", CALLER).unwrap();
        let mut broken = FluentSetterVisitor {
            chain: Template::new("#{} +"),
            ..visitor()
        };
        let mut ctx = ExecutionContext::new();
        let out = broken.visit_root(unit, &mut ctx);
        assert_eq!(out.print(), CALLER);
        assert!(template_failed(&ctx));
    }

    #[test]
    fn failed_return_keeps_the_void_setter() {
        let unit = JavaParser::new().parse("A.java", SETTER).unwrap();
        let mut broken = FluentSetterVisitor {
            return_this: Template::new("return this +"),
            ..visitor()
        };
        let mut ctx = ExecutionContext::new();
        let out = broken.visit_root(unit, &mut ctx);
        assert_eq!(out.print(), SETTER);
        assert!(template_failed(&ctx));
    }

    #[test]
    fn comments_between_fused_calls_are_kept() {
        let caller = CALLER.replace("        a.setBar", "        // then bar\n        a.setBar");
        let unit = JavaParser::new().depends_on([FLUENT]).parse("B.java", &caller).unwrap();
        let mut ctx = ExecutionContext::new();
        let out = visitor().visit_root(unit, &mut ctx);
        assert!(out.print().contains(
            "        a.setFoo(\"x\")\n                // then bar\n                .setBar(\"y\");\n    }"
        ));
    }
}
